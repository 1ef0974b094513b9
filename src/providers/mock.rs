/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::scripted(...)` - Plays back a queue of replies, failures and hangs
 * - `MockProvider::repeating(...)` - Always answers with the same text
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::hanging()` - Never answers (cancellation testing)
 *
 * Every request is recorded so tests can assert on call counts and prompts.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Provider};

/// One scripted step
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Answer with this text
    Text(String),
    /// Fail with a simulated transport error
    Error(String),
    /// Never answer
    Hang,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Play the script in order, then fail once it is exhausted
    Scripted,
    /// Always answer with the same text
    Repeating(String),
    /// Always fail with an error
    Failing,
    /// Never answer
    Hanging,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Remaining scripted replies
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Cost reported for every answered call
    cost_per_call: f64,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            cost_per_call: 0.0,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that plays back the given replies in order
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new(MockBehavior::Scripted);
        provider
            .script
            .lock()
            .extend(replies.into_iter().map(|r| MockReply::Text(r.into())));
        provider
    }

    /// Create a mock that always answers with the same text
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self::new(MockBehavior::Repeating(reply.into()))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that never answers
    pub fn hanging() -> Self {
        Self::new(MockBehavior::Hanging)
    }

    /// Append a reply to the script
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.script.lock().push_back(MockReply::Text(reply.into()));
        self
    }

    /// Append a simulated transport failure to the script
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(MockReply::Error(message.into()));
        self
    }

    /// Append a call that never answers to the script
    pub fn then_hang(self) -> Self {
        self.script.lock().push_back(MockReply::Hang);
        self
    }

    /// Set the cost reported for every answered call
    pub fn with_cost(mut self, cost_per_call: f64) -> Self {
        self.cost_per_call = cost_per_call;
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.prompt.clone()).collect()
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    fn answer(&self, text: String) -> Result<Completion, ProviderError> {
        Ok(Completion {
            text,
            cost: self.cost_per_call,
            prompt_tokens: None,
            completion_tokens: None,
        })
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            script: Arc::clone(&self.script),
            cost_per_call: self.cost_per_call,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);

        match &self.behavior {
            MockBehavior::Scripted => {
                let step = self.script.lock().pop_front();
                match step {
                    Some(MockReply::Text(text)) => self.answer(text),
                    Some(MockReply::Error(message)) => Err(ProviderError::ConnectionError(message)),
                    Some(MockReply::Hang) => std::future::pending().await,
                    None => Err(ProviderError::RequestFailed(format!(
                        "Mock script exhausted (request #{})",
                        count + 1
                    ))),
                }
            }

            MockBehavior::Repeating(reply) => self.answer(reply.clone()),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Hanging => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
