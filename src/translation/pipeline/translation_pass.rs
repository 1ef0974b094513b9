/*!
 * Translation pass: constrained regeneration of one dialogue.
 *
 * The model is free to choose the words but the reply must mirror the
 * dialogue's structure exactly. Each attempt is classified right after
 * parsing:
 * - transport or parse failure: the same prompt is sent again
 * - wrong structure: the next prompt is a correction built from this attempt
 * - correct structure: done
 *
 * Every answered call adds its cost, whatever the outcome. The loop gives up
 * once the attempt ceiling is passed, without making another call.
 */

use log::{debug, warn};

use crate::errors::TranslationError;
use crate::providers::CompletionRequest;
use crate::translation::context::Summary;
use crate::translation::core::TranslationService;
use crate::translation::document::{DialogueView, Shape, TranslationResult};
use crate::translation::prompts::TranslationPromptBuilder;
use crate::translation::response::parse_json_response;
use crate::validation::{AttemptOutcome, classify};

/// Default attempt ceiling for one dialogue
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Result of translating one dialogue.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueOutcome {
    /// Correctly shaped translation
    pub translation: TranslationResult,

    /// Cost of every call made for this dialogue
    pub cost: f64,

    /// Number of calls made
    pub attempts: usize,
}

/// Bounded retry engine for dialogue translation.
#[derive(Debug, Clone)]
pub struct DialogueTranslator {
    prompts: TranslationPromptBuilder,
    max_attempts: usize,
    max_cost: Option<f64>,
}

impl DialogueTranslator {
    pub fn new(prompts: TranslationPromptBuilder) -> Self {
        Self {
            prompts,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_cost: None,
        }
    }

    /// Set the attempt ceiling
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Abort a dialogue once its calls cost more than this
    pub fn with_max_cost(mut self, max_cost: Option<f64>) -> Self {
        self.max_cost = max_cost;
        self
    }

    /// Classify one raw reply
    pub fn assess(expected: &Shape, reply: &str) -> AttemptOutcome {
        match parse_json_response(reply) {
            Ok(value) => classify(expected, &value),
            Err(e) => AttemptOutcome::ParseFailure(e.to_string()),
        }
    }

    /// Translate one dialogue
    ///
    /// # Arguments
    /// * `service` - Gateway to the model
    /// * `summary` - Glossary, character styles and style guide
    /// * `preceding` - Preceding dialogues of the same file, context only
    /// * `dialogue` - The dialogue to translate
    pub async fn translate(
        &self,
        service: &TranslationService,
        summary: &Summary,
        preceding: &[DialogueView],
        dialogue: &DialogueView,
    ) -> Result<DialogueOutcome, TranslationError> {
        let expected = dialogue.shape();
        let mut prompt = self
            .prompts
            .build_dialogue_prompt(summary, preceding, dialogue);
        let mut cost = 0.0;
        let mut last_failure = String::from("no attempt made");
        let mut attempt = 1;

        loop {
            if attempt > self.max_attempts {
                return Err(TranslationError::RetryExhausted {
                    attempts: self.max_attempts,
                    last_failure,
                });
            }

            let completion = match service.request(CompletionRequest::json(prompt.clone())).await {
                Ok(completion) => completion,
                Err(TranslationError::Cancelled) => return Err(TranslationError::Cancelled),
                Err(e) => {
                    warn!("Attempt {}/{} failed: {}. Trying again.", attempt, self.max_attempts, e);
                    last_failure = e.to_string();
                    attempt += 1;
                    continue;
                }
            };
            cost += completion.cost;

            match Self::assess(&expected, &completion.text) {
                AttemptOutcome::Valid(translation) => {
                    debug!("Dialogue translated in {} attempt(s), ${:.4}", attempt, cost);
                    return Ok(DialogueOutcome {
                        translation,
                        cost,
                        attempts: attempt,
                    });
                }
                AttemptOutcome::ParseFailure(reason) => {
                    warn!(
                        "Attempt {}/{} unusable: {}. Trying again.",
                        attempt, self.max_attempts, reason
                    );
                    last_failure = reason;
                }
                AttemptOutcome::ShapeMismatch(correction) => {
                    warn!(
                        "Attempt {}/{}: valid JSON, but not the right format: expected {}, got {}",
                        attempt, self.max_attempts, correction.expected_schema, correction.observed_schema
                    );
                    last_failure = format!(
                        "shape {} instead of {}",
                        correction.observed_schema, correction.expected_schema
                    );
                    prompt = self.prompts.build_corrective_prompt(dialogue, &correction);
                }
            }

            if let Some(ceiling) = self.max_cost {
                if cost > ceiling {
                    return Err(TranslationError::CostCeilingExceeded { spent: cost, ceiling });
                }
            }
            attempt += 1;
        }
    }
}
