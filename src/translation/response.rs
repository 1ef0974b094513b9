/*!
 * Model reply parsing.
 *
 * Models frequently wrap JSON in a markdown code fence even when asked not
 * to. The fence is stripped before parsing; anything else that does not parse
 * is reported as a malformed response so the caller can retry.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::TranslationError;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[\w+-]*[ \t]*\r?\n?(.*?)\r?\n?```$").unwrap()
});

/// Remove a surrounding markdown code fence, if any
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    }
}

/// Parse a model reply as JSON, tolerating a surrounding code fence
pub fn parse_json_response(reply: &str) -> Result<Value, TranslationError> {
    parse_typed_response(reply)
}

/// Parse a model reply straight into a typed value
pub fn parse_typed_response<T: DeserializeOwned>(reply: &str) -> Result<T, TranslationError> {
    let body = strip_code_fence(reply);
    if body.is_empty() {
        return Err(TranslationError::MalformedResponse(
            "model reply is empty".to_string(),
        ));
    }
    serde_json::from_str(body).map_err(|e| {
        TranslationError::MalformedResponse(format!("{} in reply: {}", e, preview(body)))
    })
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 120;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_CHARS).collect();
        format!("{}...", cut)
    }
}
