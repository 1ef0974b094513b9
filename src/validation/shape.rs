/*!
 * Structural validation of dialogue translations.
 *
 * A translation must mirror its source dialogue exactly: one list per speech
 * and, for speech *i*, as many strings as the source speech has lines. The
 * parsed model reply is classified into one [`AttemptOutcome`] right after
 * parsing so the retry loop never inspects raw JSON itself.
 */

use serde_json::Value;
use std::fmt;

use crate::translation::document::{Shape, TranslationResult};

/// Structure actually observed in a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedShape {
    /// The reply was not a list at all; holds the JSON type found
    NotAList(&'static str),

    /// One entry per element: its length if it was a list, else its JSON type
    Elements(Vec<ObservedElement>),
}

/// One top-level element of a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedElement {
    List(usize),
    Other(&'static str),
}

impl ObservedShape {
    /// Describe the structure of any JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(items) => ObservedShape::Elements(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Array(lines) => ObservedElement::List(lines.len()),
                        other => ObservedElement::Other(json_type_name(other)),
                    })
                    .collect(),
            ),
            other => ObservedShape::NotAList(json_type_name(other)),
        }
    }
}

impl From<&Shape> for ObservedShape {
    fn from(shape: &Shape) -> Self {
        ObservedShape::Elements(shape.0.iter().map(|n| ObservedElement::List(*n)).collect())
    }
}

impl fmt::Display for ObservedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedShape::NotAList(kind) => write!(f, "a single {} instead of a list", kind),
            ObservedShape::Elements(elements) => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|e| match e {
                        ObservedElement::List(n) => n.to_string(),
                        ObservedElement::Other(kind) => kind.to_string(),
                    })
                    .collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// What is needed to build a corrective prompt from one bad attempt
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionContext {
    /// Line counts of the source dialogue
    pub expected_schema: Shape,

    /// Structure the model actually returned
    pub observed_schema: ObservedShape,

    /// The malformed attempt, re-serialized as compact JSON
    pub prior_attempt_text: String,
}

/// Classification of one model attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Parsed and correctly shaped
    Valid(TranslationResult),

    /// Parsed but the structure differs from the source
    ShapeMismatch(CorrectionContext),

    /// Not usable JSON, or lines that are not strings
    ParseFailure(String),
}

impl AttemptOutcome {
    /// Short description for logging
    pub fn describe(&self) -> String {
        match self {
            AttemptOutcome::Valid(_) => "valid".to_string(),
            AttemptOutcome::ShapeMismatch(ctx) => format!(
                "shape mismatch: expected {}, got {}",
                ctx.expected_schema, ctx.observed_schema
            ),
            AttemptOutcome::ParseFailure(reason) => format!("parse failure: {}", reason),
        }
    }
}

/// Validate a parsed reply against the expected shape
pub fn classify(expected: &Shape, value: &Value) -> AttemptOutcome {
    let observed = ObservedShape::of(value);

    if observed != ObservedShape::from(expected) {
        return AttemptOutcome::ShapeMismatch(CorrectionContext {
            expected_schema: expected.clone(),
            observed_schema: observed,
            prior_attempt_text: value.to_string(),
        });
    }

    match serde_json::from_value::<TranslationResult>(value.clone()) {
        Ok(translation) => AttemptOutcome::Valid(translation),
        Err(e) => AttemptOutcome::ParseFailure(format!("lines must be strings: {}", e)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
