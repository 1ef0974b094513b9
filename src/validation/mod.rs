/*!
 * Validation of model replies for dialogue translation.
 *
 * - `shape`: structural classification of a parsed reply (accept, correct or retry)
 * - `length`: advisory row width and character set checks on accepted translations
 */

pub mod length;
pub mod shape;

// Re-export main types
pub use length::{LineLengthValidator, LineLimits, RowIssue};
pub use shape::{AttemptOutcome, CorrectionContext, ObservedElement, ObservedShape, classify};
