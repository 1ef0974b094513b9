/*!
 * Context management for dialogue translation.
 *
 * This module provides the context every dialogue prompt carries:
 * - Corpus summary (terms, character styles, style guide)
 * - Glossary of pre-translated terms
 * - Window of preceding dialogues in the same file
 */

pub mod glossary;
pub mod summary;
pub mod window;

// Re-export main types
pub use glossary::Glossary;
pub use summary::{CorpusSummary, Summary};
pub use window::{ContextWindow, DEFAULT_WINDOW_SIZE};
