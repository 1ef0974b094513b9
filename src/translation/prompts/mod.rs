/*!
 * Prompt construction for dialogue translation.
 *
 * This module provides:
 * - The fixed prompt templates
 * - A builder that renders them for a game, a target language and row limits
 */

pub mod templates;

// Re-export main types
pub use templates::{PromptSettings, PromptTemplate, TranslationPromptBuilder};
