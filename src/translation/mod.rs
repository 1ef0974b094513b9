/*!
 * Translation of game dialogue using AI providers.
 *
 * This module contains the core functionality for translating a dialogue
 * corpus. It is split into several submodules:
 *
 * - `core`: The model gateway with cancellation and usage tracking
 * - `document`: Document model for the extracted dialogue corpus
 * - `context`: Summary, glossary and preceding-dialogue window
 * - `prompts`: Prompt templates and builders
 * - `response`: Parsing of model replies
 * - `pipeline`: Analysis and translation passes and their orchestration
 */

// Re-export main types for easier usage
pub use self::core::TranslationService;

// Re-export document model types
pub use self::document::{
    Dialogue, DialogueDocument, DialogueFile, DialogueView, Line, Shape, Speech, TranslationResult,
};

// Re-export pipeline types
pub use self::pipeline::{PipelineConfig, PipelineProgress, RunReport, TranslationPipeline};

// Submodules
pub mod context;
pub mod core;
pub mod document;
pub mod pipeline;
pub mod prompts;
pub mod response;
