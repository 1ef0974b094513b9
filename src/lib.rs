/*!
 * # dialogai - game dialogue translation with AI
 *
 * A Rust library for translating extracted game dialogue with language models
 * while keeping the structure of every dialogue intact.
 *
 * ## Features
 *
 * - Corpus summary and glossary pass before any dialogue is translated
 * - Dialogue translation with a bounded window of preceding dialogues
 * - Structural validation of every reply with corrective re-prompting
 * - Translate using various AI providers:
 *   - OpenRouter and other OpenAI-compatible APIs
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Per-call cost tracking and an optional cost ceiling per dialogue
 * - ISO 639-1 and ISO 639-2 language code support
 * - Dialogue extraction from `.tsc` game scripts, and writing translations back
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: AI-powered translation services:
 *   - `translation::core`: Model gateway with cancellation and usage tracking
 *   - `translation::document`: Dialogue document model
 *   - `translation::context`: Summary, glossary and context window
 *   - `translation::prompts`: Prompt templates
 *   - `translation::pipeline`: Analysis and translation passes
 * - `validation`: Reply shape classification and row checks
 * - `game_data`: TSC script extraction and rebuilding
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for various LLM providers
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod game_data;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use translation::{DialogueDocument, TranslationPipeline, TranslationService};
