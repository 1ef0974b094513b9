/*!
 * Translation pipeline for game dialogue translation.
 *
 * The pipeline processes a document in two phases:
 * 1. **Analysis Pass**: Summarize the corpus and translate its glossary terms
 * 2. **Translation Pass**: Translate each dialogue under structural constraints,
 *    retrying until the reply mirrors the source shape
 */

pub mod analysis_pass;
pub mod orchestrator;
pub mod translation_pass;

// Re-export types used externally
pub use analysis_pass::{AnalysisPass, AnalysisResult};
pub use orchestrator::{PipelineConfig, PipelineProgress, RunReport, TranslationPipeline};
pub use translation_pass::{DEFAULT_MAX_ATTEMPTS, DialogueOutcome, DialogueTranslator};
