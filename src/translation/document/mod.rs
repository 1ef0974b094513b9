/*!
 * Document modeling for game dialogue translation.
 *
 * This module provides the corpus model read from and written back to the
 * dialogue JSON file, plus the compact views sent to the model.
 */

pub mod model;

// Re-export types used by other modules
pub use model::{
    Dialogue, DialogueDocument, DialogueFile, DialogueView, Line, NO_PORTRAIT, Shape, Speech,
    SpeechView, SpokenLine, TranslationResult,
};
