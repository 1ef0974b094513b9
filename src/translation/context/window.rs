/*!
 * Preceding-dialogue context window.
 *
 * Each dialogue is translated with up to `size` dialogues that come right
 * before it in the same file. The window never crosses file boundaries and
 * never contains the dialogue being translated.
 */

use crate::translation::document::{Dialogue, DialogueView};

/// Default number of preceding dialogues shown to the model
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Window of preceding dialogues within one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    pub size: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl ContextWindow {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Dialogues `[index - size, index)` of one file, clipped at its start
    pub fn preceding<'a>(&self, dialogues: &'a [Dialogue], index: usize) -> &'a [Dialogue] {
        let end = index.min(dialogues.len());
        let start = end.saturating_sub(self.size);
        &dialogues[start..end]
    }

    /// Prompt views of the preceding dialogues
    pub fn preceding_views(&self, dialogues: &[Dialogue], index: usize) -> Vec<DialogueView> {
        self.preceding(dialogues, index)
            .iter()
            .map(Dialogue::to_view)
            .collect()
    }
}
