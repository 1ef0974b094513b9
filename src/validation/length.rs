/*!
 * Advisory checks on translated line rows.
 *
 * A line's text may hold several displayed rows separated by `\r\n`. Rows
 * longer than the message box allows, or carrying characters the game font
 * cannot draw, are reported but never rejected: only the shape decides
 * whether a translation is accepted.
 */

use log::debug;
use std::fmt;

use crate::translation::document::{NO_PORTRAIT, TranslationResult};

/// Row separator used inside line texts
pub const ROW_BREAK: &str = "\r\n";

/// Row width limits for the two message box layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLimits {
    /// Rows must stay under this many characters for no-portrait text
    pub no_portrait: usize,
    /// Rows must stay under this many characters next to a portrait
    pub portrait: usize,
}

impl LineLimits {
    /// Limit for a speech by the given character
    pub fn for_character(&self, character: &str) -> usize {
        if character == NO_PORTRAIT {
            self.no_portrait
        } else {
            self.portrait
        }
    }
}

impl Default for LineLimits {
    fn default() -> Self {
        Self {
            no_portrait: 34,
            portrait: 27,
        }
    }
}

/// Types of row issues
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    /// Row is not under the width limit
    TooLong {
        speech: usize,
        line: usize,
        row: String,
        length: usize,
        limit: usize,
    },
    /// Row has characters outside ASCII
    NonAscii {
        speech: usize,
        line: usize,
        row: String,
    },
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::TooLong {
                speech,
                line,
                row,
                length,
                limit,
            } => write!(
                f,
                "speech {} line {}: row of {} chars must be under {}: {:?}",
                speech, line, length, limit, row
            ),
            RowIssue::NonAscii { speech, line, row } => {
                write!(f, "speech {} line {}: non-ASCII row: {:?}", speech, line, row)
            }
        }
    }
}

/// Row checker for accepted translations
pub struct LineLengthValidator {
    limits: LineLimits,
    ascii_only: bool,
}

impl LineLengthValidator {
    pub fn new(limits: LineLimits, ascii_only: bool) -> Self {
        Self { limits, ascii_only }
    }

    /// Check every row of a translation; `characters` gives the speaker of each speech
    pub fn check(&self, characters: &[&str], translation: &TranslationResult) -> Vec<RowIssue> {
        let mut issues = Vec::new();

        for (speech_idx, (character, lines)) in characters.iter().zip(translation).enumerate() {
            let limit = self.limits.for_character(character);

            for (line_idx, text) in lines.iter().enumerate() {
                for row in text.split(ROW_BREAK) {
                    let length = row.chars().count();
                    if length >= limit {
                        issues.push(RowIssue::TooLong {
                            speech: speech_idx,
                            line: line_idx,
                            row: row.to_string(),
                            length,
                            limit,
                        });
                    }
                    if self.ascii_only && !row.is_ascii() {
                        issues.push(RowIssue::NonAscii {
                            speech: speech_idx,
                            line: line_idx,
                            row: row.to_string(),
                        });
                    }
                }
            }
        }

        debug!("Row check found {} issue(s)", issues.len());
        issues
    }
}
