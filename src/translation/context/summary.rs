/*!
 * Corpus summary used as translation context.
 *
 * The summary is produced once per run by the model: the names and terms that
 * must be translated consistently, a style note for each speaking character,
 * and a free-form style guide. Once the terms are translated the summary
 * becomes a [`Summary`] holding the glossary instead of the raw term list.
 */

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::glossary::Glossary;

/// Summary as returned by the analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    /// Source-language names and terms to keep consistent
    pub terms: Vec<String>,

    /// Character name to translation style note
    #[serde(default)]
    pub character_styles: Map<String, Value>,

    /// Opaque style guide, passed back to the model verbatim
    #[serde(default)]
    pub style_guide: Value,
}

impl CorpusSummary {
    /// Named characters that received no style note
    pub fn characters_without_style(&self, characters: &BTreeSet<String>) -> Vec<String> {
        characters
            .iter()
            .filter(|name| !self.character_styles.contains_key(name.as_str()))
            .cloned()
            .collect()
    }

    /// Log a warning for each named character the model skipped
    pub fn warn_missing_styles(&self, characters: &BTreeSet<String>) {
        for name in self.characters_without_style(characters) {
            warn!("No style note for character '{}'", name);
        }
    }

    /// Distinct terms, in first-seen order
    pub fn distinct_terms(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty() && seen.insert(t.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// Replace the term list by its translations
    pub fn into_summary(self, glossary: Glossary) -> Summary {
        Summary {
            glossary,
            character_styles: self.character_styles,
            style_guide: self.style_guide,
        }
    }
}

/// Run-scoped translation context shared by every dialogue prompt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    /// Source term to target-language base form
    pub glossary: Glossary,

    pub character_styles: Map<String, Value>,

    pub style_guide: Value,
}
