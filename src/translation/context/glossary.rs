/*!
 * Glossary of pre-translated terms.
 *
 * Maps each source-language term to its target-language base form (the
 * nominative singular for Latin nouns). Dialogue prompts require the model to
 * use these forms.
 */

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source term to translated term
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glossary {
    pub entries: BTreeMap<String, String>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translation of a term, if known
    pub fn get(&self, term: &str) -> Option<&str> {
        self.entries.get(term).map(String::as_str)
    }

    /// Add or replace a term translation
    pub fn insert(&mut self, term: impl Into<String>, translation: impl Into<String>) {
        self.entries.insert(term.into(), translation.into());
    }

    /// Requested terms the model returned no translation for
    pub fn missing_terms<'a>(&self, requested: &'a [String]) -> Vec<&'a str> {
        requested
            .iter()
            .filter(|t| !self.entries.contains_key(t.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Log a warning for each requested term left untranslated
    pub fn warn_missing(&self, requested: &[String]) {
        for term in self.missing_terms(requested) {
            warn!("No glossary translation for term '{}'", term);
        }
    }

    /// Compact JSON used inside prompts
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
