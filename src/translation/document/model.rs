/*!
 * Core document model types for game dialogue translation.
 *
 * The document is the JSON produced by the dialogue extractor. Only the
 * innermost line texts are ever rewritten; every other field is carried
 * through untouched so the rebuilt game files stay byte-compatible.
 */

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

use crate::errors::TranslationError;

/// Character tag for text shown without a portrait (narration, signs, items)
pub const NO_PORTRAIT: &str = "NP";

/// Translated text of one dialogue: one list of line texts per speech.
pub type TranslationResult = Vec<Vec<String>>;

const DOCUMENT_FIELDS: &[&str] = &["files"];
const FILE_FIELDS: &[&str] = &["dialogues"];
const SPEECH_FIELDS: &[&str] = &["character", "text"];

/// Complete dialogue corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueDocument {
    /// Script files in extraction order
    pub files: Vec<DialogueFile>,

    /// Fields this tool does not interpret (e.g. `game_data_root`)
    pub extra: Map<String, Value>,

    order: FieldOrder,
}

/// One script file and its dialogues.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueFile {
    /// Dialogues in script order
    pub dialogues: Vec<Dialogue>,

    /// Fields this tool does not interpret (e.g. `original`, `path`)
    pub extra: Map<String, Value>,

    order: FieldOrder,
}

/// One scene or conversation unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dialogue {
    pub speeches: Vec<Speech>,
}

/// One character's turn inside a dialogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Speech {
    /// Speaker name, or [`NO_PORTRAIT`]
    pub character: String,

    /// Lines in display order
    pub text: Vec<Line>,

    pub extra: Map<String, Value>,

    order: FieldOrder,
}

/// Key order of an object as it was read, so it is written back the same way.
#[derive(Debug, Clone, PartialEq, Default)]
struct FieldOrder(Vec<String>);

impl FieldOrder {
    /// Split `object` into its `known` fields and the rest
    fn split(object: Map<String, Value>, known: &[&str]) -> (Map<String, Value>, Map<String, Value>, Self) {
        let mut fields = Map::new();
        let mut extra = Map::new();
        let mut order = Vec::with_capacity(object.len());
        for (key, value) in object {
            order.push(key.clone());
            if known.contains(&key.as_str()) {
                fields.insert(key, value);
            } else {
                extra.insert(key, value);
            }
        }
        (fields, extra, Self(order))
    }

    fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    /// Keys to write: unrecorded known fields, then the recorded order, then
    /// extra fields added since reading
    fn keys<'a>(&'a self, known: &[&'a str], extra: &'a Map<String, Value>) -> Vec<&'a str> {
        let mut keys: Vec<&str> = known.iter().copied().filter(|k| !self.contains(k)).collect();
        keys.extend(
            self.0
                .iter()
                .map(String::as_str)
                .filter(|k| known.contains(k) || extra.contains_key(*k)),
        );
        keys.extend(extra.keys().map(String::as_str).filter(|k| !self.contains(k)));
        keys
    }

    fn push(&mut self, key: &str) {
        if !self.contains(key) {
            self.0.push(key.to_string());
        }
    }
}

fn take_field<T: DeserializeOwned, E: de::Error>(fields: &mut Map<String, Value>, key: &'static str) -> Result<T, E> {
    let value = fields.remove(key).ok_or_else(|| E::missing_field(key))?;
    serde_json::from_value(value).map_err(E::custom)
}

/// Write `keys` in order, taking typed fields from `known` and the rest from `extra`
fn serialize_fields<S, F>(
    serializer: S,
    keys: Vec<&str>,
    extra: &Map<String, Value>,
    mut known: F,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    F: FnMut(&mut S::SerializeMap, &str) -> Result<bool, S::Error>,
{
    let mut map = serializer.serialize_map(Some(keys.len()))?;
    for key in keys {
        if known(&mut map, key)? {
            continue;
        }
        if let Some(value) = extra.get(key) {
            map.serialize_entry(key, value)?;
        }
    }
    map.end()
}

impl Serialize for DialogueDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.order.keys(DOCUMENT_FIELDS, &self.extra);
        serialize_fields(serializer, keys, &self.extra, |map, key| match key {
            "files" => map.serialize_entry(key, &self.files).map(|_| true),
            _ => Ok(false),
        })
    }
}

impl<'de> Deserialize<'de> for DialogueDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object: Map<String, Value> = Map::deserialize(deserializer)?;
        let (mut fields, extra, order) = FieldOrder::split(object, DOCUMENT_FIELDS);
        Ok(Self {
            files: take_field(&mut fields, "files")?,
            extra,
            order,
        })
    }
}

impl Serialize for DialogueFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.order.keys(FILE_FIELDS, &self.extra);
        serialize_fields(serializer, keys, &self.extra, |map, key| match key {
            "dialogues" => map.serialize_entry(key, &self.dialogues).map(|_| true),
            _ => Ok(false),
        })
    }
}

impl<'de> Deserialize<'de> for DialogueFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object: Map<String, Value> = Map::deserialize(deserializer)?;
        let (mut fields, extra, order) = FieldOrder::split(object, FILE_FIELDS);
        Ok(Self {
            dialogues: take_field(&mut fields, "dialogues")?,
            extra,
            order,
        })
    }
}

impl Serialize for Speech {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.order.keys(SPEECH_FIELDS, &self.extra);
        serialize_fields(serializer, keys, &self.extra, |map, key| match key {
            "character" => map.serialize_entry(key, &self.character).map(|_| true),
            "text" => map.serialize_entry(key, &self.text).map(|_| true),
            _ => Ok(false),
        })
    }
}

impl<'de> Deserialize<'de> for Speech {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object: Map<String, Value> = Map::deserialize(deserializer)?;
        let (mut fields, extra, order) = FieldOrder::split(object, SPEECH_FIELDS);
        Ok(Self {
            character: take_field(&mut fields, "character")?,
            text: take_field(&mut fields, "text")?,
            extra,
            order,
        })
    }
}

/// A displayed line: a JSON array whose first element is the text.
///
/// Anything after the text (the extractor stores the source byte range there)
/// is kept as-is and written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub trailing: Vec<Value>,
}

impl Line {
    /// A line with no trailing metadata
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            trailing: Vec::new(),
        }
    }
}

impl Serialize for Line {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + self.trailing.len()))?;
        seq.serialize_element(&self.text)?;
        for value in &self.trailing {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Line {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut items = Vec::<Value>::deserialize(deserializer)?;
        if items.is_empty() {
            return Err(de::Error::custom("line container is empty"));
        }
        match items.remove(0) {
            Value::String(text) => Ok(Line {
                text,
                trailing: items,
            }),
            other => Err(de::Error::custom(format!(
                "line text must be a string, found {}",
                other
            ))),
        }
    }
}

/// Per-speech line counts of a dialogue, the structure a translation must mirror.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape(pub Vec<usize>);

impl Shape {
    /// Shape of an already validated translation
    pub fn of_translation(translation: &TranslationResult) -> Self {
        Shape(translation.iter().map(Vec::len).collect())
    }

    /// Number of speeches
    pub fn speech_count(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "[{}]", counts.join(", "))
    }
}

impl Speech {
    /// Create a speech with plain lines
    pub fn new(character: impl Into<String>, lines: &[&str]) -> Self {
        Self {
            character: character.into(),
            text: lines.iter().map(|l| Line::new(*l)).collect(),
            extra: Map::new(),
            order: FieldOrder::default(),
        }
    }

    /// Create a speech from lines that already carry metadata
    pub fn with_lines(character: impl Into<String>, text: Vec<Line>) -> Self {
        Self {
            character: character.into(),
            text,
            extra: Map::new(),
            order: FieldOrder::default(),
        }
    }

    /// Whether this speech is shown without a portrait
    pub fn is_no_portrait(&self) -> bool {
        self.character == NO_PORTRAIT
    }
}

impl Dialogue {
    pub fn new(speeches: Vec<Speech>) -> Self {
        Self { speeches }
    }

    /// Line counts per speech
    pub fn shape(&self) -> Shape {
        Shape(self.speeches.iter().map(|s| s.text.len()).collect())
    }

    /// Prompt-facing view `[{character: [line, ...]}, ...]`
    pub fn to_view(&self) -> DialogueView {
        DialogueView {
            speeches: self
                .speeches
                .iter()
                .map(|s| SpeechView {
                    character: s.character.clone(),
                    lines: s.text.iter().map(|l| l.text.clone()).collect(),
                })
                .collect(),
        }
    }

    /// Replace every line text with its translation.
    ///
    /// Speech attribution, line cardinality and line metadata stay untouched.
    pub fn apply_translation(&mut self, translation: &TranslationResult) -> Result<(), TranslationError> {
        let expected = self.shape();
        let actual = Shape::of_translation(translation);
        if expected != actual {
            return Err(TranslationError::MalformedResponse(format!(
                "translation shape {} does not match dialogue shape {}",
                actual, expected
            )));
        }

        for (speech, lines) in self.speeches.iter_mut().zip(translation) {
            for (line, text) in speech.text.iter_mut().zip(lines) {
                line.text = text.clone();
            }
        }
        Ok(())
    }
}

impl DialogueFile {
    pub fn new(dialogues: Vec<Dialogue>) -> Self {
        Self {
            dialogues,
            extra: Map::new(),
            order: FieldOrder::default(),
        }
    }

    /// Add an uninterpreted field, written after the dialogues
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.order.push("dialogues");
        self.order.push(key);
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Uninterpreted string field, e.g. `path` or `original`
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

impl DialogueDocument {
    pub fn new(files: Vec<DialogueFile>) -> Self {
        Self {
            files,
            extra: Map::new(),
            order: FieldOrder::default(),
        }
    }

    /// Add an uninterpreted field; on a new document it is written before the files
    pub fn with_leading_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.order.push(key);
        self.order.push("files");
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Uninterpreted string field, e.g. `game_data_root`
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Total number of dialogues across all files
    pub fn dialogue_count(&self) -> usize {
        self.files.iter().map(|f| f.dialogues.len()).sum()
    }

    /// One `{character: line}` entry per spoken line, in document order
    pub fn spoken_lines(&self) -> Vec<SpokenLine<'_>> {
        self.files
            .iter()
            .flat_map(|f| f.dialogues.iter())
            .flat_map(|d| d.speeches.iter())
            .flat_map(|s| {
                s.text.iter().map(move |l| SpokenLine {
                    character: &s.character,
                    text: &l.text,
                })
            })
            .collect()
    }

    /// Distinct speaking characters, without the no-portrait tag
    pub fn named_characters(&self) -> BTreeSet<String> {
        self.files
            .iter()
            .flat_map(|f| f.dialogues.iter())
            .flat_map(|d| d.speeches.iter())
            .filter(|s| !s.is_no_portrait())
            .map(|s| s.character.clone())
            .collect()
    }
}

/// One spoken line, serialized as `{character: text}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpokenLine<'a> {
    pub character: &'a str,
    pub text: &'a str,
}

impl Serialize for SpokenLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.character, self.text)?;
        map.end()
    }
}

/// A dialogue as shown to the model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialogueView {
    pub speeches: Vec<SpeechView>,
}

/// A speech as shown to the model, serialized as `{character: [lines]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechView {
    pub character: String,
    pub lines: Vec<String>,
}

impl DialogueView {
    /// Line counts per speech
    pub fn shape(&self) -> Shape {
        Shape(self.speeches.iter().map(|s| s.lines.len()).collect())
    }

    /// Compact JSON used inside prompts
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Serialize for DialogueView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.speeches.serialize(serializer)
    }
}

impl Serialize for SpeechView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.character, &self.lines)?;
        map.end()
    }
}
