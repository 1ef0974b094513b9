/*!
 * Tests for the dialogue document model
 */

use serde_json::{Value, json};

use dialogai::errors::TranslationError;
use dialogai::translation::document::{DialogueDocument, Shape, TranslationResult};

use crate::common::{HELLO_DOCUMENT, VILLAGE_DOCUMENT, document};

#[test]
fn test_dialogueDocument_parse_shouldKeepUnknownFieldsAndLineMetadata() {
    let doc = document(HELLO_DOCUMENT);

    assert_eq!(doc.files.len(), 1);
    assert_eq!(doc.extra.get("game_data_root"), Some(&json!("data")));
    assert_eq!(doc.files[0].extra.get("path"), Some(&json!("Start.tsc")));

    let line = &doc.files[0].dialogues[0].speeches[0].text[0];
    assert_eq!(line.text, "Hello.");
    assert_eq!(line.trailing, vec![json!(12), json!(18)]);
}

#[test]
fn test_dialogueDocument_serialize_shouldEqualInputValue() {
    let doc = document(VILLAGE_DOCUMENT);

    let written = serde_json::to_value(&doc).unwrap();
    let original: Value = serde_json::from_str(VILLAGE_DOCUMENT).unwrap();

    assert_eq!(written, original);
}

#[test]
fn test_dialogueDocument_counts_shouldCoverAllFiles() {
    let doc = document(VILLAGE_DOCUMENT);

    assert_eq!(doc.dialogue_count(), 5);
    assert_eq!(doc.spoken_lines().len(), 7);
    let characters: Vec<String> = doc.named_characters().into_iter().collect();
    assert_eq!(characters, vec!["Jack".to_string(), "Sue".to_string()]);
}

#[test]
fn test_dialogue_shape_shouldCountLinesPerSpeech() {
    let doc = document(VILLAGE_DOCUMENT);
    let first = &doc.files[0].dialogues[0];

    assert_eq!(first.shape(), Shape(vec![2, 1]));
    assert_eq!(first.shape().to_string(), "[2, 1]");
    assert_eq!(
        first.to_view().to_json(),
        r#"[{"Sue":["Hi!","Who are you?"]},{"NP":["She looks scared."]}]"#
    );
}

#[test]
fn test_applyTranslation_withMatchingShape_shouldReplaceTextOnly() {
    let mut doc = document(HELLO_DOCUMENT);
    let translation: TranslationResult = vec![vec!["Salve.".to_string()]];

    doc.files[0].dialogues[0].apply_translation(&translation).unwrap();

    let written = serde_json::to_value(&doc).unwrap();
    assert_eq!(
        written["files"][0]["dialogues"][0][0],
        json!({"character": "NP", "text": [["Salve.", 12, 18]]})
    );
}

#[test]
fn test_applyTranslation_withWrongShape_shouldLeaveDialogueUntouched() {
    let mut doc = document(HELLO_DOCUMENT);
    let before = doc.clone();
    let translation: TranslationResult = vec![vec!["Salve.".to_string(), "Extra.".to_string()]];

    let result = doc.files[0].dialogues[0].apply_translation(&translation);

    assert!(matches!(result, Err(TranslationError::MalformedResponse(_))));
    assert_eq!(doc, before);
}

#[test]
fn test_dialogueDocument_parse_withBadLines_shouldFail() {
    let empty_line = r#"{"files": [{"dialogues": [[{"character": "NP", "text": [[]]}]]}]}"#;
    let numeric_text = r#"{"files": [{"dialogues": [[{"character": "NP", "text": [[7]]}]]}]}"#;
    let no_files = r#"{"dialogues": []}"#;

    assert!(DialogueDocument::from_json(empty_line).is_err());
    assert!(DialogueDocument::from_json(numeric_text).is_err());
    assert!(DialogueDocument::from_json(no_files).is_err());
}

#[test]
fn test_dialogueDocument_emptyFiles_shouldHaveNoDialogues() {
    let doc = DialogueDocument::from_json(r#"{"files": [{"dialogues": []}]}"#).unwrap();

    assert_eq!(doc.dialogue_count(), 0);
    assert!(doc.spoken_lines().is_empty());
}
