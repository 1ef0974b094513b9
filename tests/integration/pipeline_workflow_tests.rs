/*!
 * Integration tests for whole-document runs.
 *
 * Tests the analysis phase, the per-file dialogue loop and the controller's
 * file handling with scripted model replies.
 */

use anyhow::Result;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::fs;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use dialogai::app_config::Config;
use dialogai::app_controller::Controller;
use dialogai::errors::TranslationError;
use dialogai::providers::mock::MockProvider;
use dialogai::translation::{PipelineConfig, PipelineProgress, TranslationPipeline, TranslationService};

use crate::common::{
    EMPTY_SUMMARY_REPLY, HELLO_DOCUMENT, VILLAGE_DOCUMENT, create_temp_dir, create_test_file,
    document, init_logging, latin_pipeline, mock_service,
};

/// Replies for the five village dialogues, in document order
const VILLAGE_REPLIES: [&str; 5] = [
    r#"[["Salve!", "Quis es?"], ["Timet."]]"#,
    r#"[["Porta clausa est."]]"#,
    r#"[["Exi."]]"#,
    r#"[["Mane!"]]"#,
    r#"[["Clavem habeo."]]"#,
];

fn village_mock() -> MockProvider {
    MockProvider::scripted(std::iter::once(EMPTY_SUMMARY_REPLY).chain(VILLAGE_REPLIES))
}

#[tokio::test]
async fn test_run_withSingleLine_shouldTranslateInOneDialogueCall() {
    let mock = MockProvider::scripted([EMPTY_SUMMARY_REPLY, r#"[["Salve."]]"#]);

    let (translated, report) = latin_pipeline()
        .run(&mock_service(&mock), document(HELLO_DOCUMENT), None)
        .await
        .unwrap();

    // Summary call plus one dialogue call, no glossary call without terms
    assert_eq!(mock.request_count(), 2);
    assert_eq!(report.total_attempts, 1);
    assert_eq!(report.dialogues_translated, 1);

    let written = serde_json::to_value(&translated).unwrap();
    assert_eq!(
        written["files"][0]["dialogues"][0][0],
        json!({"character": "NP", "text": [["Salve.", 12, 18]]})
    );
    assert_eq!(written["files"][0]["path"], json!("Start.tsc"));
    assert_eq!(written["game_data_root"], json!("data"));
}

#[tokio::test]
async fn test_run_withExtraLineFirst_shouldAcceptCorrectedReply() {
    let mock = MockProvider::scripted([
        EMPTY_SUMMARY_REPLY,
        r#"[["Salve.", "Extra."]]"#,
        r#"[["Salve."]]"#,
    ]);

    let (translated, report) = latin_pipeline()
        .run(&mock_service(&mock), document(HELLO_DOCUMENT), None)
        .await
        .unwrap();

    assert_eq!(report.total_attempts, 2);
    assert_eq!(mock.request_count(), 3);
    assert!(mock.prompts()[2].contains("The English length schema is [1], but the Classical Latin is [2]."));
    assert_eq!(translated.files[0].dialogues[0].speeches[0].text[0].text, "Salve.");
}

#[tokio::test]
async fn test_run_withTerms_shouldTranslateGlossaryAndUseItInDialoguePrompts() {
    let mock = MockProvider::scripted([
        r#"```json
{"terms": ["Mimiga", "Mimiga", "Polar Star"], "character_styles": {"Sue": "Polite"}, "style_guide": ["No macrons"]}
```"#,
        r#"{"Mimiga": "Mimiga", "Polar Star": "Stella Polaris"}"#,
        r#"[["Salve."]]"#,
    ]);

    let (_, report) = latin_pipeline()
        .run(&mock_service(&mock), document(HELLO_DOCUMENT), None)
        .await
        .unwrap();

    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains("### DATA TO ANALYZE\n[{\"NP\":\"Hello.\"}]"));
    // Duplicate terms are sent once
    assert!(prompts[1].contains(r#"["Mimiga","Polar Star"]"#));
    assert!(prompts[2].contains(r#"{"Mimiga":"Mimiga","Polar Star":"Stella Polaris"}"#));
    assert!(prompts[2].contains("### Character Styles\n{\"Sue\":\"Polite\"}"));
    assert!(prompts[2].contains("### Style Guide\n[\"No macrons\"]"));
    assert_eq!(report.total_attempts, 1);
}

#[tokio::test]
async fn test_run_withSeveralFiles_shouldBoundWindowToSameFile() {
    let mock = village_mock();

    let (translated, report) = latin_pipeline()
        .run(&mock_service(&mock), document(VILLAGE_DOCUMENT), None)
        .await
        .unwrap();

    assert_eq!(report.dialogues_translated, 5);
    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 6);

    // Dialogue 4 of the village sees the three before it
    let fourth = prompts[4].split("### Preceding Dialogues in File").nth(1).unwrap();
    assert!(fourth.contains("Salve!"));
    assert!(fourth.contains("Porta clausa est."));
    assert!(fourth.contains("Exi."));

    // First dialogue of the cave sees nothing from the village
    assert!(prompts[5].contains("### Preceding Dialogues in File\n[]"));

    assert_eq!(translated.files[1].dialogues[0].speeches[0].text[0].text, "Clavem habeo.");
    assert_eq!(translated.files[0].dialogues[0].speeches[0].text[1].text, "Quis es?");
}

#[tokio::test]
async fn test_run_withSmallerWindow_shouldDropOlderDialogues() {
    let mock = village_mock();
    let pipeline = TranslationPipeline::new(PipelineConfig::new("Cave Story", "Classical Latin").with_window(1));

    pipeline
        .run(&mock_service(&mock), document(VILLAGE_DOCUMENT), None)
        .await
        .unwrap();

    let fourth = mock.prompts()[4].clone();
    let preceding = fourth.split("### Preceding Dialogues in File").nth(1).unwrap();
    assert!(preceding.contains("Exi."));
    assert!(!preceding.contains("Porta clausa est."));
}

#[tokio::test]
async fn test_run_withCostlyCalls_shouldReportCumulativeCostAfterEachDialogue() {
    let mock = village_mock().with_cost(0.01);
    let updates: Mutex<Vec<PipelineProgress>> = Mutex::new(Vec::new());
    let callback = |progress: &PipelineProgress| updates.lock().push(progress.clone());

    let (_, report) = latin_pipeline()
        .run(&mock_service(&mock), document(VILLAGE_DOCUMENT), Some(&callback))
        .await
        .unwrap();

    let updates = updates.into_inner();
    assert_eq!(updates.len(), 5);
    assert_eq!(updates[0].index, 1);
    assert_eq!(updates[4].total, 5);
    // The summary call is part of the running total
    assert!((updates[0].cumulative_cost - 0.02).abs() < 1e-9);
    assert!((updates[4].cumulative_cost - 0.06).abs() < 1e-9);
    assert!((report.total_cost() - 0.06).abs() < 1e-9);
    assert!((report.summary_cost - 0.01).abs() < 1e-9);
    assert_eq!(report.term_cost, 0.0);
}

#[tokio::test]
async fn test_run_withLongRows_shouldWarnButKeepTranslation() {
    init_logging();
    let mock = MockProvider::scripted([
        EMPTY_SUMMARY_REPLY,
        r#"[["Salve, viator, in hanc speluncam obscuram."]]"#,
    ]);

    let (translated, report) = latin_pipeline()
        .run(&mock_service(&mock), document(HELLO_DOCUMENT), None)
        .await
        .unwrap();

    assert_eq!(report.row_warnings, 1);
    assert_eq!(
        translated.files[0].dialogues[0].speeches[0].text[0].text,
        "Salve, viator, in hanc speluncam obscuram."
    );
}

#[tokio::test]
async fn test_run_withBadSummary_shouldFailWithoutRetrying() {
    let mock = MockProvider::repeating("I could not find any terms.");

    let result = latin_pipeline()
        .run(&mock_service(&mock), document(HELLO_DOCUMENT), None)
        .await;

    assert!(matches!(result, Err(TranslationError::MalformedResponse(_))));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_run_withEmptyDocument_shouldMakeNoCalls() {
    let mock = MockProvider::failing();

    let (translated, report) = latin_pipeline()
        .run(&mock_service(&mock), document(r#"{"files": []}"#), None)
        .await
        .unwrap();

    assert_eq!(mock.request_count(), 0);
    assert!(translated.files.is_empty());
    assert_eq!(report.total_cost(), 0.0);
}

#[tokio::test]
async fn test_controller_withMockService_shouldWriteTranslatedFile() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let input = create_test_file(temp_dir.path(), "dialogue.json", HELLO_DOCUMENT)?;
    let output = temp_dir.path().join("dialogue.la.json");
    let mock = MockProvider::scripted([EMPTY_SUMMARY_REPLY, r#"[["Salve."]]"#]);
    let controller = Controller::with_config(Config::default())?;

    let report = controller
        .run_with_service(&mock_service(&mock), &input, &output, false)
        .await?;

    assert_eq!(report.dialogues_translated, 1);
    let written: Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(written["files"][0]["dialogues"][0][0]["text"], json!([["Salve.", 12, 18]]));
    // Input untouched
    assert_eq!(fs::read_to_string(&input)?, HELLO_DOCUMENT);
    Ok(())
}

#[tokio::test]
async fn test_controller_withExistingOutput_shouldRefuseBeforeAnyCall() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let input = create_test_file(temp_dir.path(), "dialogue.json", HELLO_DOCUMENT)?;
    let output = create_test_file(temp_dir.path(), "dialogue.la.json", "keep me")?;
    let mock = MockProvider::scripted([EMPTY_SUMMARY_REPLY, r#"[["Salve."]]"#]);
    let controller = Controller::with_config(Config::default())?;

    let result = controller
        .run_with_service(&mock_service(&mock), &input, &output, false)
        .await;

    assert!(result.is_err());
    assert_eq!(mock.request_count(), 0);
    assert_eq!(fs::read_to_string(&output)?, "keep me");

    // Forced runs replace the file
    controller
        .run_with_service(&mock_service(&mock), &input, &output, true)
        .await?;
    assert_ne!(fs::read_to_string(&output)?, "keep me");
    Ok(())
}

#[tokio::test]
async fn test_controller_withExhaustedRetries_shouldWriteNothing() -> Result<()> {
    init_logging();
    let temp_dir = create_temp_dir()?;
    let input = create_test_file(temp_dir.path(), "dialogue.json", HELLO_DOCUMENT)?;
    let output = temp_dir.path().join("dialogue.la.json");
    // Every dialogue call fails once the script runs out
    let mock = MockProvider::scripted([EMPTY_SUMMARY_REPLY]);
    let controller = Controller::with_config(Config::default())?;

    let err = controller
        .run_with_service(&mock_service(&mock), &input, &output, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TranslationError>(),
        Some(TranslationError::RetryExhausted { attempts: 10, .. })
    ));
    assert_eq!(mock.request_count(), 11);
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_controller_withCancellation_shouldWriteNothing() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let input = create_test_file(temp_dir.path(), "dialogue.json", HELLO_DOCUMENT)?;
    let output = temp_dir.path().join("dialogue.la.json");
    let mock = MockProvider::scripted([EMPTY_SUMMARY_REPLY]).then_hang();
    let cancel = CancellationToken::new();
    let service = TranslationService::new(Box::new(mock.clone()), cancel.clone());
    let controller = Controller::with_config(Config::default())?;

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = controller
        .run_with_service(&service, &input, &output, false)
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<TranslationError>(), Some(TranslationError::Cancelled)));
    assert!(!output.exists());
    Ok(())
}
