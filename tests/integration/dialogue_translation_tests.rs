/*!
 * Integration tests for the dialogue retry and correction loop.
 *
 * Every test drives a real `DialogueTranslator` through a `TranslationService`
 * backed by a scripted mock, then inspects the prompts the mock received.
 */

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use dialogai::errors::TranslationError;
use dialogai::providers::ResponseFormat;
use dialogai::providers::mock::MockProvider;
use dialogai::translation::context::Summary;
use dialogai::translation::document::{Dialogue, DialogueView, Speech};
use dialogai::translation::pipeline::DialogueTranslator;
use dialogai::translation::prompts::{PromptSettings, TranslationPromptBuilder};
use dialogai::translation::TranslationService;

use crate::common::{init_logging, mock_service};

fn translator() -> DialogueTranslator {
    DialogueTranslator::new(TranslationPromptBuilder::new(PromptSettings::new(
        "Cave Story",
        "Classical Latin",
    )))
}

/// Sue speaks two lines, then a portrait-less line: shape [2, 1]
fn sue_dialogue() -> DialogueView {
    Dialogue::new(vec![
        Speech::new("Sue", &["Hi!", "Who are you?"]),
        Speech::new("NP", &["She looks scared."]),
    ])
    .to_view()
}

const SUE_VALID: &str = r#"[["Salve!", "Quis es?"], ["Timet."]]"#;
const SUE_ONE_LINE: &str = r#"[["Salve! Quis es?"], ["Timet."]]"#;
const SUE_MERGED: &str = r#"[["Salve! Quis es? Timet."]]"#;

#[tokio::test]
async fn test_translate_withShapeMismatch_shouldSendCorrectivePromptWithBothSchemas() {
    let mock = MockProvider::scripted([SUE_ONE_LINE, SUE_VALID]);

    let outcome = translator()
        .translate(&mock_service(&mock), &Summary::default(), &[], &sue_dialogue())
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.translation[0], vec!["Salve!", "Quis es?"]);
    assert_eq!(mock.request_count(), 2);

    let prompts = mock.prompts();
    assert!(prompts[0].contains("### Dialogue to Translate"));
    assert!(prompts[1].contains("The English length schema is [2, 1], but the Classical Latin is [1, 1]."));
    assert!(prompts[1].contains(r#"### CLASSICAL LATIN
[["Salve! Quis es?"],["Timet."]]"#));
    // Every dialogue call asks for JSON
    assert!(mock.requests().iter().all(|r| r.format == ResponseFormat::Json));
}

#[tokio::test]
async fn test_translate_withRepeatedMismatch_shouldCorrectOnlyLatestAttempt() {
    let mock = MockProvider::scripted([SUE_ONE_LINE, SUE_MERGED, SUE_VALID]);

    let outcome = translator()
        .translate(&mock_service(&mock), &Summary::default(), &[], &sue_dialogue())
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 3);
    let prompts = mock.prompts();
    assert!(prompts[2].contains("but the Classical Latin is [1]."));
    assert!(prompts[2].contains("Salve! Quis es? Timet."));
    assert!(!prompts[2].contains(r#"["Timet."]"#));
    assert_eq!(prompts[2].matches("### Segmenting Directions").count(), 1);
}

#[tokio::test]
async fn test_translate_withParseFailureAfterCorrection_shouldResendCorrectivePrompt() {
    let mock = MockProvider::scripted([SUE_ONE_LINE, "Sorry, here it is: Salve!", SUE_VALID]);

    let outcome = translator()
        .translate(&mock_service(&mock), &Summary::default(), &[], &sue_dialogue())
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 3);
    let prompts = mock.prompts();
    assert_eq!(prompts[1], prompts[2]);
    assert_ne!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn test_translate_withPersistentMismatch_shouldStopAtTenCalls() {
    init_logging();
    let mock = MockProvider::repeating(SUE_ONE_LINE);

    let result = translator()
        .translate(&mock_service(&mock), &Summary::default(), &[], &sue_dialogue())
        .await;

    match result {
        Err(TranslationError::RetryExhausted { attempts, last_failure }) => {
            assert_eq!(attempts, 10);
            assert!(last_failure.contains("[1, 1]"));
        }
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
    assert_eq!(mock.request_count(), 10);
}

#[tokio::test]
async fn test_translate_withTransportFailures_shouldCountThemAsAttempts() {
    let mock = MockProvider::failing();

    let result = translator()
        .with_max_attempts(3)
        .translate(&mock_service(&mock), &Summary::default(), &[], &sue_dialogue())
        .await;

    assert!(matches!(result, Err(TranslationError::RetryExhausted { attempts: 3, .. })));
    assert_eq!(mock.request_count(), 3);
    // Transport failures are retried with the original prompt
    let prompts = mock.prompts();
    assert!(prompts.iter().all(|p| p == &prompts[0]));
}

#[tokio::test]
async fn test_translate_withFailedAttempts_shouldStillChargeTheirCost() {
    let mock = MockProvider::scripted(["not json", SUE_MERGED, SUE_VALID]).with_cost(0.01);

    let outcome = translator()
        .translate(&mock_service(&mock), &Summary::default(), &[], &sue_dialogue())
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 3);
    assert!((outcome.cost - 0.03).abs() < 1e-12);
}

#[tokio::test]
async fn test_translate_withCostCeiling_shouldAbortBeforeAttemptCeiling() {
    let mock = MockProvider::repeating(SUE_MERGED).with_cost(0.2);

    let result = translator()
        .with_max_cost(Some(0.5))
        .translate(&mock_service(&mock), &Summary::default(), &[], &sue_dialogue())
        .await;

    match result {
        Err(TranslationError::CostCeilingExceeded { spent, ceiling }) => {
            assert!((spent - 0.6).abs() < 1e-9);
            assert_eq!(ceiling, 0.5);
        }
        other => panic!("expected CostCeilingExceeded, got {:?}", other),
    }
    assert_eq!(mock.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withCancellationDuringCall_shouldStopRetrying() {
    let mock = MockProvider::scripted([SUE_ONE_LINE]).then_hang();
    let cancel = CancellationToken::new();
    let service = TranslationService::new(Box::new(mock.clone()), cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = translator()
        .translate(&service, &Summary::default(), &[], &sue_dialogue())
        .await;

    assert!(matches!(result, Err(TranslationError::Cancelled)));
    assert_eq!(mock.request_count(), 2);
}
