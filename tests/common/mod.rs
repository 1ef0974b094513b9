/*!
 * Common test utilities for the dialogai test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use dialogai::providers::mock::MockProvider;
use dialogai::translation::{DialogueDocument, PipelineConfig, TranslationPipeline, TranslationService};

/// One file, one dialogue, one portrait-less line
pub const HELLO_DOCUMENT: &str = r#"{
  "files": [
    {
      "dialogues": [
        [{"character": "NP", "text": [["Hello.", 12, 18]]}]
      ],
      "path": "Start.tsc"
    }
  ],
  "game_data_root": "data"
}"#;

/// Two files, four dialogues in the first
pub const VILLAGE_DOCUMENT: &str = r#"{
  "files": [
    {
      "dialogues": [
        [{"character": "Sue", "text": [["Hi!"], ["Who are you?"]]}, {"character": "NP", "text": [["She looks scared."]]}],
        [{"character": "NP", "text": [["The door is locked."]]}],
        [{"character": "Jack", "text": [["Get out."]]}],
        [{"character": "Sue", "text": [["Wait!"]]}]
      ],
      "path": "Village.tsc"
    },
    {
      "dialogues": [
        [{"character": "NP", "text": [["Got the key."]]}]
      ],
      "path": "Cave.tsc"
    }
  ]
}"#;

/// Summary reply without terms, so the glossary call is skipped
pub const EMPTY_SUMMARY_REPLY: &str =
    r#"{"terms": [], "character_styles": {}, "style_guide": {"tone": "plain"}}"#;

/// Routes `log` output through the test harness; RUST_LOG=debug shows prompts
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Parses one of the sample documents
pub fn document(json: &str) -> DialogueDocument {
    DialogueDocument::from_json(json).expect("sample document should parse")
}

/// Wraps a mock in a service; the mock clone shares its call log
pub fn mock_service(mock: &MockProvider) -> TranslationService {
    TranslationService::new(Box::new(mock.clone()), CancellationToken::new())
}

/// Pipeline translating into Classical Latin with default limits
pub fn latin_pipeline() -> TranslationPipeline {
    TranslationPipeline::new(PipelineConfig::new("Cave Story", "Classical Latin"))
}
