/*!
 * Game data access: pulls the dialogue document out of a folder of `.tsc`
 * scripts and writes translated scripts back in the same layout.
 *
 * - `codec`: script obfuscation
 * - `lexer`: TSC tokens
 * - `script`: dialogue extraction and script rebuilding
 */

pub mod codec;
pub mod lexer;
pub mod script;

use log::{debug, info, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::errors::AppError;
use crate::translation::document::{DialogueDocument, DialogueFile};

pub use codec::{decode_script, encode_script};
pub use script::{extract_dialogues, rebuild_script};

/// Extract every script under `data_dir` that contains at least one dialogue
pub fn extract_document(data_dir: &Path) -> Result<DialogueDocument, AppError> {
    let root = data_dir
        .to_str()
        .ok_or_else(|| AppError::File(format!("Game data path is not UTF-8: {}", data_dir.display())))?;
    if !data_dir.is_dir() {
        return Err(AppError::File(format!("Game data folder not found: {}", root)));
    }

    let pattern = format!("{}/**/*.tsc", glob::Pattern::escape(root));
    let entries = glob::glob(&pattern).map_err(|e| AppError::File(format!("Bad script pattern {}: {}", pattern, e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let bytes = fs::read(&path)?;
        let text = String::from_utf8_lossy(&decode_script(&bytes)).into_owned();
        let dialogues = extract_dialogues(&text);
        if dialogues.is_empty() {
            debug!("No dialogue in {}", path.display());
            continue;
        }

        debug!("{} dialogues in {}", dialogues.len(), path.display());
        files.push(
            DialogueFile::new(dialogues)
                .with_field("original", text)
                .with_field("path", path.to_string_lossy().into_owned()),
        );
    }

    let document = DialogueDocument::new(files).with_leading_field("game_data_root", root);
    info!(
        "Extracted {} dialogues from {} scripts",
        document.dialogue_count(),
        document.files.len()
    );
    Ok(document)
}

// Script path relative to the game data root, refusing anything that would leave the output folder
fn relative_script_path(root: &Path, file: &DialogueFile) -> Result<PathBuf, AppError> {
    let path = file
        .str_field("path")
        .ok_or_else(|| AppError::Document("script entry has no path".to_string()))?;
    let relative = Path::new(path)
        .strip_prefix(root)
        .map_err(|_| AppError::Document(format!("{} is not under {}", path, root.display())))?;

    if relative.as_os_str().is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(AppError::Document(format!("Unexpected script path: {}", path)));
    }
    Ok(relative.to_path_buf())
}

/// Rebuild every script of `document` and write it, encoded, under `output_dir`.
///
/// All scripts are rebuilt before the first one is written, so a broken entry leaves
/// the output folder untouched.
pub fn write_game_files(document: &DialogueDocument, output_dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let root = document
        .str_field("game_data_root")
        .map(Path::new)
        .ok_or_else(|| AppError::Document("document has no game_data_root".to_string()))?;

    let scripts = document
        .files
        .iter()
        .map(|file| -> Result<_, AppError> {
            Ok((output_dir.join(relative_script_path(root, file)?), rebuild_script(file)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut written = Vec::with_capacity(scripts.len());
    for (path, script) in scripts {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, encode_script(script.as_bytes()))?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
