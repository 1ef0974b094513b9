use anyhow::{Context, Result, anyhow};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::AppError;
use crate::translation::document::DialogueDocument;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @reads: Whole file as UTF-8
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read file: {}", path.as_ref().display()))
    }

    // @writes: Content through a temporary file in the target directory, then renames it
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::ensure_dir(parent)?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in: {}", parent.display()))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to write file {}: {}", path.display(), e))?;
        Ok(())
    }

    // @checks: Output may be written, refusing to clobber unless forced
    pub fn check_output_path<P: AsRef<Path>>(path: P, force_overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(anyhow!("Output path is a directory: {}", path.display()));
        }
        if Self::file_exists(path) && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {} (use --force-overwrite to replace it)",
                path.display()
            ));
        }
        Ok(())
    }

    // @reads: Dialogue document JSON
    pub fn read_document<P: AsRef<Path>>(path: P) -> Result<DialogueDocument> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open dialogue file: {}", path.display()))?;
        let document = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            AppError::Document(format!("Invalid dialogue document {}: {}", path.display(), e))
        })?;
        Ok(document)
    }

    // @writes: Dialogue document as JSON with 2-space indentation
    pub fn write_document<P: AsRef<Path>>(path: P, document: &DialogueDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)
            .context("Failed to serialize dialogue document")?;
        Self::write_to_file(path, &json)
    }
}
