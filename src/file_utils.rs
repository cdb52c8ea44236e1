use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::subtitle_processor::{TIMESTAMP_SEPARATOR, VTT_HEADER};

// @module: File and directory utilities

// @const: Extension of WebVTT files
pub const VTT_EXTENSION: &str = "vtt";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @generates: Output path for translated subtitle
    // @params: input_file, output_dir, target_language, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(target_language);
        output_filename.push('.');
        output_filename.push_str(extension);

        output_dir.as_ref().join(output_filename)
    }

    /// Whether `path` already looks like `<stem>.<target_language>.vtt`
    pub fn is_translation_output<P: AsRef<Path>>(path: P, target_language: &str) -> bool {
        path.as_ref()
            .file_stem()
            .and_then(|stem| Path::new(stem).extension())
            .is_some_and(|lang| lang.to_string_lossy().eq_ignore_ascii_case(target_language))
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            let matches = path.is_file() && path.extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted));
            if matches {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Detect whether a file is a WebVTT subtitle
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        let by_extension = path.extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(VTT_EXTENSION));
        if by_extension {
            return Ok(FileType::Subtitle);
        }

        // Fall back to examining file contents
        if let Ok(content) = fs::read_to_string(path) {
            if content.trim_start().starts_with(VTT_HEADER) && content.contains(TIMESTAMP_SEPARATOR) {
                return Ok(FileType::Subtitle);
            }
        }

        Ok(FileType::Unknown)
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// WebVTT subtitle file
    Subtitle,
    /// Anything else
    Unknown,
}
