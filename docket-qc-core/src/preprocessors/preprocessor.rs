// Preprocessor abstraction for document processing
//
// This module defines the boundary between text extraction (file -> page texts)
// and the QC core (page texts -> records -> findings). The core never sees
// bytes, so any extraction method can sit behind this trait.

use anyhow::Result;
use std::path::Path;

/// Preprocessor trait - converts documents to ordered page texts
///
/// The preprocessing happens in two clear steps:
/// 1. Document -> raw pages, `None` where a page couldn't be read
/// 2. Raw pages -> normalized page texts (shared by all preprocessors)
pub trait Preprocessor {
    /// Step 1: Format-specific extraction
    ///
    /// Errors only when the document as a whole can't be read. A single bad
    /// page is reported as `None` and does not fail the call.
    fn extract_raw_pages(&self, bytes: &[u8]) -> Result<Vec<Option<String>>>;

    /// Step 2: Normalize raw pages into the core's input
    fn normalize(&self, raw: Vec<Option<String>>) -> Vec<String> {
        normalize_pages(raw)
    }

    /// Full document processing (combines both steps)
    fn process(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let raw = self.extract_raw_pages(bytes)?;
        Ok(self.normalize(raw))
    }

    /// Reads the file and processes the bytes
    fn process_file(&self, input: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(input)?;
        self.process(&bytes)
    }

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Missing pages become empty strings, CR and CRLF line endings become LF.
pub fn normalize_pages(raw: Vec<Option<String>>) -> Vec<String> {
    raw.into_iter()
        .enumerate()
        .map(|(index, page)| match page {
            Some(text) => text.replace("\r\n", "\n").replace('\r', "\n"),
            None => {
                log::warn!("⚠️  Page {} could not be extracted, treating as empty", index + 1);
                String::new()
            }
        })
        .collect()
}

/// Case-insensitive extension check shared by the preprocessors
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
