//! Plain-text preprocessor for documents that were already run through a
//! text extractor. Pages are separated by form feeds, as `pdftotext` writes them.

use super::preprocessor::{has_extension, Preprocessor};
use anyhow::Result;
use std::path::Path;

pub const PAGE_BREAK: char = '\x0c';

#[derive(Debug, Default)]
pub struct TextPreprocessor;

impl TextPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

/// Split on form feeds. A single trailing form feed doesn't start a new page.
pub fn split_pages(text: &str) -> Vec<String> {
    let text = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
    text.split(PAGE_BREAK).map(str::to_string).collect()
}

impl Preprocessor for TextPreprocessor {
    fn extract_raw_pages(&self, bytes: &[u8]) -> Result<Vec<Option<String>>> {
        let text = String::from_utf8_lossy(bytes);
        Ok(split_pages(&text).into_iter().map(Some).collect())
    }

    fn name(&self) -> &str {
        "TextPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, &["txt", "text"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_feed_splits_pages() {
        let pages = TextPreprocessor::new()
            .process(b"PLAN VIEW - BASE\n\x0cELEVATION A\n\x0c")
            .unwrap();
        assert_eq!(pages, vec!["PLAN VIEW - BASE\n".to_string(), "ELEVATION A\n".to_string()]);
    }

    #[test]
    fn test_no_form_feed_is_one_page() {
        let pages = TextPreprocessor::new().process(b"just one page").unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_blank_pages_are_kept() {
        let pages = split_pages("a\x0c\x0cc");
        assert_eq!(pages, vec!["a".to_string(), String::new(), "c".to_string()]);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let pages = TextPreprocessor::new().process(b"B1\xff-600x560x720").unwrap();
        assert!(pages[0].starts_with("B1"));
    }

    #[test]
    fn test_supports_txt() {
        let p = TextPreprocessor::new();
        assert!(p.supports_file_type(Path::new("docket.txt")));
        assert!(!p.supports_file_type(Path::new("docket.pdf")));
    }
}
