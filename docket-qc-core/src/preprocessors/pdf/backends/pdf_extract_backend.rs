use super::PdfBackend;
use crate::error::ExtractionError;
use anyhow::Result;

const PAGE_BREAK: char = '\x0c';

/// Whole-document extraction with pdf-extract.
///
/// pdf-extract returns one string for the whole file. Pages are recovered from
/// form feeds when it emits them; otherwise the document is a single page.
#[derive(Debug, Default, Clone)]
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for PdfExtractBackend {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<Option<String>>> {
        let text = pdf_extract::extract_text_from_mem(pdf_bytes)
            .map_err(|e| ExtractionError::Load(format!("pdf-extract failed: {}", e)))?;

        let text = text.strip_suffix(PAGE_BREAK).unwrap_or(&text);
        Ok(text.split(PAGE_BREAK).map(|page| Some(page.to_string())).collect())
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}
