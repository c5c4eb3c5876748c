//! PDF Preprocessor
//!
//! Main preprocessor for PDF documents. Tries its backends in order and keeps
//! the first result that contains any text.

pub mod backends;

use super::preprocessor::{has_extension, Preprocessor};
use crate::error::ExtractionError;
use anyhow::Result;
use std::path::Path;

pub use backends::PdfBackend;

#[cfg(feature = "lopdf-backend")]
pub use backends::LopdfBackend;

#[cfg(feature = "pdf-extract-backend")]
pub use backends::PdfExtractBackend;

/// Backend enum for runtime backend selection
pub enum PdfBackendImpl {
    #[cfg(feature = "lopdf-backend")]
    Lopdf(LopdfBackend),
    #[cfg(feature = "pdf-extract-backend")]
    PdfExtract(PdfExtractBackend),
    /// Caller-supplied backend
    Custom(Box<dyn PdfBackend>),
}

impl PdfBackend for PdfBackendImpl {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<Option<String>>> {
        match self {
            #[cfg(feature = "lopdf-backend")]
            PdfBackendImpl::Lopdf(backend) => backend.extract_pages(pdf_bytes),
            #[cfg(feature = "pdf-extract-backend")]
            PdfBackendImpl::PdfExtract(backend) => backend.extract_pages(pdf_bytes),
            PdfBackendImpl::Custom(backend) => backend.extract_pages(pdf_bytes),
        }
    }

    fn name(&self) -> &str {
        match self {
            #[cfg(feature = "lopdf-backend")]
            PdfBackendImpl::Lopdf(backend) => backend.name(),
            #[cfg(feature = "pdf-extract-backend")]
            PdfBackendImpl::PdfExtract(backend) => backend.name(),
            PdfBackendImpl::Custom(backend) => backend.name(),
        }
    }
}

fn has_text(pages: &[Option<String>]) -> bool {
    pages
        .iter()
        .flatten()
        .any(|page| !page.trim().is_empty())
}

/// PDF Preprocessor with ordered fallback backends
///
/// - The first backend that returns any non-empty page wins
/// - A backend that loads the file but finds no text is remembered, and its
///   pages are returned if nothing better turns up (image-only PDFs)
/// - If every backend errors, the errors are combined into one
pub struct PdfPreprocessor {
    backends: Vec<PdfBackendImpl>,
}

impl PdfPreprocessor {
    /// Default chain: lopdf, then pdf-extract (whichever are compiled in)
    pub fn new() -> Self {
        Self::with_password(None)
    }

    /// Default chain, with a password for encrypted documents
    #[cfg_attr(not(feature = "lopdf-backend"), allow(unused_variables))]
    pub fn with_password(password: Option<String>) -> Self {
        #[cfg_attr(
            not(any(feature = "lopdf-backend", feature = "pdf-extract-backend")),
            allow(unused_mut)
        )]
        let mut backends = Vec::new();
        #[cfg(feature = "lopdf-backend")]
        backends.push(PdfBackendImpl::Lopdf(LopdfBackend::with_password(password)));
        #[cfg(feature = "pdf-extract-backend")]
        backends.push(PdfBackendImpl::PdfExtract(PdfExtractBackend::new()));
        Self { backends }
    }

    /// Explicit backend chain, tried in the given order
    pub fn with_backends(backends: Vec<PdfBackendImpl>) -> Self {
        Self { backends }
    }

    /// Get the backend names for logging
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }
}

impl Default for PdfPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor for PdfPreprocessor {
    fn extract_raw_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<Option<String>>> {
        let mut empty_result: Option<Vec<Option<String>>> = None;
        let mut failures = Vec::new();

        for backend in &self.backends {
            match backend.extract_pages(pdf_bytes) {
                Ok(pages) if has_text(&pages) => {
                    log::info!("📄 Extracted {} pages with {}", pages.len(), backend.name());
                    return Ok(pages);
                }
                Ok(pages) => {
                    log::warn!(
                        "⚠️  {} read {} pages but found no text, trying next backend",
                        backend.name(),
                        pages.len()
                    );
                    empty_result.get_or_insert(pages);
                }
                Err(e) => {
                    // A password problem won't be solved by another backend
                    if let Some(
                        err @ (ExtractionError::PasswordRequired | ExtractionError::InvalidPassword),
                    ) = e.downcast_ref::<ExtractionError>()
                    {
                        log::error!("🔒 {}: {}", backend.name(), err);
                        return Err(e);
                    }
                    log::warn!("⚠️  {} failed: {}", backend.name(), e);
                    failures.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        if let Some(pages) = empty_result {
            log::warn!("⚠️  No backend found any text, PDF may be image-only");
            return Ok(pages);
        }

        if failures.is_empty() {
            failures.push("no backends configured".to_string());
        }
        Err(ExtractionError::AllBackendsFailed(failures.join("; ")).into())
    }

    fn name(&self) -> &str {
        "PdfPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, &["pdf"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FixedBackend {
        name: &'static str,
        pages: Option<Vec<Option<String>>>,
    }

    impl PdfBackend for FixedBackend {
        fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<Option<String>>> {
            self.pages
                .clone()
                .ok_or_else(|| anyhow!("{} cannot read this", self.name))
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn fixed(name: &'static str, pages: Option<Vec<Option<String>>>) -> PdfBackendImpl {
        PdfBackendImpl::Custom(Box::new(FixedBackend { name, pages }))
    }

    struct LockedBackend;

    impl PdfBackend for LockedBackend {
        fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<Option<String>>> {
            Err(ExtractionError::PasswordRequired.into())
        }

        fn name(&self) -> &str {
            "locked"
        }
    }

    #[test]
    fn test_first_backend_with_text_wins() {
        let pre = PdfPreprocessor::with_backends(vec![
            fixed("first", Some(vec![Some("A".into())])),
            fixed("second", Some(vec![Some("B".into())])),
        ]);
        assert_eq!(pre.process(b"%PDF").unwrap(), vec!["A".to_string()]);
    }

    #[test]
    fn test_falls_through_errors_and_empty_results() {
        let pre = PdfPreprocessor::with_backends(vec![
            fixed("broken", None),
            fixed("blank", Some(vec![Some("  ".into()), None])),
            fixed("good", Some(vec![None, Some("ELEVATION A".into())])),
        ]);
        assert_eq!(
            pre.process(b"%PDF").unwrap(),
            vec![String::new(), "ELEVATION A".to_string()]
        );
    }

    #[test]
    fn test_empty_result_kept_when_nothing_better() {
        let pre = PdfPreprocessor::with_backends(vec![
            fixed("blank", Some(vec![Some(String::new()), Some(String::new())])),
            fixed("broken", None),
        ]);
        assert_eq!(pre.process(b"%PDF").unwrap().len(), 2);
    }

    #[test]
    fn test_all_backends_failing_is_an_error() {
        let pre = PdfPreprocessor::with_backends(vec![fixed("a", None), fixed("b", None)]);
        let err = pre.process(b"%PDF").unwrap_err();
        match err.downcast_ref::<ExtractionError>() {
            Some(ExtractionError::AllBackendsFailed(message)) => {
                assert!(message.contains("a: a cannot read this"));
                assert!(message.contains("b: b cannot read this"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_password_error_stops_the_chain() {
        let pre = PdfPreprocessor::with_backends(vec![
            PdfBackendImpl::Custom(Box::new(LockedBackend)),
            fixed("good", Some(vec![Some("text".into())])),
        ]);
        let err = pre.process(b"%PDF").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractionError>(),
            Some(ExtractionError::PasswordRequired)
        ));
    }

    #[test]
    fn test_supports_pdf_only() {
        let pre = PdfPreprocessor::with_backends(Vec::new());
        assert!(pre.supports_file_type(Path::new("Kitchen Docket.PDF")));
        assert!(!pre.supports_file_type(Path::new("docket.txt")));
    }

    #[test]
    #[cfg(all(feature = "lopdf-backend", feature = "pdf-extract-backend"))]
    fn test_password_chain_keeps_default_order() {
        let pre = PdfPreprocessor::with_password(Some("s3cret".to_string()));
        assert_eq!(pre.backend_names(), vec!["lopdf", "pdf-extract"]);
    }
}
