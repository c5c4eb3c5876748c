//! PDF Backend trait
//!
//! Defines the interface that all PDF extraction backends must implement.
//! Every backend produces the same thing: one optional text per page, in
//! page order, so the rest of the pipeline never knows which one ran.

use anyhow::Result;

/// Backend trait for PDF text extraction
///
/// - Whole-document failures (not a PDF, encrypted, corrupt) are errors
/// - A page the backend couldn't read is `None`, not an error
pub trait PdfBackend: Send + Sync {
    /// Extract PDF bytes to per-page text
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<Option<String>>>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &str;
}

#[cfg(feature = "lopdf-backend")]
pub mod lopdf_backend;

#[cfg(feature = "lopdf-backend")]
pub use lopdf_backend::LopdfBackend;

#[cfg(feature = "pdf-extract-backend")]
pub mod pdf_extract_backend;

#[cfg(feature = "pdf-extract-backend")]
pub use pdf_extract_backend::PdfExtractBackend;
