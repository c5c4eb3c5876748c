//! Document Preprocessors
//!
//! This module provides the preprocessing layer for turning input files into
//! the ordered page texts the QC core consumes.
//!
//! ## Architecture
//!
//! ```text
//! Document (PDF, pre-extracted text)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! Raw pages (Option<String> per page)
//!     ↓
//! [normalize_pages]
//!     ↓
//! Page texts (missing pages are "")
//!     ↓
//! [RecordBuilder → checks]
//! ```
//!
//! ## Available Preprocessors
//!
//! - `PdfPreprocessor` - PDF documents via ordered backends (lopdf, pdf-extract)
//! - `TextPreprocessor` - plain text with form-feed page breaks (`pdftotext` output)

pub mod pdf;
pub mod preprocessor;
pub mod text;

// Re-export main types
pub use pdf::{PdfBackend, PdfBackendImpl, PdfPreprocessor};
pub use preprocessor::{normalize_pages, Preprocessor};
pub use text::TextPreprocessor;

// Re-export backends
#[cfg(feature = "lopdf-backend")]
pub use pdf::LopdfBackend;

#[cfg(feature = "pdf-extract-backend")]
pub use pdf::PdfExtractBackend;
