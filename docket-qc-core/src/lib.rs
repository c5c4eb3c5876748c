// Docket QC Core Library
//
// Extracts module dimensions and dimension chains from cabinetry drawing text
// and cross-checks them. Page-text extraction sits behind the preprocessor
// layer; everything after it is pure.

pub mod types;
pub mod error;
pub mod preprocessors;
pub mod processor;
pub mod config;
pub mod rules;
pub mod classifier;
pub mod report;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::ExtractionError;
pub use preprocessors::{PdfPreprocessor, Preprocessor, TextPreprocessor};
pub use processor::{DocumentProcessor, LoadedDocument, PipelineStages, StepProfiler};
pub use config::QcConfig;
pub use report::QcReport;
pub use rules::{Findings, RecordBuilder, RuleEngine};

// Re-export backends for direct use
#[cfg(feature = "lopdf-backend")]
pub use preprocessors::LopdfBackend;

#[cfg(feature = "pdf-extract-backend")]
pub use preprocessors::PdfExtractBackend;
