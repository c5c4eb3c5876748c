use thiserror::Error;

/// Failures at the page-text extraction boundary.
///
/// The QC core itself never fails; these only come out of preprocessors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("Password required for encrypted PDF")]
    PasswordRequired,

    #[error("Invalid password for PDF")]
    InvalidPassword,

    #[error("No extraction backend could read the document: {0}")]
    AllBackendsFailed(String),

    #[error("No preprocessor supports input file: {0}")]
    UnsupportedInput(String),
}
