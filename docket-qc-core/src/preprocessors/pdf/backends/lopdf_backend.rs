use super::PdfBackend;
use crate::error::ExtractionError;
use anyhow::Result;
use lopdf::Document;

/// Per-page extraction with lopdf
#[derive(Debug, Default, Clone)]
pub struct LopdfBackend {
    password: Option<String>,
}

impl LopdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(password: Option<String>) -> Self {
        Self { password }
    }

    fn load(&self, pdf_bytes: &[u8]) -> Result<Document, ExtractionError> {
        let mut doc = Document::load_mem(pdf_bytes).map_err(|e| {
            let message = e.to_string();
            // lopdf may refuse encrypted files outright
            if message.contains("encrypted") || message.contains("password") {
                ExtractionError::PasswordRequired
            } else {
                ExtractionError::Load(message)
            }
        })?;

        if doc.is_encrypted() {
            let Some(password) = self.password.as_deref() else {
                return Err(ExtractionError::PasswordRequired);
            };
            doc.decrypt(password).map_err(|e| {
                let message = e.to_string();
                if message.contains("password") || message.contains("decrypt") {
                    ExtractionError::InvalidPassword
                } else {
                    ExtractionError::Load(format!("Decryption failed: {}", message))
                }
            })?;
        }

        Ok(doc)
    }
}

impl PdfBackend for LopdfBackend {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<Option<String>>> {
        let doc = self.load(pdf_bytes)?;

        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => Some(text),
                Err(e) => {
                    log::warn!("⚠️  lopdf could not extract page {}: {}", page_num, e);
                    None
                }
            })
            .collect();

        Ok(pages)
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail_to_load() {
        let err = LopdfBackend::new()
            .extract_pages(b"this is not a pdf")
            .unwrap_err();
        assert!(err.downcast_ref::<ExtractionError>().is_some());
    }

    #[test]
    fn test_password_is_kept() {
        let backend = LopdfBackend::with_password(Some("s3cret".to_string()));
        assert_eq!(backend.password.as_deref(), Some("s3cret"));
        assert_eq!(LopdfBackend::new().password, None);
    }
}
