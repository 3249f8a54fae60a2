//! Page text extraction for PDF sources
//!
//! Extracts plain text from PDF documents using pdf-extract. Layout
//! interpretation lives in [`super::layout`].

use std::path::Path;

use super::ImportError;

/// PDF page-text source
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextSource;

impl PdfTextSource {
    /// Extract text content from a PDF file
    pub fn extract_file(path: &Path) -> Result<String, ImportError> {
        tracing::debug!("Extracting text from {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| ImportError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::extract_bytes(&bytes)
    }

    /// Extract text content from PDF bytes
    #[cfg(feature = "pdf")]
    pub fn extract_bytes(bytes: &[u8]) -> Result<String, ImportError> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ImportError::Extraction(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ImportError::Extraction(
                "PDF contains no extractable text".to_string(),
            ));
        }

        Ok(text)
    }

    #[cfg(not(feature = "pdf"))]
    pub fn extract_bytes(_bytes: &[u8]) -> Result<String, ImportError> {
        Err(ImportError::Extraction(
            "PDF support not enabled (build with the `pdf` feature)".to_string(),
        ))
    }
}
