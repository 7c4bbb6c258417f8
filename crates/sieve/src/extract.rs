//! Document-to-text extraction.
//!
//! The engine treats extraction as a pluggable collaborator behind
//! [`TextExtractor`]; the default [`LocalTextExtractor`] handles PDF and
//! plain text. DOCX and image OCR need their own backends and plug in behind
//! the same trait. Extraction is synchronous and CPU-bound, so the queue
//! worker runs it through `spawn_blocking`.

use std::path::Path;

use crate::errors::ExtractError;

/// Turns a source document into raw text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Extraction from the local filesystem: PDF via `pdf-extract`, TXT via
/// lossy UTF-8 read.
pub struct LocalTextExtractor;

impl TextExtractor for LocalTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => extract_pdf(path),
            "txt" => extract_txt(path),
            other => Err(ExtractError::Unsupported(if other.is_empty() {
                "<none>".to_string()
            } else {
                format!(".{other}")
            })),
        }
    }
}

fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn extract_txt(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
