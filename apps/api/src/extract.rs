//! PDF text extraction.
//!
//! Extraction is CPU-bound and `pdf-extract` may panic on malformed documents, so
//! [`extract_text`] runs it on the blocking pool and turns a panic into "no text".

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF parse error: {0}")]
    Pdf(String),
}

/// Pluggable text extractor. Default: [`PdfTextExtractor`].
pub trait TextExtractor: Send + Sync {
    /// Returns the document text, or `None` when the document has no extractable text.
    fn extract(&self, bytes: &[u8]) -> Result<Option<String>, ExtractError>;
}

/// Extracts text from PDF bytes with `pdf-extract`.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Option<String>, ExtractError> {
        if !looks_like_pdf(bytes) {
            return Ok(None);
        }
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        Ok(non_empty(text))
    }
}

/// Runs `extractor` off the async runtime. Failures and panics are logged and reported as
/// `None` so one unreadable CV does not abort the whole upload.
pub async fn extract_text(
    extractor: Arc<dyn TextExtractor>,
    file_name: &str,
    bytes: Bytes,
) -> Option<String> {
    let result = tokio::task::spawn_blocking(move || extractor.extract(&bytes)).await;
    match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Could not extract text from {file_name}: {e}");
            None
        }
        Err(e) => {
            warn!("Text extraction for {file_name} aborted: {e}");
            None
        }
    }
}

/// PDF files start with `%PDF`, possibly after a few bytes of garbage.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes
        .windows(4)
        .take(1024)
        .any(|w| w == b"%PDF")
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanickingExtractor;

    impl TextExtractor for PanickingExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<Option<String>, ExtractError> {
            panic!("malformed xref table");
        }
    }

    struct FailingExtractor;

    impl TextExtractor for FailingExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<Option<String>, ExtractError> {
            Err(ExtractError::Pdf("encrypted".into()))
        }
    }

    #[test]
    fn test_non_pdf_bytes_yield_none() {
        let result = PdfTextExtractor.extract(b"plain text, not a pdf").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_looks_like_pdf_accepts_leading_garbage() {
        assert!(looks_like_pdf(b"\xef\xbb\xbf%PDF-1.7\n"));
        assert!(!looks_like_pdf(b"PK\x03\x04 docx archive"));
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  hello \n".into()), Some("hello".into()));
        assert_eq!(non_empty(" \n\t ".into()), None);
    }

    #[tokio::test]
    async fn test_panic_is_reported_as_no_text() {
        let text = extract_text(
            Arc::new(PanickingExtractor),
            "broken.pdf",
            Bytes::from_static(b"%PDF-1.4"),
        )
        .await;
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_error_is_reported_as_no_text() {
        let text = extract_text(
            Arc::new(FailingExtractor),
            "locked.pdf",
            Bytes::from_static(b"%PDF-1.4"),
        )
        .await;
        assert!(text.is_none());
    }
}
