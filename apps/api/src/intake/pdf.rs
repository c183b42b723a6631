//! Resume PDF text extraction.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to extract text. The PDF might be scanned or protected.")]
    NoText,

    #[error("PDF could not be parsed: {0}")]
    Parse(String),
}

/// Extracts the text layer of a PDF. Runs on the blocking pool since
/// parsing is CPU-bound.
pub async fn extract_text(bytes: bytes::Bytes) -> Result<String, PdfError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| PdfError::Parse(format!("extraction task failed: {e}")))?
        .map_err(|e| PdfError::Parse(e.to_string()))?;

    debug!("Extracted {} characters from PDF", text.len());
    ensure_text(text)
}

fn ensure_text(text: String) -> Result<String, PdfError> {
    if text.trim().is_empty() {
        return Err(PdfError::NoText);
    }
    Ok(text)
}
