//! Axum route handlers for resume intake.

use axum::{extract::Multipart, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::intake::pdf::{extract_text, PdfError};

#[derive(Debug, Serialize)]
pub struct ParsePdfResponse {
    pub text: String,
}

/// POST /api/parse-pdf
///
/// Multipart upload with a `file` field. Returns the PDF's text layer.
pub async fn handle_parse_pdf(mut multipart: Multipart) -> Result<Json<ParsePdfResponse>, AppError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {e}")))?;
            file = Some(bytes);
            break;
        }
    }

    let bytes = file.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    info!("Parsing uploaded PDF ({} bytes)", bytes.len());

    let text = extract_text(bytes).await.map_err(|e| match e {
        PdfError::NoText => AppError::Validation(e.to_string()),
        PdfError::Parse(details) => AppError::PdfParse(details),
    })?;

    Ok(Json(ParsePdfResponse { text }))
}
