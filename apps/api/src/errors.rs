use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::PipelineError;
use crate::intake::IntakeError;

/// Shown whenever a link submission cannot be turned into usable text.
pub const SOURCE_BLOCKED_MESSAGE: &str = "LinkedIn blocked the automated data extraction. \
    Please use the PDF Resume upload method instead for guaranteed results.";

const ANALYSIS_FAILED_MESSAGE: &str = "An error occurred during multi-agent analysis";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Body shape: `{"error": <message>, "code": <CODE>, "details"?: <diagnostics>}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The untrusted source was unreachable or yielded too little text.
    #[error("Profile source unusable: {0}")]
    SourceBlocked(IntakeError),

    #[error("Analysis failed: {0}")]
    Analysis(PipelineError),

    #[error("Analysis timed out: {0}")]
    Timeout(PipelineError),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("PDF parse error: {0}")]
    PdfParse(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Intake(intake) => AppError::SourceBlocked(intake),
            PipelineError::Cancelled => AppError::Cancelled,
            e @ PipelineError::Timeout(_) => AppError::Timeout(e),
            e @ (PipelineError::Provider { .. } | PipelineError::StageParse { .. }) => {
                AppError::Analysis(e)
            }
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::SourceBlocked(e) => {
                tracing::warn!("Profile source rejected: {e}");
                let code = match e {
                    IntakeError::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
                    IntakeError::InsufficientContent(_) => "INSUFFICIENT_CONTENT",
                };
                (
                    StatusCode::BAD_REQUEST,
                    code,
                    SOURCE_BLOCKED_MESSAGE.to_string(),
                    None,
                )
            }
            AppError::Analysis(e) => {
                tracing::error!("Analysis error: {e}");
                let code = match e {
                    PipelineError::StageParse { .. } => "STAGE_PARSE_ERROR",
                    _ => "PROVIDER_ERROR",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    ANALYSIS_FAILED_MESSAGE.to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Timeout(e) => {
                tracing::error!("Analysis timeout: {e}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    ANALYSIS_FAILED_MESSAGE.to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CANCELLED",
                "Analysis was cancelled before completion".to_string(),
                None,
            ),
            AppError::PdfParse(details) => {
                tracing::error!("PDF parse error: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PDF_PARSE_ERROR",
                    "An error occurred while parsing the PDF.".to_string(),
                    Some(details.clone()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let (Some(details), Value::Object(map)) = (details, &mut body) {
            map.insert("details".to_string(), Value::String(details));
        }

        (status, Json(body)).into_response()
    }
}
