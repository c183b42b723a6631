//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::analysis::pipeline::AnalysisPipeline;
use crate::cache::is_valid_key;
use crate::errors::AppError;
use crate::llm_client::ModelClient;
use crate::models::report::FinalReport;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub profile_text: Option<String>,
    pub model: Option<String>,
}

/// POST /api/analyze
///
/// Runs the four-stage chain (or serves a cached report) for the submitted
/// profile text. The `x-cache` response header reports `hit` or `miss`, and
/// `x-diagnosis-key` carries the key for `GET /api/diagnosis/:key`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let profile_text = request
        .profile_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("No profile text provided.".to_string()))?;

    let model = request
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.config.default_model.clone());
    let client = state.llm.for_model(&model);

    // A client disconnect drops this future along with any in-flight provider
    // call, so nothing is cached. The token is for callers that cancel explicitly.
    let cancel = CancellationToken::new();

    let pipeline = AnalysisPipeline {
        cache: state.cache.as_ref(),
        fetcher: &state.fetcher,
        budget: state.config.max_request_duration,
    };

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "analyze",
        %request_id,
        model = client.model_id(),
        provider = client.kind().as_str()
    );
    let outcome = pipeline
        .analyze(&client, &profile_text, &cancel)
        .instrument(span)
        .await?;

    info!(
        %request_id,
        cache_key = %outcome.cache_key,
        cache_hit = outcome.cache_hit,
        final_score = outcome.report.final_score,
        "analysis finished"
    );

    let cache_status = if outcome.cache_hit { "hit" } else { "miss" };
    let diagnosis_key = HeaderValue::from_str(&outcome.cache_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid cache key header: {e}")))?;

    let mut response = Json(outcome.report).into_response();
    let headers = response.headers_mut();
    headers.insert("x-cache", HeaderValue::from_static(cache_status));
    headers.insert("x-diagnosis-key", diagnosis_key);
    Ok(response)
}

/// GET /api/diagnosis/:key
///
/// Returns a previously computed report by its cache key.
pub async fn handle_get_diagnosis(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<FinalReport>, AppError> {
    if !is_valid_key(&key) {
        return Err(AppError::Validation(
            "Diagnosis key must be a 64-character lowercase hex digest".to_string(),
        ));
    }

    let entry = state
        .cache
        .get(&key)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("cache lookup failed: {e}")))?
        .ok_or_else(|| AppError::NotFound(format!("No diagnosis stored under {key}")))?;

    Ok(Json(entry.report))
}
