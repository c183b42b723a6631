pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::intake::handlers as intake;
use crate::state::AppState;

/// Resume PDFs are larger than axum's default 2 MB body limit allows.
const PDF_UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/analyze", post(analysis::handle_analyze))
        .route("/api/diagnosis/:key", get(analysis::handle_get_diagnosis))
        .route(
            "/api/parse-pdf",
            post(intake::handle_parse_pdf).layer(DefaultBodyLimit::max(PDF_UPLOAD_LIMIT_BYTES)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::cache::{cache_key, CacheEntry, CacheStore, MemoryCacheStore};
    use crate::config::Config;
    use crate::errors::SOURCE_BLOCKED_MESSAGE;
    use crate::intake::scrape::ProfileFetcher;
    use crate::llm_client::LlmClient;
    use crate::models::report::{FinalReport, ScoreBundle};

    fn state_with(cache: Arc<dyn CacheStore>) -> AppState {
        let config = Config::for_tests();
        AppState {
            llm: LlmClient::new(&config),
            cache,
            fetcher: ProfileFetcher::new(config.scrape_timeout),
            config,
        }
    }

    fn report() -> FinalReport {
        FinalReport {
            final_score: 6.5,
            base_scores: ScoreBundle {
                vigor: 40,
                immunity: 30,
                depth: 35,
                width: 45,
                variance: 20,
                experience_context: 30,
            },
            insights: "- Report drafting is automatable".to_string(),
            roadmap: vec!["Move toward systems ownership".to_string()],
            quests: vec!["q1".to_string(), "q2".to_string(), "q3".to_string()],
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let cache = response
            .headers()
            .get("x-cache")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cache, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_with(Arc::new(MemoryCacheStore::new())));
        let (status, _, body) = send(app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cache_backend"], "memory");
    }

    #[tokio::test]
    async fn test_analyze_without_profile_text_is_400() {
        let app = build_router(state_with(Arc::new(MemoryCacheStore::new())));
        let (status, _, body) = send(app, post_json("/api/analyze", json!({ "profileText": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No profile text provided.");
    }

    #[tokio::test]
    async fn test_analyze_with_malformed_json_is_400_json_error() {
        let app = build_router(state_with(Arc::new(MemoryCacheStore::new())));
        let request = Request::post("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"profileText\": "))
            .unwrap();
        let (status, _, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_analyze_serves_cached_report_without_credentials() {
        let text = "Staff data engineer, 8 years of batch ETL on Airflow";
        let cache = Arc::new(MemoryCacheStore::new());
        cache
            .put(
                &cache_key(text, "gemini-2.5-flash"),
                &CacheEntry::new(report(), "gemini-2.5-flash"),
            )
            .await
            .unwrap();

        // No API keys are configured, so only a cache hit can succeed.
        let app = build_router(state_with(cache));
        let (status, cache_status, body) =
            send(app, post_json("/api/analyze", json!({ "profileText": text }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_status.as_deref(), Some("hit"));
        assert_eq!(body, serde_json::to_value(report()).unwrap());
    }

    #[tokio::test]
    async fn test_analyze_cache_miss_without_credentials_is_500() {
        let app = build_router(state_with(Arc::new(MemoryCacheStore::new())));
        let (status, _, body) = send(
            app,
            post_json(
                "/api/analyze",
                json!({ "profileText": "Payroll clerk, 3 years", "model": "gpt-4o-mini" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "PROVIDER_ERROR");
        assert!(body["details"].as_str().unwrap().contains("openai"));
    }

    #[tokio::test]
    async fn test_unreachable_profile_link_is_400_with_fallback_message() {
        let mut state = state_with(Arc::new(MemoryCacheStore::new()));
        state.fetcher = ProfileFetcher::new(std::time::Duration::from_millis(1));
        let app = build_router(state);

        let (status, _, body) = send(
            app,
            post_json(
                "/api/analyze",
                json!({
                    "profileText": "LinkedIn Profile Link: https://www.linkedin.com/in/someone\n\
                                    (System note: Treat this as the primary profile to scrape and examine.)"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], SOURCE_BLOCKED_MESSAGE);
        assert_eq!(body["code"], "SOURCE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_get_diagnosis() {
        let cache = Arc::new(MemoryCacheStore::new());
        let key = cache_key("some profile", "gemini-2.5-flash");
        cache
            .put(&key, &CacheEntry::new(report(), "gemini-2.5-flash"))
            .await
            .unwrap();
        let app = build_router(state_with(cache));

        let uri = format!("/api/diagnosis/{key}");
        let (status, _, body) =
            send(app.clone(), Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["finalScore"], 6.5);

        let missing = format!("/api/diagnosis/{}", cache_key("other", "gemini-2.5-flash"));
        let (status, _, _) = send(app.clone(), Request::get(missing).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = send(app, Request::get("/api/diagnosis/xyz").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parse_pdf_without_file_is_400() {
        let app = build_router(state_with(Arc::new(MemoryCacheStore::new())));
        let boundary = "X-BOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n"
        );
        let request = Request::post("/api/parse-pdf")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, _, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");
    }
}
