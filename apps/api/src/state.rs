use std::sync::Arc;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::intake::scrape::ProfileFetcher;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Pluggable report cache. Redis when `REDIS_URL` is set, in-memory otherwise.
    pub cache: Arc<dyn CacheStore>,
    pub fetcher: ProfileFetcher,
    pub config: Config,
}
