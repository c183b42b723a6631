mod analysis;
mod cache;
mod config;
mod errors;
mod intake;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{CacheStore, MemoryCacheStore, RedisCacheStore};
use crate::config::Config;
use crate::intake::scrape::ProfileFetcher;
use crate::llm_client::{LlmClient, ProviderKind};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerScan API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize report cache
    let cache: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisCacheStore::open(url)?),
        None => Arc::new(MemoryCacheStore::new()),
    };
    info!("Report cache initialized (backend: {})", cache.backend());

    // Initialize LLM client
    let llm = LlmClient::new(&config);
    info!(
        "LLM client initialized (default model: {}, provider: {})",
        config.default_model,
        ProviderKind::from_model_id(&config.default_model).as_str()
    );
    if config.gemini_api_key.is_empty() && config.openai_api_key.is_empty() {
        tracing::warn!("No provider API keys configured; only cached reports can be served");
    }

    let fetcher = ProfileFetcher::new(config.scrape_timeout);

    // Build app state
    let state = AppState {
        llm,
        cache,
        fetcher,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
