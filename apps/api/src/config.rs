use std::time::Duration;

use anyhow::{Context, Result};

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Application configuration loaded from environment variables.
/// Provider keys are optional at startup; a missing key only fails requests
/// routed to that provider.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub openai_api_key: String,
    pub gemini_api_base: Option<String>,
    pub openai_api_base: Option<String>,
    pub default_model: String,
    pub max_request_duration: Duration,
    pub scrape_timeout: Duration,
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY").unwrap_or_default(),
            openai_api_key: optional_env("OPENAI_API_KEY").unwrap_or_default(),
            gemini_api_base: optional_env("GEMINI_API_BASE"),
            openai_api_base: optional_env("OPENAI_API_BASE"),
            default_model: optional_env("DEFAULT_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_request_duration: Duration::from_secs(parse_env("MAX_REQUEST_SECS", 60)?),
            scrape_timeout: Duration::from_secs(parse_env("SCRAPE_TIMEOUT_SECS", 15)?),
            redis_url: optional_env("REDIS_URL"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns the variable's value, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for tests: no credentials, in-memory cache.
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: String::new(),
            openai_api_key: String::new(),
            gemini_api_base: None,
            openai_api_base: None,
            default_model: DEFAULT_MODEL.to_string(),
            max_request_duration: Duration::from_secs(60),
            scrape_timeout: Duration::from_secs(5),
            redis_url: None,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}
