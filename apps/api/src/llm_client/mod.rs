/// LLM Client — the single point of entry for all generative-model calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Every stage of the analysis chain goes through `ModelClient`.
///
/// Provider selection is by model id prefix: `gemini*` goes to Gemini,
/// everything else to the OpenAI chat completions API. The choice is made
/// once per request in `LlmClient::for_model`.
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::Config;

pub mod gemini;
pub mod openai;

#[cfg(test)]
pub mod fake;

use gemini::GeminiClient;
use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No API key configured for provider '{provider}'")]
    MissingCredentials { provider: &'static str },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// The closed set of provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn from_model_id(model_id: &str) -> Self {
        if model_id.starts_with("gemini") {
            ProviderKind::Gemini
        } else {
            ProviderKind::OpenAi
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }
}

/// Uniform capability over any JSON-returning text provider.
///
/// One call per invocation: implementations must not retry or stream.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends one system + user prompt pair and returns the provider's raw text.
    /// Implementations request JSON-object output mode where the provider supports it.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError>;

    fn model_id(&self) -> &str;
}

/// Holds the shared HTTP client and credentials for every provider.
/// Cheap to clone; lives in `AppState`.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    gemini_api_key: String,
    openai_api_key: String,
    gemini_api_base: Option<String>,
    openai_api_base: Option<String>,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::builder()
                .timeout(config.max_request_duration)
                .build()
                .expect("Failed to build HTTP client"),
            gemini_api_key: config.gemini_api_key.clone(),
            openai_api_key: config.openai_api_key.clone(),
            gemini_api_base: config.gemini_api_base.clone(),
            openai_api_base: config.openai_api_base.clone(),
        }
    }

    /// Resolves the provider for `model_id` and returns a client bound to it.
    pub fn for_model(&self, model_id: &str) -> ProviderClient {
        match ProviderKind::from_model_id(model_id) {
            ProviderKind::Gemini => ProviderClient::Gemini(GeminiClient::new(
                self.http.clone(),
                self.gemini_api_base.as_deref(),
                &self.gemini_api_key,
                model_id,
            )),
            ProviderKind::OpenAi => ProviderClient::OpenAi(OpenAiClient::new(
                self.http.clone(),
                self.openai_api_base.as_deref(),
                &self.openai_api_key,
                model_id,
            )),
        }
    }
}

/// A provider client resolved for a single model id.
pub enum ProviderClient {
    Gemini(GeminiClient),
    OpenAi(OpenAiClient),
}

impl ProviderClient {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderClient::Gemini(_) => ProviderKind::Gemini,
            ProviderClient::OpenAi(_) => ProviderKind::OpenAi,
        }
    }
}

#[async_trait]
impl ModelClient for ProviderClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        match self {
            ProviderClient::Gemini(c) => c.generate(system_prompt, user_prompt, temperature).await,
            ProviderClient::OpenAi(c) => c.generate(system_prompt, user_prompt, temperature).await,
        }
    }

    fn model_id(&self) -> &str {
        match self {
            ProviderClient::Gemini(c) => c.model_id(),
            ProviderClient::OpenAi(c) => c.model_id(),
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
