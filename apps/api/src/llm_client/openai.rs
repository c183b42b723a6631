//! OpenAI chat completions backend. Also serves any OpenAI-compatible endpoint
//! configured through `OPENAI_API_BASE`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LlmError, ModelClient};

const OPENAI_API_BASE: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(http: Client, base: Option<&str>, api_key: &str, model: &str) -> Self {
        let base = base.unwrap_or(OPENAI_API_BASE);
        Self {
            http,
            url: format!("{}/v1/chat/completions", base.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::MissingCredentials { provider: "openai" });
        }

        let payload = ChatCompletionRequest {
            model: &self.model,
            temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatCompletionResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "OpenAI call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                self.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Deserialize)]
struct OpenAiErrorBody {
    message: String,
}
