//! Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LlmError, ModelClient};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: Client, base: Option<&str>, api_key: &str, model: &str) -> Self {
        let base = base.unwrap_or(GEMINI_API_BASE);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base.trim_end_matches('/'),
            model
        );
        Self {
            http,
            url,
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::MissingCredentials { provider: "gemini" });
        }

        let payload = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(system_prompt),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: Some(user_prompt),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", &self.api_key)])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini call succeeded: model={}, prompt_tokens={}, output_tokens={}",
                self.model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        body.candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .find_map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: &str) -> GeminiClient {
        GeminiClient::new(Client::new(), Some(&server.uri()), key, "gemini-2.5-flash")
    }

    #[tokio::test]
    async fn test_generate_requests_json_mode_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" },
                "systemInstruction": { "parts": [{ "text": "sys" }] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "{\"vigor_score\": 70}" }] } }],
                "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server, "test-key")
            .generate("sys", "user", 0.0)
            .await
            .unwrap();
        assert_eq!(text, "{\"vigor_score\": 70}");
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "API key not valid" }
            })))
            .mount(&server)
            .await;

        let err = client(&server, "bad-key")
            .generate("sys", "user", 0.0)
            .await
            .unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, "").generate("sys", "user", 0.0).await;
        assert!(matches!(
            err,
            Err(LlmError::MissingCredentials { provider: "gemini" })
        ));
    }
}
