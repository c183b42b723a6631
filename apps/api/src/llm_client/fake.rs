//! Scripted `ModelClient` for chain and pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{LlmError, ModelClient};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
}

enum Scripted {
    Text(String),
    ApiError(u16, String),
}

/// Replays canned responses in order and records every call it receives.
pub struct ScriptedClient {
    model: String,
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedClient {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    /// Queues the four stage responses of a normal run.
    pub fn with_stage_scores(model: &str, scores: [u32; 6]) -> Self {
        let [vigor, immunity, depth, width, variance, experience] = scores;
        Self::new(model)
            .respond(&format!(
                r#"{{"structured_profile": "Backend engineer profile", "vigor_score": {vigor}}}"#
            ))
            .respond(&format!(
                r#"{{"research_insights": "- CRUD work is exposed", "immunity_score": {immunity}}}"#
            ))
            .respond(&format!(
                r#"{{"domain_depth": {depth}, "knowledge_width": {width}, "domain_variance": {variance}, "experience_context": {experience}}}"#
            ))
            .respond(
                r#"{"cyber_roadmap": ["Own the consensus layer"], "level_up_quests": ["Build a Raft log", "Write a query planner", "Ship an eBPF profiler"]}"#,
            )
    }

    pub fn respond(self, text: &str) -> Self {
        self.push(Scripted::Text(text.to_string()))
    }

    pub fn fail(self, status: u16, message: &str) -> Self {
        self.push(Scripted::ApiError(status, message.to_string()))
    }

    /// Cancels `token` right after the `n`-th call returns.
    pub fn cancel_after(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((n, token));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(self, item: Scripted) -> Self {
        self.responses.lock().unwrap().push_back(item);
        self
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
                temperature,
            });
            calls.len()
        };

        let next = self.responses.lock().unwrap().pop_front();

        if let Some((n, token)) = &self.cancel_after {
            if count == *n {
                token.cancel();
            }
        }

        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::ApiError(status, message)) => Err(LlmError::Api { status, message }),
            None => Err(LlmError::EmptyContent),
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
