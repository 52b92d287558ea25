//! Remote agent: every utterance and verdict comes from an OpenAI
//! Responses-compatible endpoint.
//!
//! The client makes exactly one request per call. Retry and backoff are left
//! to whoever wraps it; the engine treats any failure as fatal for the
//! battle in progress.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arena_engine::{Agent, AgentError, JudgeContext, TurnContext};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::RemoteSettings;
use crate::prompts;
use crate::roster::Profile;

/// Pull the generated text out of a Responses API payload.
///
/// Prefers the top-level `output_text`; otherwise joins every `text` part of
/// type `output_text` or `text` found under `output[].content[]`.
pub fn extract_text(payload: &Value) -> String {
    if let Some(text) = payload["output_text"].as_str().filter(|t| !t.trim().is_empty()) {
        return text.trim().to_string();
    }

    let chunks: Vec<&str> = payload["output"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item["content"].as_array())
        .flatten()
        .filter(|part| matches!(part["type"].as_str(), Some("output_text") | Some("text")))
        .filter_map(|part| part["text"].as_str())
        .filter(|text| !text.is_empty())
        .collect();
    chunks.join("\n").trim().to_string()
}

/// Thin client for `POST {url}` with a system and a user message.
pub struct ResponsesClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl ResponsesClient {
    pub fn new(settings: &RemoteSettings) -> Result<Self, AgentError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AgentError::Configuration("ARENA_API_KEY / OPENAI_API_KEY is not set".into())
            })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AgentError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model: settings.model.clone(),
            url: settings.url.clone(),
        })
    }

    pub async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AgentError> {
        let start = Instant::now();
        let request_body = serde_json::json!({
            "model": self.model,
            "input": [
                {"role": "system", "content": [{"type": "input_text", "text": system_prompt}]},
                {"role": "user", "content": [{"type": "input_text", "text": user_prompt}]}
            ]
        });

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AgentError::Unavailable(format!("connection error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Unavailable(format!(
                "API error ({status}): {body}"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;
        let text = extract_text(&payload);
        debug!(
            model = %self.model,
            prompt_version = prompts::PROMPT_VERSION,
            chars = text.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "remote generation"
        );
        if text.is_empty() {
            return Err(AgentError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Debater whose words come from the remote model, in the persona of a
/// roster profile.
pub struct RemoteAgent {
    profile: &'static Profile,
    system_prompt: String,
    client: Arc<ResponsesClient>,
}

impl RemoteAgent {
    pub fn new(profile: &'static Profile, profile_text: &str, client: Arc<ResponsesClient>) -> Self {
        Self {
            profile,
            system_prompt: prompts::system_prompt(profile.name, profile_text),
            client,
        }
    }
}

#[async_trait]
impl Agent for RemoteAgent {
    fn id(&self) -> &str {
        self.profile.id
    }

    fn name(&self) -> &str {
        self.profile.name
    }

    fn keywords(&self) -> Vec<String> {
        self.profile.keywords()
    }

    fn profile_topic(&self) -> Option<String> {
        Some(self.profile.home_topic().title.to_string())
    }

    async fn opening(&self) -> Result<String, AgentError> {
        self.client
            .generate(&self.system_prompt, &prompts::opening_prompt())
            .await
    }

    async fn turn(&self, ctx: &TurnContext<'_>) -> Result<String, AgentError> {
        let prompt =
            prompts::turn_prompt(ctx.topic, &ctx.transcript.to_log(), ctx.turn, ctx.total_turns);
        self.client.generate(&self.system_prompt, &prompt).await
    }

    async fn judge(&self, ctx: &JudgeContext<'_>) -> Result<String, AgentError> {
        let prompt = prompts::judge_prompt(
            ctx.topic,
            &ctx.transcript.to_log(),
            ctx.debater_a,
            ctx.debater_b,
        );
        self.client.generate(&self.system_prompt, &prompt).await
    }
}
