//! Anthropic Messages API judge.

use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wordcraft_core::traits::{
    parse_judge_reply, rubric_prompt, AssessmentRequest, Judge, RawAssessment,
    JUDGE_SYSTEM_PROMPT,
};

use crate::error::JudgeError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MAX_TOKENS: u32 = 400;

/// Judge backed by the Anthropic API.
pub struct AnthropicJudge {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicJudge {
    pub fn new(api_key: &str, base_url: Option<String>, model: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        })
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[async_trait]
impl Judge for AnthropicJudge {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %self.model, mode = %request.mode))]
    async fn assess(&self, request: &AssessmentRequest) -> anyhow::Result<RawAssessment> {
        if self.api_key.trim().is_empty() {
            return Err(JudgeError::MissingCredentials("anthropic").into());
        }
        let start = Instant::now();

        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system: JUDGE_SYSTEM_PROMPT,
            messages: vec![AnthropicMessage {
                role: "user",
                content: rubric_prompt(request),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| JudgeError::from_transport(e, DEFAULT_TIMEOUT_SECS))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(JudgeError::rate_limited(&response).into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(JudgeError::ApiError { status, message }.into());
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::MalformedResponse(e.to_string()))?;
        let reply = api_response
            .content
            .first()
            .map(|c| c.text.as_str())
            .unwrap_or_default();

        let raw = parse_judge_reply(reply)
            .map_err(|e| JudgeError::MalformedResponse(e.to_string()))?;
        tracing::debug!(latency_ms = start.elapsed().as_millis() as u64, "assessment received");
        Ok(raw)
    }
}
