//! OpenAI-compatible chat completions judge.

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wordcraft_core::traits::{
    parse_judge_reply, rubric_prompt, AssessmentRequest, Judge, RawAssessment,
    JUDGE_SYSTEM_PROMPT,
};

use crate::error::JudgeError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MAX_TOKENS: u32 = 400;

/// Judge backed by an OpenAI-compatible API.
pub struct OpenAiJudge {
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl OpenAiJudge {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
        model: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            org_id,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        })
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    response_format: ResponseFormat,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Judge for OpenAiJudge {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %self.model, mode = %request.mode))]
    async fn assess(&self, request: &AssessmentRequest) -> anyhow::Result<RawAssessment> {
        if self.api_key.trim().is_empty() {
            return Err(JudgeError::MissingCredentials("openai").into());
        }

        let body = OpenAiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: vec![
                OpenAiMessage {
                    role: "system",
                    content: JUDGE_SYSTEM_PROMPT.to_string(),
                },
                OpenAiMessage {
                    role: "user",
                    content: rubric_prompt(request),
                },
            ],
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req
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
            return Err(JudgeError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::MalformedResponse(e.to_string()))?;
        let reply = api_response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default();

        Ok(parse_judge_reply(reply).map_err(|e| JudgeError::MalformedResponse(e.to_string()))?)
    }
}
