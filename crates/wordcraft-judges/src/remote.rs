//! Client for a wordcraft assessment service.
//!
//! Posts the [`AssessmentRequest`] wire format to `{base_url}/api/assess` and
//! reads `{score, feedback, improved?}` back. Any non-2xx reply, including the
//! service's own rate limiting, is an error.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use wordcraft_core::traits::{AssessmentRequest, Judge, RawAssessment};

use crate::error::JudgeError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Judge that delegates to a remote assessment service.
pub struct RemoteJudge {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ServiceError {
    error: String,
}

impl RemoteJudge {
    pub fn new(base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Judge for RemoteJudge {
    fn name(&self) -> &str {
        "remote"
    }

    #[instrument(skip(self, request), fields(base_url = %self.base_url, mode = %request.mode))]
    async fn assess(&self, request: &AssessmentRequest) -> anyhow::Result<RawAssessment> {
        let response = self
            .client
            .post(format!("{}/api/assess", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| JudgeError::from_transport(e, DEFAULT_TIMEOUT_SECS))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(JudgeError::rate_limited(&response).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServiceError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(JudgeError::ApiError { status, message }.into());
        }

        let raw: RawAssessment = response
            .json()
            .await
            .map_err(|e| JudgeError::MalformedResponse(e.to_string()))?;
        Ok(raw)
    }
}
