//! wordcraft-server — HTTP assessment service.
//!
//! Validates user input, applies a per-client rate limit, and forwards
//! definition and sentence assessments to a configured [`Judge`].

pub mod rate_limit;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use wordcraft_core::assessment::{validate_user_input, Feedback};
use wordcraft_core::day::DayKey;
use wordcraft_core::error::InputError;
use wordcraft_core::model::{WordBank, WordEntry};
use wordcraft_core::progress::WordCount;
use wordcraft_core::selector::select_daily;
use wordcraft_core::traits::{AssessmentRequest, Judge};

pub use rate_limit::SlidingWindowLimiter;

/// Shared service state.
#[derive(Clone)]
pub struct AppState {
    pub judge: Arc<dyn Judge>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub bank: Arc<WordBank>,
}

impl AppState {
    pub fn new(judge: Arc<dyn Judge>, limiter: SlidingWindowLimiter, bank: WordBank) -> Self {
        Self {
            judge,
            limiter: Arc::new(limiter),
            bank: Arc::new(bank),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/assess", post(assess))
        .route("/api/words/today", get(words_today))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("assessment failed: {0}")]
    Judge(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Judge(_) => StatusCode::BAD_GATEWAY,
        };
        let mut response =
            (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

/// Client identity for rate limiting: first `x-forwarded-for` hop.
///
/// The header is caller-controlled, so the server must sit behind a trusted
/// reverse proxy that overwrites it. Exposed directly, clients can pick a new
/// key per request and bypass the limit.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    judge: String,
    bank_size: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "wordcraft-server",
        judge: state.judge.name().to_string(),
        bank_size: state.bank.len(),
    })
}

async fn assess(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<Feedback>, ApiError> {
    let client = client_key(&headers);
    state.limiter.check(&client).map_err(|retry| {
        warn!(client = %client, "rate limited");
        ApiError::RateLimited {
            // round up so clients never retry early
            retry_after_secs: retry.as_secs() + u64::from(retry.subsec_nanos() > 0),
        }
    })?;

    let Json(mut request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if request.word.trim().is_empty() {
        return Err(ApiError::BadRequest("word is empty".into()));
    }
    request.user_input = validate_user_input(&request.user_input)
        .map_err(|e| match e {
            InputError::Empty => ApiError::BadRequest("userInput is empty".into()),
            InputError::TooLong { len, max } => ApiError::BadRequest(format!(
                "userInput is too long ({len} characters, maximum is {max})"
            )),
        })?
        .to_string();

    let raw = state.judge.assess(&request).await.map_err(|e| {
        warn!(word = %request.word, error = %e, "judge call failed");
        ApiError::Judge(e.to_string())
    })?;
    let feedback = Feedback::from_raw(request.mode, &raw).map_err(|e| {
        warn!(word = %request.word, error = %e, "malformed judge reply");
        ApiError::Judge(e.to_string())
    })?;

    info!(
        word = %request.word,
        mode = %request.mode,
        score = feedback.score.value(),
        "assessed"
    );
    Ok(Json(feedback))
}

#[derive(Debug, Deserialize)]
struct TodayQuery {
    count: Option<u8>,
    day: Option<String>,
}

#[derive(Debug, Serialize)]
struct TodayResponse<'a> {
    day: DayKey,
    words: Vec<&'a WordEntry>,
}

async fn words_today(
    State(state): State<AppState>,
    query: Result<Query<TodayQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let count = match query.count {
        Some(n) => WordCount::try_from(n).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => WordCount::default(),
    };
    let day = match query.day {
        Some(d) => d
            .parse::<DayKey>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => DayKey::today(),
    };

    let words = select_daily(&state.bank, &day, count.get());
    Ok(Json(TodayResponse { day, words }).into_response())
}
