//! Mock judge for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use wordcraft_core::traits::{AssessmentMode, AssessmentRequest, Judge, RawAssessment};

/// A deterministic judge for exercising the trainer without network calls.
///
/// Replies from a script first, then with a fixed default; can also be set to
/// fail every call.
pub struct MockJudge {
    /// Replies consumed in order, one per call.
    script: Mutex<VecDeque<Value>>,
    /// Score used once the script is exhausted.
    default_score: Value,
    /// Fail every call instead of replying.
    failing: bool,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<AssessmentRequest>>,
}

impl MockJudge {
    /// A judge that always replies with `score`.
    pub fn with_fixed_score(score: u8) -> Self {
        Self::with_raw_score(json!(score))
    }

    /// A judge that always replies with an arbitrary raw score value.
    pub fn with_raw_score(score: Value) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_score: score,
            failing: false,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A judge that replies with `scores` in order, then with 3.
    pub fn scripted(scores: impl IntoIterator<Item = u8>) -> Self {
        let judge = Self::with_fixed_score(3);
        *judge.script.lock().unwrap_or_else(|e| e.into_inner()) =
            scores.into_iter().map(|s| json!(s)).collect();
        judge
    }

    /// A judge whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::with_fixed_score(3)
        }
    }

    /// Get the number of calls made to this judge.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this judge.
    pub fn last_request(&self) -> Option<AssessmentRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Judge for MockJudge {
    fn name(&self) -> &str {
        "mock"
    }

    async fn assess(&self, request: &AssessmentRequest) -> anyhow::Result<RawAssessment> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        if self.failing {
            anyhow::bail!("mock judge unavailable");
        }

        let score = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default_score.clone());

        Ok(RawAssessment {
            score,
            feedback: format!("Mock feedback on '{}'.", request.word),
            improved: match request.mode {
                AssessmentMode::Definition => None,
                AssessmentMode::Sentence => {
                    Some(format!("A clearer sentence using '{}'.", request.word))
                }
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordcraft_core::model::{Tier, WordEntry};

    fn entry() -> WordEntry {
        WordEntry {
            term: "tenacious".into(),
            definition: "persistent".into(),
            connotation_note: String::new(),
            etymology: String::new(),
            tier: Tier::Common,
        }
    }

    #[tokio::test]
    async fn fixed_score() {
        let judge = MockJudge::with_fixed_score(4);
        let raw = judge
            .assess(&AssessmentRequest::definition(&entry(), "stubborn"))
            .await
            .unwrap();
        assert_eq!(raw.score, json!(4));
        assert!(raw.improved.is_none());
        assert_eq!(judge.call_count(), 1);
        assert_eq!(judge.last_request().unwrap().user_input, "stubborn");
    }

    #[tokio::test]
    async fn scripted_then_default() {
        let judge = MockJudge::scripted([5, 1]);
        let req = AssessmentRequest::sentence(&entry(), "She was tenacious.");
        let scores: Vec<Value> = [
            judge.assess(&req).await.unwrap(),
            judge.assess(&req).await.unwrap(),
            judge.assess(&req).await.unwrap(),
        ]
        .into_iter()
        .map(|r| r.score)
        .collect();
        assert_eq!(scores, vec![json!(5), json!(1), json!(3)]);
    }

    #[tokio::test]
    async fn failing_judge() {
        let judge = MockJudge::failing();
        assert!(judge
            .assess(&AssessmentRequest::definition(&entry(), "x"))
            .await
            .is_err());
        assert_eq!(judge.call_count(), 1);
    }
}
