//! Scores and feedback produced by a judge.
//!
//! Judge output is untrusted: a [`RawAssessment`] only becomes [`Feedback`]
//! after its score has been read as an integer and clamped into `1..=5`.
//! A failed or unusable assessment becomes the unassessed sentinel instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AssessError, InputError};
use crate::traits::{AssessmentMode, RawAssessment};

/// Longest answer accepted, in characters.
pub const MAX_INPUT_CHARS: usize = 1000;

/// Shown when an answer could not be assessed.
pub const FALLBACK_MESSAGE: &str =
    "We couldn't check your answer right now. Submit it again to retry.";

/// Trim and bound a user's answer before it is sent anywhere.
pub fn validate_user_input(text: &str) -> Result<&str, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_INPUT_CHARS {
        return Err(InputError::TooLong {
            len,
            max: MAX_INPUT_CHARS,
        });
    }
    Ok(trimmed)
}

/// An assessment score: `1..=5` from a judge, or `0` when unassessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const UNASSESSED: Score = Score(0);
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// Lowest score that lets "I already know this" dismiss a word.
    pub const DISMISS_THRESHOLD: u8 = 4;

    /// A judge score; `None` outside `1..=5`.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Read a judge's raw score field.
    ///
    /// Accepts JSON numbers and numeric strings holding an integral value and
    /// clamps them into `1..=5`. Anything else is malformed.
    pub fn from_raw(raw: &Value) -> Result<Self, AssessError> {
        let malformed = || AssessError::MalformedScore(raw.to_string());
        let integral = match raw {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(i),
                None => n.as_f64().and_then(integral_f64),
            },
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral_f64))
            }
            _ => None,
        };
        let value = integral.ok_or_else(malformed)?;
        Ok(Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_assessed(self) -> bool {
        self.0 != 0
    }

    pub fn meets_dismiss_threshold(self) -> bool {
        self.0 >= Self::DISMISS_THRESHOLD
    }
}

fn integral_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then(|| f.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

impl TryFrom<u8> for Score {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(format!("score out of range: {value}"))
        }
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

/// Validated feedback for one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub score: Score,
    #[serde(rename = "feedback")]
    pub message: String,
    /// Sample sentence from the judge (sentence mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved: Option<String>,
}

impl Feedback {
    /// The sentinel recorded when an assessment could not be completed.
    pub fn unassessed() -> Self {
        Self {
            score: Score::UNASSESSED,
            message: FALLBACK_MESSAGE.to_string(),
            improved: None,
        }
    }

    pub fn is_unassessed(&self) -> bool {
        !self.score.is_assessed()
    }

    /// Validate a raw judge reply for the given mode.
    pub fn from_raw(mode: AssessmentMode, raw: &RawAssessment) -> Result<Self, AssessError> {
        let score = Score::from_raw(&raw.score)?;
        let message = raw.feedback.trim();
        if message.is_empty() {
            return Err(AssessError::EmptyFeedback);
        }
        let improved = raw
            .improved
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if mode == AssessmentMode::Sentence && improved.is_none() {
            return Err(AssessError::MissingImproved);
        }
        Ok(Self {
            score,
            message: message.to_string(),
            improved: match mode {
                AssessmentMode::Definition => None,
                AssessmentMode::Sentence => improved,
            },
        })
    }
}
