//! Per-day progress state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assessment::Feedback;
use crate::day::DayKey;
use crate::error::StoreError;
use crate::phase::Phase;

/// Practice state for one word on one day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordState {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_feedback: Option<Feedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_feedback: Option<Feedback>,
}

/// All recorded progress: day → term → state.
///
/// Past days are kept; they simply stop being looked up once the day rolls
/// over.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    days: BTreeMap<DayKey, BTreeMap<String, WordState>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded state, or a fresh `Defining` state.
    pub fn get_state_for(&self, day: &DayKey, term: &str) -> WordState {
        self.days
            .get(day)
            .and_then(|words| words.get(term))
            .cloned()
            .unwrap_or_default()
    }

    /// A new store with one entry replaced.
    #[must_use]
    pub fn put_state_for(mut self, day: &DayKey, term: &str, state: WordState) -> Self {
        self.days
            .entry(day.clone())
            .or_default()
            .insert(term.to_string(), state);
        self
    }

    /// Recorded states for one day.
    pub fn day(&self, day: &DayKey) -> Option<&BTreeMap<String, WordState>> {
        self.days.get(day)
    }

    pub fn days(&self) -> impl Iterator<Item = &DayKey> {
        self.days.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Parse a persisted store, degrading to an empty one on any error.
    pub fn from_json_lossy(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable progress");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Words shown per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WordCount(u8);

impl WordCount {
    pub const MIN: u8 = 3;
    pub const MAX: u8 = 5;

    /// The largest allowed count.
    pub fn largest() -> Self {
        Self(Self::MAX)
    }

    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl Default for WordCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for WordCount {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(StoreError::InvalidWordCount(value))
        }
    }
}

impl From<WordCount> for u8 {
    fn from(count: WordCount) -> Self {
        count.0
    }
}
