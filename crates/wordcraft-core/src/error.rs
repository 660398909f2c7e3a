//! Core error types.
//!
//! Each stage of a word's daily flow has its own error so callers can tell
//! rejected input apart from a rejected transition or a broken store.

use thiserror::Error;

use crate::phase::Phase;

/// Errors raised while loading or validating a word bank.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to parse word bank: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read word bank {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("word bank is empty")]
    Empty,

    #[error("entry #{index} has an empty term")]
    EmptyTerm { index: usize },

    #[error("duplicate term in word bank: {0}")]
    DuplicateTerm(String),

    #[error("invalid tier {tier} for '{term}' (expected 1, 2 or 3)")]
    InvalidTier { term: String, tier: u8 },
}

/// A day key that is not a valid `YYYY-MM-DD` calendar date.
#[derive(Debug, Error)]
#[error("invalid day key '{0}': expected a calendar date formatted YYYY-MM-DD")]
pub struct DayKeyError(pub String);

/// User-submitted text rejected before any assessment call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("please write something before submitting")]
    Empty,

    #[error("answer is too long ({len} characters, maximum is {max})")]
    TooLong { len: usize, max: usize },
}

/// A phase machine trigger fired from a phase that does not accept it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action}: the word is {from}")]
pub struct TransitionError {
    pub from: Phase,
    pub action: &'static str,
}

/// A judge reply that cannot be used structurally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessError {
    #[error("score is missing or not a number: {0}")]
    MalformedScore(String),

    #[error("feedback is empty")]
    EmptyFeedback,

    #[error("sentence assessment is missing an improved sample")]
    MissingImproved,
}

/// Errors from a progress persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write progress: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize progress: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("words per day must be 3, 4 or 5 (got {0})")]
    InvalidWordCount(u8),
}

/// Errors surfaced by the trainer to the front end.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("an assessment for '{term}' is already in progress")]
    Pending { term: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
