//! Per-word phase machine.
//!
//! ```text
//! Defining ──submit definition──▶ Revealed ──advance──▶ ComposingSentence ──submit sentence──▶ Graded
//!    │                               │
//!    └─"already know it", score ≥ 4──┴──mark known──▶ Dismissed
//! ```
//!
//! Transitions here are pure: the trainer performs the judge call and hands
//! the resulting feedback in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assessment::Feedback;
use crate::error::TransitionError;
use crate::progress::WordState;

/// Where a word is in today's practice flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Defining,
    Revealed,
    ComposingSentence,
    Graded,
    Dismissed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Graded | Phase::Dismissed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Defining => write!(f, "defining"),
            Phase::Revealed => write!(f, "revealed"),
            Phase::ComposingSentence => write!(f, "composing a sentence"),
            Phase::Graded => write!(f, "graded"),
            Phase::Dismissed => write!(f, "dismissed"),
        }
    }
}

/// How a definition is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionIntent {
    /// Normal practice: always continue to the reveal.
    Learn,
    /// "I already know this": dismiss the word if the judge agrees.
    AlreadyKnown,
}

impl WordState {
    /// Whether a definition may be submitted now.
    ///
    /// A revealed word whose definition could not be assessed accepts a
    /// resubmission.
    pub fn check_submit_definition(&self) -> Result<(), TransitionError> {
        let retry = self.phase == Phase::Revealed
            && self
                .definition_feedback
                .as_ref()
                .is_some_and(Feedback::is_unassessed);
        if self.phase == Phase::Defining || retry {
            Ok(())
        } else {
            Err(self.reject("submit a definition"))
        }
    }

    /// Record an assessed definition.
    pub fn apply_definition(
        &mut self,
        text: &str,
        feedback: Feedback,
        intent: DefinitionIntent,
    ) -> Result<(), TransitionError> {
        self.check_submit_definition()?;
        let dismiss =
            intent == DefinitionIntent::AlreadyKnown && feedback.score.meets_dismiss_threshold();
        self.user_definition = Some(text.to_string());
        self.definition_feedback = Some(feedback);
        self.phase = if dismiss {
            Phase::Dismissed
        } else {
            Phase::Revealed
        };
        Ok(())
    }

    pub fn advance_to_sentence(&mut self) -> Result<(), TransitionError> {
        if self.phase != Phase::Revealed {
            return Err(self.reject("start sentence practice"));
        }
        self.phase = Phase::ComposingSentence;
        Ok(())
    }

    /// Whether a sentence may be submitted now. A graded word whose sentence
    /// could not be assessed accepts a resubmission.
    pub fn check_submit_sentence(&self) -> Result<(), TransitionError> {
        let retry = self.phase == Phase::Graded
            && self
                .sentence_feedback
                .as_ref()
                .is_some_and(Feedback::is_unassessed);
        if self.phase == Phase::ComposingSentence || retry {
            Ok(())
        } else {
            Err(self.reject("submit a sentence"))
        }
    }

    pub fn apply_sentence(&mut self, text: &str, feedback: Feedback) -> Result<(), TransitionError> {
        self.check_submit_sentence()?;
        self.user_sentence = Some(text.to_string());
        self.sentence_feedback = Some(feedback);
        self.phase = Phase::Graded;
        Ok(())
    }

    /// Skip sentence practice for a revealed word.
    pub fn mark_known(&mut self) -> Result<(), TransitionError> {
        if self.phase != Phase::Revealed {
            return Err(self.reject("mark the word as known"));
        }
        self.phase = Phase::Dismissed;
        Ok(())
    }

    fn reject(&self, action: &'static str) -> TransitionError {
        TransitionError {
            from: self.phase,
            action,
        }
    }
}
