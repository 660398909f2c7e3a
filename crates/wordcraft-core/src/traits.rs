//! The judge seam.
//!
//! A [`Judge`] scores a user's definition or sentence. Implementations live in
//! the `wordcraft-judges` crate (remote service, LLM APIs, mock).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::WordEntry;

// ---------------------------------------------------------------------------
// Judge trait
// ---------------------------------------------------------------------------

/// A scoring capability for free-text answers.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Human-readable judge name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Score one answer. The reply is unvalidated.
    async fn assess(&self, request: &AssessmentRequest) -> anyhow::Result<RawAssessment>;
}

/// What is being assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentMode {
    Definition,
    Sentence,
}

impl fmt::Display for AssessmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentMode::Definition => write!(f, "definition"),
            AssessmentMode::Sentence => write!(f, "sentence"),
        }
    }
}

/// Assessment request, in the assessment service's wire format.
///
/// Definition mode carries the reference definition in `actualDefinition`;
/// sentence mode carries it in `definition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    #[serde(rename = "type")]
    pub mode: AssessmentMode,
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connotation: Option<String>,
    pub user_input: String,
}

impl AssessmentRequest {
    pub fn definition(entry: &WordEntry, user_input: &str) -> Self {
        Self {
            mode: AssessmentMode::Definition,
            word: entry.term.clone(),
            actual_definition: Some(entry.definition.clone()),
            definition: None,
            connotation: non_empty(&entry.connotation_note),
            user_input: user_input.to_string(),
        }
    }

    pub fn sentence(entry: &WordEntry, user_input: &str) -> Self {
        Self {
            mode: AssessmentMode::Sentence,
            word: entry.term.clone(),
            actual_definition: None,
            definition: Some(entry.definition.clone()),
            connotation: non_empty(&entry.connotation_note),
            user_input: user_input.to_string(),
        }
    }

    /// The reference definition, whichever field carries it.
    pub fn reference_definition(&self) -> Option<&str> {
        self.actual_definition
            .as_deref()
            .or(self.definition.as_deref())
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.trim().is_empty()).then(|| s.to_string())
}

/// An unvalidated judge reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAssessment {
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved: Option<String>,
}

// ---------------------------------------------------------------------------
// Prompting
// ---------------------------------------------------------------------------

/// System prompt for LLM-backed judges.
pub const JUDGE_SYSTEM_PROMPT: &str = "You are a supportive but exacting vocabulary tutor. You grade a learner's answer about one English word against a rubric. Respond ONLY with a single JSON object and nothing else.";

const DEFINITION_RUBRIC: &str = "\
5 = correct meaning and connotation
4 = correct meaning, minor connotation gap
3 = roughly correct but vague
2 = significant gaps
1 = wrong or vague";

const SENTENCE_RUBRIC: &str = "\
5 = vivid usage with the correct connotation
4 = correct usage but could be more vivid
3 = correct but flat or generic
2 = awkward or wrong connotation
1 = incorrect usage";

/// Build the user prompt an LLM judge sends for `request`.
pub fn rubric_prompt(request: &AssessmentRequest) -> String {
    let mut prompt = format!("Word: {}\n", request.word);
    if let Some(def) = request.reference_definition() {
        prompt.push_str(&format!("Reference definition: {def}\n"));
    }
    if let Some(note) = &request.connotation {
        prompt.push_str(&format!("Connotation: {note}\n"));
    }
    match request.mode {
        AssessmentMode::Definition => {
            prompt.push_str(&format!(
                "\nThe learner defined the word as:\n\"{}\"\n\nScore the definition from 1 to 5:\n{DEFINITION_RUBRIC}\n\n\
                 Reply as {{\"score\": <integer>, \"feedback\": \"<one or two sentences>\"}}",
                request.user_input
            ));
        }
        AssessmentMode::Sentence => {
            prompt.push_str(&format!(
                "\nThe learner used the word in this sentence:\n\"{}\"\n\nScore the sentence from 1 to 5:\n{SENTENCE_RUBRIC}\n\n\
                 Reply as {{\"score\": <integer>, \"feedback\": \"<one or two sentences>\", \"improved\": \"<one better example sentence>\"}}",
                request.user_input
            ));
        }
    }
    prompt
}

/// Pull the JSON object out of a model reply.
///
/// Models sometimes wrap the object in a ```json fence or add a sentence
/// around it; take the span from the first `{` to the last `}`.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// Parse a model reply into a raw assessment.
pub fn parse_judge_reply(reply: &str) -> anyhow::Result<RawAssessment> {
    let json = extract_json_object(reply)
        .ok_or_else(|| anyhow::anyhow!("judge reply contains no JSON object"))?;
    serde_json::from_str(json).map_err(|e| anyhow::anyhow!("judge reply is not valid JSON: {e}"))
}
