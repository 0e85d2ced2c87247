use serde::{Deserialize, Serialize};

use crate::error::SquadronError;

/// Category/answer pair decoded from a completion body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verdict {
    pub category: String,
    pub answer: String,
}

impl Verdict {
    /// Decode a completion body as a category/answer verdict.
    /// Strict: non-JSON text or a missing field is a decode failure.
    pub fn from_completion(text: &str) -> Result<Self, SquadronError> {
        serde_json::from_str(text).map_err(|e| {
            SquadronError::Decode(format!("completion is not category/answer JSON: {e}"))
        })
    }

    /// Placeholder verdict recorded when every attempt for a question fails.
    pub fn failure() -> Self {
        Self {
            category: "error".to_string(),
            answer: "Failed to get response".to_string(),
        }
    }
}

/// Final record for one input question, serialized verbatim to the
/// results file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub category: String,
    pub answer: String,
}

impl QuestionResult {
    pub fn new(question: String, verdict: Verdict) -> Self {
        Self {
            question,
            category: verdict.category,
            answer: verdict.answer,
        }
    }
}
