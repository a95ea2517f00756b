//! Educational content data types.
//!
//! These are the shapes exchanged between the generator, the reviewer and the
//! pipeline. They deserialize straight from completion JSON; the rules serde
//! cannot express (distinct options, answer membership, feedback/status
//! agreement) are checked by the `validate` methods in the sibling
//! `validation` module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of answer options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Errors raised when a content request is rejected up front.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Grade must be a positive integer, got 0")]
    ZeroGrade,

    #[error("Topic must not be empty")]
    EmptyTopic,
}

/// Input to a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub grade: u32,
    pub topic: String,
}

impl ContentRequest {
    /// Builds a request, rejecting grade 0 and blank topics. The topic is stored trimmed.
    pub fn new(grade: u32, topic: impl AsRef<str>) -> Result<Self, RequestError> {
        if grade == 0 {
            return Err(RequestError::ZeroGrade);
        }

        let topic = topic.as_ref().trim();
        if topic.is_empty() {
            return Err(RequestError::EmptyTopic);
        }

        Ok(Self {
            grade,
            topic: topic.to_string(),
        })
    }
}

/// A multiple choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mcq {
    pub question: String,
    /// Exactly four answer options, in display order.
    pub options: [String; OPTIONS_PER_QUESTION],
    /// The correct answer, copied verbatim from `options`.
    pub answer: String,
}

impl Mcq {
    pub fn new(
        question: impl Into<String>,
        options: [String; OPTIONS_PER_QUESTION],
        answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options,
            answer: answer.into(),
        }
    }

    /// Position of the answer within `options`.
    pub fn answer_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.answer)
    }
}

/// Explanation plus quiz produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub explanation: String,
    pub mcqs: Vec<Mcq>,
}

impl GeneratedContent {
    pub fn question_count(&self) -> usize {
        self.mcqs.len()
    }
}

/// Outcome of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pass => write!(f, "pass"),
            ReviewStatus::Fail => write!(f, "fail"),
        }
    }
}

/// Verdict returned by the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    pub status: ReviewStatus,
    /// One entry per deficiency; empty when the content passed.
    pub feedback: Vec<String>,
}

impl ReviewVerdict {
    pub fn pass() -> Self {
        Self {
            status: ReviewStatus::Pass,
            feedback: Vec::new(),
        }
    }

    pub fn fail<I, S>(feedback: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: ReviewStatus::Fail,
            feedback: feedback.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == ReviewStatus::Pass
    }
}
