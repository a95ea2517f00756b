//! Audit trail types recorded by the pipeline.
//!
//! Every generation and review outcome is appended to an [`AttemptTrail`] in
//! execution order. Entries are never edited or removed once appended; the
//! finished trail is handed to the caller inside a [`PipelineResult`] (or a
//! `PipelineFailure` when a run aborts part way).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ContentRequest, GeneratedContent, ReviewVerdict};

/// Stage of the generate/review cycle that produced an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    InitialGeneration,
    Review,
    RefinementGeneration,
    RefinementReview,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::InitialGeneration => "initial_generation",
            Stage::Review => "review",
            Stage::RefinementGeneration => "refinement_generation",
            Stage::RefinementReview => "refinement_review",
        }
    }

    /// Whether this stage calls the generator (as opposed to the reviewer).
    pub fn is_generation(&self) -> bool {
        matches!(self, Stage::InitialGeneration | Stage::RefinementGeneration)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final status of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    /// The last review passed.
    Pass,
    /// The content was refined once and the re-review still failed.
    FailAfterRefinement,
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinalStatus::Pass => write!(f, "pass"),
            FinalStatus::FailAfterRefinement => write!(f, "fail_after_refinement"),
        }
    }
}

/// What a stage produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttemptOutput {
    Content(GeneratedContent),
    Verdict(ReviewVerdict),
}

impl AttemptOutput {
    pub fn as_content(&self) -> Option<&GeneratedContent> {
        match self {
            AttemptOutput::Content(content) => Some(content),
            AttemptOutput::Verdict(_) => None,
        }
    }

    pub fn as_verdict(&self) -> Option<&ReviewVerdict> {
        match self {
            AttemptOutput::Verdict(verdict) => Some(verdict),
            AttemptOutput::Content(_) => None,
        }
    }
}

/// One recorded stage outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineAttempt {
    /// 0-based position in the trail.
    pub sequence: usize,
    pub stage: Stage,
    pub recorded_at: DateTime<Utc>,
    pub output: AttemptOutput,
}

/// Append-only trail of attempts for a single run.
#[derive(Debug, Default)]
pub(crate) struct AttemptTrail {
    attempts: Vec<PipelineAttempt>,
}

impl AttemptTrail {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, stage: Stage, output: AttemptOutput) {
        let attempt = PipelineAttempt {
            sequence: self.attempts.len(),
            stage,
            recorded_at: Utc::now(),
            output,
        };
        self.attempts.push(attempt);
    }

    pub(crate) fn len(&self) -> usize {
        self.attempts.len()
    }

    pub(crate) fn into_attempts(self) -> Vec<PipelineAttempt> {
        self.attempts
    }
}

/// Outcome of a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub request: ContentRequest,
    /// Every attempt in execution order: two entries, or four after a refinement.
    pub attempts: Vec<PipelineAttempt>,
    /// Content from the last generation on the path taken.
    pub final_output: GeneratedContent,
    pub final_status: FinalStatus,
    pub refined: bool,
}

impl PipelineResult {
    /// The attempt recorded for `stage`, if that stage ran.
    pub fn attempt(&self, stage: Stage) -> Option<&PipelineAttempt> {
        self.attempts.iter().find(|a| a.stage == stage)
    }

    pub fn initial_generation(&self) -> Option<&GeneratedContent> {
        self.attempt(Stage::InitialGeneration)
            .and_then(|a| a.output.as_content())
    }

    pub fn initial_review(&self) -> Option<&ReviewVerdict> {
        self.attempt(Stage::Review).and_then(|a| a.output.as_verdict())
    }

    pub fn refinement_generation(&self) -> Option<&GeneratedContent> {
        self.attempt(Stage::RefinementGeneration)
            .and_then(|a| a.output.as_content())
    }

    pub fn refinement_review(&self) -> Option<&ReviewVerdict> {
        self.attempt(Stage::RefinementReview)
            .and_then(|a| a.output.as_verdict())
    }

    /// Reviewer feedback that drove the refinement, if one happened.
    pub fn feedback_addressed(&self) -> Option<&[String]> {
        if !self.refined {
            return None;
        }
        self.initial_review().map(|v| v.feedback.as_slice())
    }

    pub fn is_pass(&self) -> bool {
        self.final_status == FinalStatus::Pass
    }
}
