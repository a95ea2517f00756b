//! Pipeline orchestrator for the generate/review cycle.
//!
//! A run walks a fixed set of states:
//!
//! ```text
//! initial_generation -> review -> pass ----------------------------> finalize
//!                                 fail -> refinement_generation
//!                                           -> refinement_review --> finalize
//! ```
//!
//! There is at most one refinement. The refinement review always leads to
//! `finalize`, whatever its verdict, so a run records two or four attempts.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::agents::{AgentError, ContentGeneratorAgent, ContentReviewerAgent};
use crate::content::{ContentRequest, GeneratedContent, RequestError};
use crate::error::LlmError;
use crate::llm::{CompletionClient, LlmProvider};

use super::config::{ConfigError, PipelineConfig};
use super::trail::{AttemptOutput, AttemptTrail, FinalStatus, PipelineAttempt, PipelineResult, Stage};

/// Errors that can abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request was rejected before any completion call.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// The completion service failed during a stage.
    #[error("Completion failed during {stage}: {source}")]
    Completion {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    /// A stage produced output that does not fit the expected shape.
    #[error("Schema violation during {stage}: {reason}")]
    SchemaViolation {
        stage: Stage,
        reason: String,
        raw_output: String,
    },
}

impl PipelineError {
    fn from_agent(stage: Stage, error: AgentError) -> Self {
        match error {
            AgentError::Completion(source) => PipelineError::Completion { stage, source },
            AgentError::SchemaViolation { reason, raw_output } => PipelineError::SchemaViolation {
                stage,
                reason,
                raw_output,
            },
            AgentError::Json(e) => PipelineError::SchemaViolation {
                stage,
                reason: format!("content could not be serialized: {}", e),
                raw_output: String::new(),
            },
        }
    }

    /// Stage that failed; `None` when the request itself was invalid.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::InvalidRequest(_) => None,
            PipelineError::Completion { stage, .. } | PipelineError::SchemaViolation { stage, .. } => {
                Some(*stage)
            }
        }
    }

    /// Raw completion text for schema violations.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            PipelineError::SchemaViolation { raw_output, .. } => Some(raw_output),
            _ => None,
        }
    }
}

/// An aborted run: the error plus every attempt recorded before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PipelineFailure {
    #[source]
    pub error: PipelineError,
    /// Partial trail; empty when the request was invalid.
    pub attempts: Vec<PipelineAttempt>,
}

impl PipelineFailure {
    fn new(error: PipelineError, attempts: Vec<PipelineAttempt>) -> Self {
        Self { error, attempts }
    }

    pub fn stage(&self) -> Option<Stage> {
        self.error.stage()
    }
}

/// Position of a run in the generate/review cycle.
#[derive(Debug)]
enum RunState {
    InitialGeneration,
    Review {
        content: GeneratedContent,
    },
    RefinementGeneration {
        feedback: Vec<String>,
    },
    RefinementReview {
        content: GeneratedContent,
    },
    Finalize {
        content: GeneratedContent,
        status: FinalStatus,
        refined: bool,
    },
}

/// Coordinates the generator and reviewer for one request at a time.
///
/// The orchestrator holds no per-run state; every call to [`run`](Self::run)
/// starts a fresh trail, so one orchestrator can serve many requests.
#[derive(Debug)]
pub struct PipelineOrchestrator {
    generator: ContentGeneratorAgent,
    reviewer: ContentReviewerAgent,
}

impl PipelineOrchestrator {
    pub fn new(generator: ContentGeneratorAgent, reviewer: ContentReviewerAgent) -> Self {
        Self {
            generator,
            reviewer,
        }
    }

    /// Builds both agents on a shared provider, configured from `config`.
    pub fn with_provider(provider: Arc<dyn LlmProvider>, config: &PipelineConfig) -> Self {
        Self::new(
            ContentGeneratorAgent::new(Arc::clone(&provider), config.generator_config()),
            ContentReviewerAgent::new(provider, config.reviewer_config()),
        )
    }

    /// Validates `config` and connects a [`CompletionClient`] to it.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = CompletionClient::new(
            config.api_base.clone(),
            config.api_key.clone(),
            config.model.clone(),
            config.request_timeout,
        )?;

        info!(
            api_base = %client.api_base(),
            model = %client.default_model(),
            api_key = %client.api_key_masked(),
            "Completion client ready"
        );

        Ok(Self::with_provider(Arc::new(client), config))
    }

    pub fn generator(&self) -> &ContentGeneratorAgent {
        &self.generator
    }

    pub fn reviewer(&self) -> &ContentReviewerAgent {
        &self.reviewer
    }

    /// Runs the pipeline for `grade` and `topic`.
    ///
    /// Invalid input is rejected before any completion call is made.
    pub async fn run(&self, grade: u32, topic: &str) -> Result<PipelineResult, PipelineFailure> {
        let request = ContentRequest::new(grade, topic).map_err(|e| {
            warn!(grade, topic, error = %e, "Rejected content request");
            PipelineFailure::new(e.into(), Vec::new())
        })?;

        self.run_request(request).await
    }

    /// Runs the pipeline for an already validated request.
    pub async fn run_request(
        &self,
        request: ContentRequest,
    ) -> Result<PipelineResult, PipelineFailure> {
        info!(grade = request.grade, topic = %request.topic, "Starting content pipeline");

        let mut trail = AttemptTrail::new();
        let mut state = RunState::InitialGeneration;

        loop {
            state = match state {
                RunState::Finalize {
                    content,
                    status,
                    refined,
                } => {
                    info!(
                        final_status = %status,
                        refined,
                        attempts = trail.len(),
                        "Content pipeline finished"
                    );

                    return Ok(PipelineResult {
                        request,
                        attempts: trail.into_attempts(),
                        final_output: content,
                        final_status: status,
                        refined,
                    });
                }
                other => match self.advance(other, &request, &mut trail).await {
                    Ok(next) => next,
                    Err(error) => {
                        warn!(
                            error = %error,
                            attempts = trail.len(),
                            "Content pipeline aborted"
                        );
                        return Err(PipelineFailure::new(error, trail.into_attempts()));
                    }
                },
            };
        }
    }

    /// Executes one stage, records its output and returns the next state.
    async fn advance(
        &self,
        state: RunState,
        request: &ContentRequest,
        trail: &mut AttemptTrail,
    ) -> Result<RunState, PipelineError> {
        match state {
            RunState::InitialGeneration => {
                let stage = Stage::InitialGeneration;
                info!(%stage, grade = request.grade, topic = %request.topic, "Generating content");

                let content = self
                    .generator
                    .generate(request, None)
                    .await
                    .map_err(|e| PipelineError::from_agent(stage, e))?;
                trail.record(stage, AttemptOutput::Content(content.clone()));

                info!(%stage, questions = content.question_count(), "Content generated");
                Ok(RunState::Review { content })
            }

            RunState::Review { content } => {
                let stage = Stage::Review;
                info!(%stage, "Reviewing content");

                let verdict = self
                    .reviewer
                    .review(&content, request)
                    .await
                    .map_err(|e| PipelineError::from_agent(stage, e))?;
                trail.record(stage, AttemptOutput::Verdict(verdict.clone()));

                if verdict.is_pass() {
                    info!(%stage, status = %verdict.status, "Content passed review");
                    Ok(RunState::Finalize {
                        content,
                        status: FinalStatus::Pass,
                        refined: false,
                    })
                } else {
                    warn!(
                        %stage,
                        status = %verdict.status,
                        feedback_items = verdict.feedback.len(),
                        "Content failed review, refining once"
                    );
                    for item in &verdict.feedback {
                        debug!(%stage, feedback = %item, "Reviewer feedback");
                    }
                    Ok(RunState::RefinementGeneration {
                        feedback: verdict.feedback,
                    })
                }
            }

            RunState::RefinementGeneration { feedback } => {
                let stage = Stage::RefinementGeneration;
                info!(%stage, feedback_items = feedback.len(), "Regenerating content with feedback");

                let content = self
                    .generator
                    .generate(request, Some(feedback.as_slice()))
                    .await
                    .map_err(|e| PipelineError::from_agent(stage, e))?;
                trail.record(stage, AttemptOutput::Content(content.clone()));

                info!(%stage, questions = content.question_count(), "Refined content generated");
                Ok(RunState::RefinementReview { content })
            }

            RunState::RefinementReview { content } => {
                let stage = Stage::RefinementReview;
                info!(%stage, "Reviewing refined content");

                let verdict = self
                    .reviewer
                    .review(&content, request)
                    .await
                    .map_err(|e| PipelineError::from_agent(stage, e))?;
                trail.record(stage, AttemptOutput::Verdict(verdict.clone()));

                let status = if verdict.is_pass() {
                    info!(%stage, status = %verdict.status, "Refined content passed review");
                    FinalStatus::Pass
                } else {
                    warn!(
                        %stage,
                        status = %verdict.status,
                        feedback_items = verdict.feedback.len(),
                        "Refined content failed review"
                    );
                    FinalStatus::FailAfterRefinement
                };

                Ok(RunState::Finalize {
                    content,
                    status,
                    refined: true,
                })
            }

            finalize @ RunState::Finalize { .. } => Ok(finalize),
        }
    }
}
