//! Pipeline orchestration for lesson generation.
//!
//! This module ties the generator and reviewer together into a single
//! generate/review run with at most one refinement.
//!
//! # Architecture
//!
//! - **Orchestrator**: Drives the run through its fixed states and owns the attempt trail
//! - **Trail**: Attempt records and the final `PipelineResult`
//! - **Config**: Endpoint, credential and sampling settings for both agents
//!
//! # Pipeline Flow
//!
//! 1. **Initial generation**: The generator writes an explanation and MCQs
//! 2. **Review**: The reviewer returns pass, or fail with feedback
//! 3. **Refinement generation**: On fail, the generator rewrites with the feedback
//! 4. **Refinement review**: The rewrite is reviewed once; its verdict is final
//!
//! # Example
//!
//! ```rust,ignore
//! use lesson_forge::pipeline::{PipelineConfig, PipelineOrchestrator};
//!
//! let config = PipelineConfig::from_env()?;
//! let orchestrator = PipelineOrchestrator::from_config(&config)?;
//!
//! let result = orchestrator.run(4, "Types of angles").await?;
//! println!("{} after {} attempts", result.final_status, result.attempts.len());
//! ```

pub mod config;
pub mod orchestrator;
pub mod trail;

pub use config::{ConfigError, PipelineConfig};
pub use orchestrator::{PipelineError, PipelineFailure, PipelineOrchestrator};
pub use trail::{AttemptOutput, FinalStatus, PipelineAttempt, PipelineResult, Stage};
