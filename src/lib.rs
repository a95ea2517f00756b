//! lesson_forge: grade-aware lesson and quiz generation with an LLM review pass.
//!
//! A generator agent writes an explanation and multiple choice questions for a
//! grade and topic, a reviewer agent judges them, and the pipeline refines the
//! lesson at most once when the review fails. Every stage is recorded in an
//! auditable attempt trail.

// Core modules
pub mod agents;
pub mod cli;
pub mod content;
pub mod error;
pub mod export;
pub mod llm;
pub mod pipeline;
pub mod utils;

// Re-export commonly used error types
pub use error::{ExportError, LlmError};

pub use content::{ContentRequest, GeneratedContent, Mcq, ReviewStatus, ReviewVerdict};
pub use pipeline::{
    FinalStatus, PipelineConfig, PipelineError, PipelineFailure, PipelineOrchestrator,
    PipelineResult, Stage,
};
