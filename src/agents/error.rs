//! Error types for the generator and reviewer agents.

use thiserror::Error;

use crate::error::LlmError;

/// Errors that can occur during a single agent call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The completion capability could not be reached or answered with an error.
    #[error("LLM error: {0}")]
    Completion(#[from] LlmError),

    /// The completion arrived but does not fit the expected shape.
    #[error("Schema violation: {reason}")]
    SchemaViolation {
        reason: String,
        /// The completion text exactly as received.
        raw_output: String,
    },

    /// Serializing content into a prompt failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    pub(crate) fn schema_violation(reason: impl Into<String>, raw_output: &str) -> Self {
        AgentError::SchemaViolation {
            reason: reason.into(),
            raw_output: raw_output.to_string(),
        }
    }

    /// Raw completion text attached to a schema violation.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            AgentError::SchemaViolation { raw_output, .. } => Some(raw_output),
            AgentError::Completion(_) | AgentError::Json(_) => None,
        }
    }
}

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
