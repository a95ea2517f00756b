//! Structured completions: send a request, get back a typed value.
//!
//! This is the `complete(prompt, expected_shape)` boundary both agents share.
//! Transport problems surface as [`AgentError::Completion`]; anything that
//! arrives but cannot be read as `T` is an [`AgentError::SchemaViolation`]
//! carrying the raw completion text.

use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::llm::{GenerationRequest, LlmProvider};
use crate::utils::json_extraction::try_extract_json_from_response;

use super::error::{AgentError, AgentResult};

/// A parsed completion together with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct StructuredCompletion<T> {
    pub value: T,
    pub raw_output: String,
}

/// Runs `request` against `provider` and deserializes the JSON object in the first choice.
pub async fn complete_structured<T: DeserializeOwned>(
    provider: &dyn LlmProvider,
    request: GenerationRequest,
) -> AgentResult<StructuredCompletion<T>> {
    let response = provider.generate(request).await?;

    let raw_output = match response.first_content() {
        Some(content) if !content.trim().is_empty() => content.to_string(),
        _ => return Err(LlmError::EmptyResponse.into()),
    };

    let json = try_extract_json_from_response(&raw_output)
        .into_result()
        .map_err(|e| {
            tracing::warn!(error = %e, "Could not locate JSON in completion");
            AgentError::schema_violation(e.to_string(), &raw_output)
        })?;

    let value = serde_json::from_str::<T>(&json).map_err(|e| {
        tracing::warn!(error = %e, "Completion JSON does not match expected shape");
        AgentError::schema_violation(format!("Invalid JSON shape: {}", e), &raw_output)
    })?;

    Ok(StructuredCompletion { value, raw_output })
}
