//! LLM integration for lesson-forge.
//!
//! The generator and reviewer agents never talk HTTP themselves; they build a
//! [`GenerationRequest`] and hand it to an [`LlmProvider`]. The production
//! provider is [`CompletionClient`], which speaks the OpenAI-compatible
//! chat-completions protocol (Groq by default).
//!
//! ```ignore
//! use lesson_forge::llm::{CompletionClient, GenerationRequest, LlmProvider, Message};
//!
//! let client = CompletionClient::groq(api_key)?;
//! let request = GenerationRequest::new("", vec![Message::user("Hello!")])
//!     .with_temperature(0.3);
//! let response = client.generate(request).await?;
//! println!("{}", response.first_content().unwrap_or_default());
//! ```

pub mod client;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{
    Choice, CompletionClient, GenerationRequest, GenerationResponse, LlmProvider, Message,
    ResponseFormat, Usage, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
