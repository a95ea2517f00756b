//! Generator and reviewer agents.
//!
//! Both agents are stateless: they hold a shared LLM provider handle and their
//! sampling configuration, and each call is one request/response exchange.

pub mod error;
pub mod generator;
pub mod reviewer;
pub mod structured;

pub use error::{AgentError, AgentResult};
pub use generator::{ContentGeneratorAgent, GeneratorConfig};
pub use reviewer::{ContentReviewerAgent, ReviewerConfig};
pub use structured::{complete_structured, StructuredCompletion};
