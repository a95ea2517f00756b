//! Data model for generated lessons and their reviews.

pub mod types;
pub mod validation;

pub use types::{
    ContentRequest, GeneratedContent, Mcq, RequestError, ReviewStatus, ReviewVerdict,
    OPTIONS_PER_QUESTION,
};
pub use validation::SchemaError;
