//! Shared utility functions for lesson-forge.

pub mod json_extraction;
pub mod template;

pub use json_extraction::{
    analyze_json_structure, find_matching_brace, try_extract_json_from_response,
    JsonExtractionError, JsonExtractionResult, JsonStructureAnalysis,
};
pub use template::fill_template;
