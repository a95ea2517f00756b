//! Export module for pipeline results.
//!
//! Writes the final lesson and the full audit record as JSON files.

pub mod json;

pub use json::{content_file_name, file_stem, results_file_name, ExportedFiles, ResultExporter};
