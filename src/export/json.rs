//! JSON export of pipeline results.
//!
//! Writes two pretty-printed documents per run into an output directory:
//!
//! - `content_grade{grade}_{topic}.json`: the final lesson only
//! - `pipeline_results_grade{grade}_{topic}.json`: the whole `PipelineResult`,
//!   attempt trail included
//!
//! Spaces, path separators and other characters that are unsafe in a file
//! name become underscores, so every file lands directly in the output
//! directory.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::content::ContentRequest;
use crate::error::ExportError;
use crate::pipeline::PipelineResult;

/// Paths written by [`ResultExporter::export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub content_path: PathBuf,
    pub results_path: PathBuf,
}

/// Writes pipeline results as JSON files.
///
/// # Example
///
/// ```ignore
/// use lesson_forge::export::ResultExporter;
///
/// let exporter = ResultExporter::new("./lessons");
/// let files = exporter.export(&result)?;
/// println!("Wrote {}", files.results_path.display());
/// ```
#[derive(Debug, Clone)]
pub struct ResultExporter {
    output_dir: PathBuf,
}

impl ResultExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes both the final content and the full result.
    pub fn export(&self, result: &PipelineResult) -> Result<ExportedFiles, ExportError> {
        Ok(ExportedFiles {
            content_path: self.export_final_content(result)?,
            results_path: self.export_pipeline_result(result)?,
        })
    }

    /// Writes `final_output` alone.
    pub fn export_final_content(&self, result: &PipelineResult) -> Result<PathBuf, ExportError> {
        let path = self
            .prepare_dir()?
            .join(content_file_name(&result.request));
        write_pretty_json(&path, &result.final_output)?;

        tracing::debug!(path = %path.display(), "Exported final content");
        Ok(path)
    }

    /// Writes the complete result, attempt trail included.
    pub fn export_pipeline_result(&self, result: &PipelineResult) -> Result<PathBuf, ExportError> {
        let path = self
            .prepare_dir()?
            .join(results_file_name(&result.request));
        write_pretty_json(&path, result)?;

        tracing::debug!(
            path = %path.display(),
            attempts = result.attempts.len(),
            "Exported pipeline result"
        );
        Ok(path)
    }

    fn prepare_dir(&self) -> Result<&Path, ExportError> {
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(ExportError::NotADirectory(
                self.output_dir.display().to_string(),
            ));
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(&self.output_dir)
    }
}

/// `grade{grade}_{topic}`, with every character of the topic that is not
/// filename-safe (spaces and path separators included) replaced by `_`.
pub fn file_stem(request: &ContentRequest) -> String {
    let topic: String = request
        .topic
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("grade{}_{}", request.grade, topic)
}

pub fn content_file_name(request: &ContentRequest) -> String {
    format!("content_{}.json", file_stem(request))
}

pub fn results_file_name(request: &ContentRequest) -> String {
    format!("pipeline_results_{}.json", file_stem(request))
}

fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
