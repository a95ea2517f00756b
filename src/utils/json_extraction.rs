//! JSON extraction for LLM completions.
//!
//! Models asked for "JSON only" still wrap it in markdown fences or put a
//! sentence in front of it now and then. This module locates the JSON object
//! inside such a completion without altering it. It never repairs content:
//! a truncated object is reported as truncated, not closed.
//!
//! # Extraction Strategies
//!
//! Tried in order, first hit wins:
//! 1. A ```` ```json ```` fenced block
//! 2. A generic ```` ``` ```` fenced block
//! 3. The first balanced `{...}` anywhere in the text
//!
//! # Example
//!
//! ```
//! use lesson_forge::utils::json_extraction::try_extract_json_from_response;
//!
//! let response = "Here is the review: {\"status\": \"pass\", \"feedback\": []}";
//! let json = try_extract_json_from_response(response).into_result().unwrap();
//! assert!(json.contains("\"pass\""));
//! ```

use thiserror::Error;

/// Number of characters kept in error previews.
const PREVIEW_LEN: usize = 100;

/// Error type for JSON extraction failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JsonExtractionError {
    #[error("JSON appears truncated: {unclosed_braces} unclosed braces, {unclosed_brackets} unclosed brackets")]
    Truncated {
        unclosed_braces: usize,
        unclosed_brackets: usize,
    },
    #[error("No JSON object found in response. Content starts with: '{content_preview}'")]
    NotFound { content_preview: String },
}

/// Result of a JSON extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtractionResult {
    /// Found a syntactically valid JSON object.
    Success(String),
    /// An object was opened but never closed.
    Truncated {
        unclosed_braces: usize,
        unclosed_brackets: usize,
    },
    /// Nothing JSON-like in the response.
    NotFound { content_preview: String },
}

impl JsonExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JsonExtractionResult::Success(_))
    }

    /// Converts the result into a `Result`.
    pub fn into_result(self) -> Result<String, JsonExtractionError> {
        match self {
            JsonExtractionResult::Success(json) => Ok(json),
            JsonExtractionResult::Truncated {
                unclosed_braces,
                unclosed_brackets,
            } => Err(JsonExtractionError::Truncated {
                unclosed_braces,
                unclosed_brackets,
            }),
            JsonExtractionResult::NotFound { content_preview } => {
                Err(JsonExtractionError::NotFound { content_preview })
            }
        }
    }
}

/// Brace/bracket balance of a string, ignoring characters inside string literals.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStructureAnalysis {
    pub unclosed_braces: usize,
    pub unclosed_brackets: usize,
    /// Whether the scan ended inside a string literal.
    pub in_string: bool,
}

impl JsonStructureAnalysis {
    pub fn is_truncated(&self) -> bool {
        self.unclosed_braces > 0 || self.unclosed_brackets > 0 || self.in_string
    }
}

/// Scans `s` and reports how many braces and brackets remain open.
pub fn analyze_json_structure(s: &str) -> JsonStructureAnalysis {
    let mut brace_depth: isize = 0;
    let mut bracket_depth: isize = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for c in s.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => brace_depth += 1,
            '}' if !in_string => brace_depth -= 1,
            '[' if !in_string => bracket_depth += 1,
            ']' if !in_string => bracket_depth -= 1,
            _ => {}
        }
    }

    JsonStructureAnalysis {
        unclosed_braces: brace_depth.max(0) as usize,
        unclosed_brackets: bracket_depth.max(0) as usize,
        in_string,
    }
}

/// Returns the byte index of the '}' matching the '{' at the start of `s`.
pub fn find_matching_brace(s: &str) -> Option<usize> {
    if !s.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Body of the first ```` ```json ```` fenced block.
pub fn extract_from_json_code_block(content: &str) -> Option<String> {
    let start = content.find("```json")?;
    let body_start = start + "```json".len();
    let end = content[body_start..].find("```")?;
    Some(content[body_start..body_start + end].trim().to_string())
}

/// Body of the first generic ```` ``` ```` fenced block, skipping a language tag line.
pub fn extract_from_generic_code_block(content: &str) -> Option<String> {
    let start = content.find("```")?;
    let after_fence = &content[start + 3..];
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim().to_string())
}

fn parses_as_json(candidate: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(candidate).is_ok()
}

fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_LEN).collect()
}

/// Attempts to locate a JSON object in an LLM response.
pub fn try_extract_json_from_response(content: &str) -> JsonExtractionResult {
    let trimmed = content.trim();

    if let Some(json) = extract_from_json_code_block(trimmed) {
        if parses_as_json(&json) {
            return JsonExtractionResult::Success(json);
        }
    }

    if let Some(json) = extract_from_generic_code_block(trimmed) {
        if json.starts_with('{') && parses_as_json(&json) {
            return JsonExtractionResult::Success(json);
        }
    }

    if let Some(start) = trimmed.find('{') {
        let candidate_region = &trimmed[start..];
        if let Some(end) = find_matching_brace(candidate_region) {
            let candidate = &candidate_region[..=end];
            if parses_as_json(candidate) {
                return JsonExtractionResult::Success(candidate.to_string());
            }
        }

        let analysis = analyze_json_structure(candidate_region);
        if analysis.is_truncated() {
            return JsonExtractionResult::Truncated {
                unclosed_braces: analysis.unclosed_braces,
                unclosed_brackets: analysis.unclosed_brackets,
            };
        }
    }

    JsonExtractionResult::NotFound {
        content_preview: preview(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_json() {
        let content = r#"{"status": "pass", "feedback": []}"#;
        let result = try_extract_json_from_response(content);
        assert_eq!(result, JsonExtractionResult::Success(content.to_string()));
    }

    #[test]
    fn test_json_code_block() {
        let content = "Here you go:\n```json\n{\"status\": \"fail\", \"feedback\": [\"x\"]}\n```\nDone.";
        let json = try_extract_json_from_response(content)
            .into_result()
            .expect("json found");
        assert_eq!(json, r#"{"status": "fail", "feedback": ["x"]}"#);
    }

    #[test]
    fn test_generic_code_block() {
        let content = "```\n{\"explanation\": \"Angles\"}\n```";
        let json = try_extract_json_from_response(content)
            .into_result()
            .expect("json found");
        assert_eq!(json, r#"{"explanation": "Angles"}"#);
    }

    #[test]
    fn test_json_with_surrounding_text() {
        let content = r#"Sure! {"status": "pass", "feedback": []} Hope that helps."#;
        let json = try_extract_json_from_response(content)
            .into_result()
            .expect("json found");
        assert_eq!(json, r#"{"status": "pass", "feedback": []}"#);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let content = r#"{"explanation": "Use {braces} and \"quotes\"", "mcqs": []}"#;
        assert_eq!(find_matching_brace(content), Some(content.len() - 1));
        assert!(try_extract_json_from_response(content).is_success());
    }

    #[test]
    fn test_truncated_object() {
        let content = r#"{"explanation": "An angle is", "mcqs": [{"question": "What"#;
        let result = try_extract_json_from_response(content);
        assert!(matches!(
            result,
            JsonExtractionResult::Truncated {
                unclosed_braces: 2,
                unclosed_brackets: 1
            }
        ));
        assert!(matches!(
            result.into_result(),
            Err(JsonExtractionError::Truncated { .. })
        ));
    }

    #[test]
    fn test_no_json() {
        let result = try_extract_json_from_response("I cannot help with that.");
        assert_eq!(
            result.into_result(),
            Err(JsonExtractionError::NotFound {
                content_preview: "I cannot help with that.".to_string()
            })
        );
    }

    #[test]
    fn test_empty_content() {
        assert!(matches!(
            try_extract_json_from_response("   "),
            JsonExtractionResult::NotFound { .. }
        ));
    }

    #[test]
    fn test_analyze_json_structure() {
        let analysis = analyze_json_structure(r#"{"a": [1, 2"#);
        assert_eq!(analysis.unclosed_braces, 1);
        assert_eq!(analysis.unclosed_brackets, 1);
        assert!(!analysis.in_string);
        assert!(analysis.is_truncated());

        assert!(!analyze_json_structure(r#"{"a": [1, 2]}"#).is_truncated());
    }
}
