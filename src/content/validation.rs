//! Schema rules for generated content and review verdicts.
//!
//! Deserialization already enforces field presence, field types and the
//! four-option arity. The checks here cover the remaining invariants. They are
//! pure and never modify the value, so validating twice gives the same answer.

use std::collections::HashSet;

use thiserror::Error;

use super::types::{GeneratedContent, Mcq, ReviewStatus, ReviewVerdict};

/// A broken data-model rule. Question numbers are 1-based, as a reader counts them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("explanation is empty")]
    EmptyExplanation,

    #[error("content has no multiple choice questions")]
    NoQuestions,

    #[error("MCQ {number}: question text is empty")]
    EmptyQuestion { number: usize },

    #[error("MCQ {number}: option {option} is empty")]
    EmptyOption { number: usize, option: usize },

    #[error("MCQ {number}: option '{text}' appears more than once")]
    DuplicateOption { number: usize, text: String },

    #[error("MCQ {number}: answer '{answer}' is not one of the options")]
    AnswerNotInOptions { number: usize, answer: String },

    #[error("verdict is 'pass' but carries {count} feedback item(s)")]
    PassWithFeedback { count: usize },

    #[error("verdict is 'fail' but carries no feedback")]
    FailWithoutFeedback,

    #[error("feedback item {number} is empty")]
    EmptyFeedback { number: usize },
}

impl Mcq {
    /// Checks question text, option distinctness and answer membership.
    pub fn validate(&self, number: usize) -> Result<(), SchemaError> {
        if self.question.trim().is_empty() {
            return Err(SchemaError::EmptyQuestion { number });
        }

        let mut seen = HashSet::new();
        for (i, option) in self.options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(SchemaError::EmptyOption {
                    number,
                    option: i + 1,
                });
            }
            if !seen.insert(option.as_str()) {
                return Err(SchemaError::DuplicateOption {
                    number,
                    text: option.clone(),
                });
            }
        }

        if self.answer_index().is_none() {
            return Err(SchemaError::AnswerNotInOptions {
                number,
                answer: self.answer.clone(),
            });
        }

        Ok(())
    }
}

impl GeneratedContent {
    /// Builds content and validates it in one step.
    pub fn new(explanation: impl Into<String>, mcqs: Vec<Mcq>) -> Result<Self, SchemaError> {
        let content = Self {
            explanation: explanation.into(),
            mcqs,
        };
        content.validate()?;
        Ok(content)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.explanation.trim().is_empty() {
            return Err(SchemaError::EmptyExplanation);
        }
        if self.mcqs.is_empty() {
            return Err(SchemaError::NoQuestions);
        }
        for (i, mcq) in self.mcqs.iter().enumerate() {
            mcq.validate(i + 1)?;
        }
        Ok(())
    }
}

impl ReviewVerdict {
    /// Status and feedback must agree: pass has none, fail has at least one.
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self.status {
            ReviewStatus::Pass if !self.feedback.is_empty() => {
                return Err(SchemaError::PassWithFeedback {
                    count: self.feedback.len(),
                });
            }
            ReviewStatus::Fail if self.feedback.is_empty() => {
                return Err(SchemaError::FailWithoutFeedback);
            }
            _ => {}
        }

        if let Some(i) = self.feedback.iter().position(|f| f.trim().is_empty()) {
            return Err(SchemaError::EmptyFeedback { number: i + 1 });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(a: &str, b: &str, c: &str, d: &str) -> [String; 4] {
        [a.to_string(), b.to_string(), c.to_string(), d.to_string()]
    }

    fn right_angle_mcq() -> Mcq {
        Mcq::new(
            "How many degrees are in a right angle?",
            options("45", "90", "180", "360"),
            "90",
        )
    }

    #[test]
    fn test_valid_content() {
        let content =
            GeneratedContent::new("A right angle measures 90 degrees.", vec![right_angle_mcq()])
                .expect("valid content");
        assert_eq!(content.question_count(), 1);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let content =
            GeneratedContent::new("A right angle measures 90 degrees.", vec![right_angle_mcq()])
                .expect("valid content");
        assert!(content.validate().is_ok());
        assert!(content.validate().is_ok());
    }

    #[test]
    fn test_empty_explanation() {
        let result = GeneratedContent::new("   ", vec![right_angle_mcq()]);
        assert_eq!(result, Err(SchemaError::EmptyExplanation));
    }

    #[test]
    fn test_no_questions() {
        let result = GeneratedContent::new("Angles are everywhere.", Vec::new());
        assert_eq!(result, Err(SchemaError::NoQuestions));
    }

    #[test]
    fn test_answer_not_in_options() {
        let mut mcq = right_angle_mcq();
        mcq.answer = "ninety".to_string();
        let result = GeneratedContent::new("Angles.", vec![right_angle_mcq(), mcq]);
        assert_eq!(
            result,
            Err(SchemaError::AnswerNotInOptions {
                number: 2,
                answer: "ninety".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_option() {
        let mcq = Mcq::new("Pick one", options("acute", "obtuse", "acute", "right"), "right");
        assert_eq!(
            mcq.validate(1),
            Err(SchemaError::DuplicateOption {
                number: 1,
                text: "acute".to_string()
            })
        );
    }

    #[test]
    fn test_empty_option_and_question() {
        let mcq = Mcq::new("Pick one", options("acute", " ", "obtuse", "right"), "right");
        assert_eq!(
            mcq.validate(3),
            Err(SchemaError::EmptyOption {
                number: 3,
                option: 2
            })
        );

        let mcq = Mcq::new("", options("a", "b", "c", "d"), "a");
        assert_eq!(mcq.validate(1), Err(SchemaError::EmptyQuestion { number: 1 }));
    }

    #[test]
    fn test_verdict_rules() {
        assert!(ReviewVerdict::pass().validate().is_ok());
        assert!(ReviewVerdict::fail(["Too advanced for grade 4"])
            .validate()
            .is_ok());

        let noisy_pass = ReviewVerdict {
            status: ReviewStatus::Pass,
            feedback: vec!["Nice work".to_string()],
        };
        assert_eq!(
            noisy_pass.validate(),
            Err(SchemaError::PassWithFeedback { count: 1 })
        );

        let silent_fail = ReviewVerdict::fail(Vec::<String>::new());
        assert_eq!(silent_fail.validate(), Err(SchemaError::FailWithoutFeedback));

        let blank_item = ReviewVerdict::fail(["ok", ""]);
        assert_eq!(
            blank_item.validate(),
            Err(SchemaError::EmptyFeedback { number: 2 })
        );
    }
}
