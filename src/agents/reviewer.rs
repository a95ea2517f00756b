//! Content Reviewer Agent.
//!
//! Judges a generated lesson for factual correctness, grade-appropriate
//! language, question clarity and answer-option plausibility. The reviewer
//! sees only the content, the grade and the topic. It is never told whether
//! this is a first review or a re-review, so identical inputs always produce
//! an identical prompt.

use std::sync::Arc;

use crate::content::{ContentRequest, GeneratedContent, ReviewVerdict};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::utils::fill_template;

use super::error::{AgentError, AgentResult};
use super::structured::complete_structured;

/// System prompt for content review.
const REVIEWER_SYSTEM_PROMPT: &str = r#"You are an expert educational content reviewer.
Evaluate educational content for age-appropriateness, conceptual correctness, and clarity.

You MUST respond with ONLY a valid JSON object in this exact format:
{
  "status": "pass" | "fail",
  "feedback": ["<one specific, actionable issue per entry>"]
}

Rules:
- Use "fail" if you find ANY issue that needs fixing, with one feedback entry per issue.
- Use "pass" only when there is nothing to fix; "feedback" must then be an empty list.

IMPORTANT: Your output must be valid JSON matching the exact structure specified."#;

/// User prompt template for content review.
const REVIEWER_USER_TEMPLATE: &str = r#"Review this educational content:

Grade Level: {grade}
Topic: {topic}

Content to Review:
{content}

Evaluation Criteria:
1. Age Appropriateness: Is the language suitable for grade {grade}?
2. Conceptual Correctness: Are all concepts and answers accurate?
3. Clarity: Is the explanation clear and well-structured?
4. Question Quality: Do MCQs test introduced concepts, with one unambiguous correct answer and plausible distractors?

Return ONLY valid JSON, no markdown formatting or code blocks."#;

/// Configuration for the Content Reviewer Agent.
#[derive(Debug, Clone)]
pub struct ReviewerConfig {
    /// Model identifier; empty means the provider default.
    pub model: String,
    /// Temperature for LLM generation. Kept low so verdicts stay stable.
    pub temperature: f64,
    /// Maximum tokens for LLM response.
    pub max_tokens: u32,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.3,
            max_tokens: 2048,
        }
    }
}

impl ReviewerConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Content Reviewer Agent that asks the LLM for a pass/fail verdict.
pub struct ContentReviewerAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: ReviewerConfig,
}

impl std::fmt::Debug for ContentReviewerAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentReviewerAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ContentReviewerAgent {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "content_reviewer";

    pub fn new(llm_client: Arc<dyn LlmProvider>, config: ReviewerConfig) -> Self {
        Self { llm_client, config }
    }

    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, ReviewerConfig::default())
    }

    pub fn config(&self) -> &ReviewerConfig {
        &self.config
    }

    /// Reviews `content` written for `request`.
    ///
    /// The content is assumed to be structurally valid already; only the
    /// verdict itself is checked for shape (status and feedback must agree).
    pub async fn review(
        &self,
        content: &GeneratedContent,
        request: &ContentRequest,
    ) -> AgentResult<ReviewVerdict> {
        let llm_request = self.build_request(content, request)?;
        let completion =
            complete_structured::<ReviewVerdict>(self.llm_client.as_ref(), llm_request).await?;

        completion.value.validate().map_err(|e| {
            tracing::warn!(
                agent = Self::AGENT_NAME,
                error = %e,
                topic = %request.topic,
                "Review verdict violates schema"
            );
            AgentError::schema_violation(e.to_string(), &completion.raw_output)
        })?;

        tracing::debug!(
            agent = Self::AGENT_NAME,
            status = %completion.value.status,
            feedback_items = completion.value.feedback.len(),
            "Review verdict parsed"
        );

        Ok(completion.value)
    }

    /// Builds the completion request for one review call.
    pub fn build_request(
        &self,
        content: &GeneratedContent,
        request: &ContentRequest,
    ) -> AgentResult<GenerationRequest> {
        let prompt = self.format_prompt(content, request)?;

        Ok(GenerationRequest::new(
            self.config.model.clone(),
            vec![
                Message::system(REVIEWER_SYSTEM_PROMPT),
                Message::user(prompt),
            ],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens)
        .with_json_response())
    }

    fn format_prompt(
        &self,
        content: &GeneratedContent,
        request: &ContentRequest,
    ) -> AgentResult<String> {
        let content_json = serde_json::to_string_pretty(content)?;

        let grade = request.grade.to_string();

        Ok(fill_template(
            REVIEWER_USER_TEMPLATE,
            &[
                ("grade", grade.as_str()),
                ("topic", request.topic.as_str()),
                ("content", content_json.as_str()),
            ],
        ))
    }
}
