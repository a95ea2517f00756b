//! Content Generator Agent.
//!
//! Turns a grade and topic (and, on the refinement pass, the reviewer's
//! feedback) into an explanation plus multiple choice questions. The agent
//! makes exactly one completion call per invocation and never retries;
//! whether to regenerate is the pipeline's decision.

use std::sync::Arc;

use crate::content::{ContentRequest, GeneratedContent};
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::utils::fill_template;

use super::error::{AgentError, AgentResult};
use super::structured::complete_structured;

/// System prompt for content generation.
const GENERATOR_SYSTEM_PROMPT: &str = r#"You are an expert educational content creator.
Generate age-appropriate educational content including an explanation and multiple choice questions.

You MUST respond with ONLY a valid JSON object in this exact format:
{
  "explanation": "<educational explanation of the topic>",
  "mcqs": [
    {
      "question": "<question text>",
      "options": ["<option 1>", "<option 2>", "<option 3>", "<option 4>"],
      "answer": "<the correct option, copied exactly from options>"
    }
  ]
}

IMPORTANT: Your output must be valid JSON matching the exact structure specified."#;

/// User prompt template for content generation.
const GENERATOR_USER_TEMPLATE: &str = r#"Create educational content for:
Grade: {grade}
Topic: {topic}
{feedback_section}
Requirements:
- Language must be appropriate for grade {grade} students
- Explanation should be clear, engaging, and accurate
- Create exactly {mcq_count} multiple choice questions
- Each MCQ must have exactly 4 distinct options
- Each answer must be copied exactly from its question's options
- Ensure concepts are introduced before being tested

Return ONLY valid JSON, no markdown formatting or code blocks."#;

/// Heading of the corrective section added on the refinement pass.
const FEEDBACK_HEADING: &str = "FEEDBACK FROM REVIEWER (Address these issues):";

/// Configuration for the Content Generator Agent.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier; empty means the provider default.
    pub model: String,
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens for LLM response.
    pub max_tokens: u32,
    /// Number of questions requested per lesson.
    pub mcq_count: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.7,
            max_tokens: 4096,
            mcq_count: 4,
        }
    }
}

impl GeneratorConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature for LLM generation.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets how many questions to ask for (at least one).
    pub fn with_mcq_count(mut self, count: usize) -> Self {
        self.mcq_count = count.max(1);
        self
    }
}

/// Content Generator Agent that asks the LLM for a lesson.
pub struct ContentGeneratorAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: GeneratorConfig,
}

impl std::fmt::Debug for ContentGeneratorAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentGeneratorAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ContentGeneratorAgent {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "content_generator";

    pub fn new(llm_client: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new generator with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a lesson for the request.
    ///
    /// # Arguments
    ///
    /// * `request` - Grade and topic to write for
    /// * `feedback` - Reviewer feedback from a failed review, when regenerating
    ///
    /// # Errors
    ///
    /// [`AgentError::Completion`] when the LLM call fails, and
    /// [`AgentError::SchemaViolation`] when the reply is not valid content.
    pub async fn generate(
        &self,
        request: &ContentRequest,
        feedback: Option<&[String]>,
    ) -> AgentResult<GeneratedContent> {
        tracing::debug!(
            agent = Self::AGENT_NAME,
            grade = request.grade,
            topic = %request.topic,
            feedback_items = feedback.map_or(0, |f| f.len()),
            "Building generation request"
        );

        let llm_request = self.build_request(request, feedback);
        let completion =
            complete_structured::<GeneratedContent>(self.llm_client.as_ref(), llm_request).await?;

        completion.value.validate().map_err(|e| {
            tracing::warn!(
                agent = Self::AGENT_NAME,
                error = %e,
                topic = %request.topic,
                "Generated content violates schema"
            );
            AgentError::schema_violation(e.to_string(), &completion.raw_output)
        })?;

        Ok(completion.value)
    }

    /// Builds the completion request for one generation call.
    pub fn build_request(
        &self,
        request: &ContentRequest,
        feedback: Option<&[String]>,
    ) -> GenerationRequest {
        GenerationRequest::new(
            self.config.model.clone(),
            vec![
                Message::system(GENERATOR_SYSTEM_PROMPT),
                Message::user(self.format_prompt(request, feedback)),
            ],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens)
        .with_json_response()
    }

    fn format_prompt(&self, request: &ContentRequest, feedback: Option<&[String]>) -> String {
        let grade = request.grade.to_string();
        let mcq_count = self.config.mcq_count.to_string();
        let feedback_section = format_feedback_section(feedback);

        fill_template(
            GENERATOR_USER_TEMPLATE,
            &[
                ("grade", grade.as_str()),
                ("topic", request.topic.as_str()),
                ("mcq_count", mcq_count.as_str()),
                ("feedback_section", feedback_section.as_str()),
            ],
        )
    }
}

/// Renders reviewer feedback as a bullet list, verbatim and in order.
fn format_feedback_section(feedback: Option<&[String]>) -> String {
    match feedback {
        Some(items) if !items.is_empty() => {
            let bullets: Vec<String> = items.iter().map(|item| format!("- {}", item)).collect();
            format!("\n{}\n{}\n", FEEDBACK_HEADING, bullets.join("\n"))
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::mock::ScriptedProvider;

    const VALID_CONTENT: &str = r#"{
        "explanation": "An angle is formed when two rays meet at a point.",
        "mcqs": [
            {
                "question": "What is an angle smaller than 90 degrees called?",
                "options": ["Acute", "Right", "Obtuse", "Straight"],
                "answer": "Acute"
            },
            {
                "question": "How many degrees are in a right angle?",
                "options": ["45", "90", "180", "360"],
                "answer": "90"
            }
        ]
    }"#;

    fn angles() -> ContentRequest {
        ContentRequest::new(4, "Types of angles").expect("valid request")
    }

    #[tokio::test]
    async fn test_generate_valid_content() {
        let provider = Arc::new(ScriptedProvider::new().reply(VALID_CONTENT));
        let agent = ContentGeneratorAgent::with_defaults(provider.clone());

        let content = agent
            .generate(&angles(), None)
            .await
            .expect("generation should succeed");

        assert_eq!(content.question_count(), 2);
        assert_eq!(content.mcqs[1].answer, "90");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_from_code_block() {
        let response = format!("Here is your lesson:\n```json\n{}\n```", VALID_CONTENT);
        let provider = Arc::new(ScriptedProvider::new().reply(response));
        let agent = ContentGeneratorAgent::with_defaults(provider);

        let content = agent
            .generate(&angles(), None)
            .await
            .expect("generation should succeed");
        assert_eq!(content.question_count(), 2);
    }

    #[tokio::test]
    async fn test_three_options_rejected() {
        let raw = r#"{
            "explanation": "Angles.",
            "mcqs": [{"question": "Q?", "options": ["a", "b", "c"], "answer": "a"}]
        }"#;
        let provider = Arc::new(ScriptedProvider::new().reply(raw));
        let agent = ContentGeneratorAgent::with_defaults(provider);

        let err = agent
            .generate(&angles(), None)
            .await
            .expect_err("three options is a schema violation");

        assert!(matches!(err, AgentError::SchemaViolation { .. }));
        assert_eq!(err.raw_output(), Some(raw));
    }

    #[tokio::test]
    async fn test_answer_outside_options_rejected() {
        let raw = r#"{
            "explanation": "Angles.",
            "mcqs": [{"question": "Q?", "options": ["a", "b", "c", "d"], "answer": "e"}]
        }"#;
        let provider = Arc::new(ScriptedProvider::new().reply(raw));
        let agent = ContentGeneratorAgent::with_defaults(provider);

        let err = agent
            .generate(&angles(), None)
            .await
            .expect_err("answer must be an option");

        match err {
            AgentError::SchemaViolation { reason, raw_output } => {
                assert!(reason.contains("MCQ 1"));
                assert_eq!(raw_output, raw);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_not_retried() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .fail(LlmError::ApiError {
                    code: 503,
                    message: "overloaded".to_string(),
                })
                .reply(VALID_CONTENT),
        );
        let agent = ContentGeneratorAgent::with_defaults(provider.clone());

        let err = agent.generate(&angles(), None).await.expect_err("fails");

        assert!(matches!(err, AgentError::Completion(LlmError::ApiError { code: 503, .. })));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_prompt_without_feedback() {
        let agent = ContentGeneratorAgent::with_defaults(Arc::new(ScriptedProvider::new()));
        let request = agent.build_request(&angles(), None);
        let prompt = request.content_for_role("user");

        assert!(prompt.contains("Grade: 4"));
        assert!(prompt.contains("Topic: Types of angles"));
        assert!(prompt.contains("appropriate for grade 4 students"));
        assert!(prompt.contains("exactly 4 multiple choice questions"));
        assert!(!prompt.contains(FEEDBACK_HEADING));
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.response_format.is_some());
    }

    #[test]
    fn test_prompt_with_feedback_is_verbatim() {
        let agent = ContentGeneratorAgent::with_defaults(Arc::new(ScriptedProvider::new()));
        let feedback = vec![
            "MCQ 2 has an ambiguous answer".to_string(),
            "Explain what a ray is first".to_string(),
        ];
        let prompt = agent
            .build_request(&angles(), Some(feedback.as_slice()))
            .content_for_role("user");

        assert!(prompt.contains(
            "FEEDBACK FROM REVIEWER (Address these issues):\n- MCQ 2 has an ambiguous answer\n- Explain what a ray is first"
        ));
    }

    #[test]
    fn test_placeholders_in_topic_are_not_expanded() {
        let agent = ContentGeneratorAgent::with_defaults(Arc::new(ScriptedProvider::new()));
        let request =
            ContentRequest::new(4, "Angles {feedback_section} {mcq_count}").expect("valid request");
        let feedback = vec!["MCQ 2 has an ambiguous answer".to_string()];

        let prompt = agent
            .build_request(&request, Some(feedback.as_slice()))
            .content_for_role("user");

        assert!(prompt.contains("Topic: Angles {feedback_section} {mcq_count}\n"));
        assert_eq!(prompt.matches(FEEDBACK_HEADING).count(), 1);
        assert_eq!(prompt.matches("- MCQ 2 has an ambiguous answer").count(), 1);
    }

    #[test]
    fn test_agent_name() {
        assert_eq!(ContentGeneratorAgent::AGENT_NAME, "content_generator");
    }

    #[test]
    fn test_empty_feedback_adds_no_section() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(format_feedback_section(Some(empty.as_slice())), "");
        assert_eq!(format_feedback_section(None), "");
    }

    #[test]
    fn test_config_builder() {
        let config = GeneratorConfig::default()
            .with_model("llama-3.1-8b-instant")
            .with_temperature(3.0)
            .with_max_tokens(2000)
            .with_mcq_count(0);

        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert!((config.temperature - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.mcq_count, 1);
    }
}
