//! Pipeline configuration.
//!
//! Holds everything needed to build the completion client and the two agents:
//! endpoint and credential, model, per-agent sampling settings and the number
//! of questions requested. The credential is an explicit value here, never
//! ambient process state read deep inside an agent.

use std::time::Duration;
use thiserror::Error;

use crate::agents::{GeneratorConfig, ReviewerConfig};
use crate::llm::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// The completion client could not be constructed.
    #[error("Failed to build completion client: {0}")]
    Client(#[from] crate::error::LlmError),
}

/// Configuration for the content pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // Completion service
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Bearer token for the API.
    pub api_key: Option<String>,
    /// Model used by both agents.
    pub model: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,

    // Generation
    /// Temperature for the generator.
    pub generator_temperature: f64,
    /// Temperature for the reviewer.
    pub reviewer_temperature: f64,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Number of questions requested per lesson.
    pub mcq_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),

            generator_temperature: 0.7,
            reviewer_temperature: 0.3,
            max_tokens: 4096,
            mcq_count: 4,
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GROQ_API_KEY`: API key (required)
    /// - `GROQ_API_BASE`: API base URL (default: https://api.groq.com/openai/v1)
    /// - `PIPELINE_MODEL`: Model for both agents (default: llama-3.3-70b-versatile)
    /// - `PIPELINE_GENERATOR_TEMPERATURE`: Generator temperature (default: 0.7)
    /// - `PIPELINE_REVIEWER_TEMPERATURE`: Reviewer temperature (default: 0.3)
    /// - `PIPELINE_MAX_TOKENS`: Maximum tokens per completion (default: 4096)
    /// - `PIPELINE_MCQ_COUNT`: Questions per lesson (default: 4)
    /// - `PIPELINE_REQUEST_TIMEOUT_SECS`: HTTP timeout in seconds (default: 120)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or have invalid values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_env_optional()?;
        if config.api_key.is_none() {
            return Err(ConfigError::MissingEnvVar("GROQ_API_KEY".to_string()));
        }
        config.validate()?;
        Ok(config)
    }

    /// Like [`from_env`](Self::from_env) but leaves the API key unset when
    /// `GROQ_API_KEY` is absent and skips validation, so callers can layer
    /// their own overrides on top.
    pub fn from_env_optional() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(val) = lookup("GROQ_API_KEY") {
            if !val.trim().is_empty() {
                config.api_key = Some(val);
            }
        }

        if let Some(val) = lookup("GROQ_API_BASE") {
            config.api_base = val;
        }

        if let Some(val) = lookup("PIPELINE_MODEL") {
            config.model = val;
        }

        if let Some(val) = lookup("PIPELINE_GENERATOR_TEMPERATURE") {
            config.generator_temperature = parse_env_value(&val, "PIPELINE_GENERATOR_TEMPERATURE")?;
        }

        if let Some(val) = lookup("PIPELINE_REVIEWER_TEMPERATURE") {
            config.reviewer_temperature = parse_env_value(&val, "PIPELINE_REVIEWER_TEMPERATURE")?;
        }

        if let Some(val) = lookup("PIPELINE_MAX_TOKENS") {
            config.max_tokens = parse_env_value(&val, "PIPELINE_MAX_TOKENS")?;
        }

        if let Some(val) = lookup("PIPELINE_MCQ_COUNT") {
            config.mcq_count = parse_env_value(&val, "PIPELINE_MCQ_COUNT")?;
        }

        if let Some(val) = lookup("PIPELINE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "PIPELINE_REQUEST_TIMEOUT_SECS")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_generator_temperature(mut self, temperature: f64) -> Self {
        self.generator_temperature = temperature;
        self
    }

    pub fn with_reviewer_temperature(mut self, temperature: f64) -> Self {
        self.reviewer_temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_mcq_count(mut self, count: usize) -> Self {
        self.mcq_count = count;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationFailed(
                    "an API key is required (set GROQ_API_KEY or pass --api-key)".to_string(),
                ))
            }
        }

        if self.api_base.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "api_base must not be empty".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("generator_temperature", self.generator_temperature),
            ("reviewer_temperature", self.reviewer_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be between 0.0 and 2.0, got {}",
                    name, value
                )));
            }
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.mcq_count == 0 {
            return Err(ConfigError::ValidationFailed(
                "mcq_count must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Generator settings derived from this configuration.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::default()
            .with_model(self.model.clone())
            .with_temperature(self.generator_temperature)
            .with_max_tokens(self.max_tokens)
            .with_mcq_count(self.mcq_count)
    }

    /// Reviewer settings derived from this configuration.
    pub fn reviewer_config(&self) -> ReviewerConfig {
        ReviewerConfig::default()
            .with_model(self.model.clone())
            .with_temperature(self.reviewer_temperature)
            .with_max_tokens(self.max_tokens)
    }
}

/// Parses an environment variable value.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
}
