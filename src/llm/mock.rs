//! Scripted LLM provider for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LlmError;

use super::{Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, Usage};

/// Replays canned completions in order and records every request it receives.
pub(crate) struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful completion.
    pub(crate) fn reply(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .expect("lock not poisoned")
            .push_back(Ok(content.into()));
        self
    }

    /// Queue a transport failure.
    pub(crate) fn fail(self, error: LlmError) -> Self {
        self.responses
            .lock()
            .expect("lock not poisoned")
            .push_back(Err(error));
        self
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("lock not poisoned").clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().expect("lock not poisoned").len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.requests
            .lock()
            .expect("lock not poisoned")
            .push(request);

        let next = self
            .responses
            .lock()
            .expect("lock not poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::RequestFailed("script exhausted".to_string())));

        let content = next?;
        Ok(GenerationResponse {
            id: "mock-id".to_string(),
            model: "mock-model".to_string(),
            choices: vec![Choice {
                index: 0,
                message: Message::assistant(content),
                finish_reason: "stop".to_string(),
            }],
            usage: Usage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            },
        })
    }
}
