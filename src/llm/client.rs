//! Generation collaborator trait and an in-process scripted implementation

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::ProviderError;
use super::types::GenerationOptions;

/// Stateless text generator - each call is independent (no conversation state)
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, ProviderError>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

/// Generator that replays queued outcomes in order and records every prompt
///
/// Used by tests and by the CLI when replaying a saved response.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that answers once with the given text
    pub fn with_response(response: impl Into<String>) -> Self {
        let generator = Self::new();
        generator.push_response(response);
        generator
    }

    /// Generator that fails once with the given error
    pub fn with_error(error: ProviderError) -> Self {
        let generator = Self::new();
        generator.push_error(error);
        generator
    }

    /// Queue a successful response
    pub fn push_response(&self, response: impl Into<String>) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(Ok(response.into()));
        }
    }

    /// Queue a failure
    pub fn push_error(&self, error: ProviderError) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(Err(error));
        }
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of generate calls made
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self.outcomes.lock().ok().and_then(|mut o| o.pop_front());
        next.unwrap_or_else(|| Err(ProviderError::InvalidResponse("scripted generator exhausted".to_string())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
