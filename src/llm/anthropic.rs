//! Anthropic API generator implementation
//!
//! This module implements the Generator trait for the Anthropic (Claude) Messages API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::llm::client::Generator;
use crate::llm::error::ProviderError;
use crate::llm::types::{GenerationOptions, OutputLimit, Usage};

/// Anthropic API base URL
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Default model to use
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Largest output the API accepts; sent when the caller asks for an unbounded limit
pub const MODEL_OUTPUT_CEILING: u32 = 64_000;

/// Configuration for the Anthropic generator
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

impl AnthropicConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Anthropic API generator
pub struct AnthropicGenerator {
    client: Client,
    api_key: String,
    config: AnthropicConfig,
    usage: Arc<Mutex<Usage>>,
}

impl AnthropicGenerator {
    /// Create a new generator
    ///
    /// Reads ANTHROPIC_API_KEY from environment
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ProviderError::MissingApiKey {
            env_var: API_KEY_ENV.to_string(),
        })?;

        Self::with_api_key(api_key, config)
    }

    /// Create a generator with an explicit API key
    pub fn with_api_key(api_key: String, config: AnthropicConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            config,
            usage: Arc::new(Mutex::new(Usage::default())),
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request(&self, prompt: &str, options: &GenerationOptions) -> Value {
        let max_tokens = match options.max_output_tokens {
            OutputLimit::Tokens(n) => n,
            OutputLimit::Unbounded => {
                log::warn!(
                    "Unbounded output requested; sending model ceiling of {} tokens",
                    MODEL_OUTPUT_CEILING
                );
                MODEL_OUTPUT_CEILING
            }
        };

        json!({
            "model": self.config.model,
            "max_tokens": max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }

    /// Pull the text out of an API response body
    fn parse_response(&self, body: Value) -> Result<String, ProviderError> {
        if let Some(u) = body.get("usage") {
            let usage = Usage::new(
                u["input_tokens"].as_u64().unwrap_or(0),
                u["output_tokens"].as_u64().unwrap_or(0),
            );
            log::debug!(
                "Anthropic usage: {} input, {} output tokens",
                usage.input_tokens,
                usage.output_tokens
            );
            if let Ok(mut total) = self.usage.lock() {
                total.add(&usage);
            }
        }

        if body["stop_reason"].as_str() == Some("max_tokens") {
            log::warn!("Response truncated at max_tokens");
        }

        let mut content = String::new();
        if let Some(blocks) = body["content"].as_array() {
            for block in blocks {
                if block["type"].as_str() == Some("text")
                    && let Some(text) = block["text"].as_str()
                {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(text);
                }
            }
        }

        if content.is_empty() {
            return Err(ProviderError::InvalidResponse("No text content in response".to_string()));
        }
        Ok(content)
    }

    /// Send a request to the Anthropic API
    async fn send_request(&self, body: Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ProviderError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status, message));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    fn classify_transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.config.timeout)
        } else {
            ProviderError::Network(e)
        }
    }

    /// Get cumulative token usage
    pub fn total_usage(&self) -> Usage {
        self.usage.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

/// Map a non-success, non-429 status to a provider error
fn classify_status(status: u16, message: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Authentication { status, message },
        _ => ProviderError::Api { status, message },
    }
}

#[async_trait]
impl Generator for AnthropicGenerator {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, ProviderError> {
        let body = self.build_request(prompt, options);

        let response = match options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.send_request(body))
                .await
                .map_err(|_| ProviderError::Timeout(timeout))??,
            None => self.send_request(body).await?,
        };

        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for AnthropicGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicGenerator")
            .field("model", &self.config.model)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> AnthropicGenerator {
        AnthropicGenerator::with_api_key("test-key".to_string(), AnthropicConfig::default()).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = AnthropicConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_config_with_model() {
        let config = AnthropicConfig::with_model("claude-3-haiku-20240307");
        assert_eq!(config.model, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_build_request_basic() {
        let body = generator().build_request("Plan a trip", &GenerationOptions::default());

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Plan a trip");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_build_request_unbounded_uses_ceiling() {
        let options = GenerationOptions::new().with_max_output_tokens(OutputLimit::Unbounded);
        let body = generator().build_request("x", &options);
        assert_eq!(body["max_tokens"], MODEL_OUTPUT_CEILING);
    }

    #[test]
    fn test_parse_response_text() {
        let text = generator()
            .parse_response(json!({
                "content": [
                    { "type": "text", "text": "{\"itinerary\": []}" }
                ],
                "stop_reason": "end_turn",
                "usage": { "input_tokens": 10, "output_tokens": 5 }
            }))
            .unwrap();
        assert_eq!(text, "{\"itinerary\": []}");
    }

    #[test]
    fn test_parse_response_joins_text_blocks() {
        let text = generator()
            .parse_response(json!({
                "content": [
                    { "type": "text", "text": "part one" },
                    { "type": "text", "text": "part two" }
                ],
                "stop_reason": "end_turn"
            }))
            .unwrap();
        assert_eq!(text, "part one\npart two");
    }

    #[test]
    fn test_parse_response_without_text_is_invalid() {
        let result = generator().parse_response(json!({ "content": [], "stop_reason": "end_turn" }));
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_total_usage_accumulation() {
        let client = generator();
        let _ = client.parse_response(json!({
            "content": [{ "type": "text", "text": "a" }],
            "usage": { "input_tokens": 100, "output_tokens": 50 }
        }));
        let _ = client.parse_response(json!({
            "content": [{ "type": "text", "text": "b" }],
            "usage": { "input_tokens": 200, "output_tokens": 100 }
        }));

        let total = client.total_usage();
        assert_eq!(total.input_tokens, 300);
        assert_eq!(total.output_tokens, 150);
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(401, "bad key".to_string()),
            ProviderError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            classify_status(403, "forbidden".to_string()),
            ProviderError::Authentication { status: 403, .. }
        ));
        assert!(matches!(
            classify_status(500, "oops".to_string()),
            ProviderError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_debug_impl_hides_key() {
        let debug_str = format!("{:?}", generator());
        assert!(debug_str.contains("AnthropicGenerator"));
        assert!(debug_str.contains(DEFAULT_MODEL));
        assert!(!debug_str.contains("test-key"));
    }

    #[test]
    fn test_model() {
        assert_eq!(generator().model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnthropicGenerator>();
    }
}
