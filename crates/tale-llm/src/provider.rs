//! LLM provider trait.
//!
//! Defines the interface that all LLM providers must implement.

use async_trait::async_trait;

use crate::error::LlmResult;
use crate::types::{LlmResponse, Message};

/// LLM provider trait.
///
/// Implementors provide non-streaming chat completions.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Complete without streaming.
    ///
    /// Returns the full response once generation is complete. A non-empty
    /// `system` is sent ahead of `messages`.
    async fn complete(&self, messages: &[Message], system: &str) -> LlmResult<LlmResponse>;

    /// Simple text completion (single user prompt, no system preamble).
    async fn complete_simple(&self, prompt: &str) -> LlmResult<String> {
        let messages = vec![Message::user(prompt)];
        let response = self.complete(&messages, "").await?;
        Ok(response.message.content)
    }
}

/// Blanket implementation allowing `Box<dyn LlmProvider>` to be used as
/// a type parameter wherever `P: LlmProvider` is required.
#[async_trait]
impl LlmProvider for Box<dyn LlmProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete(&self, messages: &[Message], system: &str) -> LlmResult<LlmResponse> {
        (**self).complete(messages, system).await
    }
}

/// Shared providers can be handed to several owners.
#[async_trait]
impl<T: LlmProvider + ?Sized> LlmProvider for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete(&self, messages: &[Message], system: &str) -> LlmResult<LlmResponse> {
        (**self).complete(messages, system).await
    }
}

/// Configuration for LLM providers.
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: usize,
    /// Temperature (0.0 - 2.0).
    pub temperature: f64,
    /// API base URL (for custom endpoints).
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("has_api_key", &!self.api_key.is_empty())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("has_base_url", &self.base_url.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a new config with API key and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set max tokens.
    #[must_use]
    pub fn max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = temp.clamp(0.0, 2.0);
        self
    }

    /// Set base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            temperature: 1.0,
            base_url: None,
            timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ProviderConfig::new("sk-test", "gpt-4o")
            .max_tokens(800)
            .temperature(3.5)
            .base_url("http://localhost:1234/v1/chat/completions");

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 800);
        assert!((config.temperature - 2.0).abs() < f64::EPSILON);
        assert!(config.base_url.is_some());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig::new("sk-secret", "gpt-4o");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("has_api_key: true"));
    }
}
