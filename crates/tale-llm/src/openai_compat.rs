//! OpenAI-compatible LLM provider implementation.
//!
//! Works with:
//! - `OpenAI` API
//! - LM Studio (localhost:1234)
//! - vLLM
//! - Ollama (with `OpenAI` compatibility)
//! - Any `OpenAI`-compatible endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{LlmError, LlmResult};
use crate::provider::{LlmProvider, ProviderConfig};
use crate::types::{LlmResponse, Message, MessageRole, StopReason, Usage};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    client: Client,
    model: String,
    max_tokens: usize,
    temperature: f64,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatProvider {
    /// Create a new provider for `OpenAI`.
    #[must_use]
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self::custom(DEFAULT_OPENAI_URL, Some(api_key), model)
    }

    /// Create a custom provider pointed at any compatible endpoint.
    #[must_use]
    pub fn custom(base_url: &str, api_key: Option<&str>, model: &str) -> Self {
        let defaults = ProviderConfig::default();
        Self {
            client: Client::new(),
            model: model.to_string(),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            base_url: base_url.to_string(),
            api_key: api_key.map(ToString::to_string),
        }
    }

    /// Build a provider from a [`ProviderConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] if the HTTP client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        let api_key = (!config.api_key.is_empty()).then(|| config.api_key.clone());

        Ok(Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
            api_key,
        })
    }

    /// Set max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the request body.
    fn build_request(&self, messages: &[Message], system: &str) -> Value {
        let mut openai_messages = Vec::with_capacity(messages.len().saturating_add(1));

        if !system.is_empty() {
            openai_messages.push(serde_json::json!({
                "role": "system",
                "content": system
            }));
        }

        for msg in messages {
            openai_messages.push(convert_message(msg));
        }

        serde_json::json!({
            "model": self.model,
            "messages": openai_messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": false
        })
    }
}

fn convert_message(msg: &Message) -> Value {
    serde_json::json!({
        "role": msg.role.as_str(),
        "content": msg.content
    })
}

/// Map a decoded response body to our response type.
fn into_llm_response(response: OpenAiResponse, model: &str) -> LlmResult<LlmResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

    let text = choice.message.content.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(LlmError::EmptyCompletion {
            model: model.to_string(),
        });
    }

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    };

    let usage = response.usage.map_or_else(Usage::default, |u| Usage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    Ok(LlmResponse {
        message: Message {
            role: MessageRole::Assistant,
            content: text,
        },
        stop_reason,
        usage,
    })
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "openai-compat"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message], system: &str) -> LlmResult<LlmResponse> {
        // Remote endpoints require an API key; local endpoints (LM Studio,
        // Ollama, vLLM) typically do not.
        if self.api_key.as_ref().is_none_or(String::is_empty) && !is_local_url(&self.base_url) {
            return Err(LlmError::ApiKeyNotConfigured {
                provider: "openai-compat".to_string(),
            });
        }

        let request_body = self.build_request(messages, system);

        debug!(
            model = %self.model,
            base_url = %self.base_url,
            messages = messages.len(),
            "Making OpenAI-compatible completion request"
        );

        let mut request = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/json");

        if let Some(ref api_key) = self.api_key {
            let mut auth_value = reqwest::header::HeaderValue::try_from(format!(
                "Bearer {api_key}"
            ))
            .map_err(|e| LlmError::ApiRequestFailed(format!("Invalid API key characters: {e}")))?;
            auth_value.set_sensitive(true);
            request = request.header("Authorization", auth_value);
        }

        let response = request
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "OpenAI API error");
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimitExceeded(body));
            }
            let status_code = status.as_u16();
            return Err(LlmError::InvalidResponse(format!(
                "HTTP {status_code}: {body}"
            )));
        }

        let response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        into_llm_response(response, &self.model)
    }
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

/// Check whether a URL points to a local endpoint (localhost, 127.0.0.1, etc.)
/// where an API key is typically not required.
fn is_local_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("localhost") || lower.contains("127.0.0.1") || lower.contains("[::1]")
}
