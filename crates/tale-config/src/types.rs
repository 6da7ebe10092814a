//! Configuration types for the Tale relay.
//!
//! These types have no dependency on other tale crates; conversion to the
//! runtime types happens where the binary wires things together. Every
//! struct implements [`Default`] matching `defaults.toml`, so a bare
//! `[section]` header produces a working section.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page credentials and Graph API endpoint.
    pub facebook: FacebookSection,
    /// Language model selection.
    pub model: ModelSection,
    /// Story behaviour.
    pub story: StorySection,
    /// Webhook server.
    pub server: ServerSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// FacebookSection
// ---------------------------------------------------------------------------

/// Page identity and credentials.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct FacebookSection {
    /// Page id. Comments from this account are the storyteller's.
    pub page_id: String,
    /// Page access token.
    pub access_token: String,
    /// App secret used to verify webhook signatures.
    pub app_secret: String,
    /// Token expected in the webhook subscription handshake.
    pub verify_token: String,
    /// Token expected on `/trigger`. Falls back to `verify_token`.
    pub trigger_token: Option<String>,
    /// Graph API host.
    pub graph_url: String,
    /// Graph API version.
    pub api_version: String,
    /// Graph request timeout.
    pub timeout_secs: u64,
}

impl FacebookSection {
    /// Token the scheduled trigger must present.
    #[must_use]
    pub fn effective_trigger_token(&self) -> &str {
        self.trigger_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.verify_token)
    }
}

impl std::fmt::Debug for FacebookSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacebookSection")
            .field("page_id", &self.page_id)
            .field("has_access_token", &!self.access_token.is_empty())
            .field("has_app_secret", &!self.app_secret.is_empty())
            .field("has_verify_token", &!self.verify_token.is_empty())
            .field("has_trigger_token", &self.trigger_token.is_some())
            .field("graph_url", &self.graph_url)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Serialize for FacebookSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FacebookSection", 4)?;
        state.serialize_field("page_id", &self.page_id)?;
        // Tokens and the app secret are omitted.
        state.serialize_field("graph_url", &self.graph_url)?;
        state.serialize_field("api_version", &self.api_version)?;
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.end()
    }
}

impl Default for FacebookSection {
    fn default() -> Self {
        Self {
            page_id: String::new(),
            access_token: String::new(),
            app_secret: String::new(),
            verify_token: String::new(),
            trigger_token: None,
            graph_url: "https://graph.facebook.com".to_owned(),
            api_version: "v18.0".to_owned(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// ModelSection
// ---------------------------------------------------------------------------

/// Language model provider and sampling settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Provider identifier (`"openai"` or `"openai-compat"`).
    pub provider: String,
    /// Model name sent to the provider API.
    pub model: String,
    /// API key. Prefer environment variables over storing this in a file.
    pub api_key: Option<String>,
    /// Chat completions URL (overrides the provider default).
    pub api_url: Option<String>,
    /// Maximum tokens per completion.
    pub max_tokens: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// System preamble sent ahead of every transcript.
    pub system_prompt: String,
    /// Request timeout.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ModelSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSection")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("has_api_url", &self.api_url.is_some())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Serialize for ModelSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ModelSection", 6)?;
        state.serialize_field("provider", &self.provider)?;
        state.serialize_field("model", &self.model)?;
        // api_key and api_url are omitted.
        state.serialize_field("max_tokens", &self.max_tokens)?;
        state.serialize_field("temperature", &self.temperature)?;
        state.serialize_field("system_prompt", &self.system_prompt)?;
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.end()
    }
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_owned(),
            model: "gpt-3.5-turbo".to_owned(),
            api_key: None,
            api_url: None,
            max_tokens: 500,
            temperature: 1.0,
            system_prompt: "You are an AI trained to write stories in the style of \"choose your own adventure\". You have started a story and prompted the user to make a choice.".to_owned(),
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// StorySection
// ---------------------------------------------------------------------------

/// Story behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySection {
    /// A page status starting with this word opens a story under it.
    pub trigger_keyword: String,
    /// `"lenient"` (first number anywhere) or `"strict"` (number only).
    pub move_policy: String,
    /// Opening prompt for new stories.
    pub seed_prompt: String,
}

impl Default for StorySection {
    fn default() -> Self {
        Self {
            trigger_keyword: "start".to_owned(),
            move_policy: "lenient".to_owned(),
            seed_prompt: "Start a story in the style of \"choose your own adventure\". Prompt me with a numbered list of options for me to choose what happens next.".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerSection
// ---------------------------------------------------------------------------

/// Webhook server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Listen address: an IP address or a host name.
    pub bind: String,
    /// Listen port.
    pub port: u16,
    /// Seconds a processed comment id is remembered. `0` disables.
    pub dedup_window_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_owned(),
            port: 8080,
            dedup_window_secs: 600,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["tale_core=debug", "hyper=warn"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
