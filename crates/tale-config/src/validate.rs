//! Post-merge configuration validation.
//!
//! [`validate`] checks ranges and enumerations and runs on every load.
//! [`require_credentials`] checks that the secrets a command needs are
//! present; it runs only when a command is about to use them.

use crate::env::env_hint;
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound for `model.max_tokens`.
const MAX_TOKENS_UPPER_BOUND: usize = 128_000;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_facebook(config)?;
    validate_model(config)?;
    validate_story(config)?;
    validate_server(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_facebook(config: &Config) -> ConfigResult<()> {
    let fb = &config.facebook;

    if !(fb.graph_url.starts_with("http://") || fb.graph_url.starts_with("https://")) {
        return Err(invalid(
            "facebook.graph_url",
            format!("'{}' is not an http(s) URL", fb.graph_url),
        ));
    }

    if fb.timeout_secs == 0 {
        return Err(invalid("facebook.timeout_secs", "timeout must be at least 1 second"));
    }

    Ok(())
}

fn validate_model(config: &Config) -> ConfigResult<()> {
    let m = &config.model;

    if !matches!(m.provider.as_str(), "openai" | "openai-compat") {
        return Err(invalid(
            "model.provider",
            format!(
                "unsupported provider '{}'; expected one of: openai, openai-compat",
                m.provider
            ),
        ));
    }

    if m.provider == "openai-compat" && m.api_url.as_deref().is_none_or(str::is_empty) {
        return Err(invalid(
            "model.api_url",
            "openai-compat provider requires an api_url",
        ));
    }

    if m.model.trim().is_empty() {
        return Err(invalid("model.model", "model name must not be empty"));
    }

    if !(0.0..=2.0).contains(&m.temperature) {
        return Err(invalid(
            "model.temperature",
            format!(
                "temperature {} is out of range; must be between 0.0 and 2.0",
                m.temperature
            ),
        ));
    }

    if m.max_tokens == 0 || m.max_tokens > MAX_TOKENS_UPPER_BOUND {
        return Err(invalid(
            "model.max_tokens",
            format!("max_tokens must be between 1 and {MAX_TOKENS_UPPER_BOUND}"),
        ));
    }

    if m.timeout_secs == 0 {
        return Err(invalid("model.timeout_secs", "timeout must be at least 1 second"));
    }

    Ok(())
}

fn validate_story(config: &Config) -> ConfigResult<()> {
    let s = &config.story;

    if !matches!(s.move_policy.to_lowercase().as_str(), "strict" | "lenient") {
        return Err(invalid(
            "story.move_policy",
            format!(
                "unknown move policy '{}'; expected strict or lenient",
                s.move_policy
            ),
        ));
    }

    if s.seed_prompt.trim().is_empty() {
        return Err(invalid("story.seed_prompt", "seed prompt must not be empty"));
    }

    Ok(())
}

fn validate_server(config: &Config) -> ConfigResult<()> {
    if config.server.bind.trim().is_empty() {
        return Err(invalid("server.bind", "bind address must not be empty"));
    }
    if config.server.port == 0 {
        return Err(invalid("server.port", "port must be non-zero"));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !matches!(
        l.level.to_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "invalid log level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        ));
    }

    if !matches!(
        l.format.to_lowercase().as_str(),
        "pretty" | "compact" | "json" | "full"
    ) {
        return Err(invalid(
            "logging.format",
            format!(
                "invalid log format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        ));
    }

    Ok(())
}

/// Which command the credentials are checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Running the webhook server.
    Serve,
    /// Publishing a new story once.
    StartStory,
}

/// Check that every secret `purpose` needs is set.
///
/// # Errors
///
/// Returns [`ConfigError::MissingSetting`] for the first absent secret.
pub fn require_credentials(config: &Config, purpose: Purpose) -> ConfigResult<()> {
    let fb = &config.facebook;
    let mut required: Vec<(&str, &str)> = vec![
        ("facebook.page_id", fb.page_id.as_str()),
        ("facebook.access_token", fb.access_token.as_str()),
    ];
    if purpose == Purpose::Serve {
        required.push(("facebook.app_secret", fb.app_secret.as_str()));
        required.push(("facebook.verify_token", fb.verify_token.as_str()));
    }
    if config.model.provider == "openai" {
        required.push((
            "model.api_key",
            config.model.api_key.as_deref().unwrap_or_default(),
        ));
    }

    match required.into_iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(ConfigError::MissingSetting {
            field: field.to_owned(),
            env_hint: env_hint(field).to_owned(),
        }),
        None => Ok(()),
    }
}
