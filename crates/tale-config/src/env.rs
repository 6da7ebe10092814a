//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they are only applied to fields
//! that no config file set.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
pub(crate) struct EnvMapping {
    pub(crate) var_name: &'static str,
    pub(crate) field_path: &'static str,
}

/// Supported env vars, in priority order: the first var found for a field
/// wins.
pub(crate) const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "FACEBOOK_PAGE_ID",
        field_path: "facebook.page_id",
    },
    EnvMapping {
        var_name: "FACEBOOK_ACCESS_TOKEN",
        field_path: "facebook.access_token",
    },
    EnvMapping {
        var_name: "FACEBOOK_APP_SECRET",
        field_path: "facebook.app_secret",
    },
    EnvMapping {
        var_name: "FACEBOOK_WEBHOOK_VERIFICATION_TOKEN",
        field_path: "facebook.verify_token",
    },
    EnvMapping {
        var_name: "TALE_TRIGGER_TOKEN",
        field_path: "facebook.trigger_token",
    },
    EnvMapping {
        var_name: "OPENAI_KEY",
        field_path: "model.api_key",
    },
    // Standard OpenAI SDK env var.
    EnvMapping {
        var_name: "OPENAI_API_KEY",
        field_path: "model.api_key",
    },
    EnvMapping {
        var_name: "TALE_MODEL",
        field_path: "model.model",
    },
    EnvMapping {
        var_name: "TALE_MODEL_API_URL",
        field_path: "model.api_url",
    },
    EnvMapping {
        var_name: "TALE_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "TALE_PORT",
        field_path: "server.port",
    },
];

/// Env var that can supply `field_path`, for error messages.
#[must_use]
pub fn env_hint(field_path: &str) -> &'static str {
    ENV_MAPPINGS
        .iter()
        .find(|m| m.field_path == field_path)
        .map_or("a config file", |m| m.var_name)
}

/// Apply environment variable fallbacks to fields that were not set by a
/// config file.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults)
        {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name).filter(|v| !v.is_empty()) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            set_field_from_string(merged, mapping.field_path, val);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Set a dotted `section.key` field in the TOML tree from a string value.
fn set_field_from_string(root: &mut toml::Value, path: &str, val: &str) {
    let Some((section, key)) = path.split_once('.') else {
        return;
    };
    let toml_val = coerce_to_toml_value(path, val);

    if let Some(root) = root.as_table_mut() {
        let table = root
            .entry(section.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        if let Some(table) = table.as_table_mut() {
            table.insert(key.to_owned(), toml_val);
        }
    }
}

/// Coerce a string env var value to the TOML type of the field.
fn coerce_to_toml_value(path: &str, val: &str) -> toml::Value {
    if matches!(path, "server.port" | "model.max_tokens")
        && let Ok(i) = val.trim().parse::<i64>()
    {
        return toml::Value::Integer(i);
    }

    toml::Value::String(val.to_owned())
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
