//! Config file discovery and layered loading.
//!
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge one config file: the explicit `--config` path, else
//!    `./tale.toml`, else `~/.tale/config.toml`
//! 3. Apply env var fallbacks for fields the file did not set
//! 4. Deserialize and validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Name of the config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tale.toml";

/// A loaded configuration with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final configuration.
    pub config: Config,
    /// Which layer set each field.
    pub field_sources: FieldSources,
    /// Config file that was merged, if any.
    pub loaded_file: Option<PathBuf>,
}

/// Where [`load_from`] looks for files and env vars.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config path; must exist when given.
    pub explicit: Option<PathBuf>,
    /// Directory searched for `tale.toml`.
    pub working_dir: Option<PathBuf>,
    /// Home directory searched for `.tale/config.toml`.
    pub home_dir: Option<PathBuf>,
}

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a config file is unreadable or malformed, or
/// if the merged configuration fails validation.
pub fn load(explicit: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let home_dir = directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)?;
    let options = LoadOptions {
        explicit: explicit.map(Path::to_path_buf),
        working_dir: std::env::current_dir().ok(),
        home_dir: Some(home_dir),
    };
    load_from(&options, &collect_env_vars())
}

/// Load configuration with explicit search locations and env vars.
///
/// # Errors
///
/// See [`load`].
pub fn load_from<S: ::std::hash::BuildHasher>(
    options: &LoadOptions,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut field_sources = FieldSources::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    // 2. Config file.
    let loaded_file = match &options.explicit {
        Some(path) => {
            let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
                path: path.display().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?;
            Some((overlay, path.clone()))
        },
        None => discover(options)?,
    };

    let loaded_file = loaded_file.map(|(overlay, path)| {
        let layer = ConfigLayer::File(path.display().to_string());
        deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
        info!(path = %path.display(), "loaded config file");
        path
    });

    // 3. Env var fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 4. Deserialize and validate.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_file,
    })
}

fn discover(options: &LoadOptions) -> ConfigResult<Option<(toml::Value, PathBuf)>> {
    let candidates = [
        options.working_dir.as_ref().map(|d| d.join(LOCAL_CONFIG_FILE)),
        options
            .home_dir
            .as_ref()
            .map(|h| h.join(".tale").join("config.toml")),
    ];
    for path in candidates.into_iter().flatten() {
        if let Some(overlay) = try_load_file(&path)? {
            return Ok(Some((overlay, path)));
        }
    }
    Ok(None)
}

/// Load a config from a specific file path (no layering, no env).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}
