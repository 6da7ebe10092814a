use std::io;
use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// Path to the config file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse config file at {path}: {source}")]
    ParseError {
        /// Path to the config file that failed to parse.
        path: String,
        /// Underlying TOML parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation.
        field: String,
        /// Validation failure description.
        message: String,
    },

    /// A required setting is absent from every layer.
    #[error("Missing required setting '{field}' (set it in the config file or via {env_hint})")]
    MissingSetting {
        /// Dotted field path.
        field: String,
        /// Environment variable that can supply it.
        env_hint: String,
    },

    /// Could not determine home directory.
    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_names_env_var() {
        let err = ConfigError::MissingSetting {
            field: "facebook.app_secret".to_owned(),
            env_hint: "FACEBOOK_APP_SECRET".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("facebook.app_secret"));
        assert!(msg.contains("FACEBOOK_APP_SECRET"));
    }
}
