#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for the Tale relay.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tale_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("Serving page {}", resolved.config.facebook.page_id);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Config file**: `--config <path>`, else `./tale.toml`, else
//!    `~/.tale/config.toml`
//! 2. **Environment variables** (`FACEBOOK_*`, `OPENAI_KEY`, `TALE_*`),
//!    fallback only
//! 3. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other tale crates. Conversion to the
//! runtime types happens in the binary.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with source tracking.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadOptions, ResolvedConfig};
pub use merge::ConfigLayer;
pub use types::*;
pub use validate::Purpose;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit)
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Check that the secrets needed for `purpose` are present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] naming the first absent secret.
    pub fn require_credentials(&self, purpose: Purpose) -> ConfigResult<()> {
        validate::require_credentials(self, purpose)
    }
}
