//! Common re-exports.
//!
//! ```
//! use tale_telemetry::prelude::*;
//! ```

pub use crate::{
    LogConfig, LogFormat, LogTarget, RequestContext, TelemetryError,
    TelemetryResult, setup_default_logging, setup_logging,
};
