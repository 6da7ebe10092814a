//! Tale Telemetry - logging setup and request correlation for the Tale relay.
//!
//! # Example
//!
//! ```rust,no_run
//! use tale_telemetry::{LogConfig, LogFormat, RequestContext, setup_logging};
//!
//! # fn main() -> Result<(), tale_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("tale_core=debug");
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new("webhook").with_operation("notification");
//! let _guard = ctx.span().entered();
//! tracing::info!("Delivery received");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::RequestContext;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
