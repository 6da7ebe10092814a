//! Tale Gateway - the webhook HTTP server.
//!
//! Routes:
//!
//! - `GET /webhook`: subscription handshake, echoes `hub.challenge`.
//! - `POST /webhook`: signed page notifications.
//! - `POST /trigger`: scheduled story start, authenticated with
//!   `X-Tale-Trigger-Token`.
//! - `GET /health`: liveness.
//!
//! Notifications are verified and routed synchronously, then every action
//! runs on its own task after the response is sent.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tale_core::{Engine, EventRouter, RouterSettings};
//! use tale_gateway::{Gateway, GatewaySettings};
//!
//! # async fn example(engine: Arc<Engine>) -> Result<(), tale_gateway::GatewayError> {
//! let gateway = Gateway::new(
//!     EventRouter::new(RouterSettings::new("verify-token")),
//!     engine,
//!     GatewaySettings::new("app-secret").with_dedup_window(Duration::from_secs(600)),
//! );
//! gateway
//!     .serve("0.0.0.0:8080".parse().unwrap(), async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;
pub mod signature;

mod dedup;
mod error;
mod server;
mod tracker;

pub use dedup::{DeliveryDedup, delivery_key};
pub use error::{GatewayError, GatewayResult};
pub use server::{Gateway, GatewaySettings, TRIGGER_TOKEN_HEADER};
pub use signature::SIGNATURE_HEADER;
