//! Tale Graph - Facebook Graph API client.
//!
//! [`GraphClient`] implements [`tale_core::Platform`]: it reads posts,
//! comments and comment threads and publishes comments and page posts with a
//! page access token.
//!
//! Objects that no longer exist (HTTP 404 or Graph error code 100) are
//! reported as `Ok(None)`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod client;
mod error;
mod model;

pub use client::{DEFAULT_API_VERSION, DEFAULT_GRAPH_URL, GraphClient, GraphConfig};
pub use error::{GraphError, GraphResult};
