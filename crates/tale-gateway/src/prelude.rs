//! Common re-exports.

pub use crate::{Gateway, GatewayError, GatewayResult, GatewaySettings};
