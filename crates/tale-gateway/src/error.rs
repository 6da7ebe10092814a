//! Error types for the gateway.

use std::net::SocketAddr;

use thiserror::Error;

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    /// Invalid gateway settings.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
