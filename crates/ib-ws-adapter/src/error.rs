/*
[INPUT]:  Error sources (URL parsing, serialization, WebSocket transport, client misuse)
[OUTPUT]: Structured error types for synchronous calls and asynchronous transport failures
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors returned directly from [`crate::ConnectionClient`] calls.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Target address could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Target address is not a WebSocket URL
    #[error("Unsupported URL scheme '{0}', expected ws or wss")]
    UnsupportedScheme(String),

    /// Command could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `connect` was called more than once
    #[error("Client already connected")]
    AlreadyConnected,

    /// Connection is closed; nothing more can be sent
    #[error("Connection closed")]
    Closed,
}

/// Failure reported by the underlying connection.
///
/// Delivered through the error handler only, never returned from `send`.
/// Terminal for the connection instance that raised it.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("WebSocket connect to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("WebSocket receive failed: {0}")]
    Receive(#[source] tungstenite::Error),

    #[error("WebSocket send failed: {0}")]
    Send(#[source] tungstenite::Error),
}

impl TransportError {
    /// True if the connection never reached the open state.
    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Connect { .. })
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
