/*
[INPUT]:  Target address and dispatch options supplied by the caller
[OUTPUT]: Validated connection configuration
[POS]:    Configuration layer - client setup
[UPDATE]: When adding new connection options
*/

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

/// Connection settings for [`crate::ConnectionClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket endpoint (`ws://` or `wss://`)
    pub url: Url,
    /// Delay between a frame's arrival and its handler call.
    /// Zero still defers the call to the dispatcher task.
    pub message_delay: Duration,
}

impl ClientConfig {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(ClientError::UnsupportedScheme(other.to_string())),
        }

        Ok(Self {
            url,
            message_delay: Duration::ZERO,
        })
    }

    pub fn with_message_delay(mut self, delay: Duration) -> Self {
        self.message_delay = delay;
        self
    }
}
