/*
[INPUT]:  Raw WebSocket frames from the gateway
[OUTPUT]: Opaque inbound payloads stamped with their arrival time
[POS]:    WebSocket layer - inbound frame representation
[UPDATE]: When changing what handlers receive per frame
*/

use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message as WsMessage;

const RAW_LOG_MAX_BYTES: usize = 1024;

/// One inbound frame, passed to the message handler unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    pub payload: String,
    pub received_at: Instant,
}

impl InboundFrame {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            received_at: Instant::now(),
        }
    }

    /// Time elapsed since the frame arrived.
    pub fn age(&self) -> std::time::Duration {
        self.received_at.elapsed()
    }
}

/// Outcome of reading one WebSocket message.
#[derive(Debug)]
pub(crate) enum Incoming {
    Frame(InboundFrame),
    Close,
    Skip,
}

pub(crate) fn classify(message: WsMessage) -> Incoming {
    match message {
        WsMessage::Text(text) => Incoming::Frame(InboundFrame::new(text.to_string())),
        WsMessage::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Incoming::Frame(InboundFrame::new(text)),
            Err(_) => {
                tracing::warn!(bytes = bytes.len(), "ws binary frame is not utf-8; skipped");
                Incoming::Skip
            }
        },
        WsMessage::Close(_) => Incoming::Close,
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => Incoming::Skip,
    }
}

pub(crate) fn truncate_for_log(value: &str) -> String {
    if value.len() <= RAW_LOG_MAX_BYTES {
        return value.to_string();
    }
    let mut end = RAW_LOG_MAX_BYTES;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}
