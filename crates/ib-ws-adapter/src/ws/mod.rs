/*
[INPUT]:  WebSocket configuration, startup commands and handlers
[OUTPUT]: Command dispatch to the gateway and inbound frame delivery
[POS]:    WebSocket layer - gateway connection
[UPDATE]: When changing connection logic or handler contracts
*/

pub mod client;
pub mod message;

pub use client::{ConnectionClient, ConnectionState, ErrorHandler, MessageHandler, OpenHandler};
pub use message::InboundFrame;
