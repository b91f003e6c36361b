/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public gateway WebSocket adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod config;
pub mod error;
pub mod types;
pub mod ws;

pub use config::ClientConfig;
pub use error::{ClientError, Result, TransportError};

// Re-export all types
pub use types::*;

pub use ws::{ConnectionClient, ConnectionState, InboundFrame};
