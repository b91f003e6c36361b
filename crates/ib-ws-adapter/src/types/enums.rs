/*
[INPUT]:  Gateway command vocabulary and serde requirements
[OUTPUT]: Typed Rust enums with wire spellings
[POS]:    Data layer - enum definitions for gateway commands
[UPDATE]: When the gateway adds order sides, order types or command codes
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Op {
    Buy,
    Sell,
}

/// Order type as the gateway spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    #[serde(rename = "MKT")]
    Market,
    #[serde(rename = "LMT")]
    Limit,
}

/// The `code` discriminator carried by every outbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    PlaceOrder,
    OrderStatusRequest,
    CancelOrderRequest,
    AccountInfoRequest,
}

impl CommandCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandCode::PlaceOrder => "PLACE-ORDER",
            CommandCode::OrderStatusRequest => "ORDER-STATUS-REQUEST",
            CommandCode::CancelOrderRequest => "CANCEL-ORDER-REQUEST",
            CommandCode::AccountInfoRequest => "ACCOUNT-INFO-REQUEST",
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
