/*
[INPUT]:  Caller-built order, status, cancel and account requests
[OUTPUT]: Immutable command values with JSON text encoding
[POS]:    Data layer - outbound frame payloads
[UPDATE]: When the gateway command vocabulary changes
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enums::{CommandCode, Op, OrderKind};

/// One outbound instruction for the order gateway.
///
/// Encoded as a flat JSON object whose first field is `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum Command {
    #[serde(rename = "PLACE-ORDER")]
    PlaceOrder(PlaceOrder),
    #[serde(rename = "ORDER-STATUS-REQUEST")]
    OrderStatusRequest { oid: u64 },
    #[serde(rename = "CANCEL-ORDER-REQUEST")]
    CancelOrderRequest { oid: u64 },
    #[serde(rename = "ACCOUNT-INFO-REQUEST")]
    AccountInfoRequest { account: String },
}

impl Command {
    pub fn order_status(oid: u64) -> Self {
        Command::OrderStatusRequest { oid }
    }

    pub fn cancel_order(oid: u64) -> Self {
        Command::CancelOrderRequest { oid }
    }

    pub fn account_info(account: impl Into<String>) -> Self {
        Command::AccountInfoRequest {
            account: account.into(),
        }
    }

    pub fn code(&self) -> CommandCode {
        match self {
            Command::PlaceOrder(_) => CommandCode::PlaceOrder,
            Command::OrderStatusRequest { .. } => CommandCode::OrderStatusRequest,
            Command::CancelOrderRequest { .. } => CommandCode::CancelOrderRequest,
            Command::AccountInfoRequest { .. } => CommandCode::AccountInfoRequest,
        }
    }

    /// Encode as a single JSON text frame.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_frame(frame: &str) -> serde_json::Result<Self> {
        serde_json::from_str(frame)
    }
}

impl From<PlaceOrder> for Command {
    fn from(order: PlaceOrder) -> Self {
        Command::PlaceOrder(order)
    }
}

/// `PLACE-ORDER` payload.
///
/// Build through [`PlaceOrder::market`] or [`PlaceOrder::limit`] so that
/// `price` is present exactly when `order_type` is `LMT`. Decoding enforces
/// the same rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlaceOrder")]
pub struct PlaceOrder {
    account: String,
    op: Op,
    symbol: String,
    qty: u64,
    order_type: OrderKind,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<Decimal>,
    /// Client order id echoed back by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    cid: Option<String>,
}

/// `PLACE-ORDER` fields as they appear on the wire, before validation.
#[derive(Deserialize)]
struct RawPlaceOrder {
    account: String,
    op: Op,
    symbol: String,
    qty: u64,
    order_type: OrderKind,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    price: Option<Decimal>,
    #[serde(default)]
    cid: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceOrderError {
    #[error("LMT order requires a price")]
    LimitWithoutPrice,
    #[error("MKT order must not carry a price")]
    MarketWithPrice,
}

impl TryFrom<RawPlaceOrder> for PlaceOrder {
    type Error = PlaceOrderError;

    fn try_from(raw: RawPlaceOrder) -> Result<Self, Self::Error> {
        let order = match (raw.order_type, raw.price) {
            (OrderKind::Market, None) => Self::market(raw.account, raw.op, raw.symbol, raw.qty),
            (OrderKind::Limit, Some(price)) => {
                Self::limit(raw.account, raw.op, raw.symbol, raw.qty, price)
            }
            (OrderKind::Limit, None) => return Err(PlaceOrderError::LimitWithoutPrice),
            (OrderKind::Market, Some(_)) => return Err(PlaceOrderError::MarketWithPrice),
        };

        Ok(match raw.cid {
            Some(cid) => order.with_cid(cid),
            None => order,
        })
    }
}

impl PlaceOrder {
    pub fn market(account: impl Into<String>, op: Op, symbol: impl Into<String>, qty: u64) -> Self {
        Self {
            account: account.into(),
            op,
            symbol: symbol.into(),
            qty,
            order_type: OrderKind::Market,
            price: None,
            cid: None,
        }
    }

    pub fn limit(
        account: impl Into<String>,
        op: Op,
        symbol: impl Into<String>,
        qty: u64,
        price: Decimal,
    ) -> Self {
        Self {
            account: account.into(),
            op,
            symbol: symbol.into(),
            qty,
            order_type: OrderKind::Limit,
            price: Some(price),
            cid: None,
        }
    }

    pub fn with_cid(mut self, cid: impl Into<String>) -> Self {
        self.cid = Some(cid.into());
        self
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn qty(&self) -> u64 {
        self.qty
    }

    pub fn order_type(&self) -> OrderKind {
        self.order_type
    }

    /// Set exactly when `order_type` is `LMT`.
    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }
}
