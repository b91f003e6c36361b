/*
[INPUT]:  Gateway command vocabulary
[OUTPUT]: Typed command values with serde support
[POS]:    Data layer - command types module root
[UPDATE]: When adding new command types
*/

pub mod commands;
pub mod enums;

pub use commands::{Command, PlaceOrder, PlaceOrderError};
pub use enums::{CommandCode, Op, OrderKind};
