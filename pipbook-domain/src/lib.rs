//! Pipbook Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains the trade entity, value objects, and the instrument pip table.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
#[allow(missing_docs)]
pub mod entities;
pub mod instrument;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{NewTrade, Trade, TradeId, TradeStatus, TradeUpdate, UserId};
pub use instrument::{InstrumentSpec, PipTable, STANDARD_CONTRACT_SIZE, STANDARD_LOT_PIP_VALUE};
pub use value_objects::{Direction, DomainError, Pair, Price, Quantity};
