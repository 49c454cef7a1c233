//! Pipbook Storage Layer
//!
//! Provides persistence for journal trades.
//!
//! # Architecture
//!
//! - **Repository trait**: Defines the storage interface (port)
//! - **In-memory store**: Implementation used by the daemon and tests
//!
//! # Usage
//!
//! ```rust
//! use pipbook_store::{MemoryStore, TradeFilter, TradeRepository};
//! use pipbook_domain::{Direction, NewTrade, Pair, Price, Quantity, Trade};
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!
//!     let trade = Trade::open("demo_user", NewTrade {
//!         pair: Pair::parse("EUR/USD").unwrap(),
//!         entry_price: Price::new(dec!(1.0850)).unwrap(),
//!         lot_size: Quantity::new(dec!(0.4)).unwrap(),
//!         direction: Direction::Long,
//!         stop_loss: None,
//!         take_profit: None,
//!         exit_price: None,
//!         tags: vec![],
//!         notes: None,
//!     });
//!     store.insert(&trade).await.unwrap();
//!
//!     let trades = store.find(&TradeFilter::for_user("demo_user")).await.unwrap();
//!     println!("Trades: {}", trades.len());
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
mod repository;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
pub use repository::{TradeFilter, TradeRepository, DEFAULT_TRADE_LIMIT};
