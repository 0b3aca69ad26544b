//! Core data types for the order book.
//!
//! ## Types
//!
//! - [`Order`]: an order held by the engine
//! - [`OrderRequest`]: trading intent submitted by a caller
//! - [`Side`] / [`OrderKind`]: bid or ask, limit or market
//! - [`Match`]: a fill between a maker and a taker
//! - [`Execution`]: everything a single submission produced
//!
//! ## Fixed-Point Arithmetic
//!
//! Prices are `u64` tick counts and sizes are `u64` lots. See [`price`].

mod order;
mod execution;
pub mod price;

pub use order::{Order, OrderId, OrderKind, OrderRequest, Side, ANONYMOUS};
pub use execution::{Execution, Match, OrderStatus};
pub use price::PriceScale;
