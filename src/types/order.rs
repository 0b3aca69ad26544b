//! Order types for the matching engine.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so the audit trail can record
//! resting orders with a fixed, deterministic byte layout. Enums are stored as
//! raw `u8` fields for SSZ compatibility.
//!
//! ## Fixed-Point Representation
//!
//! Prices are `u64` counts of the instrument's tick, sizes are `u64` lots.
//! Conversion to human units lives in [`crate::types::price`].

use std::fmt;

use ssz_rs::prelude::*;

use crate::error::{BookError, Result as BookResult};

/// Engine-assigned order identifier, also the handle used for cancellation.
pub type OrderId = u64;

/// Owner value for orders that do not take part in self-trade prevention.
pub const ANONYMOUS: u64 = 0;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy (bid) or Sell (ask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("bid"),
            Side::Sell => f.write_str("ask"),
        }
    }
}

// ============================================================================
// OrderKind enum
// ============================================================================

/// How an order treats its price.
///
/// A `Market` order has no limit: it crosses every opposing level and never
/// rests. Whatever it cannot fill is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderKind {
    #[default]
    Limit,
    Market,
}

impl OrderKind {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            OrderKind::Limit => 0,
            OrderKind::Market => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderKind::Limit),
            1 => Some(OrderKind::Market),
            _ => None,
        }
    }
}

// ============================================================================
// OrderRequest
// ============================================================================

/// An incoming order before the engine has accepted it.
///
/// Ids and arrival sequence numbers are assigned by the engine, so a request
/// carries only trading intent.
///
/// ```
/// use limit_book::types::{OrderRequest, Side};
///
/// let request = OrderRequest::limit(Side::Buy, 100, 5).with_owner(9);
/// assert!(request.validate().is_ok());
/// assert!(OrderRequest::limit(Side::Buy, 0, 5).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    /// Owning account, or [`ANONYMOUS`]
    pub owner: u64,
    pub side: Side,
    pub kind: OrderKind,
    /// Limit price in ticks; ignored for market orders
    pub price: u64,
    pub size: u64,
}

impl OrderRequest {
    /// A limit order at `price` ticks for `size` lots
    pub fn limit(side: Side, price: u64, size: u64) -> Self {
        Self {
            owner: ANONYMOUS,
            side,
            kind: OrderKind::Limit,
            price,
            size,
        }
    }

    /// A market order for `size` lots
    pub fn market(side: Side, size: u64) -> Self {
        Self {
            owner: ANONYMOUS,
            side,
            kind: OrderKind::Market,
            price: 0,
            size,
        }
    }

    /// Attach an owner for self-trade prevention
    pub fn with_owner(mut self, owner: u64) -> Self {
        self.owner = owner;
        self
    }

    /// Reject non-positive sizes and (for limit orders) non-positive prices.
    pub fn validate(&self) -> BookResult<()> {
        if self.size == 0 {
            return Err(BookError::InvalidOrder {
                reason: "size must be positive",
            });
        }
        if self.kind == OrderKind::Limit && self.price == 0 {
            return Err(BookError::InvalidOrder {
                reason: "price must be positive",
            });
        }
        Ok(())
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// An order as held by the engine.
///
/// ## SSZ Layout
///
/// Fixed-size container of 6 `u64` and 2 `u8` fields: 50 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier (assigned by the engine)
    pub id: u64,

    /// Owning account, 0 when anonymous
    pub owner: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Order kind as u8 (0=Limit, 1=Market)
    pub kind_raw: u8,

    /// Limit price in ticks (0 for market orders)
    pub price: u64,

    /// Original size
    pub quantity: u64,

    /// Unfilled size, strictly decreasing with every fill
    pub remaining: u64,

    /// Arrival sequence number, the time-priority tie breaker
    pub sequence: u64,
}

impl Order {
    /// Create an order from an accepted request.
    pub fn new(id: OrderId, request: &OrderRequest, sequence: u64) -> Self {
        Self {
            id,
            owner: request.owner,
            side_raw: request.side.to_u8(),
            kind_raw: request.kind.to_u8(),
            price: request.price,
            quantity: request.size,
            remaining: request.size,
            sequence,
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or_default()
    }

    /// Get the order kind
    pub fn kind(&self) -> OrderKind {
        OrderKind::from_u8(self.kind_raw).unwrap_or_default()
    }

    /// The limit price, or `None` for a market order
    pub fn limit_price(&self) -> Option<u64> {
        match self.kind() {
            OrderKind::Limit => Some(self.price),
            OrderKind::Market => None,
        }
    }

    /// Owner for self-trade checks, `None` when anonymous
    pub fn owner(&self) -> Option<u64> {
        (self.owner != ANONYMOUS).then_some(self.owner)
    }

    /// Check if the order is fully filled
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    /// Get the filled quantity
    pub fn filled_quantity(&self) -> u64 {
        self.quantity.saturating_sub(self.remaining)
    }

    /// Fill a portion of this order
    ///
    /// # Returns
    ///
    /// The actual quantity filled (capped at the remaining size)
    pub fn fill(&mut self, fill_qty: u64) -> u64 {
        let actual_fill = fill_qty.min(self.remaining);
        self.remaining -= actual_fill;
        actual_fill
    }

    /// SSZ encoding for the audit trail
    pub fn encode(&self) -> BookResult<Vec<u8>> {
        ssz_rs::serialize(self).map_err(|err| BookError::Encoding(format!("{err:?}")))
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            OrderKind::Limit => write!(
                f,
                "[#{} {} {}@{}]",
                self.id,
                self.side(),
                self.remaining,
                self.price
            ),
            OrderKind::Market => write!(f, "[#{} {} {}@market]", self.id, self.side(), self.remaining),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
