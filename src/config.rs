//! Engine configuration.
//!
//! Every field has a default, so a partial document is enough:
//!
//! ```
//! use limit_book::config::{EngineConfig, SelfTradePolicy};
//!
//! let config: EngineConfig =
//!     serde_json::from_str(r#"{ "self_trade_policy": "cancel_resting" }"#).unwrap();
//! assert_eq!(config.self_trade_policy, SelfTradePolicy::CancelResting);
//! assert_eq!(config.order_capacity, 10_000);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BookError, Result};
use crate::types::price::{PriceScale, DEFAULT_TICK};

/// What to do when a taker would fill against a resting order of the same owner.
///
/// Only orders with a non-anonymous owner are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTradePolicy {
    /// Match as if the owners differed
    #[default]
    Allow,
    /// Cancel the resting order and keep matching
    CancelResting,
    /// Stop matching and drop the taker's remainder
    CancelTaker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Orders to pre-allocate in the slab and id index
    pub order_capacity: usize,

    /// Value of one price tick (display and parsing only)
    pub tick_size: Decimal,

    pub self_trade_policy: SelfTradePolicy,

    /// Run the full book audit after every mutation
    pub audit_invariants: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_capacity: 10_000,
            tick_size: DEFAULT_TICK,
            self_trade_policy: SelfTradePolicy::default(),
            audit_invariants: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.order_capacity == 0 {
            return Err(BookError::InvalidConfig("order_capacity must be positive".into()));
        }
        self.price_scale().map(|_| ())
    }

    pub fn price_scale(&self) -> Result<PriceScale> {
        PriceScale::new(self.tick_size).ok_or_else(|| {
            BookError::InvalidConfig(format!("tick_size must be positive, got {}", self.tick_size))
        })
    }
}
