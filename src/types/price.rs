//! Tick-based fixed-point prices.
//!
//! The book never sees a decimal price: every price is a `u64` count of the
//! instrument's tick. `PriceScale` converts between ticks and human units at
//! the edges (config, logs, market data) using `rust_decimal`.
//!
//! ```
//! use limit_book::types::price::PriceScale;
//! use rust_decimal::Decimal;
//!
//! let scale = PriceScale::new(Decimal::new(5, 1)).unwrap(); // tick = 0.5
//! assert_eq!(scale.to_ticks("50.5"), Some(101));
//! assert_eq!(scale.to_ticks("50.25"), None); // not on a tick
//! assert_eq!(scale.format(101), "50.5");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Default tick: 0.01
pub const DEFAULT_TICK: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Conversion between tick counts and decimal prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceScale {
    tick_size: Decimal,
}

impl Default for PriceScale {
    fn default() -> Self {
        Self {
            tick_size: DEFAULT_TICK,
        }
    }
}

impl PriceScale {
    /// `None` unless `tick_size` is strictly positive
    pub fn new(tick_size: Decimal) -> Option<Self> {
        (tick_size > Decimal::ZERO).then_some(Self { tick_size })
    }

    #[inline]
    pub fn tick_size(&self) -> Decimal {
        self.tick_size
    }

    /// Parse a decimal string into ticks.
    ///
    /// Returns `None` for unparsable, negative, off-tick or out-of-range values.
    pub fn to_ticks(&self, s: &str) -> Option<u64> {
        let decimal = Decimal::from_str(s).ok()?;
        self.decimal_to_ticks(decimal)
    }

    pub fn decimal_to_ticks(&self, d: Decimal) -> Option<u64> {
        if d.is_sign_negative() {
            return None;
        }
        let ticks = d.checked_div(self.tick_size)?;
        if !ticks.fract().is_zero() {
            return None;
        }
        ticks.to_u64()
    }

    /// Decimal value of `ticks`, saturating at `Decimal::MAX`
    pub fn from_ticks(&self, ticks: u64) -> Decimal {
        Decimal::from(ticks)
            .checked_mul(self.tick_size)
            .unwrap_or(Decimal::MAX)
    }

    /// Human-readable price with trailing zeros trimmed
    pub fn format(&self, ticks: u64) -> String {
        self.from_ticks(ticks).normalize().to_string()
    }
}
