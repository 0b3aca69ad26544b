//! Match records and the per-submission execution report.

use ssz_rs::prelude::*;

use crate::error::{BookError, Result as BookResult};
use crate::types::{OrderId, Side};

/// A single fill between a resting maker and an incoming taker.
///
/// The execution price is always the maker's resting price, so a taker
/// crossing through several levels receives each level's price.
///
/// `sequence` is the position of this match among the matches generated by
/// the same submission, starting at 0. `id` is unique across the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Match {
    pub id: u64,
    pub sequence: u64,
    pub maker_order_id: u64,
    pub taker_order_id: u64,
    pub price: u64,
    pub quantity: u64,
}

impl Match {
    pub fn new(
        id: u64,
        sequence: u64,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        price: u64,
        quantity: u64,
    ) -> Self {
        Self {
            id,
            sequence,
            maker_order_id,
            taker_order_id,
            price,
            quantity,
        }
    }

    /// price * quantity in ticks x lots
    pub fn notional_raw(&self) -> u128 {
        (self.price as u128) * (self.quantity as u128)
    }

    /// SSZ encoding for the audit trail (48 bytes)
    pub fn encode(&self) -> BookResult<Vec<u8>> {
        ssz_rs::serialize(self).map_err(|err| BookError::Encoding(format!("{err:?}")))
    }

    /// Decode a record written by [`Match::encode`]
    pub fn decode(bytes: &[u8]) -> BookResult<Self> {
        ssz_rs::deserialize(bytes).map_err(|err| BookError::Encoding(format!("{err:?}")))
    }
}

/// Lifecycle state of an order after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Resting with nothing filled yet
    Resting,
    /// Resting after one or more fills
    PartiallyFilled,
    /// Nothing left; terminal
    Filled,
    /// Removed before filling completely; terminal
    Canceled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Canceled)
    }
}

/// Outcome of one submission.
///
/// `filled + rested + discarded == size` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub order_id: OrderId,
    pub side: Side,
    /// Size as submitted
    pub size: u64,
    pub status: OrderStatus,
    /// Handle of the resting remainder, if any
    pub resting: Option<OrderId>,
    /// Fills in generation order
    pub matches: Vec<Match>,
    pub filled: u64,
    /// Size placed on the book
    pub rested: u64,
    /// Size dropped (market remainder or self-trade cancel)
    pub discarded: u64,
    /// Makers that reached zero remaining during this submission
    pub completed_makers: Vec<OrderId>,
    /// Makers removed by self-trade prevention
    pub canceled_makers: Vec<OrderId>,
}

impl Execution {
    pub(crate) fn status_for(size: u64, filled: u64, rested: u64) -> OrderStatus {
        if filled == size {
            OrderStatus::Filled
        } else if rested > 0 && filled == 0 {
            OrderStatus::Resting
        } else if rested > 0 {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Canceled
        }
    }

    pub fn is_fully_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    /// Volume-weighted average fill price in ticks, rounded down
    pub fn average_price(&self) -> Option<u64> {
        if self.filled == 0 {
            return None;
        }
        let notional: u128 = self.matches.iter().map(Match::notional_raw).sum();
        u64::try_from(notional / self.filled as u128).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_encoding() {
        let m = Match::new(9, 0, 1, 2, 100, 4);
        let bytes = m.encode().expect("encode");

        assert_eq!(bytes.len(), 48);
        assert_eq!(Match::decode(&bytes).expect("decode"), m);
        assert!(Match::decode(&bytes[..10]).is_err());
    }

    #[test]
    fn test_status_for() {
        assert_eq!(Execution::status_for(10, 10, 0), OrderStatus::Filled);
        assert_eq!(Execution::status_for(10, 0, 10), OrderStatus::Resting);
        assert_eq!(Execution::status_for(10, 6, 4), OrderStatus::PartiallyFilled);
        assert_eq!(Execution::status_for(10, 6, 0), OrderStatus::Canceled);
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(!OrderStatus::PartiallyFilled.is_terminal());
    }

    #[test]
    fn test_average_price() {
        let execution = Execution {
            order_id: 3,
            side: Side::Buy,
            size: 10,
            status: OrderStatus::Filled,
            resting: None,
            matches: vec![Match::new(1, 0, 1, 3, 100, 6), Match::new(2, 1, 2, 3, 101, 4)],
            filled: 10,
            rested: 0,
            discarded: 0,
            completed_makers: vec![1, 2],
            canceled_makers: vec![],
        };
        // (600 + 404) / 10
        assert_eq!(execution.average_price(), Some(100));
        assert!(execution.is_fully_filled());
    }
}
