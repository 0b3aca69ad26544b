//! Error type shared by the book, the engine and the configuration layer.
//!
//! Two classes of failure exist:
//!
//! - **Caller errors** (`InvalidOrder`, `OrderNotFound`, `InvalidConfig`): the
//!   request is rejected and the book is left untouched.
//! - **Fatal errors** (`BookInvariantViolation`, `EngineHalted`): the book's
//!   internal structure no longer agrees with itself. The engine stops accepting
//!   mutations once one is observed.

use thiserror::Error;

use crate::types::OrderId;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BookError>;

/// Errors produced by the order book and matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// Submission rejected before any state was touched
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: &'static str },

    /// Cancel referenced an order that is not resting (unknown, filled or canceled)
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The book's internal accounting or ordering is inconsistent
    #[error("book invariant violated: {0}")]
    BookInvariantViolation(String),

    /// A previous operation hit an invariant violation; mutations are refused
    #[error("engine halted after an invariant violation")]
    EngineHalted,

    /// Configuration values out of range
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// SSZ encoding or decoding of an audit record failed
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl BookError {
    /// Shorthand for building an invariant violation.
    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        BookError::BookInvariantViolation(detail.into())
    }

    /// Whether this error leaves the engine unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BookError::BookInvariantViolation(_) | BookError::EngineHalted
        )
    }
}
