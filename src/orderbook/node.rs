//! Order node for slab-based storage.
//!
//! `OrderNode` wraps an `Order` with doubly-linked list pointers so an order
//! can leave its price level in O(1) given its slab key, without disturbing
//! the relative order of the others.
//!
//! ## Links
//!
//! - `prev`: the older neighbour in the level (towards the head)
//! - `next`: the newer neighbour in the level (towards the tail)
//! - `level`: price of the level currently holding the order
//!
//! `level` is a lookup aid for cancellation, not ownership. It is set when the
//! order joins a level and cleared the moment it leaves one.

use crate::types::{Order, OrderId};

#[derive(Debug, Clone)]
pub struct OrderNode {
    pub order: Order,

    /// Next (newer) order in the level queue, slab key
    pub next: Option<usize>,

    /// Previous (older) order in the level queue, slab key
    pub prev: Option<usize>,

    /// Price of the containing level while resting
    pub level: Option<u64>,
}

impl OrderNode {
    /// Create a new node that is not part of any level yet
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
            level: None,
        }
    }

    /// Whether a level currently holds this node
    #[inline]
    pub fn is_resting(&self) -> bool {
        self.level.is_some()
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.order.remaining
    }
}
