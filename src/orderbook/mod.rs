//! Order book data structures.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **Price levels**: FIFO queues linked through the slab
//! - **Book sides**: price levels ordered best-first in a `BTreeMap`
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus queue links and its level association
//! - [`PriceLevel`]: the queue and aggregate volume at one price
//! - [`BookSide`]: all levels of one side
//! - [`OrderBook`]: bids, asks and the order arena
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Rest order | O(log n) |
//! | Cancel by id | O(1) + O(log n) when the level empties |
//! | Best bid/ask | O(log n) |
//! | Fill head order | O(1) |

pub mod node;
pub mod level;
pub mod side;
pub mod book;
pub mod view;

pub use node::OrderNode;
pub use level::PriceLevel;
pub use side::BookSide;
pub use book::{OrderBook, RestingHead};
pub use view::{BookSnapshot, LevelView};
