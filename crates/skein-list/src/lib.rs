//! Circular doubly-linked sequence backed by an index arena.
//!
//! [`CircularList`] is the container under both the placement ring (a sorted
//! sequence of virtual-node labels) and every store bucket chain. It offers
//! positional get/insert/remove with O(1) access to both ends and an O(n)
//! forward walk for anything in between.
//!
//! Nodes live in a `Vec` of slots and link to each other by slot index.
//! Freed slots are threaded onto a free list and reused by later inserts, so
//! removing an element never shifts the others.

mod error;
mod list;

pub use error::ListError;
pub use list::{CircularList, IntoIter, Iter};
