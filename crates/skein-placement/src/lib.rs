//! Consistent hashing ring for deterministic key placement.
//!
//! This crate implements the ring that maps keys to stores. Every store
//! places [`REPLICAS`](skein_types::REPLICAS) virtual-node labels on the ring
//! at `label_hash(replica * LABEL_SPACE + store)`, and the ring keeps them
//! in a [`CircularList`](skein_list::CircularList) sorted by that hash.
//!
//! A key belongs to the first label whose hash is greater than or equal to
//! the key's hash, wrapping to the head of the ring when no such label
//! exists. Ties between labels with equal hashes go to whichever comes
//! first in ring order.

mod error;
mod ring;

pub use error::PlacementError;
pub use ring::HashRing;
