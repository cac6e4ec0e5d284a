//! In-process key-value store used as a balancer backend.
//!
//! A [`Store`] is a hash table with a fixed bucket count. Keys pick their
//! bucket with [`skein_types::key_hash`] and each bucket is a
//! [`CircularList`](skein_list::CircularList) chain of [`Entry`] values.
//! Keys are unique per store; storing an existing key replaces its value.

mod error;
mod store;

pub use error::StoreError;
pub use store::{Entry, Store, StoreStats};
