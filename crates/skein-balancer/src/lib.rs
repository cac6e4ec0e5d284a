//! Consistent-hash load balancer tying the Skein components together.
//!
//! The [`LoadBalancer`] owns the placement ring and every backing store,
//! and exposes the four data-plane calls: add a store, remove a store,
//! store a key, retrieve a key. Membership changes report the entries they
//! moved as [`Migration`] records.

pub mod balancer;
pub mod error;

pub use balancer::{BalancerConfig, LoadBalancer, Migration};
pub use error::BalancerError;

#[cfg(test)]
mod tests;
