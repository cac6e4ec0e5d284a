//! Error types for store operations.

/// Errors that can occur when creating or using a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A store needs at least one bucket to hash keys into.
    #[error("store bucket count must be at least 1")]
    ZeroBuckets,
}
