//! Error types for list operations.

/// Errors that can occur when editing a [`CircularList`](crate::CircularList).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// An insert targeted a position past the end of the list.
    #[error("position {position} out of bounds for list of length {len}")]
    OutOfBounds {
        /// The requested position.
        position: usize,
        /// Length of the list at the time of the call.
        len: usize,
    },
}
