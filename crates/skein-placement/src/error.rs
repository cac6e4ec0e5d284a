//! Error types for ring edits.

use skein_types::Label;

/// Errors that can occur while editing the [`HashRing`](crate::HashRing).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// The label is already on the ring.
    #[error("label {0} is already on the ring")]
    DuplicateLabel(Label),

    /// The underlying list rejected the edit.
    #[error("ring list error: {0}")]
    List(#[from] skein_list::ListError),
}
