//! Error types for the balancer.

use skein_types::{LABEL_SPACE, Label, StoreId};

/// Errors that can occur during balancer operations.
///
/// Every rejected call leaves the ring and the stores exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalancerError {
    /// The store id is already registered.
    #[error("store {0} is already registered")]
    DuplicateStore(StoreId),

    /// The store id is not registered.
    #[error("store {0} is not registered")]
    UnknownStore(StoreId),

    /// The store id does not fit in the label encoding.
    #[error("store id {0} must be below {max}", max = LABEL_SPACE)]
    InvalidStoreId(StoreId),

    /// Removing the last store would leave its entries without an owner.
    #[error("cannot remove store {store}: it is the last store and holds {entries} entries")]
    WouldOrphan {
        /// The store that was asked to leave.
        store: StoreId,
        /// Entries it still holds.
        entries: usize,
    },

    /// No store is registered, so no key has an owner.
    #[error("no stores registered")]
    NoStores,

    /// A ring label points at a store with no backing table.
    #[error("ring references store {0} with no backing table")]
    MissingStore(StoreId),

    /// A registered store has a label missing from the ring.
    #[error("label {0} of a registered store is missing from the ring")]
    MissingLabel(Label),

    /// Store construction failed.
    #[error("store error: {0}")]
    Store(#[from] skein_store::StoreError),

    /// Ring edit failed.
    #[error("placement error: {0}")]
    Placement(#[from] skein_placement::PlacementError),
}
