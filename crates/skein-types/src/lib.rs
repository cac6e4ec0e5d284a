//! Shared types and identifiers for Skein.
//!
//! This crate defines the core types used across the Skein workspace:
//! store identifiers ([`StoreId`]), virtual-node labels ([`Label`]),
//! the placement constants ([`REPLICAS`], [`LABEL_SPACE`],
//! [`DEFAULT_BUCKET_COUNT`]) and the two hash primitives the ring and the
//! stores agree on ([`label_hash`], [`key_hash`]).

mod hash;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use hash::{key_hash, label_hash};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of virtual nodes (labels) each store places on the ring.
pub const REPLICAS: u8 = 3;

/// Modulus separating the replica index from the store id inside a flat
/// label. Every valid store id is strictly below this value.
pub const LABEL_SPACE: u32 = 100_000;

/// Bucket count of a store when none is configured.
pub const DEFAULT_BUCKET_COUNT: usize = 1000;

// ---------------------------------------------------------------------------
// Store identifier
// ---------------------------------------------------------------------------

/// Identifier of a backend store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(u32);

impl StoreId {
    /// Wrap a raw store id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Return the raw id.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether this id fits below [`LABEL_SPACE`] and can be encoded in a label.
    pub const fn is_valid(self) -> bool {
        self.0 < LABEL_SPACE
    }
}

impl From<u32> for StoreId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Virtual-node label
// ---------------------------------------------------------------------------

/// A virtual node on the ring: one of the [`REPLICAS`] positions of a store.
///
/// Kept as a tagged pair internally. The flat encoding
/// `replica * LABEL_SPACE + store` only exists at the hashing boundary
/// ([`Label::raw`], [`Label::hash`]) and in log output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    replica: u8,
    store: StoreId,
}

impl Label {
    /// Create the label for `replica` of `store`.
    pub const fn new(replica: u8, store: StoreId) -> Self {
        Self { replica, store }
    }

    /// The primary label (replica 0) of `store`.
    pub const fn primary(store: StoreId) -> Self {
        Self::new(0, store)
    }

    /// All labels of `store`, in replica order.
    pub fn for_store(store: StoreId) -> [Label; REPLICAS as usize] {
        std::array::from_fn(|replica| Self::new(replica as u8, store))
    }

    /// Decode a flat label. `None` when the replica part is not below
    /// [`REPLICAS`].
    pub const fn from_raw(raw: u32) -> Option<Self> {
        let replica = raw / LABEL_SPACE;
        if replica >= REPLICAS as u32 {
            return None;
        }
        Some(Self {
            replica: replica as u8,
            store: StoreId(raw % LABEL_SPACE),
        })
    }

    /// Replica index of this label.
    pub const fn replica(self) -> u8 {
        self.replica
    }

    /// Store that owns this label.
    pub const fn store(self) -> StoreId {
        self.store
    }

    /// Flat encoding: `replica * LABEL_SPACE + store`.
    pub const fn raw(self) -> u32 {
        self.replica as u32 * LABEL_SPACE + self.store.0
    }

    /// Ring position of this label.
    pub fn hash(self) -> u32 {
        label_hash(self.raw())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({}:{})", self.store, self.replica)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
