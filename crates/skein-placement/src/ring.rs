//! Consistent hashing ring implementation.

use skein_list::CircularList;
use skein_types::{Label, StoreId, key_hash};
use tracing::debug;

use crate::error::PlacementError;

/// Consistent hashing ring for deterministic key placement.
///
/// Holds every virtual-node label in non-decreasing order of
/// [`Label::hash`]. Positions are indices into that order, starting from
/// the label with the smallest hash.
#[derive(Debug, Clone, Default)]
pub struct HashRing {
    labels: CircularList<Label>,
}

impl HashRing {
    /// Create a new empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the total number of labels on the ring.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the ring holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at `position`, wrapping around the ring.
    pub fn get(&self, position: usize) -> Option<Label> {
        self.labels.get(position).copied()
    }

    /// Label immediately clockwise of `position`, wrapping from the last
    /// label to the first.
    pub fn successor(&self, position: usize) -> Option<Label> {
        self.get(position + 1)
    }

    /// Iterate over labels in ring order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.labels.iter().copied()
    }

    /// Return every store with at least one label on the ring, sorted.
    pub fn store_ids(&self) -> Vec<StoreId> {
        let mut ids: Vec<StoreId> = self.labels().map(Label::store).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Whether `label` is on the ring.
    pub fn contains(&self, label: Label) -> bool {
        self.position_of(label).is_some()
    }

    /// Position at which `label` would be inserted: the first label whose
    /// hash is greater than or equal to `label`'s, or the end of the ring.
    pub fn insertion_position(&self, label: Label) -> usize {
        let hash = label.hash();
        self.labels
            .position(|l| hash <= l.hash())
            .unwrap_or(self.labels.len())
    }

    /// Position of the label that owns `key`.
    ///
    /// The first label whose hash is greater than or equal to the key's hash
    /// wins; past the last label ownership wraps to position 0. Returns
    /// `None` on an empty ring.
    pub fn owner_position(&self, key: &[u8]) -> Option<usize> {
        if self.labels.is_empty() {
            return None;
        }
        let hash = key_hash(key);
        Some(self.labels.position(|l| hash <= l.hash()).unwrap_or(0))
    }

    /// Label that owns `key`, or `None` on an empty ring.
    pub fn owner(&self, key: &[u8]) -> Option<Label> {
        self.owner_position(key).and_then(|pos| self.get(pos))
    }

    /// Current position of `label`.
    ///
    /// Starts from the label's insertion position and skips past other
    /// labels sharing its hash until the exact label is found.
    pub fn position_of(&self, label: Label) -> Option<usize> {
        let hash = label.hash();
        let start = self.insertion_position(label);
        self.labels
            .iter()
            .enumerate()
            .skip(start)
            .take_while(|(_, l)| l.hash() == hash)
            .find(|(_, l)| **l == label)
            .map(|(pos, _)| pos)
    }

    /// Insert `label` at its sorted position and return that position.
    pub fn insert(&mut self, label: Label) -> Result<usize, PlacementError> {
        if self.contains(label) {
            return Err(PlacementError::DuplicateLabel(label));
        }
        let position = self.insertion_position(label);
        self.labels.insert(position, label)?;
        debug!(
            %label,
            store = %label.store(),
            replica = label.replica(),
            position,
            hash = label.hash(),
            "inserted label into ring"
        );
        Ok(position)
    }

    /// Remove `label` from the ring and return the position it held.
    pub fn remove(&mut self, label: Label) -> Option<usize> {
        let position = self.position_of(label)?;
        self.labels.remove(position)?;
        debug!(%label, store = %label.store(), position, "removed label from ring");
        Some(position)
    }

    /// Whether labels are in non-decreasing hash order from head to tail.
    pub fn is_sorted(&self) -> bool {
        let mut previous: Option<u32> = None;
        for label in self.labels() {
            let hash = label.hash();
            if previous.is_some_and(|p| p > hash) {
                return false;
            }
            previous = Some(hash);
        }
        true
    }
}
