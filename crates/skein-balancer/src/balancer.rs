//! [`LoadBalancer`]: the hash ring plus the stores it routes to.
//!
//! The balancer owns the placement ring and one [`Store`] per registered
//! id. Reads and writes resolve the key's owner on the ring and go straight
//! to that store. Membership changes edit the ring one label at a time and
//! move exactly the entries whose owner changed.

use std::collections::BTreeMap;

use bytes::Bytes;
use skein_placement::HashRing;
use skein_store::{Entry, Store};
use skein_types::{DEFAULT_BUCKET_COUNT, Label, StoreId};
use tracing::{debug, info, trace, warn};

use crate::error::BalancerError;

/// Configuration for creating a [`LoadBalancer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancerConfig {
    /// Buckets per store. Affects chain lengths only, never placement.
    pub bucket_count: usize,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}

/// An entry that changed stores during a membership change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The key that moved.
    pub key: Bytes,
    /// The store that held it before the change.
    pub from: StoreId,
    /// The store that holds it after the change.
    pub to: StoreId,
}

/// Consistent-hash load balancer over in-process stores.
#[derive(Debug)]
pub struct LoadBalancer {
    /// Virtual-node labels of every registered store, sorted by hash.
    ring: HashRing,
    /// Backing tables, one per registered store.
    stores: BTreeMap<StoreId, Store>,
    /// Bucket count handed to every new store.
    bucket_count: usize,
}

impl LoadBalancer {
    /// Create an empty balancer.
    pub fn new(config: BalancerConfig) -> Self {
        Self {
            ring: HashRing::new(),
            stores: BTreeMap::new(),
            bucket_count: config.bucket_count,
        }
    }

    /// Register a store and pull in the entries its labels now own.
    ///
    /// Each of the store's labels is inserted on its own. After each insert
    /// the clockwise neighbour's store is scanned, and only entries whose
    /// owner position is now the new label move across. Returns every
    /// migration performed.
    pub fn add_store(&mut self, id: StoreId) -> Result<Vec<Migration>, BalancerError> {
        if !id.is_valid() {
            warn!(store = %id, "rejected store id outside label space");
            return Err(BalancerError::InvalidStoreId(id));
        }
        if self.stores.contains_key(&id) {
            warn!(store = %id, "rejected duplicate store");
            return Err(BalancerError::DuplicateStore(id));
        }

        self.stores.insert(id, Store::new(self.bucket_count)?);

        let mut migrations = Vec::new();
        for label in Label::for_store(id) {
            let position = self.ring.insert(label)?;
            migrations.extend(self.claim_arc(label, position)?);
        }

        info!(
            store = %id,
            moved = migrations.len(),
            stores = self.stores.len(),
            labels = self.ring.len(),
            "added store"
        );
        Ok(migrations)
    }

    /// Unregister a store and hand each of its entries to the new owner.
    ///
    /// The store's labels leave the ring first, so every entry is placed
    /// against the updated ring. The last store can only leave once it is
    /// empty.
    pub fn remove_store(&mut self, id: StoreId) -> Result<Vec<Migration>, BalancerError> {
        let Some(store) = self.stores.get(&id) else {
            warn!(store = %id, "rejected removal of unknown store");
            return Err(BalancerError::UnknownStore(id));
        };
        if self.stores.len() == 1 && !store.is_empty() {
            warn!(store = %id, entries = store.len(), "rejected removal of last store");
            return Err(BalancerError::WouldOrphan {
                store: id,
                entries: store.len(),
            });
        }

        if let Some(label) = Label::for_store(id)
            .into_iter()
            .find(|&label| !self.ring.contains(label))
        {
            warn!(store = %id, %label, "rejected removal of store with missing label");
            return Err(BalancerError::MissingLabel(label));
        }

        for label in Label::for_store(id) {
            self.ring
                .remove(label)
                .ok_or(BalancerError::MissingLabel(label))?;
        }

        let removed = self
            .stores
            .remove(&id)
            .ok_or(BalancerError::UnknownStore(id))?;

        let mut migrations = Vec::with_capacity(removed.len());
        for Entry { key, value } in removed.into_entries() {
            let (to, target) = self.owner_store_mut(&key)?;
            trace!(key = %key.escape_ascii(), from = %id, %to, "relocating entry");
            migrations.push(Migration {
                key: key.clone(),
                from: id,
                to,
            });
            target.store(key, value);
        }

        info!(
            store = %id,
            moved = migrations.len(),
            stores = self.stores.len(),
            labels = self.ring.len(),
            "removed store"
        );
        Ok(migrations)
    }

    /// Store `value` under `key` on the owning store and return its id.
    pub fn store(&mut self, key: &[u8], value: &[u8]) -> Result<StoreId, BalancerError> {
        self.store_bytes(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value))
    }

    /// Like [`store`](Self::store), taking already-owned buffers.
    pub fn store_bytes(&mut self, key: Bytes, value: Bytes) -> Result<StoreId, BalancerError> {
        let (id, store) = self.owner_store_mut(&key)?;
        debug!(store = %id, key = %key.escape_ascii(), size = value.len(), "storing entry");
        store.store(key, value);
        Ok(id)
    }

    /// Value stored under `key`, with the id of the store that holds it.
    ///
    /// `None` when the key is absent or no store is registered.
    pub fn retrieve(&self, key: &[u8]) -> Option<(StoreId, &Bytes)> {
        let id = self.owner_of(key)?;
        let value = self.stores.get(&id)?.retrieve(key)?;
        Some((id, value))
    }

    /// Remove `key` from its owning store.
    pub fn remove(&mut self, key: &[u8]) -> Option<(StoreId, Entry)> {
        let id = self.owner_of(key)?;
        let entry = self.stores.get_mut(&id)?.remove(key)?;
        debug!(store = %id, key = %key.escape_ascii(), "removed entry");
        Some((id, entry))
    }

    /// Store that owns `key` under the current ring.
    pub fn owner_of(&self, key: &[u8]) -> Option<StoreId> {
        self.ring.owner(key).map(Label::store)
    }

    /// The placement ring.
    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Backing table of store `id`.
    pub fn get_store(&self, id: StoreId) -> Option<&Store> {
        self.stores.get(&id)
    }

    /// Whether store `id` is registered.
    pub fn contains_store(&self, id: StoreId) -> bool {
        self.stores.contains_key(&id)
    }

    /// Registered store ids, ascending.
    pub fn store_ids(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.stores.keys().copied()
    }

    /// Number of registered stores.
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Total entries across all stores.
    pub fn len(&self) -> usize {
        self.stores.values().map(Store::len).sum()
    }

    /// Whether no store holds any entry.
    pub fn is_empty(&self) -> bool {
        self.stores.values().all(Store::is_empty)
    }

    /// Bucket count used for every store.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Move into `label`'s store every entry whose owner position became
    /// `position` when `label` was inserted there.
    ///
    /// Only the clockwise neighbour can have lost keys to the new label, so
    /// only its store is scanned.
    fn claim_arc(&mut self, label: Label, position: usize) -> Result<Vec<Migration>, BalancerError> {
        if self.ring.len() <= 1 {
            return Ok(Vec::new());
        }
        let Some(neighbour) = self.ring.successor(position) else {
            return Ok(Vec::new());
        };
        let from = neighbour.store();
        let to = label.store();
        if from == to {
            return Ok(Vec::new());
        }

        let ring = &self.ring;
        let moved = self
            .stores
            .get_mut(&from)
            .ok_or(BalancerError::MissingStore(from))?
            .extract_if(|e| ring.owner_position(&e.key) == Some(position));

        let target = self
            .stores
            .get_mut(&to)
            .ok_or(BalancerError::MissingStore(to))?;

        let mut migrations = Vec::with_capacity(moved.len());
        for Entry { key, value } in moved {
            trace!(key = %key.escape_ascii(), %from, %to, "claiming entry");
            migrations.push(Migration {
                key: key.clone(),
                from,
                to,
            });
            target.store(key, value);
        }

        debug!(
            %label,
            %neighbour,
            position,
            moved = migrations.len(),
            "claimed arc from neighbour"
        );
        Ok(migrations)
    }

    fn owner_store_mut(&mut self, key: &[u8]) -> Result<(StoreId, &mut Store), BalancerError> {
        let id = self.ring.owner(key).ok_or(BalancerError::NoStores)?.store();
        let store = self
            .stores
            .get_mut(&id)
            .ok_or(BalancerError::MissingStore(id))?;
        Ok((id, store))
    }
}

impl Default for LoadBalancer {
    fn default() -> Self {
        Self::new(BalancerConfig::default())
    }
}
