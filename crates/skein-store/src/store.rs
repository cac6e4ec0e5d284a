//! Bucketed key-value store.

use bytes::Bytes;
use skein_list::CircularList;
use skein_types::key_hash;
use tracing::trace;

use crate::error::StoreError;

/// A key-value pair owned by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Key bytes, unique within the owning store.
    pub key: Bytes,
    /// Value bytes.
    pub value: Bytes,
}

impl Entry {
    /// Create an entry from anything convertible to [`Bytes`].
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Occupancy figures for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of entries held.
    pub entries: usize,
    /// Sum of key and value lengths across all entries.
    pub bytes: u64,
    /// Buckets holding at least one entry.
    pub occupied_buckets: usize,
    /// Length of the longest bucket chain.
    pub longest_chain: usize,
}

/// Hash table with a fixed number of chained buckets.
#[derive(Debug, Clone)]
pub struct Store {
    buckets: Vec<CircularList<Entry>>,
    len: usize,
}

impl Store {
    /// Create an empty store with `bucket_count` buckets.
    pub fn new(bucket_count: usize) -> Result<Self, StoreError> {
        if bucket_count == 0 {
            return Err(StoreError::ZeroBuckets);
        }
        Ok(Self {
            buckets: (0..bucket_count).map(|_| CircularList::new()).collect(),
            len: 0,
        })
    }

    /// Number of buckets, fixed at creation.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// Returns the replaced value, if the key was already present.
    pub fn store(&mut self, key: Bytes, value: Bytes) -> Option<Bytes> {
        let bucket = self.bucket_of(&key);
        let chain = &mut self.buckets[bucket];

        if let Some(entry) = chain.find_mut(|e| e.key == key) {
            trace!(key = %key.escape_ascii(), bucket, "overwriting entry");
            return Some(std::mem::replace(&mut entry.value, value));
        }

        trace!(key = %key.escape_ascii(), bucket, "appending entry");
        chain.push_back(Entry { key, value });
        self.len += 1;
        None
    }

    /// Value stored under `key`, if any.
    pub fn retrieve(&self, key: &[u8]) -> Option<&Bytes> {
        self.buckets[self.bucket_of(key)]
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.retrieve(key).is_some()
    }

    /// Remove `key` and return its entry.
    pub fn remove(&mut self, key: &[u8]) -> Option<Entry> {
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];
        let position = chain.position(|e| e.key == key)?;
        let entry = chain.remove(position)?;
        self.len -= 1;
        trace!(key = %key.escape_ascii(), bucket, "removed entry");
        Some(entry)
    }

    /// Iterate over every entry, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.buckets.iter().flat_map(|chain| chain.iter())
    }

    /// Iterate over every key.
    pub fn keys(&self) -> impl Iterator<Item = &Bytes> {
        self.iter().map(|e| &e.key)
    }

    /// Remove every entry matching `pred`, bucket by bucket.
    pub fn extract_if<F>(&mut self, mut pred: F) -> Vec<Entry>
    where
        F: FnMut(&Entry) -> bool,
    {
        let mut extracted = Vec::new();
        for chain in &mut self.buckets {
            extracted.extend(chain.extract_if(&mut pred));
        }
        self.len -= extracted.len();
        extracted
    }

    /// Consume the store, yielding every entry.
    pub fn into_entries(self) -> impl Iterator<Item = Entry> {
        self.buckets.into_iter().flatten()
    }

    /// Current occupancy figures.
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            entries: self.len,
            bytes: 0,
            occupied_buckets: 0,
            longest_chain: 0,
        };
        for chain in &self.buckets {
            if !chain.is_empty() {
                stats.occupied_buckets += 1;
            }
            stats.longest_chain = stats.longest_chain.max(chain.len());
            stats.bytes += chain
                .iter()
                .map(|e| (e.key.len() + e.value.len()) as u64)
                .sum::<u64>();
        }
        stats
    }

    fn bucket_of(&self, key: &[u8]) -> usize {
        key_hash(key) as usize % self.buckets.len()
    }
}
