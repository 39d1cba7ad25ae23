//! LruCache: hash index + recency list behind a single lock

use std::collections::HashMap;
use std::mem;

use ahash::RandomState;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::handler::DataHandler;
use crate::key::CacheKey;
use crate::list::{NodeId, RecencyList};
use crate::stats::CacheStats;

/// Upper bound on storage reserved by `preallocate`; larger caches grow on demand
const MAX_PREALLOCATE: usize = 1 << 16;

/// Thread-safe LRU cache of releasable handles
///
/// Every operation, `get` included, takes one exclusive lock: lookups
/// reorder the recency list. The lock only covers the index and the list.
/// Handles evicted by an operation are collected while it is held and
/// released by the calling thread once it has been dropped.
///
/// Dropping the cache drops the remaining handles without releasing them;
/// call [`clear`](LruCache::clear) first if they must be released.
pub struct LruCache<K, H> {
    inner: Mutex<Inner<K, H>>,
    stats: CacheStats,
}

/// Everything guarded by the cache lock
struct Inner<K, H> {
    capacity: usize,
    index: HashMap<K, NodeId, RandomState>,
    list: RecencyList<K, H>,
}

impl<K, H> Inner<K, H>
where
    K: CacheKey + Clone,
{
    /// Replace the value of a present entry and mark it most recently used
    fn replace(&mut self, id: NodeId, value: H) -> Option<H> {
        let previous = self
            .list
            .get_mut(id)
            .map(|slot| mem::replace(slot, value));
        self.list.move_to_front(id);
        previous
    }

    /// Insert an absent key at the head, evicting the tail if over capacity
    fn insert(&mut self, key: K, value: H) -> Option<H> {
        let id = self.list.push_front(key.clone(), value);
        self.index.insert(key, id);

        if self.list.len() > self.capacity {
            self.pop_lru()
        } else {
            None
        }
    }

    /// Evict from the tail until at most `limit` entries remain.
    ///
    /// Handles come back least recently used first.
    fn evict_over(&mut self, limit: usize) -> Vec<H> {
        let mut evicted = Vec::with_capacity(self.list.len().saturating_sub(limit));
        while self.list.len() > limit {
            match self.pop_lru() {
                Some(handle) => evicted.push(handle),
                None => break,
            }
        }
        evicted
    }

    fn pop_lru(&mut self) -> Option<H> {
        let (key, handle) = self.list.pop_back()?;
        self.index.remove(&key);
        Some(handle)
    }

    fn remove(&mut self, key: &K) -> Option<H> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|(_, handle)| handle)
    }
}

impl<K, H> LruCache<K, H>
where
    K: CacheKey + Clone,
    H: DataHandler,
{
    /// Create a new cache holding at most `capacity` entries
    ///
    /// A capacity of zero is accepted; such a cache evicts every new entry
    /// as soon as it is set.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(&CacheConfig::with_capacity(capacity))
    }

    /// Create a new cache from a [`CacheConfig`]
    pub fn with_config(config: &CacheConfig) -> Self {
        let reserve = if config.preallocate {
            config.capacity.min(MAX_PREALLOCATE)
        } else {
            0
        };

        Self {
            inner: Mutex::new(Inner {
                capacity: config.capacity,
                index: HashMap::with_capacity_and_hasher(reserve, RandomState::new()),
                list: RecencyList::with_capacity(reserve),
            }),
            stats: CacheStats::new(),
        }
    }

    /// Get the current capacity
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// Change the capacity, evicting least recently used entries if the
    /// cache holds more than `capacity`
    ///
    /// Evicted handles are released in eviction order, oldest first, after
    /// the lock is dropped. Growing the capacity never evicts.
    pub fn set_capacity(&self, capacity: usize) {
        let (previous, evicted) = {
            let mut inner = self.inner.lock();
            let evicted = inner.evict_over(capacity);
            let previous = mem::replace(&mut inner.capacity, capacity);
            (previous, evicted)
        };

        debug!(
            from = previous,
            to = capacity,
            evicted = evicted.len(),
            "cache capacity changed"
        );
        self.release_all(evicted);
    }

    /// Put a handle into the cache under `key`
    ///
    /// If `key` is already present its value is replaced and the entry
    /// becomes the most recently used. The replaced handle is dropped
    /// without being released. Otherwise a new entry is inserted at the
    /// head; if that takes the cache over capacity, the least recently used
    /// entry is evicted and released.
    ///
    /// # Errors
    /// * `Error::InvalidKey` - `key` failed [`CacheKey::is_valid`]; the
    ///   cache is left untouched
    pub fn set(&self, key: K, value: H) -> Result<()> {
        if !key.is_valid() {
            return Err(Error::InvalidKey);
        }

        let mut inner = self.inner.lock();
        let existing = inner.index.get(&key).copied();
        match existing {
            Some(id) => {
                let previous = inner.replace(id, value);
                drop(inner);
                self.stats.record_update();
                drop(previous);
            }
            None => {
                let evicted = inner.insert(key, value);
                drop(inner);
                self.stats.record_insert();
                self.release_all(evicted.into_iter().collect());
            }
        }

        Ok(())
    }

    /// Look up `key`, marking it most recently used
    ///
    /// Returns `None` for missing and invalid keys alike.
    pub fn get(&self, key: &K) -> Option<H::Data> {
        let data = if key.is_valid() {
            let mut inner = self.inner.lock();
            inner.index.get(key).copied().and_then(|id| {
                inner.list.move_to_front(id);
                inner.list.get(id).map(|(_, handle)| handle.data())
            })
        } else {
            None
        };

        match data {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        data
    }

    /// Look up `key` without changing its recency
    pub fn peek(&self, key: &K) -> Option<H::Data> {
        if !key.is_valid() {
            return None;
        }

        let inner = self.inner.lock();
        let id = *inner.index.get(key)?;
        inner.list.get(id).map(|(_, handle)| handle.data())
    }

    /// Check whether `key` is present without changing its recency
    pub fn contains(&self, key: &K) -> bool {
        key.is_valid() && self.inner.lock().index.contains_key(key)
    }

    /// Take the entry for `key` out of the cache
    ///
    /// The handle is returned to the caller as is: it is not released, since
    /// it was not evicted.
    pub fn remove(&self, key: &K) -> Option<H> {
        if !key.is_valid() {
            return None;
        }

        self.inner.lock().remove(key)
    }

    /// Evict and release every entry, least recently used first
    pub fn clear(&self) {
        let evicted = self.inner.lock().evict_over(0);

        debug!(evicted = evicted.len(), "cache cleared");
        self.release_all(evicted);
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().list.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().list.is_empty()
    }

    /// Snapshot of the keys, most recently used first
    pub fn keys(&self) -> Vec<K> {
        self.inner
            .lock()
            .list
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Release handles collected under the lock. Must be called without it.
    fn release_all(&self, evicted: Vec<H>) {
        if evicted.is_empty() {
            return;
        }

        let total = evicted.len();
        self.stats.record_evictions(total);
        for (position, handle) in evicted.into_iter().enumerate() {
            trace!(position, total, "releasing evicted entry");
            handle.release();
        }
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let inner = self.inner.lock();
        inner.list.assert_consistent();
        assert_eq!(inner.index.len(), inner.list.len());
        for (key, &id) in &inner.index {
            let (stored, _) = inner.list.get(id).expect("index points at a free slot");
            assert!(stored == key, "index and list disagree on a key");
        }
    }
}
