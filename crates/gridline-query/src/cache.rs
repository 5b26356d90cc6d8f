//! Bounded result caches.
//!
//! Both caches key on the grid version alongside the query parameters,
//! so stale entries self-invalidate without an explicit flush: a version
//! bump simply stops producing the old keys and the LRU bound evicts
//! them. Hit/miss counters are exposed for observability and tests.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;

use gridline_model::{SearchOptions, SearchResult};

/// Snapshot of a cache's hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SearchKey {
    pub term: String,
    pub options: SearchOptions,
    pub version: u64,
}

pub(crate) struct SearchCache {
    inner: Mutex<LruCache<SearchKey, Arc<SearchResult>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SearchCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &SearchKey) -> Option<Arc<SearchResult>> {
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match cache.get(key) {
            Some(result) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(result))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: SearchKey, result: Arc<SearchResult>) {
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(key, result);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FilterKey {
    /// Hex digest over the canonical rendering of the filter set.
    pub digest: String,
    pub version: u64,
}

pub(crate) struct FilterCache {
    inner: Mutex<LruCache<FilterKey, Arc<Vec<usize>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FilterCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &FilterKey) -> Option<Arc<Vec<usize>>> {
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match cache.get(key) {
            Some(indices) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(indices))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: FilterKey, indices: Arc<Vec<usize>>) {
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(key, indices);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
