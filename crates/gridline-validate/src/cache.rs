//! Time-bounded validation result cache.
//!
//! Keyed by `(row index, content fingerprint)`: a mutated row produces a
//! new fingerprint and simply stops hitting its old entry. The TTL
//! bounds staleness under continuous re-validation of unchanged rows
//! (as-you-type), and the LRU bound keeps memory flat.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

use gridline_model::ValidationFinding;

use crate::fingerprint::Fingerprint;

/// Snapshot of the cache's hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct CachedFindings {
    findings: Vec<ValidationFinding>,
    computed_at: Instant,
}

pub(crate) struct ValidationCache {
    inner: Mutex<LruCache<(usize, Fingerprint), CachedFindings>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ValidationCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, row_index: usize, fingerprint: Fingerprint) -> Option<Vec<ValidationFinding>> {
        let key = (row_index, fingerprint);
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = cache.get(&key) {
            if entry.computed_at.elapsed() < self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.findings.clone());
            }
            cache.pop(&key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn put(
        &self,
        row_index: usize,
        fingerprint: Fingerprint,
        findings: Vec<ValidationFinding>,
    ) {
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(
            (row_index, fingerprint),
            CachedFindings {
                findings,
                computed_at: Instant::now(),
            },
        );
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
