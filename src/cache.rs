//! Time-bounded in-process cache of scan envelopes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::types::{ScanEnvelope, ScanProfile, ScanStatus};

type CacheKey = (String, ScanProfile);

#[derive(Debug)]
struct CacheEntry {
    envelope: ScanEnvelope,
    created_at: Instant,
}

/// TTL cache keyed by exact `(target, profile)` — no key normalization;
/// callers supply canonical input.
///
/// Expiry is checked lazily at read time; a stale entry keeps its slot until
/// the same key is looked up again or [`clear`](ScanCache::clear) runs. That
/// tradeoff is deliberate: the data volume is small and a sweeper is not
/// worth its thread. One coarse lock guards the whole key space, and it is
/// never held across an await, so concurrent misses for the same key may
/// each compute independently.
pub struct ScanCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl ScanCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return a fresh cached envelope for `(target, profile)`, or run
    /// `compute` and store its result. The returned flag is true when the
    /// envelope came from the cache.
    ///
    /// With `allow_cache` false the lookup is skipped, but a successful
    /// compute still writes through. Error envelopes are never stored —
    /// failures are reported, not remembered.
    pub async fn get_or_compute<F, Fut>(
        &self,
        target: &str,
        profile: ScanProfile,
        allow_cache: bool,
        compute: F,
    ) -> (ScanEnvelope, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ScanEnvelope>,
    {
        if allow_cache {
            let entries = self.entries.lock().expect("cache lock poisoned");
            if let Some(entry) = entries.get(&(target.to_string(), profile)) {
                if entry.created_at.elapsed() < self.ttl {
                    return (entry.envelope.clone(), true);
                }
            }
        }

        let envelope = compute().await;

        if envelope.status == ScanStatus::Success {
            let mut entries = self.entries.lock().expect("cache lock poisoned");
            entries.insert(
                (target.to_string(), profile),
                CacheEntry {
                    envelope: envelope.clone(),
                    created_at: Instant::now(),
                },
            );
        }

        (envelope, false)
    }

    /// Discard every entry.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    /// Number of live slots, stale entries included. Diagnostic only.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
