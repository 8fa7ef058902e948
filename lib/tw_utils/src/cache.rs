//! Memoizing cache with per-key single-flight computation.

use dashmap::DashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// A concurrent cache that computes missing values on demand.
///
/// Every key owns a cell. The first thread reaching an empty cell runs the
/// loader; concurrent readers of the same key wait for that computation while
/// readers of other keys are not affected. Once stored, a value is never
/// replaced.
pub struct ComputingCache<K, V> {
    entries: DashMap<K, Arc<OnceLock<V>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<K, V> Default for ComputingCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }
}

impl<K, V> fmt::Debug for ComputingCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ComputingCache")
            .field("entries", &self.entries.len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl<K, V> ComputingCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value bound to `key`, running `loader` if no value
    /// has been computed yet.
    pub fn get_or_compute<F>(&self, key: K, loader: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        // the shard lock is released before the loader runs
        let cell = match self.entries.get(&key) {
            Some(cell) => Arc::clone(cell.value()),
            None => Arc::clone(self.entries.entry(key.clone()).or_default().value()),
        };

        let mut computed = false;
        let value = cell
            .get_or_init(|| {
                computed = true;
                loader(&key)
            })
            .clone();

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Returns the value bound to `key` if it has already been computed.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .get(key)
            .and_then(|cell| cell.value().get().cloned())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_compute_once() {
        let cache: ComputingCache<String, usize> = ComputingCache::new();
        assert_eq!(cache.get_or_compute("abc".to_string(), |k| k.len()), 3);
        assert_eq!(cache.get_or_compute("abc".to_string(), |_| 42), 3);
        assert_eq!(cache.get(&"abc".to_string()), Some(3));
        assert_eq!(cache.get(&"xyz".to_string()), None);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_debug() {
        // values that cannot be cloned
        let cache: ComputingCache<String, std::sync::Mutex<u8>> = ComputingCache::default();
        cache.entries.insert("a".to_string(), Arc::new(OnceLock::new()));
        cache.misses.fetch_add(1, Ordering::Relaxed);
        assert_eq!(
            format!("{cache:?}"),
            "ComputingCache { entries: 1, hits: 0, misses: 1 }"
        );
    }

    #[test]
    fn test_single_flight() {
        let cache: ComputingCache<u32, u32> = ComputingCache::new();
        let loads = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let v = cache.get_or_compute(7, |k| {
                        loads.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        k * 2
                    });
                    assert_eq!(v, 14);
                });
            }
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 7);
    }
}
