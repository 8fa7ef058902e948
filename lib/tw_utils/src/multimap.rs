//! Concurrent multimap.

use dashmap::DashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;

/// A map from keys to ordered sets of values, safe to share between threads.
///
/// Insertions and lookups on the same key are linearizable; there is no
/// ordering guarantee across different keys.
pub struct ConcurrentMultiMap<K, V> {
    inner: DashMap<K, BTreeSet<V>>,
}

impl<K, V> Default for ConcurrentMultiMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }
}

impl<K, V> fmt::Debug for ConcurrentMultiMap<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConcurrentMultiMap")
            .field("keys", &self.inner.len())
            .finish()
    }
}

impl<K, V> ConcurrentMultiMap<K, V>
where
    K: Eq + Hash,
    V: Ord + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to `key`. Returns `false` if the binding already existed.
    pub fn put(&self, key: K, value: V) -> bool {
        self.inner.entry(key).or_default().insert(value)
    }

    /// Returns a snapshot of the values bound to `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<BTreeSet<V>> {
        self.inner.get(key).map(|values| values.value().clone())
    }

    #[must_use]
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.inner
            .get(key)
            .map_or(false, |values| values.contains(value))
    }

    /// Returns a snapshot of all the values, whatever their key.
    #[must_use]
    pub fn values(&self) -> BTreeSet<V> {
        self.inner
            .iter()
            .flat_map(|entry| entry.value().iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_put_get() {
        let map = ConcurrentMultiMap::new();
        assert!(map.put("a", 1));
        assert!(map.put("a", 2));
        assert!(!map.put("a", 1));
        assert!(map.put("b", 3));

        assert_eq!(map.get(&"a"), Some(BTreeSet::from([1, 2])));
        assert!(map.contains(&"b", &3));
        assert!(!map.contains(&"b", &1));
        assert_eq!(map.get(&"c"), None);
        assert_eq!(map.len(), 2);
        assert_eq!(map.values(), BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_concurrent_puts() {
        let map = ConcurrentMultiMap::new();
        thread::scope(|s| {
            for t in 0..4 {
                let map = &map;
                s.spawn(move || {
                    for i in 0..100 {
                        map.put(i % 10, t * 100 + i);
                    }
                });
            }
        });
        let total: usize = (0..10).map(|k| map.get(&k).unwrap().len()).sum();
        assert_eq!(total, 400);
    }
}
