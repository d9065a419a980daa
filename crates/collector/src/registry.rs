//! Lock-guarded lazy registry
//!
//! Map whose entries are created on first access and then live until the
//! registry is cleared. Lookup and insertion happen under one lock, so two
//! threads racing on the same missing key always observe the same entry.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

/// Lazily populated keyed registry
///
/// Values are expected to be cheap handles (`Arc<_>`); every accessor returns a clone.
#[derive(Debug)]
pub struct LazyRegistry<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> LazyRegistry<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the entry for `key`, creating it with `create` if missing.
    ///
    /// `create` runs at most once per key and runs under the registry lock,
    /// so it must not call back into this registry.
    pub fn get_or_create(&self, key: K, create: impl FnOnce(K) -> V) -> V {
        self.entries
            .lock()
            .entry(key)
            .or_insert_with(|| create(key))
            .clone()
    }

    /// Existing entry, never creates one
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Keys present at the time of the call
    pub fn keys(&self) -> Vec<K> {
        self.entries.lock().keys().copied().collect()
    }

    /// Key/value pairs present at the time of the call
    pub fn entries(&self) -> Vec<(K, V)> {
        self.entries
            .lock()
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove every entry, returning them. Session teardown only.
    pub fn clear(&self) -> Vec<(K, V)> {
        self.entries.lock().drain().collect()
    }
}

impl<K, V> Default for LazyRegistry<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_get_or_create_returns_same_instance() {
        let registry: LazyRegistry<u32, Arc<String>> = LazyRegistry::new();
        let a = registry.get_or_create(1, |k| Arc::new(format!("entry-{k}")));
        let b = registry.get_or_create(1, |_| Arc::new("other".to_string()));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "entry-1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_does_not_create() {
        let registry: LazyRegistry<u32, Arc<u32>> = LazyRegistry::new();
        assert!(registry.get(&7).is_none());
        assert!(!registry.contains(&7));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_first_access_creates_once() {
        let registry: Arc<LazyRegistry<u8, Arc<usize>>> = Arc::new(LazyRegistry::new());
        let created = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                let created = created.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_or_create(0, |_| {
                        Arc::new(created.fetch_add(1, Ordering::SeqCst))
                    })
                })
            })
            .collect();

        let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
    }

    #[test]
    fn test_clear_drains_entries() {
        let registry: LazyRegistry<u8, Arc<u8>> = LazyRegistry::new();
        registry.get_or_create(1, Arc::new);
        registry.get_or_create(2, Arc::new);

        let mut drained = registry.clear();
        drained.sort_by_key(|(k, _)| *k);

        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].0, 1);
        assert!(registry.is_empty());
    }
}
