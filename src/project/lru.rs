//! Edit-time cache of unsaved buffers.
//!
//! Recency lives in an [`IndexMap`]: the most recently used entry is last, the
//! eviction candidate is first. The whole map sits behind one lock so a swap
//! is a single short critical section.

use std::hash::Hash;

use indexmap::IndexMap;
use parking_lot::Mutex;

#[derive(Debug)]
pub struct LruCache<K, V> {
    entries: Mutex<IndexMap<K, V>>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity,
        }
    }

    /// Clone of the value, marking it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        let index = entries.get_index_of(key)?;
        let last = entries.len() - 1;
        entries.move_index(index, last);
        entries.get_index(last).map(|(_, v)| v.clone())
    }

    /// Insert or replace; returns the evicted entry when over capacity.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }
        let mut entries = self.entries.lock();
        entries.shift_remove(&key);
        entries.insert(key, value);
        if entries.len() > self.capacity {
            return entries.shift_remove_index(0);
        }
        None
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.lock().shift_remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn keys(&self) -> Vec<K> {
        self.entries.lock().keys().cloned().collect()
    }
}
