//! Bounded map with least-recently-used eviction.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    stamp: u64,
}

/// Key-value store holding at most `capacity` entries.
///
/// Every entry carries a monotonically increasing recency stamp. A hit
/// through [`get`](Self::get) or a re-insert moves the entry to the newest
/// stamp; inserting a new key into a full cache first evicts the entry with
/// the oldest stamp. [`peek`](Self::peek) reads without touching recency.
///
/// # Example
/// ```rust
/// use timbre_dsp::cache::LruCache;
///
/// let mut cache = LruCache::new(2);
/// cache.insert("a", 1);
/// cache.insert("b", 2);
/// cache.get("a");
/// let evicted = cache.insert("c", 3);
/// assert_eq!(evicted, Some(("b", 2)));
/// ```
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    capacity: usize,
    entries: HashMap<K, Slot<V>>,
    order: BTreeMap<u64, K>,
    clock: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create a cache. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `key` is cached. Does not affect recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Look up `key` and mark it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let stamp = self.tick();
        let slot = self.entries.get_mut(key)?;
        if let Some(owned) = self.order.remove(&slot.stamp) {
            self.order.insert(stamp, owned);
        }
        slot.stamp = stamp;
        Some(&slot.value)
    }

    /// Look up `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Insert or replace `key` as the most recently used entry.
    ///
    /// Returns the entry evicted to make room, if any. Replacing an existing
    /// key never evicts.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(stale) = self.entries.remove(&key) {
            self.order.remove(&stale.stamp);
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };
        let stamp = self.tick();
        self.order.insert(stamp, key.clone());
        self.entries.insert(key, Slot { value, stamp });
        evicted
    }

    /// Return the cached value for `key`, computing and inserting it on a miss.
    ///
    /// The second element is the entry evicted by the insert, if any.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> (V, Option<(K, V)>)
    where
        V: Clone,
        F: FnOnce() -> V,
    {
        if let Some(hit) = self.get(&key) {
            return (hit.clone(), None);
        }
        let value = make();
        let evicted = self.insert(key, value.clone());
        (value, evicted)
    }

    /// Fallible [`get_or_insert_with`](Self::get_or_insert_with). Nothing is
    /// inserted when `make` fails.
    pub fn try_get_or_insert_with<F, E>(
        &mut self,
        key: K,
        make: F,
    ) -> Result<(V, Option<(K, V)>), E>
    where
        V: Clone,
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok((hit.clone(), None));
        }
        let value = make()?;
        let evicted = self.insert(key, value.clone());
        Ok((value, evicted))
    }

    /// Remove and return the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.value))
    }

    /// Remove `key`.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.entries.remove(key)?;
        self.order.remove(&slot.stamp);
        Some(slot.value)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.order.values()
    }
}
