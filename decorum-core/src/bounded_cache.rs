use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::recency::RecencyList;
use crate::{stats_registry, CacheConfig, CacheEntry, CacheKey, CacheStats, ConfigError};

/// Argument-keyed result cache with a fixed capacity and LRU eviction.
///
/// The cache owns a map from [`CacheKey`] to [`CacheEntry`] and a
/// [`RecencyList`] holding the same keys, most recently used first.
///
/// # Invariants
///
/// - the keys of the map and the keys of the recency list are the same set,
///   each key appearing exactly once in the list
/// - `len() <= capacity()` after every operation
///
/// # Eviction
///
/// A hit moves its key to the front. A miss inserts the new key at the front,
/// and if that pushes the cache over capacity the key at the back (least
/// recently used) is dropped from both structures. All of this is O(1).
///
/// # Thread Safety
///
/// None. A cache is owned by a single wrapped function; callers that share
/// one across threads must serialize every call themselves.
///
/// # Examples
///
/// ```
/// use decorum_core::{BoundedCache, Canonicalize};
///
/// let mut cache = BoundedCache::new(2).unwrap();
/// let mut calls = 0;
///
/// for n in [1, 2, 1, 3] {
///     let key = n.canonicalize().unwrap();
///     cache.get_or_compute(key, || {
///         calls += 1;
///         n * 10
///     });
/// }
///
/// // 1 was refreshed by its second call, so inserting 3 evicted 2
/// assert_eq!(calls, 3);
/// assert!(cache.contains(&1.canonicalize().unwrap()));
/// assert!(!cache.contains(&2.canonicalize().unwrap()));
/// ```
pub struct BoundedCache<V> {
    map: HashMap<CacheKey, CacheEntry<V>>,
    order: RecencyList<CacheKey>,
    capacity: NonZeroUsize,
    name: Option<String>,
    stats: Arc<CacheStats>,
}

impl<V> BoundedCache<V> {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::from_config(CacheConfig::new(capacity))
    }

    /// Creates a cache from validated settings.
    pub fn from_config(config: CacheConfig) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        let mut cache = Self::with_capacity(config.capacity);
        cache.name = config.name;
        debug!(
            cache = cache.label(),
            capacity = cache.capacity.get(),
            "created bounded cache"
        );
        Ok(cache)
    }

    /// Creates a cache whose capacity is positive by construction.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity.get()),
            order: RecencyList::with_capacity(capacity.get()),
            capacity,
            name: None,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Reports hits, misses and evictions into `stats` instead of private counters.
    pub fn with_stats(mut self, stats: Arc<CacheStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Creates a named cache whose statistics live in the
    /// [`stats_registry`](crate::stats_registry) under `name`.
    ///
    /// Caches created with the same name share one set of counters, which is
    /// how per-thread caches of one `#[cached]` function report together.
    pub fn registered(name: &str, capacity: NonZeroUsize) -> Self {
        let mut cache = Self::with_capacity(capacity).with_stats(stats_registry::register(name));
        cache.name = Some(name.to_string());
        debug!(cache = name, capacity = capacity.get(), "created registered cache");
        cache
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn stats(&self) -> &Arc<CacheStats> {
        &self.stats
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.map.contains_key(key)
    }

    /// Looks a key up without touching recency or statistics.
    pub fn peek(&self, key: &CacheKey) -> Option<&V> {
        self.map.get(key).map(|entry| &entry.value)
    }

    /// Looks a key up as a call would.
    ///
    /// A hit moves the key to the most recently used position. Hits and
    /// misses are both recorded in the statistics.
    pub fn get(&mut self, key: &CacheKey) -> Option<&V> {
        let node = match self.map.get(key) {
            Some(entry) => entry.node,
            None => {
                self.stats.record_miss();
                trace!(cache = self.label(), key = %key, "cache miss");
                return None;
            }
        };
        self.order.move_to_front(node);
        self.stats.record_hit();
        trace!(cache = self.label(), key = %key, "cache hit");
        self.map.get(key).map(|entry| &entry.value)
    }

    /// Stores `value` under `key` as the most recently used entry.
    ///
    /// An existing entry for `key` is replaced. Returns the entry evicted to
    /// stay within capacity, if any.
    pub fn insert(&mut self, key: CacheKey, value: V) -> Option<(CacheKey, V)> {
        if let Some(entry) = self.map.get_mut(&key) {
            entry.value = value;
            let node = entry.node;
            self.order.move_to_front(node);
            return None;
        }

        let node = self.order.push_front(key.clone());
        self.map.insert(key, CacheEntry::new(value, node));

        if self.map.len() > self.capacity.get() {
            return self.evict_lru();
        }
        None
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> + '_ {
        self.order.iter()
    }

    /// Drops every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    fn evict_lru(&mut self) -> Option<(CacheKey, V)> {
        let key = self.order.pop_back()?;
        let entry = self.map.remove(&key)?;
        self.stats.record_eviction();
        trace!(cache = self.label(), key = %key, "evicted least recently used entry");
        Some((key, entry.into_value()))
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }
}

impl<V: Clone> BoundedCache<V> {
    /// Returns the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs only on a miss. After the new entry is stored, the
    /// least recently used entry is evicted if the cache is over capacity.
    pub fn get_or_compute<F>(&mut self, key: CacheKey, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value.clone();
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Like [`get_or_compute`](Self::get_or_compute) for fallible computations.
    ///
    /// An `Err` is returned as is. Nothing is stored and nothing is evicted,
    /// so the next call with the same key computes again.
    pub fn try_get_or_compute<F, E>(&mut self, key: CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value.clone());
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }
}

impl<V> fmt::Debug for BoundedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .finish()
    }
}
