use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::CacheStats;

/// Global registry of cache statistics, indexed by cache name.
///
/// Caches generated by `#[cached]` register themselves under their `name`
/// attribute (the function name by default). Every thread-local copy of the
/// same cache shares one [`CacheStats`], so the registry reports totals over
/// all threads.
///
/// # Examples
///
/// ```
/// use decorum_core::stats_registry;
///
/// let stats = stats_registry::register("doc_example");
/// stats.record_hit();
///
/// let same = stats_registry::get("doc_example").unwrap();
/// assert_eq!(same.hits(), 1);
/// assert!(stats_registry::list().contains(&"doc_example".to_string()));
/// ```
static STATS_REGISTRY: Lazy<RwLock<HashMap<String, Arc<CacheStats>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Returns the statistics registered under `name`, creating them if needed.
///
/// Registering a name twice returns the same counters both times.
pub fn register(name: &str) -> Arc<CacheStats> {
    if let Some(stats) = STATS_REGISTRY.read().get(name) {
        return Arc::clone(stats);
    }
    let mut registry = STATS_REGISTRY.write();
    Arc::clone(
        registry
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CacheStats::new())),
    )
}

/// Registers existing statistics under `name`, replacing any previous entry.
pub fn register_shared(name: &str, stats: Arc<CacheStats>) {
    STATS_REGISTRY.write().insert(name.to_string(), stats);
}

/// Get the live statistics for a cache by name.
///
/// # Returns
///
/// * `Some(Arc<CacheStats>)` - The statistics if the name is registered
/// * `None` - If no cache with that name is registered
pub fn get(name: &str) -> Option<Arc<CacheStats>> {
    STATS_REGISTRY.read().get(name).cloned()
}

/// Get a point-in-time copy of the statistics for a cache by name.
pub fn snapshot(name: &str) -> Option<CacheStats> {
    STATS_REGISTRY
        .read()
        .get(name)
        .map(|stats| CacheStats::clone(stats))
}

/// List all registered cache names.
pub fn list() -> Vec<String> {
    STATS_REGISTRY.read().keys().cloned().collect()
}

/// Reset statistics for a specific cache.
///
/// # Returns
///
/// * `true` - If the cache was found and reset
/// * `false` - If no cache with that name is registered
pub fn reset(name: &str) -> bool {
    match STATS_REGISTRY.read().get(name) {
        Some(stats) => {
            stats.reset();
            true
        }
        None => false,
    }
}

/// Clear all registered statistics.
///
/// This removes all entries from the registry but does not reset the statistics themselves.
/// Caches already holding their `Arc` keep counting into it.
pub fn clear() {
    STATS_REGISTRY.write().clear();
}
