use crate::recency::NodeId;

/// A cached result and the position of its key in the recency order.
///
/// An entry is created on the miss that computed its value. It is removed
/// by eviction or [`BoundedCache::clear`](crate::BoundedCache::clear).
///
/// # Type Parameters
///
/// * `V` - The type of the cached value
///
/// # Fields
///
/// * `value` - The result returned by the wrapped function
/// * `node` - Handle of the key's node in the cache's [`RecencyList`](crate::RecencyList)
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub node: NodeId,
}

impl<V> CacheEntry<V> {
    /// Creates a new entry for a value whose key sits at `node`.
    pub fn new(value: V, node: NodeId) -> Self {
        Self { value, node }
    }

    /// Consumes the entry and returns the cached value.
    pub fn into_value(self) -> V {
        self.value
    }
}
