//! # Decorum Core
//!
//! Runtime pieces behind the `decorum` function wrappers.
//!
//! ## Features
//!
//! - **Bounded LRU cache**: [`BoundedCache`] keeps at most `capacity` results, O(1) per call
//! - **Canonical keys**: [`Canonicalize`] turns arguments into a hashable [`CacheKey`],
//!   sequences stay ordered, sets and maps become order-independent
//! - **Call wrappers**: [`Cached`], [`SaveSlot`], [`ReentrancyFlag`], [`IgnoreError`]
//!   and [`Deprecated`]
//! - **Statistics**: per-cache [`CacheStats`] and a global [`stats_registry`]
//!
//! ## Module Organization
//!
//! - [`keys`] - canonical cache keys
//! - [`recency`] - arena-backed recency list used for LRU ordering
//! - [`stats_registry`] - named statistics for macro-generated caches
//!
mod bounded_cache;
mod cache_entry;
mod cached;
mod config;
mod deprecation;
mod error;
mod reentrancy;
mod save_slot;
mod stats;
mod suppress;

pub mod keys;
pub mod recency;
pub mod stats_registry;

pub use bounded_cache::BoundedCache;
pub use cache_entry::CacheEntry;
pub use cached::{cached_fn, try_cached_fn, Cached};
pub use config::{CacheConfig, ValidatedConfig};
pub use deprecation::{
    default_message, deprecated, warn_deprecated, Deprecated, DEPRECATION_TARGET,
};
pub use error::{CallError, ConfigError, Error, KeyError, Result};
pub use keys::{canonical_key, CacheKey, Canonicalize};
pub use recency::{NodeId, RecencyList};
pub use reentrancy::{ReentrancyFlag, ReentrancyGuard};
pub use save_slot::SaveSlot;
pub use stats::CacheStats;
pub use suppress::{ignore_error, ignore_kind, BoxError, IgnoreError};

/// Items used by code that `decorum-macros` generates. Not a stable API.
#[doc(hidden)]
pub mod __private {
    pub use std::cell::RefCell;
    pub use std::num::NonZeroUsize;

    /// Logs a call that runs uncached because its arguments have no key.
    pub fn key_failure(function: &str, error: &crate::KeyError) {
        tracing::debug!(function, error = %error, "cannot build cache key, calling uncached");
    }
}
