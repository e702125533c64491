//! # Decorum
//!
//! Small, composable function wrappers: memoization with a bounded LRU
//! cache, per-instance single-result memoization, recursion guards, error
//! suppression and deprecation warnings.
//!
//! ## Features
//!
//! - **Bounded memoization**: `#[cached(size = N)]` keeps the `N` most recently used results
//! - **Canonical keys**: arguments are compared structurally; maps and sets ignore order
//! - **Result-aware**: only `Ok` values of `Result`-returning functions are cached
//! - **Per-instance state**: `#[save_it]` and `#[prevent_recursion]` keep their state in fields
//! - **Statistics**: hits, misses and evictions per cache in [`stats_registry`]
//!
//! ## Quick Start
//!
//! ```rust
//! use decorum::cached;
//!
//! #[cached(size = 64)]
//! fn fibonacci(n: u64) -> u64 {
//!     if n <= 1 {
//!         return n;
//!     }
//!     fibonacci(n - 1) + fibonacci(n - 2)
//! }
//!
//! assert_eq!(fibonacci(40), 102_334_155);
//! ```
//!
//! ## Custom Argument Types
//!
//! Arguments must implement [`Canonicalize`]. Derive it, leaving out fields
//! that do not identify the call:
//!
//! ```rust
//! use decorum::{cached, Canonicalize};
//!
//! #[derive(Clone, Canonicalize)]
//! struct Query {
//!     table: String,
//!     limit: u32,
//!     #[canonicalize(skip)]
//!     request_id: u64,
//! }
//!
//! #[cached(size = 16)]
//! fn plan(query: Query) -> String {
//!     format!("scan {} limit {}", query.table, query.limit)
//! }
//!
//! let a = Query { table: "users".into(), limit: 10, request_id: 1 };
//! let b = Query { request_id: 2, ..a.clone() };
//! assert_eq!(plan(a), plan(b));
//! ```
//!
//! ## Runtime Wrappers
//!
//! Closures can be wrapped without macros:
//!
//! ```rust
//! use decorum::Cached;
//!
//! let mut shout = Cached::new(|word: String| word.to_uppercase(), 8).unwrap();
//! assert_eq!(shout.call("hi".to_string()).unwrap(), "HI");
//! assert_eq!(shout.cache().len(), 1);
//!
//! // A zero capacity is a configuration error
//! assert!(Cached::new(|n: u8| n, 0).is_err());
//! ```
//!
//! ## Error Handling
//!
//! Functions returning `Result<T, E>` only cache successful results:
//!
//! ```rust
//! use decorum::cached;
//!
//! #[cached(size = 8)]
//! fn divide(a: i32, b: i32) -> Result<i32, String> {
//!     if b == 0 {
//!         Err("Division by zero".to_string())
//!     } else {
//!         Ok(a / b)
//!     }
//! }
//!
//! // Ok results are cached
//! assert_eq!(divide(10, 2), Ok(5));
//! // Err results are NOT cached
//! assert!(divide(10, 0).is_err());
//! ```

pub use decorum_core::*;
pub use decorum_macros::{cached, deprecated_call, prevent_recursion, save_it, Canonicalize};
