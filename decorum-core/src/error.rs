//! Error types for decorum.
//!
//! Errors fall into two groups:
//!
//! - [`ConfigError`] - raised once, when a wrapper is configured
//! - [`KeyError`] - raised on a call, when the arguments cannot become a [`CacheKey`]
//!
//! [`CallError`] adds the wrapped function's own error to [`KeyError`] for
//! fallible functions.
//!
//! [`CacheKey`]: crate::CacheKey

use thiserror::Error;

/// Failure to turn call arguments into a [`CacheKey`](crate::CacheKey).
///
/// Key construction happens before the cache is consulted, so a `KeyError`
/// never leaves a partially updated cache behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// NaN compares unequal to itself and cannot identify a call.
    #[error("NaN cannot be used as a cache key")]
    NanFloat,

    /// Unsigned 128-bit integer outside the canonical integer range.
    #[error("integer {0} is out of range for a cache key")]
    IntegerOverflow(u128),

    /// A value whose type has no structural identity.
    #[error("value of type `{type_name}` cannot be used as a cache key")]
    Unhashable { type_name: &'static str },
}

impl KeyError {
    /// Shorthand for [`KeyError::Unhashable`] naming `T`.
    pub fn unhashable<T: ?Sized>() -> Self {
        KeyError::Unhashable {
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// Invalid wrapper configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A bounded cache must hold at least one entry.
    #[error("cache capacity must be a positive integer, got 0")]
    ZeroCapacity,

    /// Cache names label statistics and must not be blank.
    #[error("cache name must not be empty")]
    EmptyName,
}

/// Error returned by a cached call to a fallible function.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CallError<E> {
    /// The arguments could not be turned into a key; the function was not called.
    #[error("key construction failed: {0}")]
    Key(#[from] KeyError),

    /// The wrapped function failed; nothing was cached.
    #[error("wrapped function failed: {0}")]
    Function(E),
}

impl<E> CallError<E> {
    /// Returns the wrapped function's error, if that is what failed.
    pub fn into_function_error(self) -> Option<E> {
        match self {
            CallError::Function(e) => Some(e),
            CallError::Key(_) => None,
        }
    }
}

/// Unified error type for operations that either configure or key a cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Convenience `Result` alias for decorum operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhashable_names_type() {
        let err = KeyError::unhashable::<std::cell::RefCell<i32>>();
        let message = err.to_string();
        assert!(message.contains("RefCell<i32>"));
        assert!(message.ends_with("cannot be used as a cache key"));
    }

    #[test]
    fn test_call_error_from_key_error() {
        let err: CallError<String> = KeyError::NanFloat.into();
        assert_eq!(err, CallError::Key(KeyError::NanFloat));
        assert_eq!(err.into_function_error(), None);
    }

    #[test]
    fn test_call_error_function_message() {
        let err: CallError<String> = CallError::Function("boom".to_string());
        assert_eq!(err.to_string(), "wrapped function failed: boom");
        assert_eq!(err.into_function_error(), Some("boom".to_string()));
    }

    #[test]
    fn test_unified_error_is_transparent() {
        let err: Error = ConfigError::ZeroCapacity.into();
        assert_eq!(
            err.to_string(),
            "cache capacity must be a positive integer, got 0"
        );
    }
}
