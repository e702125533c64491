use std::num::NonZeroUsize;

use crate::ConfigError;

/// Decoration-time settings of a bounded call cache.
///
/// The capacity is fixed for the lifetime of the cache. The optional name
/// labels the cache in log events and, for macro-generated caches, in the
/// [`stats_registry`](crate::stats_registry).
///
/// # Examples
///
/// ```
/// use decorum_core::{CacheConfig, ConfigError};
///
/// let config = CacheConfig::new(128).with_name("parse_module");
/// let validated = config.validate().unwrap();
/// assert_eq!(validated.capacity.get(), 128);
/// assert_eq!(validated.name.as_deref(), Some("parse_module"));
///
/// assert_eq!(CacheConfig::new(0).validate().unwrap_err(), ConfigError::ZeroCapacity);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries; must be positive.
    pub capacity: usize,
    /// Label for logs and statistics.
    pub name: Option<String>,
}

/// A [`CacheConfig`] that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub capacity: NonZeroUsize,
    pub name: Option<String>,
}

impl CacheConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Checks the settings, rejecting a zero capacity and a blank name.
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let capacity = NonZeroUsize::new(self.capacity).ok_or(ConfigError::ZeroCapacity)?;
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyName);
            }
        }
        Ok(ValidatedConfig {
            capacity,
            name: self.name,
        })
    }
}

impl From<NonZeroUsize> for ValidatedConfig {
    fn from(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_capacity() {
        let validated = CacheConfig::new(2).validate().unwrap();
        assert_eq!(validated.capacity.get(), 2);
        assert_eq!(validated.name, None);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            CacheConfig::new(0).validate(),
            Err(ConfigError::ZeroCapacity)
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(
            CacheConfig::new(1).with_name("  ").validate(),
            Err(ConfigError::EmptyName)
        );
    }

    #[test]
    fn test_from_non_zero() {
        let capacity = NonZeroUsize::new(5).unwrap();
        let validated = ValidatedConfig::from(capacity);
        assert_eq!(validated.capacity, capacity);
    }
}
