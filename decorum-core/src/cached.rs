use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::{BoundedCache, CacheConfig, CallError, Canonicalize, ConfigError, KeyError};

/// A function wrapped with a bounded, argument-keyed LRU cache.
///
/// The wrapped function takes one argument `A`; several arguments are passed
/// as a tuple, and keyword-style arguments as a map inside that tuple (maps
/// canonicalize independently of insertion order). The key is built from a
/// reference to the arguments, and on a miss the original arguments are
/// moved into the function.
///
/// # Examples
///
/// ```
/// use decorum_core::Cached;
///
/// let mut calls = 0;
/// let mut area = Cached::new(
///     |(w, h): (u32, u32)| {
///         calls += 1;
///         w * h
///     },
///     16,
/// )
/// .unwrap();
///
/// assert_eq!(area.call((3, 4)).unwrap(), 12);
/// assert_eq!(area.call((3, 4)).unwrap(), 12);
/// drop(area);
/// assert_eq!(calls, 1);
/// ```
pub struct Cached<F, A, R> {
    func: F,
    cache: BoundedCache<R>,
    _args: PhantomData<fn(A)>,
}

impl<F, A, R> Cached<F, A, R>
where
    F: FnMut(A) -> R,
    A: Canonicalize,
    R: Clone,
{
    /// Wraps `func` with a cache of `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(func: F, capacity: usize) -> Result<Self, ConfigError> {
        Self::from_config(func, CacheConfig::new(capacity))
    }

    pub fn from_config(func: F, config: CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            func,
            cache: BoundedCache::from_config(config)?,
            _args: PhantomData,
        })
    }

    /// Calls the wrapped function, or returns the result cached for equal arguments.
    ///
    /// # Errors
    ///
    /// A [`KeyError`] if `args` cannot be canonicalized. The function is not
    /// called and the cache is left untouched.
    pub fn call(&mut self, args: A) -> Result<R, KeyError> {
        let key = args.canonicalize().map_err(|err| {
            debug!(cache = ?self.cache.name(), error = %err, "cannot build cache key");
            err
        })?;
        let func = &mut self.func;
        Ok(self.cache.get_or_compute(key, || func(args)))
    }
}

impl<F, A, R> Cached<F, A, R>
where
    A: Canonicalize,
    R: Clone,
{
    /// Wraps a fallible `func`; only `Ok` results are cached.
    pub fn fallible<E>(func: F, capacity: usize) -> Result<Self, ConfigError>
    where
        F: FnMut(A) -> Result<R, E>,
    {
        Ok(Self {
            func,
            cache: BoundedCache::new(capacity)?,
            _args: PhantomData,
        })
    }

    /// Calls a fallible wrapped function.
    ///
    /// Errors from the function are returned as [`CallError::Function`] and
    /// are never cached: the next call with the same arguments runs the
    /// function again.
    pub fn try_call<E>(&mut self, args: A) -> Result<R, CallError<E>>
    where
        F: FnMut(A) -> Result<R, E>,
    {
        let key = args.canonicalize()?;
        let func = &mut self.func;
        self.cache
            .try_get_or_compute(key, || func(args))
            .map_err(CallError::Function)
    }

    /// The cache backing this wrapper.
    pub fn cache(&self) -> &BoundedCache<R> {
        &self.cache
    }

    /// Drops all cached results.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Unwraps the original function.
    pub fn into_inner(self) -> F {
        self.func
    }
}

impl<F, A, R> fmt::Debug for Cached<F, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cached")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Wraps `func` in a bounded LRU cache and returns it as a closure.
///
/// ```
/// use decorum_core::cached_fn;
///
/// let mut square = cached_fn(|n: i64| n * n, 2).unwrap();
/// assert_eq!(square(4), Ok(16));
/// ```
pub fn cached_fn<F, A, R>(
    func: F,
    capacity: usize,
) -> Result<impl FnMut(A) -> Result<R, KeyError>, ConfigError>
where
    F: FnMut(A) -> R,
    A: Canonicalize,
    R: Clone,
{
    let mut cached = Cached::new(func, capacity)?;
    Ok(move |args: A| cached.call(args))
}

/// Closure form of [`Cached::try_call`]: only successful results are cached.
pub fn try_cached_fn<F, A, R, E>(
    func: F,
    capacity: usize,
) -> Result<impl FnMut(A) -> Result<R, CallError<E>>, ConfigError>
where
    F: FnMut(A) -> Result<R, E>,
    A: Canonicalize,
    R: Clone,
{
    let mut cached = Cached::fallible(func, capacity)?;
    Ok(move |args: A| cached.try_call(args))
}
