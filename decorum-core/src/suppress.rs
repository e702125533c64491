use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;

use tracing::trace;

/// Boxed error type accepted by [`ignore_kind`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A function whose errors of one kind are swallowed.
///
/// `is_ignored` decides which errors count as "the kind". A matching error
/// becomes `Ok(None)`; any other error is returned unchanged.
///
/// # Examples
///
/// ```
/// use std::num::IntErrorKind;
/// use decorum_core::IgnoreError;
///
/// let mut parse = IgnoreError::new(
///     |s: &str| s.parse::<i32>(),
///     |err: &std::num::ParseIntError| *err.kind() == IntErrorKind::Empty,
/// );
///
/// assert_eq!(parse.call("42"), Ok(Some(42)));
/// assert_eq!(parse.call(""), Ok(None));
/// assert!(parse.call("x").is_err());
/// ```
pub struct IgnoreError<F, P, A> {
    func: F,
    is_ignored: P,
    _args: PhantomData<fn(A)>,
}

impl<F, P, A, T, E> IgnoreError<F, P, A>
where
    F: FnMut(A) -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    pub fn new(func: F, is_ignored: P) -> Self {
        Self {
            func,
            is_ignored,
            _args: PhantomData,
        }
    }

    /// Calls the function, turning ignored errors into `Ok(None)`.
    pub fn call(&mut self, args: A) -> Result<Option<T>, E> {
        match (self.func)(args) {
            Ok(value) => Ok(Some(value)),
            Err(err) if (self.is_ignored)(&err) => {
                trace!("suppressed ignored error");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

impl<F, P, A> fmt::Debug for IgnoreError<F, P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreError").finish_non_exhaustive()
    }
}

/// Closure form of [`IgnoreError`].
pub fn ignore_error<F, P, A, T, E>(func: F, is_ignored: P) -> impl FnMut(A) -> Result<Option<T>, E>
where
    F: FnMut(A) -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let mut wrapper = IgnoreError::new(func, is_ignored);
    move |args: A| wrapper.call(args)
}

/// Predicate matching boxed errors whose concrete type is `K`.
///
/// ```
/// use std::fmt;
/// use decorum_core::{ignore_error, ignore_kind, BoxError};
///
/// #[derive(Debug)]
/// struct NotFound;
///
/// impl fmt::Display for NotFound {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("not found")
///     }
/// }
///
/// impl std::error::Error for NotFound {}
///
/// let mut lookup = ignore_error(
///     |id: u32| -> Result<&'static str, BoxError> {
///         match id {
///             1 => Ok("root"),
///             2 => Err(Box::new(NotFound)),
///             _ => Err("corrupt index".into()),
///         }
///     },
///     ignore_kind::<NotFound>(),
/// );
///
/// assert_eq!(lookup(1).unwrap(), Some("root"));
/// assert_eq!(lookup(2).unwrap(), None);
/// assert!(lookup(3).is_err());
/// ```
pub fn ignore_kind<K>() -> impl Fn(&BoxError) -> bool
where
    K: StdError + 'static,
{
    |err: &BoxError| err.is::<K>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, PartialEq)]
    enum LoadError {
        Missing,
        Corrupt,
    }

    fn load(name: &str) -> Result<u32, LoadError> {
        match name {
            "ok" => Ok(1),
            "missing" => Err(LoadError::Missing),
            _ => Err(LoadError::Corrupt),
        }
    }

    #[test]
    fn test_success_wrapped_in_some() {
        let mut f = IgnoreError::new(load, |e: &LoadError| *e == LoadError::Missing);
        assert_eq!(f.call("ok"), Ok(Some(1)));
    }

    #[test]
    fn test_matching_error_suppressed() {
        let mut f = IgnoreError::new(load, |e: &LoadError| *e == LoadError::Missing);
        assert_eq!(f.call("missing"), Ok(None));
    }

    #[test]
    fn test_other_error_propagates() {
        let mut f = IgnoreError::new(load, |e: &LoadError| *e == LoadError::Missing);
        assert_eq!(f.call("bad"), Err(LoadError::Corrupt));
    }

    #[test]
    fn test_ignore_kind_downcasts() {
        let is_io = ignore_kind::<io::Error>();
        let io_err: BoxError = Box::new(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let fmt_err: BoxError = Box::new(fmt::Error);
        assert!(is_io(&io_err));
        assert!(!is_io(&fmt_err));
    }

    #[test]
    fn test_closure_form() {
        let mut f = ignore_error(
            |n: i32| if n > 0 { Ok(n) } else { Err(n) },
            |e: &i32| *e == 0,
        );
        assert_eq!(f(3), Ok(Some(3)));
        assert_eq!(f(0), Ok(None));
        assert_eq!(f(-1), Err(-1));
    }
}
