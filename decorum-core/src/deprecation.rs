use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;

/// Target of the warnings emitted for deprecated calls.
pub const DEPRECATION_TARGET: &str = "decorum::deprecation";

/// Emits the deprecation warning for one call.
///
/// Used by [`Deprecated`] and by code generated with `#[deprecated_call]`.
/// The event carries the location of the call as its `caller` field.
#[track_caller]
pub fn warn_deprecated(function: &str, message: &str) {
    let caller = Location::caller();
    tracing::warn!(target: DEPRECATION_TARGET, function, caller = %caller, "{}", message);
}

/// Builds the message used when none is configured: `"<name> is deprecated"`.
pub fn default_message(function: &str) -> String {
    format!("{} is deprecated", function)
}

/// A function that warns on every call and then runs unchanged.
///
/// The warning is a `tracing` event at `WARN` level with target
/// [`DEPRECATION_TARGET`]. It never fails the call.
///
/// # Examples
///
/// ```
/// use decorum_core::Deprecated;
///
/// let mut old_sum = Deprecated::new("old_sum", |(a, b): (i32, i32)| a + b)
///     .with_message("old_sum is deprecated, use checked_sum");
///
/// assert_eq!(old_sum.call((1, 2)), 3);
/// assert_eq!(old_sum.message(), "old_sum is deprecated, use checked_sum");
/// ```
pub struct Deprecated<F, A> {
    name: Cow<'static, str>,
    message: Option<Cow<'static, str>>,
    func: F,
    _args: PhantomData<fn(A)>,
}

impl<F, A, R> Deprecated<F, A>
where
    F: FnMut(A) -> R,
{
    pub fn new(name: impl Into<Cow<'static, str>>, func: F) -> Self {
        Self {
            name: name.into(),
            message: None,
            func,
            _args: PhantomData,
        }
    }

    /// Replaces the default `"<name> is deprecated"` message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The message emitted on each call.
    pub fn message(&self) -> Cow<'_, str> {
        match &self.message {
            Some(message) => Cow::Borrowed(message.as_ref()),
            None => Cow::Owned(default_message(&self.name)),
        }
    }

    /// Warns, then delegates to the wrapped function.
    #[track_caller]
    pub fn call(&mut self, args: A) -> R {
        warn_deprecated(&self.name, &self.message());
        (self.func)(args)
    }
}

impl<F, A> fmt::Debug for Deprecated<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deprecated")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Closure form of [`Deprecated`] with an optional custom message.
pub fn deprecated<F, A, R>(
    name: impl Into<Cow<'static, str>>,
    message: Option<&'static str>,
    func: F,
) -> impl FnMut(A) -> R
where
    F: FnMut(A) -> R,
{
    let mut wrapper = Deprecated::new(name, func);
    if let Some(message) = message {
        wrapper = wrapper.with_message(message);
    }
    move |args: A| wrapper.call(args)
}
