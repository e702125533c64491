use std::cell::Cell;

/// Per-instance flag that turns re-entrant calls into a default value.
///
/// A method guarded by a `ReentrancyFlag` runs its body normally, but if the
/// body (directly or through other code) calls the same method again on the
/// same instance, the inner call returns a default instead of recursing.
///
/// The flag is raised by [`enter`](Self::enter) and lowered when the returned
/// [`ReentrancyGuard`] is dropped, which covers early returns and panics.
///
/// # Examples
///
/// ```
/// use decorum_core::ReentrancyFlag;
///
/// struct Node {
///     name: &'static str,
///     describing: ReentrancyFlag,
/// }
///
/// impl Node {
///     fn describe(&self) -> String {
///         self.describing.run(|| "<cycle>".to_string(), || {
///             // A cyclic structure would end up calling back in here
///             format!("{} -> {}", self.name, self.describe())
///         })
///     }
/// }
///
/// let node = Node { name: "a", describing: ReentrancyFlag::new() };
/// assert_eq!(node.describe(), "a -> <cycle>");
/// ```
#[derive(Debug, Default)]
pub struct ReentrancyFlag {
    active: Cell<bool>,
}

/// Keeps a [`ReentrancyFlag`] raised until dropped.
#[must_use = "the flag is lowered as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ReentrancyGuard<'a> {
    flag: &'a ReentrancyFlag,
}

impl ReentrancyFlag {
    pub const fn new() -> Self {
        Self {
            active: Cell::new(false),
        }
    }

    /// Returns `true` while a guarded call is running.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Raises the flag, or returns `None` if it is already raised.
    pub fn enter(&self) -> Option<ReentrancyGuard<'_>> {
        if self.active.replace(true) {
            return None;
        }
        Some(ReentrancyGuard { flag: self })
    }

    /// Runs `body`, or returns `default()` when called from inside `body`.
    pub fn run<T, D, F>(&self, default: D, body: F) -> T
    where
        D: FnOnce() -> T,
        F: FnOnce() -> T,
    {
        match self.enter() {
            Some(_guard) => body(),
            None => default(),
        }
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.flag.active.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_enter_and_release() {
        let flag = ReentrancyFlag::new();
        {
            let _guard = flag.enter().unwrap();
            assert!(flag.is_active());
            assert!(flag.enter().is_none());
        }
        assert!(!flag.is_active());
        assert!(flag.enter().is_some());
    }

    #[test]
    fn test_run_returns_default_on_reentry() {
        let flag = ReentrancyFlag::new();
        let outer = flag.run(
            || 0,
            || {
                let inner = flag.run(|| -1, || 100);
                inner * 2
            },
        );
        assert_eq!(outer, -2);
    }

    #[test]
    fn test_default_not_called_on_normal_path() {
        let flag = ReentrancyFlag::new();
        let value = flag.run(|| unreachable!("not re-entered"), || 5);
        assert_eq!(value, 5);
    }

    #[test]
    fn test_flag_released_after_panic() {
        let flag = ReentrancyFlag::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            flag.run(|| (), || panic!("body failed"));
        }));
        assert!(result.is_err());
        assert!(!flag.is_active());
        assert_eq!(flag.run(|| 0, || 1), 1);
    }

    #[test]
    fn test_flags_are_per_instance() {
        let a = ReentrancyFlag::new();
        let b = ReentrancyFlag::new();
        let _guard = a.enter().unwrap();
        assert!(b.enter().is_some());
    }
}
