use once_cell::unsync::OnceCell;

/// A result computed at most once and kept by the instance that owns the slot.
///
/// The slot starts empty and is filled by the first [`get_or_init`] call.
/// Every later call returns the stored value without running its closure,
/// whatever arguments the surrounding method was called with.
///
/// Use it as a field of the owning struct, one slot per memoized method.
/// The `#[save_it(slot = field)]` attribute generates the method body.
///
/// [`get_or_init`]: SaveSlot::get_or_init
///
/// # Examples
///
/// ```
/// use decorum_core::SaveSlot;
///
/// struct Module {
///     source: String,
///     line_count: SaveSlot<usize>,
/// }
///
/// impl Module {
///     fn line_count(&self) -> usize {
///         *self.line_count.get_or_init(|| self.source.lines().count())
///     }
/// }
///
/// let module = Module {
///     source: "a\nb\nc".to_string(),
///     line_count: SaveSlot::new(),
/// };
/// assert_eq!(module.line_count(), 3);
/// assert!(module.line_count.is_set());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SaveSlot<T> {
    cell: OnceCell<T>,
}

impl<T> SaveSlot<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the stored value, computing it with `init` if the slot is empty.
    ///
    /// If `init` panics the slot stays empty.
    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.cell.get_or_init(init)
    }

    /// Like [`get_or_init`](Self::get_or_init) for fallible computations.
    ///
    /// An error leaves the slot empty, so a later call tries again.
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cell.get_or_try_init(init)
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Empties the slot and returns the stored value.
    ///
    /// Requires exclusive access, so no reference handed out by
    /// [`get_or_init`](Self::get_or_init) can outlive the reset.
    pub fn take(&mut self) -> Option<T> {
        self.cell.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_starts_empty() {
        let slot: SaveSlot<i32> = SaveSlot::new();
        assert!(!slot.is_set());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_computes_once() {
        let calls = Cell::new(0);
        let slot = SaveSlot::new();

        let first = *slot.get_or_init(|| {
            calls.set(calls.get() + 1);
            10
        });
        let second = *slot.get_or_init(|| {
            calls.set(calls.get() + 1);
            20
        });

        assert_eq!(first, 10);
        assert_eq!(second, 10);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failed_init_leaves_slot_empty() {
        let slot: SaveSlot<i32> = SaveSlot::new();
        assert_eq!(slot.get_or_try_init(|| Err("nope")), Err("nope"));
        assert!(!slot.is_set());
        assert_eq!(slot.get_or_try_init(|| Ok::<_, &str>(3)), Ok(&3));
    }

    #[test]
    fn test_take_resets() {
        let mut slot = SaveSlot::new();
        slot.get_or_init(|| "value".to_string());
        assert_eq!(slot.take(), Some("value".to_string()));
        assert!(!slot.is_set());
        assert_eq!(slot.get_or_init(|| "again".to_string()), "again");
    }

    #[test]
    fn test_slots_are_per_instance() {
        let a = SaveSlot::new();
        let b = SaveSlot::new();
        a.get_or_init(|| 1);
        b.get_or_init(|| 2);
        assert_eq!(a.get(), Some(&1));
        assert_eq!(b.get(), Some(&2));
    }
}
