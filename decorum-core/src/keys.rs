use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use crate::KeyError;

/// Canonical, comparable representation of a call's arguments.
///
/// Two calls whose arguments are structurally equal produce equal keys, no
/// matter which concrete containers carried the arguments:
///
/// - ordered sequences (slices, `Vec`, arrays, tuples) become [`CacheKey::Seq`]
/// - unordered collections (`HashSet`, `BTreeSet`) become [`CacheKey::Set`]
/// - mappings become a [`CacheKey::Set`] of `Seq([key, value])` pairs
/// - everything else becomes a leaf
///
/// # Examples
///
/// ```
/// use std::collections::{BTreeMap, HashMap};
/// use decorum_core::Canonicalize;
///
/// let mut a = HashMap::new();
/// a.insert("x", 1);
/// a.insert("y", 2);
///
/// let mut b = BTreeMap::new();
/// b.insert("y", 2);
/// b.insert("x", 1);
///
/// assert_eq!(a.canonicalize().unwrap(), b.canonicalize().unwrap());
/// assert_eq!(vec![1, 2].canonicalize().unwrap(), (1, 2).canonicalize().unwrap());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// An absent value (`None`).
    Unit,
    Bool(bool),
    /// Every integer width folds into `i128`, so `1u8` and `1i64` are the same key.
    Int(i128),
    /// Bit pattern of a normalized, non-NaN `f64`.
    Float(u64),
    Str(String),
    /// Ordered sequence of keys.
    Seq(Vec<CacheKey>),
    /// Unordered collection of keys.
    Set(BTreeSet<CacheKey>),
}

impl CacheKey {
    /// Builds a float leaf, normalizing `-0.0` to `0.0` and rejecting NaN.
    pub fn float(value: f64) -> Result<Self, KeyError> {
        if value.is_nan() {
            return Err(KeyError::NanFloat);
        }
        let value = if value == 0.0 { 0.0 } else { value };
        Ok(CacheKey::Float(value.to_bits()))
    }

    /// Builds the `Seq([key, value])` pair used for mapping entries.
    pub fn pair(key: CacheKey, value: CacheKey) -> Self {
        CacheKey::Seq(vec![key, value])
    }

    /// Returns `true` for leaves, `false` for `Seq` and `Set`.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, CacheKey::Seq(_) | CacheKey::Set(_))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Unit => f.write_str("None"),
            CacheKey::Bool(b) => write!(f, "{}", b),
            CacheKey::Int(i) => write!(f, "{}", i),
            CacheKey::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            CacheKey::Str(s) => write!(f, "{:?}", s),
            CacheKey::Seq(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            CacheKey::Set(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for CacheKey {
    fn from(b: bool) -> Self {
        CacheKey::Bool(b)
    }
}

impl From<i64> for CacheKey {
    fn from(i: i64) -> Self {
        CacheKey::Int(i as i128)
    }
}

impl From<i32> for CacheKey {
    fn from(i: i32) -> Self {
        CacheKey::Int(i as i128)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        CacheKey::Str(s.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        CacheKey::Str(s)
    }
}

/// Conversion of a value into its [`CacheKey`].
///
/// Implemented for primitives, strings, options, smart pointers, sequences,
/// tuples (up to 12 elements), sets and maps. User types can implement it by
/// hand, usually by delegating to a tuple of their identifying fields, or
/// with `#[derive(Canonicalize)]` from the macros crate.
///
/// # Examples
///
/// ```
/// use decorum_core::{CacheKey, Canonicalize, KeyError};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Canonicalize for Point {
///     fn canonicalize(&self) -> Result<CacheKey, KeyError> {
///         (self.x, self.y).canonicalize()
///     }
/// }
///
/// let key = Point { x: 1, y: 2 }.canonicalize().unwrap();
/// assert_eq!(key, CacheKey::Seq(vec![CacheKey::Int(1), CacheKey::Int(2)]));
/// ```
pub trait Canonicalize {
    fn canonicalize(&self) -> Result<CacheKey, KeyError>;
}

/// Builds the key for a call from its positional and keyword arguments.
///
/// The result is `Seq([args, kwargs])`. Keyword arguments are normally a map,
/// so their order does not matter.
///
/// ```
/// use std::collections::HashMap;
/// use decorum_core::canonical_key;
///
/// let kwargs_a: HashMap<&str, i32> = [("x", 1), ("y", 2)].into_iter().collect();
/// let kwargs_b: HashMap<&str, i32> = [("y", 2), ("x", 1)].into_iter().collect();
///
/// assert_eq!(
///     canonical_key(&(10,), &kwargs_a).unwrap(),
///     canonical_key(&[10], &kwargs_b).unwrap(),
/// );
/// ```
pub fn canonical_key<A, K>(args: &A, kwargs: &K) -> Result<CacheKey, KeyError>
where
    A: Canonicalize + ?Sized,
    K: Canonicalize + ?Sized,
{
    Ok(CacheKey::Seq(vec![args.canonicalize()?, kwargs.canonicalize()?]))
}

impl Canonicalize for CacheKey {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        Ok(self.clone())
    }
}

macro_rules! impl_canonicalize_int {
    ($($t:ty),*) => {
        $(
            impl Canonicalize for $t {
                #[inline]
                fn canonicalize(&self) -> Result<CacheKey, KeyError> {
                    Ok(CacheKey::Int(*self as i128))
                }
            }
        )*
    };
}

impl_canonicalize_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl Canonicalize for u128 {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        i128::try_from(*self)
            .map(CacheKey::Int)
            .map_err(|_| KeyError::IntegerOverflow(*self))
    }
}

impl Canonicalize for f64 {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        CacheKey::float(*self)
    }
}

impl Canonicalize for f32 {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        CacheKey::float(f64::from(*self))
    }
}

impl Canonicalize for bool {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        Ok(CacheKey::Bool(*self))
    }
}

impl Canonicalize for char {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        Ok(CacheKey::Str(self.to_string()))
    }
}

impl Canonicalize for str {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        Ok(CacheKey::Str(self.to_string()))
    }
}

impl Canonicalize for String {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        Ok(CacheKey::Str(self.clone()))
    }
}

impl Canonicalize for () {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        Ok(CacheKey::Seq(Vec::new()))
    }
}

impl<T: Canonicalize> Canonicalize for Option<T> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        match self {
            // Wrapped so `Some(None)` and `None` stay distinct
            Some(value) => Ok(CacheKey::Seq(vec![value.canonicalize()?])),
            None => Ok(CacheKey::Unit),
        }
    }
}

impl<T: Canonicalize + ?Sized> Canonicalize for &T {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        (**self).canonicalize()
    }
}

impl<T: Canonicalize + ?Sized> Canonicalize for &mut T {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        (**self).canonicalize()
    }
}

impl<T: Canonicalize + ?Sized> Canonicalize for Box<T> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        (**self).canonicalize()
    }
}

impl<T: Canonicalize + ?Sized> Canonicalize for Rc<T> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        (**self).canonicalize()
    }
}

impl<T: Canonicalize + ?Sized> Canonicalize for Arc<T> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        (**self).canonicalize()
    }
}

impl<T> Canonicalize for Cow<'_, T>
where
    T: Canonicalize + ToOwned + ?Sized,
{
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        (**self).canonicalize()
    }
}

fn canonicalize_seq<'a, T, I>(items: I) -> Result<CacheKey, KeyError>
where
    T: Canonicalize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .map(Canonicalize::canonicalize)
        .collect::<Result<Vec<_>, _>>()
        .map(CacheKey::Seq)
}

fn canonicalize_set<'a, T, I>(items: I) -> Result<CacheKey, KeyError>
where
    T: Canonicalize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .map(Canonicalize::canonicalize)
        .collect::<Result<BTreeSet<_>, _>>()
        .map(CacheKey::Set)
}

fn canonicalize_map<'a, K, V, I>(entries: I) -> Result<CacheKey, KeyError>
where
    K: Canonicalize + 'a,
    V: Canonicalize + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| -> Result<CacheKey, KeyError> {
            Ok(CacheKey::pair(k.canonicalize()?, v.canonicalize()?))
        })
        .collect::<Result<BTreeSet<_>, _>>()
        .map(CacheKey::Set)
}

impl<T: Canonicalize> Canonicalize for [T] {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        canonicalize_seq(self)
    }
}

impl<T: Canonicalize, const N: usize> Canonicalize for [T; N] {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        canonicalize_seq(self)
    }
}

impl<T: Canonicalize> Canonicalize for Vec<T> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        canonicalize_seq(self)
    }
}

impl<T: Canonicalize> Canonicalize for VecDeque<T> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        canonicalize_seq(self)
    }
}

impl<T: Canonicalize, S: BuildHasher> Canonicalize for HashSet<T, S> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        canonicalize_set(self)
    }
}

impl<T: Canonicalize> Canonicalize for BTreeSet<T> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        canonicalize_set(self)
    }
}

impl<K: Canonicalize, V: Canonicalize, S: BuildHasher> Canonicalize for HashMap<K, V, S> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        canonicalize_map(self)
    }
}

impl<K: Canonicalize, V: Canonicalize> Canonicalize for BTreeMap<K, V> {
    fn canonicalize(&self) -> Result<CacheKey, KeyError> {
        canonicalize_map(self)
    }
}

macro_rules! impl_canonicalize_tuple {
    ($($name:ident)+) => {
        impl<$($name: Canonicalize),+> Canonicalize for ($($name,)+) {
            #[allow(non_snake_case)]
            fn canonicalize(&self) -> Result<CacheKey, KeyError> {
                let ($($name,)+) = self;
                Ok(CacheKey::Seq(vec![$($name.canonicalize()?),+]))
            }
        }
    };
}

impl_canonicalize_tuple!(A);
impl_canonicalize_tuple!(A B);
impl_canonicalize_tuple!(A B C);
impl_canonicalize_tuple!(A B C D);
impl_canonicalize_tuple!(A B C D E);
impl_canonicalize_tuple!(A B C D E F);
impl_canonicalize_tuple!(A B C D E F G);
impl_canonicalize_tuple!(A B C D E F G H);
impl_canonicalize_tuple!(A B C D E F G H I);
impl_canonicalize_tuple!(A B C D E F G H I J);
impl_canonicalize_tuple!(A B C D E F G H I J K);
impl_canonicalize_tuple!(A B C D E F G H I J K L);
