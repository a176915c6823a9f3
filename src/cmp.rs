use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A three-way total order over the point type `T`.
///
/// Every structure in this crate reads its ordering through a `Comparator`, so the same
/// index can serve any ordered domain. Closures of the form `Fn(&T, &T) -> Ordering` are
/// comparators too.
///
/// The order must be total and consistent; an inconsistent comparator gives unspecified
/// (but memory-safe) query results.
pub trait Comparator<T: ?Sized> {
    /// Compare two points.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// The comparator that forwards to [`Ord`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrdComparator;

impl<T: Ord + ?Sized> Comparator<T> for OrdComparator {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T, F> Comparator<T> for F
where
    T: ?Sized,
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

impl fmt::Debug for OrdComparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OrdComparator")
    }
}
