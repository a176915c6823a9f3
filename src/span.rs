//! The `Span` stored in the indexes of this crate represents the closed range [left, right].
//!
//! Two spans *touch* when they share at least one point, boundaries included, so [0, 1] and
//! [1, 5] touch. Point containment is the one place where a half-open reading is used: a span
//! contains a point `p` when `left <= p < right`.
//!
//! The indexes do not require `Span` itself: anything implementing [`Spanned`] can be stored,
//! which covers tuples, `Range` and caller-defined records.

use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::algebra;
use crate::cmp::{Comparator, OrdComparator};

/// A span over an ordered domain with `left <= right`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Span<T> {
    /// Left endpoint
    pub left: T,
    /// Right endpoint
    pub right: T,
}

impl<T: Ord> Span<T> {
    /// Create a new `Span`
    ///
    /// # Panics
    ///
    /// This method panics when left > right
    #[inline]
    pub fn new(left: T, right: T) -> Self {
        assert!(left <= right, "invalid range");
        Self { left, right }
    }

    /// Checks if self shares at least one point with `other`.
    ///
    /// # Example
    /// ```rust
    /// use span_index::Span;
    ///
    /// assert!(Span::new(0, 1).touches(&Span::new(1, 5)));
    /// assert!(!Span::new(0, 1).touches(&Span::new(2, 5)));
    /// ```
    #[inline]
    pub fn touches<S: Spanned<Point = T> + ?Sized>(&self, other: &S) -> bool {
        algebra::touching(&OrdComparator, self, other)
    }

    /// Checks if self shares an open interior region with `other`.
    ///
    /// # Example
    /// ```rust
    /// use span_index::Span;
    ///
    /// assert!(Span::new(0, 2).overlaps(&Span::new(1, 5)));
    /// assert!(!Span::new(0, 1).overlaps(&Span::new(1, 5)));
    /// ```
    #[inline]
    pub fn overlaps<S: Spanned<Point = T> + ?Sized>(&self, other: &S) -> bool {
        algebra::overlapping(&OrdComparator, self, other)
    }

    /// Half-open point containment, `left <= point < right`.
    #[inline]
    pub fn contains(&self, point: &T) -> bool {
        algebra::contains_point(&OrdComparator, self, point)
    }
}

impl<T: Ord + Clone> Span<T> {
    /// The smallest span covering both, if they touch.
    #[inline]
    pub fn union<S: Spanned<Point = T> + ?Sized>(&self, other: &S) -> Option<Span<T>> {
        algebra::union(&OrdComparator, self, other)
    }

    /// The shared region of both, if they overlap.
    #[inline]
    pub fn intersect<S: Spanned<Point = T> + ?Sized>(&self, other: &S) -> Option<Span<T>> {
        algebra::intersect(&OrdComparator, self, other)
    }

    /// The zero-width span [x, x].
    #[inline]
    pub fn point(x: T) -> Self {
        Self {
            left: x.clone(),
            right: x,
        }
    }
}

impl<T> Span<T> {
    /// Create a new `Span` ordered by `cmp`
    ///
    /// # Panics
    ///
    /// This method panics when `cmp` orders left after right
    #[inline]
    pub fn new_by<C: Comparator<T> + ?Sized>(left: T, right: T, cmp: &C) -> Self {
        assert!(cmp.compare(&left, &right).is_le(), "invalid range");
        Self { left, right }
    }
}

/// Read access to the endpoints of a span-like value.
///
/// Implementors must keep `left() <= right()` under the comparator of the structure they are
/// stored in.
pub trait Spanned {
    /// The point type of the endpoints
    type Point;

    /// Left endpoint
    fn left(&self) -> &Self::Point;

    /// Right endpoint
    fn right(&self) -> &Self::Point;
}

impl<T> Spanned for Span<T> {
    type Point = T;

    #[inline]
    fn left(&self) -> &T {
        &self.left
    }

    #[inline]
    fn right(&self) -> &T {
        &self.right
    }
}

impl<T> Spanned for (T, T) {
    type Point = T;

    #[inline]
    fn left(&self) -> &T {
        &self.0
    }

    #[inline]
    fn right(&self) -> &T {
        &self.1
    }
}

impl<T> Spanned for Range<T> {
    type Point = T;

    #[inline]
    fn left(&self) -> &T {
        &self.start
    }

    #[inline]
    fn right(&self) -> &T {
        &self.end
    }
}

impl<S: Spanned + ?Sized> Spanned for &S {
    type Point = S::Point;

    #[inline]
    fn left(&self) -> &S::Point {
        (**self).left()
    }

    #[inline]
    fn right(&self) -> &S::Point {
        (**self).right()
    }
}

impl<T> From<(T, T)> for Span<T> {
    #[inline]
    fn from((left, right): (T, T)) -> Self {
        Self { left, right }
    }
}

impl<T> From<Range<T>> for Span<T> {
    #[inline]
    fn from(range: Range<T>) -> Self {
        Self {
            left: range.start,
            right: range.end,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[should_panic(expected = "invalid range")]
    fn invalid_range_should_panic() {
        let _span = Span::new(3, 1);
    }

    #[test]
    #[should_panic(expected = "invalid range")]
    fn invalid_range_by_comparator_should_panic() {
        let rev = |a: &i32, b: &i32| b.cmp(a);
        let _span = Span::new_by(1, 3, &rev);
    }

    #[test]
    fn zero_width_span_is_valid() {
        let span = Span::point(4);
        assert_eq!(span, Span::new(4, 4));
        assert!(span.touches(&Span::new(4, 9)));
        assert!(!span.contains(&4));
    }

    #[test]
    fn tuples_and_ranges_are_spans() {
        let span = Span::new(2, 6);
        assert!(span.touches(&(6, 8)));
        assert!(!span.overlaps(&(6..8)));
        assert_eq!(Span::from(2..6), span);
        assert_eq!(Span::from((2, 6)), span);
    }
}
