//! Primitive operations on pairs of ordered endpoints.
//!
//! Every function takes the comparator explicitly so it can be shared by all indexes. The
//! convenience methods on [`Span`] forward here with [`OrdComparator`](crate::OrdComparator).

use std::cmp::Ordering;

use crate::cmp::Comparator;
use crate::span::{Span, Spanned};

/// The smaller of two points. Ties return `a`.
#[inline]
pub fn min_by<'a, T, C>(cmp: &C, a: &'a T, b: &'a T) -> &'a T
where
    T: ?Sized,
    C: Comparator<T> + ?Sized,
{
    if cmp.compare(b, a).is_lt() {
        b
    } else {
        a
    }
}

/// The larger of two points. Ties return `a`.
#[inline]
pub fn max_by<'a, T, C>(cmp: &C, a: &'a T, b: &'a T) -> &'a T
where
    T: ?Sized,
    C: Comparator<T> + ?Sized,
{
    if cmp.compare(b, a).is_gt() {
        b
    } else {
        a
    }
}

/// Ordering of the shared region's endpoints: (max of lefts) against (min of rights).
#[inline]
fn shared_region<A, B, C>(cmp: &C, a: &A, b: &B) -> Ordering
where
    A: Spanned + ?Sized,
    B: Spanned<Point = A::Point> + ?Sized,
    C: Comparator<A::Point> + ?Sized,
{
    let left = max_by(cmp, a.left(), b.left());
    let right = min_by(cmp, a.right(), b.right());
    cmp.compare(left, right)
}

/// Whether `a` and `b` share at least one point, boundaries included.
///
/// # Example
/// ```rust
/// use span_index::{algebra, OrdComparator, Span};
///
/// assert!(algebra::touching(&OrdComparator, &Span::new(0, 1), &Span::new(1, 5)));
/// assert!(!algebra::touching(&OrdComparator, &Span::new(0, 1), &Span::new(2, 5)));
/// ```
#[inline]
pub fn touching<A, B, C>(cmp: &C, a: &A, b: &B) -> bool
where
    A: Spanned + ?Sized,
    B: Spanned<Point = A::Point> + ?Sized,
    C: Comparator<A::Point> + ?Sized,
{
    shared_region(cmp, a, b).is_le()
}

/// Whether `a` and `b` share an open interior region. Boundary-adjacent spans do not overlap.
#[inline]
pub fn overlapping<A, B, C>(cmp: &C, a: &A, b: &B) -> bool
where
    A: Spanned + ?Sized,
    B: Spanned<Point = A::Point> + ?Sized,
    C: Comparator<A::Point> + ?Sized,
{
    shared_region(cmp, a, b).is_lt()
}

/// The smallest span covering `a` and `b`, or `None` when they do not touch.
///
/// # Example
/// ```rust
/// use span_index::{algebra, OrdComparator, Span};
///
/// let joined = algebra::union(&OrdComparator, &Span::new(0, 1), &Span::new(1, 5));
/// assert_eq!(joined, Some(Span::new(0, 5)));
/// assert_eq!(algebra::union(&OrdComparator, &Span::new(0, 1), &Span::new(2, 5)), None);
/// ```
#[inline]
pub fn union<A, B, C>(cmp: &C, a: &A, b: &B) -> Option<Span<A::Point>>
where
    A: Spanned + ?Sized,
    A::Point: Clone,
    B: Spanned<Point = A::Point> + ?Sized,
    C: Comparator<A::Point> + ?Sized,
{
    touching(cmp, a, b).then(|| Span {
        left: min_by(cmp, a.left(), b.left()).clone(),
        right: max_by(cmp, a.right(), b.right()).clone(),
    })
}

/// The region shared by `a` and `b`, or `None` when they do not overlap.
#[inline]
pub fn intersect<A, B, C>(cmp: &C, a: &A, b: &B) -> Option<Span<A::Point>>
where
    A: Spanned + ?Sized,
    A::Point: Clone,
    B: Spanned<Point = A::Point> + ?Sized,
    C: Comparator<A::Point> + ?Sized,
{
    overlapping(cmp, a, b).then(|| Span {
        left: max_by(cmp, a.left(), b.left()).clone(),
        right: min_by(cmp, a.right(), b.right()).clone(),
    })
}

/// The bounding span of a collection: [min of lefts, max of rights].
///
/// Returns `None` for an empty collection; callers must handle that case before using the
/// bound.
///
/// # Example
/// ```rust
/// use span_index::{algebra, OrdComparator, Span};
///
/// let spans = [Span::new(3, 4), Span::new(-5, 2), Span::new(0, 9)];
/// assert_eq!(algebra::range(&OrdComparator, &spans), Some(Span::new(-5, 9)));
/// assert_eq!(algebra::range::<Span<i32>, _, _>(&OrdComparator, &[]), None);
/// ```
pub fn range<'a, S, I, C>(cmp: &C, spans: I) -> Option<Span<S::Point>>
where
    S: Spanned + 'a,
    S::Point: Clone,
    I: IntoIterator<Item = &'a S>,
    C: Comparator<S::Point> + ?Sized,
{
    let mut iter = spans.into_iter();
    let first = iter.next()?;
    let (left, right) = iter.fold((first.left(), first.right()), |(left, right), span| {
        (
            min_by(cmp, left, span.left()),
            max_by(cmp, right, span.right()),
        )
    });
    Some(Span {
        left: left.clone(),
        right: right.clone(),
    })
}

/// Orders two spans by their left endpoint only.
#[inline]
pub fn cmp_left<A, B, C>(cmp: &C, a: &A, b: &B) -> Ordering
where
    A: Spanned + ?Sized,
    B: Spanned<Point = A::Point> + ?Sized,
    C: Comparator<A::Point> + ?Sized,
{
    cmp.compare(a.left(), b.left())
}

/// Orders two spans by their right endpoint only.
#[inline]
pub fn cmp_right<A, B, C>(cmp: &C, a: &A, b: &B) -> Ordering
where
    A: Spanned + ?Sized,
    B: Spanned<Point = A::Point> + ?Sized,
    C: Comparator<A::Point> + ?Sized,
{
    cmp.compare(a.right(), b.right())
}

/// Stable sort ascending by left endpoint. Equal lefts keep their relative order; the right
/// endpoint is not used as a tiebreaker.
#[inline]
pub fn sort_spans<S, C>(cmp: &C, spans: &mut [S])
where
    S: Spanned,
    C: Comparator<S::Point> + ?Sized,
{
    spans.sort_by(|a, b| cmp_left(cmp, a, b));
}

/// Whether `spans` is already in the order [`sort_spans`] produces.
#[inline]
pub fn is_sorted_by_left<S, C>(cmp: &C, spans: &[S]) -> bool
where
    S: Spanned,
    C: Comparator<S::Point> + ?Sized,
{
    spans
        .windows(2)
        .all(|pair| cmp_left(cmp, &pair[0], &pair[1]).is_le())
}

/// Half-open point containment: `left <= point < right`.
///
/// Zero-width spans contain no point.
#[inline]
pub fn contains_point<S, C>(cmp: &C, span: &S, point: &S::Point) -> bool
where
    S: Spanned + ?Sized,
    C: Comparator<S::Point> + ?Sized,
{
    cmp.compare(span.left(), point).is_le() && cmp.compare(point, span.right()).is_lt()
}
