#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::algebra;
use crate::cmp::Comparator;
use crate::span::{Span, Spanned};

/// A group of spans sharing one cached bounding span.
///
/// `bounds` is always exactly [min left, max right] over `members`. `sorted` is cleared when a
/// member is appended out of left order and set again by [`Bucket::sort`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct Bucket<T, S> {
    /// Whether `members` is ascending by left
    pub sorted: bool,
    /// Bounding span of all members
    pub bounds: Span<T>,
    /// Member spans in insertion order until sorted
    pub members: Vec<S>,
}

impl<T, S> Bucket<T, S>
where
    T: Clone,
    S: Spanned<Point = T>,
{
    /// Create an empty bucket whose bounds start out as the bounds of `seed`.
    pub fn new(seed: &S) -> Self {
        Bucket {
            sorted: true,
            bounds: Span {
                left: seed.left().clone(),
                right: seed.right().clone(),
            },
            members: Vec::new(),
        }
    }

    /// Append `span` and extend the bounds. Returns `true` if the bounding left moved down.
    pub fn add<C>(&mut self, cmp: &C, span: S) -> bool
    where
        C: Comparator<T>,
    {
        if let Some(last) = self.members.last() {
            self.sorted &= algebra::cmp_left(cmp, last, &span).is_le();
        }
        let moved_left = cmp.compare(span.left(), &self.bounds.left).is_lt();
        if moved_left {
            self.bounds.left = span.left().clone();
        }
        if cmp.compare(span.right(), &self.bounds.right).is_gt() {
            self.bounds.right = span.right().clone();
        }
        self.members.push(span);
        moved_left
    }

    /// Sort members by left unless they already are.
    pub fn sort<C>(&mut self, cmp: &C)
    where
        C: Comparator<T>,
    {
        if !self.sorted {
            algebra::sort_spans(cmp, &mut self.members);
            self.sorted = true;
        }
    }

    /// Position of the first member touching `query`.
    pub fn first_touching<C, Q>(&self, cmp: &C, query: &Q) -> Option<usize>
    where
        C: Comparator<T>,
        Q: Spanned<Point = T> + ?Sized,
    {
        self.members
            .iter()
            .position(|member| algebra::touching(cmp, member, query))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

impl<T, S> Spanned for Bucket<T, S> {
    type Point = T;

    #[inline]
    fn left(&self) -> &T {
        &self.bounds.left
    }

    #[inline]
    fn right(&self) -> &T {
        &self.bounds.right
    }
}
