use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use crate::algebra;
use crate::bucket::Bucket;
use crate::cmp::Comparator;
use crate::span::Spanned;

/// The next unvisited member of one bucket.
struct Head<'a, S, C> {
    span: &'a S,
    bucket: usize,
    pos: usize,
    cmp: &'a C,
}

impl<S, C> Head<'_, S, C>
where
    S: Spanned,
    C: Comparator<S::Point>,
{
    /// Ascending by left, then by bucket and position so equal lefts come out in a fixed order.
    fn order(&self, other: &Self) -> Ordering {
        algebra::cmp_left(self.cmp, self.span, other.span)
            .then(self.bucket.cmp(&other.bucket))
            .then(self.pos.cmp(&other.pos))
    }
}

impl<S, C> PartialEq for Head<'_, S, C>
where
    S: Spanned,
    C: Comparator<S::Point>,
{
    fn eq(&self, other: &Self) -> bool {
        self.order(other).is_eq()
    }
}

impl<S, C> Eq for Head<'_, S, C>
where
    S: Spanned,
    C: Comparator<S::Point>,
{
}

impl<S, C> PartialOrd for Head<'_, S, C>
where
    S: Spanned,
    C: Comparator<S::Point>,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S, C> Ord for Head<'_, S, C>
where
    S: Spanned,
    C: Comparator<S::Point>,
{
    // `BinaryHeap` is a max-heap, the smallest head must compare greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other.order(self)
    }
}

/// An iterator over the spans of a `BucketedIndex`, ascending by left.
///
/// Every bucket's members are already sorted; the iterator merges the buckets lazily.
pub struct SortedIter<'a, T, S, C> {
    /// Buckets of the index
    pub(crate) buckets: &'a [Bucket<T, S>],
    /// Order of the point domain
    pub(crate) cmp: &'a C,
    /// Smallest unvisited member of every non-exhausted bucket
    heap: BinaryHeap<Head<'a, S, C>>,
    /// Number of spans not yet yielded
    remaining: usize,
}

impl<'a, T, S, C> SortedIter<'a, T, S, C>
where
    S: Spanned<Point = T>,
    C: Comparator<T>,
{
    pub(crate) fn new(buckets: &'a [Bucket<T, S>], cmp: &'a C) -> Self {
        let heap = buckets
            .iter()
            .enumerate()
            .filter_map(|(bucket, b)| {
                b.members.first().map(|span| Head {
                    span,
                    bucket,
                    pos: 0,
                    cmp,
                })
            })
            .collect();
        SortedIter {
            buckets,
            cmp,
            heap,
            remaining: buckets.iter().map(|b| b.members.len()).sum(),
        }
    }
}

impl<'a, T, S, C> Iterator for SortedIter<'a, T, S, C>
where
    S: Spanned<Point = T>,
    C: Comparator<T>,
{
    type Item = &'a S;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let head = self.heap.pop()?;
        let pos = head.pos + 1;
        if let Some(span) = self.buckets[head.bucket].members.get(pos) {
            self.heap.push(Head {
                span,
                bucket: head.bucket,
                pos,
                cmp: self.cmp,
            });
        }
        self.remaining -= 1;
        Some(head.span)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, S, C> ExactSizeIterator for SortedIter<'_, T, S, C>
where
    S: Spanned<Point = T>,
    C: Comparator<T>,
{
}

impl<T, S, C> fmt::Debug for SortedIter<'_, T, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SortedIter")
            .field("buckets", &self.buckets.len())
            .field("remaining", &self.remaining)
            .finish()
    }
}
