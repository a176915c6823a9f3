#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::algebra;
use crate::bucket::Bucket;
use crate::cmp::{Comparator, OrdComparator};
use crate::iter::SortedIter;
use crate::span::{Span, Spanned};

/// How far the largest bucket may grow past the bucket count before a rebalance.
pub const DEFAULT_SLACK: usize = 20;

/// A mutable span index that groups spans into a few buckets with cached bounding spans.
///
/// Insertion appends to the first bucket holding a member that touches the new span, so
/// touching spans cluster together. When the largest bucket outgrows the bucket count by more
/// than the slack, every span is redistributed into `ceil(sqrt(n))` buckets in left order,
/// which keeps a touching query near `O(sqrt(n))` member checks.
///
/// Buckets are scanned in ascending order of their bounding left, which lets a scan stop at
/// the first bucket starting after the query. The order is tracked by a flag: an insertion
/// that drags a bucket's left below its predecessor's marks it stale, the next insertion
/// re-sorts the buckets, and [`BucketedIndex::touching`] scans every bucket while it is stale.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BucketedIndex<T, S = Span<T>, C = OrdComparator> {
    /// Buckets, ascending by bounding left when `sorted` is set
    pub(crate) buckets: Vec<Bucket<T, S>>,
    /// Whether `buckets` is ascending by bounding left
    pub(crate) sorted: bool,
    /// Largest member count of any bucket
    pub(crate) largest: usize,
    /// Number of spans in the index
    pub(crate) len: usize,
    /// Allowed excess of `largest` over the bucket count
    pub(crate) slack: usize,
    /// Order of the point domain
    pub(crate) cmp: C,
}

/// Outcome of a bucket scan.
enum Scan {
    /// Bucket and member position of the first touching member
    Found(usize, usize),
    /// The scan reached a bucket starting after the query
    Pruned,
    /// Every bucket was scanned without a match
    Exhausted,
}

impl<T, S> BucketedIndex<T, S>
where
    T: Ord + Clone,
    S: Spanned<Point = T>,
{
    /// Create an empty `BucketedIndex` ordered by `Ord`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(OrdComparator)
    }
}

impl<T, S> Default for BucketedIndex<T, S>
where
    T: Ord + Clone,
    S: Spanned<Point = T>,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S, C> BucketedIndex<T, S, C>
where
    T: Clone,
    S: Spanned<Point = T>,
    C: Comparator<T>,
{
    /// Create an empty `BucketedIndex` ordered by `cmp`
    #[inline]
    #[must_use]
    pub fn with_comparator(cmp: C) -> Self {
        BucketedIndex {
            buckets: Vec::new(),
            sorted: true,
            largest: 0,
            len: 0,
            slack: DEFAULT_SLACK,
            cmp,
        }
    }

    /// Set how far the largest bucket may outgrow the bucket count before a rebalance.
    #[inline]
    #[must_use]
    pub fn with_slack(mut self, slack: usize) -> Self {
        self.slack = slack;
        self
    }

    /// Insert a span into the index.
    ///
    /// The span joins the first bucket holding a member that touches it. Without a match it
    /// joins the first bucket if the scan stopped at a bucket starting after it, and the last
    /// bucket otherwise. May trigger a [`rebalance`](Self::rebalance).
    ///
    /// # Example
    /// ```rust
    /// use span_index::{BucketedIndex, Span};
    ///
    /// let mut index = BucketedIndex::new();
    /// index.insert(Span::new(0, 1));
    /// index.insert(Span::new(-5, 22));
    /// index.insert(Span::new(3, 4));
    /// assert_eq!(index.len(), 3);
    /// assert!(index.touching(&Span::new(2, 2)));
    /// assert!(!index.touching(&Span::new(100, 200)));
    /// ```
    pub fn insert(&mut self, span: S) {
        if self.buckets.is_empty() {
            self.buckets.push(Bucket::new(&span));
            self.sorted = true;
        }
        self.sort_buckets();

        let target = match self.scan(&span) {
            Scan::Found(bucket, _) => bucket,
            Scan::Pruned => 0,
            Scan::Exhausted => self.buckets.len() - 1,
        };
        let moved_left = self.buckets[target].add(&self.cmp, span);
        if moved_left && target > 0 {
            let prev = &self.buckets[target - 1];
            self.sorted &=
                algebra::cmp_left(&self.cmp, prev, &self.buckets[target]).is_le();
        }
        self.len += 1;
        self.largest = self.largest.max(self.buckets[target].len());
        trace!(bucket = target, size = self.buckets[target].len(), "inserted span");

        if self.needs_rebalance() {
            self.rebalance();
        }
    }

    /// Check if any span in the index touches `query`, boundaries included.
    #[inline]
    pub fn touching<Q>(&self, query: &Q) -> bool
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        matches!(self.scan(query), Scan::Found(..))
    }

    /// Find all spans in the index that touch `query`, in bucket order.
    ///
    /// # Example
    /// ```rust
    /// use span_index::{BucketedIndex, Span};
    ///
    /// let mut index = BucketedIndex::new();
    /// index.insert(Span::new(1, 3));
    /// index.insert(Span::new(2, 4));
    /// index.insert(Span::new(6, 7));
    /// assert_eq!(index.collect_touching(&Span::new(3, 6)).len(), 3);
    /// assert_eq!(index.collect_touching(&Span::new(5, 5)).len(), 0);
    /// ```
    pub fn collect_touching<Q>(&self, query: &Q) -> Vec<&S>
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        let mut found = Vec::new();
        for bucket in &self.buckets {
            if self.sorted && self.cmp.compare(query.right(), bucket.left()).is_lt() {
                break;
            }
            if algebra::touching(&self.cmp, bucket, query) {
                found.extend(
                    bucket
                        .members
                        .iter()
                        .filter(|member| algebra::touching(&self.cmp, *member, query)),
                );
            }
        }
        found
    }

    /// Redistribute every span into `ceil(sqrt(n))` buckets of consecutive spans in left order.
    ///
    /// Only the bucket layout changes, the stored spans stay the same.
    pub fn rebalance(&mut self) {
        let count = self.len;
        if count == 0 {
            return;
        }
        let target = ceil_sqrt(count);
        let per_bucket = count.div_ceil(target);

        let mut spans: Vec<S> = self
            .buckets
            .drain(..)
            .flat_map(|bucket| bucket.members)
            .collect();
        algebra::sort_spans(&self.cmp, &mut spans);

        let mut buckets: Vec<Bucket<T, S>> = Vec::with_capacity(target);
        for span in spans {
            match buckets.last_mut() {
                Some(bucket) if bucket.len() < per_bucket => {
                    let _ignore = bucket.add(&self.cmp, span);
                }
                _ => {
                    let mut bucket = Bucket::new(&span);
                    let _ignore = bucket.add(&self.cmp, span);
                    buckets.push(bucket);
                }
            }
        }

        self.largest = buckets.iter().map(Bucket::len).max().unwrap_or(0);
        self.buckets = buckets;
        self.sorted = true;
        debug!(
            len = count,
            buckets = self.buckets.len(),
            largest = self.largest,
            "rebalanced bucketed index"
        );
    }

    /// Get an iterator over all spans ascending by left.
    ///
    /// Buckets modified since the last call are sorted first; unchanged buckets are not
    /// sorted again.
    ///
    /// # Example
    /// ```rust
    /// use span_index::{BucketedIndex, Span};
    ///
    /// let mut index = BucketedIndex::new();
    /// index.insert(Span::new(0, 1));
    /// index.insert(Span::new(-5, 22));
    /// index.insert(Span::new(3, 4));
    /// let lefts: Vec<_> = index.iter_sorted().map(|s| s.left).collect();
    /// assert_eq!(lefts, vec![-5, 0, 3]);
    /// ```
    pub fn iter_sorted(&mut self) -> SortedIter<'_, T, S, C> {
        self.sort_buckets();
        for bucket in &mut self.buckets {
            bucket.sort(&self.cmp);
        }
        SortedIter::new(&self.buckets, &self.cmp)
    }

    /// Get an iterator over all spans in bucket order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &S> + '_ {
        self.buckets.iter().flat_map(|bucket| bucket.members.iter())
    }

    /// Remove all spans from the index
    #[inline]
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.sorted = true;
        self.largest = 0;
        self.len = 0;
    }

    /// Return the number of spans in the index.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` if the index holds no spans.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the number of buckets.
    #[inline]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl<T, S, C> BucketedIndex<T, S, C>
where
    T: Clone,
    S: Spanned<Point = T>,
    C: Comparator<T>,
{
    /// Restore ascending bucket order if an insertion broke it.
    fn sort_buckets(&mut self) {
        if !self.sorted {
            let cmp = &self.cmp;
            self.buckets.sort_by(|a, b| algebra::cmp_left(cmp, a, b));
            self.sorted = true;
        }
    }

    /// Find the first member touching `query`.
    ///
    /// The scan stops at the first bucket starting after `query` only while the buckets are
    /// known to be in ascending order.
    fn scan<Q>(&self, query: &Q) -> Scan
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        for (i, bucket) in self.buckets.iter().enumerate() {
            if self.sorted && self.cmp.compare(query.right(), bucket.left()).is_lt() {
                return Scan::Pruned;
            }
            if !algebra::touching(&self.cmp, bucket, query) {
                continue;
            }
            if let Some(j) = bucket.first_touching(&self.cmp, query) {
                return Scan::Found(i, j);
            }
        }
        Scan::Exhausted
    }

    fn needs_rebalance(&self) -> bool {
        self.largest > self.buckets.len() + self.slack
    }
}

impl<T, S> FromIterator<S> for BucketedIndex<T, S>
where
    T: Ord + Clone,
    S: Spanned<Point = T>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl<T, S, C> Extend<S> for BucketedIndex<T, S, C>
where
    T: Clone,
    S: Spanned<Point = T>,
    C: Comparator<T>,
{
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for span in iter {
            self.insert(span);
        }
    }
}

/// Smallest `r` with `r * r >= n`.
fn ceil_sqrt(n: usize) -> usize {
    let mut r = (n as f64).sqrt() as usize;
    while r * r < n {
        r += 1;
    }
    while r > 0 && (r - 1) * (r - 1) >= n {
        r -= 1;
    }
    r
}
