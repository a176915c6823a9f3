//! A span index over integer coordinates that buckets spans into fixed-width windows.
//!
//! Window `w` covers the coordinates `[w * width, (w + 1) * width)`; the window of a
//! coordinate is its floor division by the width. A span is registered in every window from
//! the window of its left endpoint to the window of its right endpoint, both included, so two
//! touching spans always share a window.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algebra;
use crate::cmp::OrdComparator;
use crate::span::{Span, Spanned};

/// How many spans per unit of peak window occupancy `insert_adaptive` tolerates before it
/// halves the window width.
pub const DEFAULT_DENSITY: usize = 1000;

/// Integer coordinate usable by a [`GridIndex`].
pub trait GridCoord: Copy + Ord + Hash + fmt::Debug {
    /// The narrowest window width
    const ONE: Self;
    /// The widest window width, one window for all non-negative coordinates
    const WIDEST: Self;

    /// Floor division of `self` by a positive `width`.
    fn window(self, width: Self) -> Self;

    /// The next window, saturating at the maximum.
    fn step(self) -> Self;

    /// Half of a width, rounded down.
    fn halve(self) -> Self;
}

macro_rules! impl_grid_coord {
    ($($ty:ty),*) => {
        $(
            impl GridCoord for $ty {
                const ONE: Self = 1;
                const WIDEST: Self = <$ty>::MAX;

                #[inline(always)]
                fn window(self, width: Self) -> Self {
                    self.div_euclid(width)
                }
                #[inline(always)]
                fn step(self) -> Self {
                    self.saturating_add(1)
                }
                #[inline(always)]
                fn halve(self) -> Self {
                    self / 2
                }
            }
        )*
    };
}

impl_grid_coord!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Iterator over the window ids `first..=last`.
struct Windows<T> {
    next: Option<T>,
    last: T,
}

impl<T: GridCoord> Iterator for Windows<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        let cur = self.next?;
        self.next = (cur < self.last).then(|| cur.step());
        Some(cur)
    }
}

/// A mutable index of integer spans bucketed by coordinate window.
///
/// Spans are kept in a flat append-only store; windows hold store positions, which never
/// change. [`GridIndex::insert_adaptive`] halves the window width and rebuilds every window
/// when the most crowded window grows past `len / density`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "T: GridCoord + Serialize, S: Serialize",
        deserialize = "T: GridCoord + Deserialize<'de>, S: Deserialize<'de>"
    ))
)]
pub struct GridIndex<T, S = Span<T>> {
    /// Width of every window
    pub(crate) width: T,
    /// Store positions of the spans covering each window
    pub(crate) windows: FxHashMap<T, Vec<usize>>,
    /// Every inserted span, in insertion order
    pub(crate) spans: Vec<S>,
    /// Largest number of spans registered in one window
    pub(crate) largest: usize,
    /// Spans per unit of peak occupancy tolerated by adaptive insertion
    pub(crate) density: usize,
}

impl<T, S> GridIndex<T, S>
where
    T: GridCoord,
    S: Spanned<Point = T>,
{
    /// Create an empty `GridIndex` with windows of `width` coordinates.
    ///
    /// # Panics
    ///
    /// This method panics when `width` is not positive
    #[inline]
    #[must_use]
    pub fn new(width: T) -> Self {
        assert!(width >= T::ONE, "invalid window width");
        GridIndex {
            width,
            windows: FxHashMap::default(),
            spans: Vec::new(),
            largest: 0,
            density: DEFAULT_DENSITY,
        }
    }

    /// Set how many spans per unit of peak window occupancy adaptive insertion tolerates.
    ///
    /// # Panics
    ///
    /// This method panics when `density` is zero
    #[inline]
    #[must_use]
    pub fn with_density(mut self, density: usize) -> Self {
        assert!(density > 0, "invalid density");
        self.density = density;
        self
    }

    /// Build an index with a fixed window width.
    ///
    /// # Example
    /// ```rust
    /// use span_index::{GridIndex, Span};
    ///
    /// let spans = vec![Span::new(0, 4), Span::new(8, 25), Span::new(40, 41)];
    /// let grid = GridIndex::build_fixed(10, spans);
    /// assert_eq!(grid.query(&Span::new(20, 30)), vec![&Span::new(8, 25)]);
    /// assert_eq!(grid.query(&Span::new(4, 8)).len(), 2);
    /// assert!(grid.query(&Span::new(26, 39)).is_empty());
    /// ```
    #[must_use]
    pub fn build_fixed<I: IntoIterator<Item = S>>(width: T, spans: I) -> Self {
        let mut grid = Self::new(width);
        for span in spans {
            let _ignore = grid.insert(span);
        }
        grid
    }

    /// Build an index that starts from the widest window and narrows it as spans pile up.
    #[must_use]
    pub fn build_adaptive<I: IntoIterator<Item = S>>(spans: I) -> Self {
        let mut grid = Self::new(T::WIDEST);
        for span in spans {
            let _ignore = grid.insert_adaptive(span);
        }
        grid
    }

    /// Insert a span and return its position in the store.
    pub fn insert(&mut self, span: S) -> usize {
        let pos = self.spans.len();
        self.spans.push(span);
        self.register(pos);
        pos
    }

    /// Insert a span, then halve the window width and rebuild if the most crowded window
    /// holds more than `len / density` spans. Returns the span's position in the store.
    ///
    /// # Example
    /// ```rust
    /// use span_index::{GridIndex, Span};
    ///
    /// let mut grid = GridIndex::new(64);
    /// grid.insert_adaptive(Span::new(3, 5));
    /// assert_eq!(grid.width(), 32);
    /// assert_eq!(grid.query(&Span::new(5, 9)), vec![&Span::new(3, 5)]);
    /// ```
    pub fn insert_adaptive(&mut self, span: S) -> usize {
        let pos = self.insert(span);
        if self.width > T::ONE && self.largest > self.spans.len() / self.density {
            self.shrink();
        }
        pos
    }

    /// Find all spans touching `query`, boundaries included, in insertion order.
    pub fn query<Q>(&self, query: &Q) -> Vec<&S>
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        let mut candidates = BTreeSet::new();
        for window in self.windows_of(query) {
            if let Some(members) = self.windows.get(&window) {
                candidates.extend(members.iter().copied());
            }
        }
        candidates
            .into_iter()
            .map(|pos| &self.spans[pos])
            .filter(|span| algebra::touching(&OrdComparator, *span, query))
            .collect()
    }

    /// Check if any span touches `query`, boundaries included.
    pub fn touching<Q>(&self, query: &Q) -> bool
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        self.windows_of(query).any(|window| {
            self.windows.get(&window).is_some_and(|members| {
                members
                    .iter()
                    .any(|&pos| algebra::touching(&OrdComparator, &self.spans[pos], query))
            })
        })
    }

    /// Return the span stored at `pos`.
    #[inline]
    pub fn get(&self, pos: usize) -> Option<&S> {
        self.spans.get(pos)
    }

    /// Get an iterator over all spans in insertion order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.spans.iter()
    }

    /// Return the current window width.
    #[inline]
    #[must_use]
    pub fn width(&self) -> T {
        self.width
    }

    /// Return the number of non-empty windows.
    #[inline]
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Return the number of spans in the index.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Return `true` if the index holds no spans.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, S> GridIndex<T, S>
where
    T: GridCoord,
    S: Spanned<Point = T>,
{
    /// Windows covered by `span` at the current width.
    fn windows_of<Q>(&self, span: &Q) -> Windows<T>
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        let first = span.left().window(self.width);
        let last = span.right().window(self.width);
        Windows {
            next: (first <= last).then_some(first),
            last,
        }
    }

    /// Add the stored span at `pos` to every window it covers.
    fn register(&mut self, pos: usize) {
        let windows = self.windows_of(&self.spans[pos]);
        for window in windows {
            let members = self.windows.entry(window).or_default();
            members.push(pos);
            self.largest = self.largest.max(members.len());
        }
    }

    /// Halve the window width and rebuild every window from the store.
    fn shrink(&mut self) {
        let previous = self.width;
        self.width = self.width.halve();
        self.windows.clear();
        self.largest = 0;
        for pos in 0..self.spans.len() {
            self.register(pos);
        }
        debug!(
            from = ?previous,
            to = ?self.width,
            len = self.spans.len(),
            largest = self.largest,
            "narrowed grid windows"
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[should_panic(expected = "invalid window width")]
    fn zero_width_should_panic() {
        let _grid = GridIndex::<i64>::new(0);
    }

    #[test]
    fn windows_use_floor_division() {
        assert_eq!((-1i32).window(10), -1);
        assert_eq!((-10i32).window(10), -1);
        assert_eq!((-11i32).window(10), -2);
        assert_eq!(9u32.window(10), 0);
        assert_eq!(10u32.window(10), 1);
    }

    #[test]
    fn span_registers_in_every_covered_window() {
        let mut grid = GridIndex::new(10);
        let pos = grid.insert(Span::new(-5, 20));
        assert_eq!(pos, 0);
        let mut windows: Vec<_> = grid.windows.keys().copied().collect();
        windows.sort_unstable();
        assert_eq!(windows, vec![-1, 0, 1, 2]);
        assert_eq!(grid.largest, 1);
    }

    #[test]
    fn query_counts_multi_window_spans_once() {
        let grid = GridIndex::build_fixed(4, vec![Span::new(0, 40), Span::new(2, 3)]);
        let found = grid.query(&Span::new(0, 40));
        assert_eq!(found, vec![&Span::new(0, 40), &Span::new(2, 3)]);
    }

    #[test]
    fn boundary_touch_across_windows_is_found() {
        let grid = GridIndex::build_fixed(5, vec![Span::new(0, 5)]);
        assert!(grid.touching(&Span::new(5, 7)));
        assert!(!grid.touching(&Span::new(6, 7)));
        assert_eq!(grid.query(&Span::new(5, 5)).len(), 1);
    }

    #[test]
    fn adaptive_insert_stops_at_width_one() {
        let grid = GridIndex::build_adaptive((0..100u32).map(|i| Span::new(i, i + 1)));
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.len(), 100);
        assert_eq!(grid.query(&Span::new(50, 50)).len(), 2);
    }

    #[test]
    fn sparse_occupancy_keeps_width() {
        let mut grid = GridIndex::new(1024i64).with_density(2);
        for i in 0..8 {
            let _ignore = grid.insert_adaptive(Span::new(i * 2048, i * 2048 + 1));
        }
        // Only the very first span, when `1 / 2 == 0`, counts as crowded.
        assert_eq!(grid.width(), 512);
        assert_eq!(grid.window_count(), 8);
    }
}
