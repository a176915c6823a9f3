//! `span_index` indexes one-dimensional spans over an ordered domain and answers
//! "does anything touch this span" and "which spans touch this span" queries.
//!
//! Three structures share one span algebra:
//!
//! - [`BucketedIndex`]: mutable, insert-heavy workloads. Spans are grouped into buckets with
//!   cached bounding spans, and the buckets are rebalanced into `ceil(sqrt(n))` groups when
//!   one of them grows too large.
//! - [`CenteredTree`]: read-mostly workloads. Built once from a batch, never mutated, and
//!   answers touching and point queries in logarithmic-plus-matches time on well-distributed
//!   input.
//! - [`GridIndex`]: integer coordinates. Spans are bucketed into fixed-width windows whose
//!   width can shrink adaptively as the index fills up.
//!
//! Spans are closed: [0, 1] and [1, 5] touch. Point containment is the one half-open
//! operation, `left <= p < right`, and carries its own name.
//!
//! Every structure is generic over the stored span type (anything implementing [`Spanned`])
//! and, except the grid, over a [`Comparator`] for the point domain. None of them is
//! internally synchronized and there is no removal.
//!
//! # Example
//!
//! ```rust
//! use span_index::{BucketedIndex, CenteredTree, GridIndex, Span};
//!
//! let spans = vec![Span::new(0, 10), Span::new(20, 30), Span::new(15, 16)];
//!
//! let mut index: BucketedIndex<i32> = spans.iter().copied().collect();
//! assert!(index.touching(&Span::new(10, 11)));
//! assert_eq!(index.iter_sorted().count(), 3);
//!
//! let tree = CenteredTree::build(spans.clone());
//! assert!(tree.touching(&Span::new(18, 20)));
//! assert!(!tree.contains_point(&10));
//!
//! let grid = GridIndex::build_fixed(8, spans);
//! assert_eq!(grid.query(&Span::new(16, 20)).len(), 2);
//! ```
//!

pub mod algebra;
mod bucket;
mod bucketed;
mod centered;
mod cmp;
mod grid;
mod index;
mod iter;
mod node;
mod span;

#[cfg(test)]
mod tests;

pub use bucketed::{BucketedIndex, DEFAULT_SLACK};
pub use centered::CenteredTree;
pub use cmp::{Comparator, OrdComparator};
pub use grid::{GridCoord, GridIndex, DEFAULT_DENSITY};
pub use index::{DefaultIx, IndexType, NodeIndex};
pub use iter::SortedIter;
pub use span::{Span, Spanned};
