#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::{IndexType, NodeIndex};

/// Node of the centered interval tree
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node<T, S, Ix> {
    /// Left endpoint of the median span this node was split on
    pub center: T,
    /// Spans crossing the center, ascending by left
    pub by_left: Vec<S>,
    /// Positions into `by_left`, ascending by right
    pub by_right: Vec<usize>,
    /// Subtree of spans ending at or before the center
    pub left: Option<NodeIndex<Ix>>,
    /// Subtree of spans starting after the center
    pub right: Option<NodeIndex<Ix>>,
}

impl<T, S, Ix> Node<T, S, Ix>
where
    Ix: IndexType,
{
    pub fn center(&self) -> &T {
        &self.center
    }

    pub fn left(&self) -> Option<NodeIndex<Ix>> {
        self.left
    }

    pub fn right(&self) -> Option<NodeIndex<Ix>> {
        self.right
    }

    /// Spans in descending order of their right endpoint.
    pub fn descending_right(&self) -> impl Iterator<Item = &S> + '_ {
        self.by_right.iter().rev().map(|&pos| &self.by_left[pos])
    }

    pub fn set_left(left: Option<NodeIndex<Ix>>) -> impl FnOnce(&mut Node<T, S, Ix>) {
        move |node: &mut Node<T, S, Ix>| {
            node.left = left;
        }
    }

    pub fn set_right(right: Option<NodeIndex<Ix>>) -> impl FnOnce(&mut Node<T, S, Ix>) {
        move |node: &mut Node<T, S, Ix>| {
            node.right = right;
        }
    }
}
