use std::cmp::Ordering;
use std::ops::ControlFlow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algebra;
use crate::cmp::{Comparator, OrdComparator};
use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::node::Node;
use crate::span::{Span, Spanned};

/// An immutable centered interval tree, built once from a batch of spans.
///
/// Every node picks a center (the left endpoint of the median span by left) and keeps the
/// spans crossing it in two orders: ascending by left and ascending by right. Spans entirely
/// before the center go to the left subtree, spans entirely after it to the right subtree.
///
/// The depth comes from halving the *count* of spans at every level, so it is logarithmic for
/// well-distributed left endpoints. Inputs where a large share of spans end exactly at or
/// start just after repeated centers can make the tree deeper; no depth bound is guaranteed.
///
/// Nodes are stored in an arena and address their children through [`NodeIndex`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CenteredTree<T, S = Span<T>, C = OrdComparator, Ix = DefaultIx> {
    /// Vector that stores nodes
    pub(crate) nodes: Vec<Node<T, S, Ix>>,
    /// Root of the tree, `None` for an empty tree
    pub(crate) root: Option<NodeIndex<Ix>>,
    /// Number of spans in the tree
    pub(crate) len: usize,
    /// Order of the point domain
    pub(crate) cmp: C,
}

/// Where a query lies relative to a node's center.
enum Position {
    /// The query ends at or before the center
    Before,
    /// `query.left <= center < query.right`
    Straddles,
    /// The query starts after the center
    After,
}

/// Which group a span is assigned to while building a node.
enum Side {
    Left,
    Center,
    Right,
}

impl<T, S> CenteredTree<T, S>
where
    T: Ord + Clone,
    S: Spanned<Point = T>,
{
    /// Build a tree ordered by `Ord`.
    ///
    /// # Example
    /// ```rust
    /// use span_index::{CenteredTree, Span};
    ///
    /// let tree = CenteredTree::build(vec![Span::new(0, 10), Span::new(20, 30), Span::new(15, 16)]);
    /// assert!(tree.touching(&Span::new(10, 11)));
    /// assert!(!tree.touching(&Span::new(17, 19)));
    /// assert!(tree.contains_point(&15));
    /// assert!(!tree.contains_point(&16));
    /// ```
    #[inline]
    #[must_use]
    pub fn build<I: IntoIterator<Item = S>>(spans: I) -> Self {
        Self::build_by(spans, OrdComparator)
    }
}

impl<T, S, C, Ix> CenteredTree<T, S, C, Ix>
where
    T: Clone,
    S: Spanned<Point = T>,
    C: Comparator<T>,
    Ix: IndexType,
{
    /// Build a tree ordered by `cmp`. An empty batch gives an empty tree.
    ///
    /// # Panics
    ///
    /// This method panics when the tree needs more nodes than `Ix` can address
    #[must_use]
    pub fn build_by<I: IntoIterator<Item = S>>(spans: I, cmp: C) -> Self {
        let spans: Vec<S> = spans.into_iter().collect();
        let mut tree = CenteredTree {
            nodes: Vec::new(),
            root: None,
            len: spans.len(),
            cmp,
        };
        tree.root = tree.build_node(spans);
        debug!(
            len = tree.len,
            nodes = tree.nodes.len(),
            depth = tree.depth(),
            "built centered interval tree"
        );
        tree
    }

    /// Check if any span in the tree touches `query`, boundaries included.
    ///
    /// # Example
    /// ```rust
    /// use span_index::{CenteredTree, Span};
    ///
    /// let tree = CenteredTree::build(vec![Span::new(1, 3), Span::new(6, 7), Span::new(9, 11)]);
    /// assert!(tree.touching(&Span::new(3, 5)));
    /// assert!(tree.touching(&Span::new(7, 9)));
    /// assert!(!tree.touching(&Span::new(4, 5)));
    /// assert!(!tree.touching(&Span::new(12, 23)));
    /// ```
    #[inline]
    pub fn touching<Q>(&self, query: &Q) -> bool
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        self.visit_touching(query, |_| ControlFlow::Break(()))
            .is_break()
    }

    /// Find all spans in the tree that touch `query`.
    ///
    /// # Example
    /// ```rust
    /// use span_index::{CenteredTree, Span};
    ///
    /// let tree = CenteredTree::build(vec![
    ///     Span::new(1, 3),
    ///     Span::new(2, 4),
    ///     Span::new(6, 7),
    ///     Span::new(7, 11),
    /// ]);
    /// assert_eq!(tree.collect_touching(&Span::new(4, 6)).len(), 2);
    /// assert_eq!(tree.collect_touching(&Span::new(5, 5)).len(), 0);
    /// ```
    pub fn collect_touching<Q>(&self, query: &Q) -> Vec<&S>
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        let mut found = Vec::new();
        let _ignore = self.visit_touching(query, |span| {
            found.push(span);
            ControlFlow::Continue(())
        });
        found
    }

    /// Check if any span contains `point`, reading spans as half-open `[left, right)`.
    #[inline]
    pub fn contains_point(&self, point: &T) -> bool {
        self.visit_containing(point, |_| ControlFlow::Break(()))
            .is_break()
    }

    /// Find all spans that contain `point`, reading spans as half-open `[left, right)`.
    pub fn collect_containing(&self, point: &T) -> Vec<&S> {
        let mut found = Vec::new();
        let _ignore = self.visit_containing(point, |span| {
            found.push(span);
            ControlFlow::Continue(())
        });
        found
    }

    /// Return the number of spans in the tree.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` if the tree holds no spans.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Return the number of nodes in the tree.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of nodes on the longest root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeIndex<Ix>, usize)> =
            self.root.map(|x| (x, 1)).into_iter().collect();
        while let Some((x, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = self.node_ref(x, |node| node);
            stack.extend(node.left().map(|l| (l, depth + 1)));
            stack.extend(node.right().map(|r| (r, depth + 1)));
        }
        deepest
    }

    /// Get an iterator over every span, node by node. Each span appears exactly once.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &S> + '_ {
        self.nodes.iter().flat_map(|node| node.by_left.iter())
    }
}

impl<T, S, C, Ix> CenteredTree<T, S, C, Ix>
where
    T: Clone,
    S: Spanned<Point = T>,
    C: Comparator<T>,
    Ix: IndexType,
{
    /// Build the subtree for `spans` and return its root.
    fn build_node(&mut self, mut spans: Vec<S>) -> Option<NodeIndex<Ix>> {
        if spans.is_empty() {
            return None;
        }
        if !algebra::is_sorted_by_left(&self.cmp, &spans) {
            algebra::sort_spans(&self.cmp, &mut spans);
        }
        let center = spans[spans.len() / 2].left().clone();

        let mut by_left = Vec::new();
        let mut to_left = Vec::new();
        let mut to_right = Vec::new();
        for span in spans {
            match self.side_of(&center, &span) {
                Side::Left => to_left.push(span),
                Side::Center => by_left.push(span),
                Side::Right => to_right.push(span),
            }
        }
        let mut by_right: Vec<usize> = (0..by_left.len()).collect();
        by_right.sort_by(|&a, &b| algebra::cmp_right(&self.cmp, &by_left[a], &by_left[b]));

        let node_idx = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != node_idx,
            "Reached maximum number of nodes"
        );
        self.nodes.push(Node {
            center,
            by_left,
            by_right,
            left: None,
            right: None,
        });

        let left = self.build_node(to_left);
        self.node_mut(node_idx, Node::set_left(left));
        let right = self.build_node(to_right);
        self.node_mut(node_idx, Node::set_right(right));
        Some(node_idx)
    }

    /// Assign a span to the center list or one of the subtrees.
    ///
    /// A span stays at the node when `left <= center < right`. The zero-width span
    /// `[center, center]` also stays, which keeps the median span at its node and makes every
    /// recursion strictly smaller.
    fn side_of(&self, center: &T, span: &S) -> Side {
        let left = self.cmp.compare(span.left(), center);
        let right = self.cmp.compare(span.right(), center);
        if left.is_gt() {
            Side::Right
        } else if right.is_gt() || (left.is_eq() && right.is_eq()) {
            Side::Center
        } else {
            Side::Left
        }
    }

    fn position<Q>(&self, center: &T, query: &Q) -> Position
    where
        Q: Spanned<Point = T> + ?Sized,
    {
        if self.cmp.compare(query.right(), center).is_le() {
            Position::Before
        } else if self.cmp.compare(query.left(), center).is_le() {
            Position::Straddles
        } else {
            Position::After
        }
    }

    /// Call `f` on spans touching `query` until it breaks.
    fn visit_touching<'a, Q, F>(&'a self, query: &Q, mut f: F) -> ControlFlow<()>
    where
        Q: Spanned<Point = T> + ?Sized,
        F: FnMut(&'a S) -> ControlFlow<()>,
    {
        let cmp = &self.cmp;
        let mut stack: Vec<NodeIndex<Ix>> = self.root.into_iter().collect();
        while let Some(x) = stack.pop() {
            let node = self.node_ref(x, |node| node);
            match self.position(node.center(), query) {
                Position::Straddles => {
                    for span in &node.by_left {
                        if algebra::touching(cmp, span, query) && f(span).is_break() {
                            return ControlFlow::Break(());
                        }
                    }
                    stack.extend(node.right());
                    stack.extend(node.left());
                }
                Position::Before => {
                    let candidates = node
                        .by_left
                        .iter()
                        .take_while(|span| cmp.compare(span.left(), query.right()).is_le());
                    for span in candidates {
                        if algebra::touching(cmp, span, query) && f(span).is_break() {
                            return ControlFlow::Break(());
                        }
                    }
                    stack.extend(node.left());
                }
                Position::After => {
                    let candidates = node
                        .descending_right()
                        .take_while(|span| cmp.compare(span.right(), query.left()).is_ge());
                    for span in candidates {
                        if algebra::touching(cmp, span, query) && f(span).is_break() {
                            return ControlFlow::Break(());
                        }
                    }
                    stack.extend(node.right());
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Call `f` on spans containing `point` until it breaks.
    fn visit_containing<'a, F>(&'a self, point: &T, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(&'a S) -> ControlFlow<()>,
    {
        let cmp = &self.cmp;
        let mut cur = self.root;
        while let Some(x) = cur {
            let node = self.node_ref(x, |node| node);
            match cmp.compare(point, node.center()) {
                Ordering::Equal => {
                    for span in &node.by_left {
                        if algebra::contains_point(cmp, span, point) && f(span).is_break() {
                            return ControlFlow::Break(());
                        }
                    }
                    // Subtree spans end at or start after the center, neither holds it.
                    return ControlFlow::Continue(());
                }
                Ordering::Less => {
                    let candidates = node
                        .by_left
                        .iter()
                        .take_while(|span| cmp.compare(span.left(), point).is_le());
                    for span in candidates {
                        if algebra::contains_point(cmp, span, point) && f(span).is_break() {
                            return ControlFlow::Break(());
                        }
                    }
                    cur = node.left();
                }
                Ordering::Greater => {
                    let candidates = node
                        .descending_right()
                        .take_while(|span| cmp.compare(span.right(), point).is_gt());
                    for span in candidates {
                        if algebra::contains_point(cmp, span, point) && f(span).is_break() {
                            return ControlFlow::Break(());
                        }
                    }
                    cur = node.right();
                }
            }
        }
        ControlFlow::Continue(())
    }
}

// Convenient methods for reference or mutate nodes
impl<'a, T, S, C, Ix> CenteredTree<T, S, C, Ix>
where
    Ix: IndexType,
{
    fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, S, Ix>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, S, Ix>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }
}

impl<T, S> FromIterator<S> for CenteredTree<T, S>
where
    T: Ord + Clone,
    S: Spanned<Point = T>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::build(iter)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_batch_builds_empty_tree() {
        let tree = CenteredTree::<i32>::build(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.depth(), 0);
        assert!(!tree.touching(&Span::new(0, 100)));
        assert!(!tree.contains_point(&0));
        assert!(tree.collect_touching(&Span::new(0, 100)).is_empty());
    }

    #[test]
    fn identical_zero_width_spans_terminate() {
        let tree = CenteredTree::build(vec![Span::point(5); 64]);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.collect_touching(&Span::new(0, 5)).len(), 64);
        assert!(!tree.touching(&Span::new(6, 9)));
        assert!(!tree.contains_point(&5));
    }

    #[test]
    fn root_center_is_left_of_median() {
        let tree = CenteredTree::build(vec![Span::new(0, 10), Span::new(20, 30), Span::new(15, 16)]);
        let root = tree.root.map(|x| *tree.node_ref(x, Node::center));
        assert_eq!(root, Some(15));
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn by_right_view_is_a_permutation_sorted_by_right() {
        let spans: Vec<_> = (0..50).map(|i| Span::new(i % 7, 20 + (i * 13) % 17)).collect();
        let tree = CenteredTree::build(spans);
        for node in &tree.nodes {
            let mut positions = node.by_right.clone();
            positions.sort_unstable();
            assert_eq!(positions, (0..node.by_left.len()).collect::<Vec<_>>());
            let rights: Vec<_> = node.by_right.iter().map(|&p| node.by_left[p].right).collect();
            assert!(rights.windows(2).all(|w| w[0] <= w[1]));
            assert!(algebra::is_sorted_by_left(&OrdComparator, &node.by_left));
        }
    }

    #[test]
    fn small_index_type_addresses_nodes() {
        let spans: Vec<_> = (0..100).map(|i| Span::new(i * 2, i * 2 + 1)).collect();
        let tree: CenteredTree<i32, Span<i32>, OrdComparator, u16> =
            CenteredTree::build_by(spans, OrdComparator);
        assert_eq!(tree.len(), 100);
        assert!(tree.touching(&Span::new(41, 41)));
        assert!(tree.touching(&Span::new(199, 300)));
        assert!(!tree.touching(&Span::new(200, 300)));
        assert!(tree.contains_point(&198));
    }
}
