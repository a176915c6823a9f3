use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::*;

struct SpanGenerator {
    rng: StdRng,
    limit: i32,
}

impl SpanGenerator {
    fn new(seed: [u8; 32]) -> Self {
        const LIMIT: i32 = 1000;
        Self {
            rng: SeedableRng::from_seed(seed),
            limit: LIMIT,
        }
    }

    fn next(&mut self) -> Span<i32> {
        let left = self.rng.gen_range(-self.limit..self.limit);
        let right = self.rng.gen_range(left..self.limit);
        Span::new(left, right)
    }

    fn next_with_range(&mut self, range: i32) -> Span<i32> {
        let left = self.rng.gen_range(-self.limit..self.limit);
        let right = self.rng.gen_range(left..=left + range);
        Span::new(left, right)
    }
}

fn with_generator(test_fn: impl Fn(SpanGenerator)) {
    let seeds = vec![[0; 32], [1; 32], [2; 32]];
    for seed in seeds {
        test_fn(SpanGenerator::new(seed));
    }
}

fn brute_touching<'a>(spans: &'a [Span<i32>], query: &Span<i32>) -> Vec<&'a Span<i32>> {
    spans.iter().filter(|s| s.touches(query)).collect()
}

fn multiset<'a>(spans: impl IntoIterator<Item = &'a Span<i32>>) -> HashMap<Span<i32>, usize> {
    let mut counts = HashMap::new();
    for span in spans {
        *counts.entry(*span).or_insert(0) += 1;
    }
    counts
}

fn sorted(mut spans: Vec<&Span<i32>>) -> Vec<&Span<i32>> {
    spans.sort_unstable();
    spans
}

impl<T, S, C, Ix> CenteredTree<T, S, C, Ix>
where
    T: Clone,
    S: Spanned<Point = T>,
    C: Comparator<T>,
    Ix: IndexType,
{
    /// Every span sits at the node whose center it crosses, and the subtrees only hold spans
    /// strictly on their side.
    fn check_partition(&self) {
        if let Some(root) = self.root {
            self.check_partition_inner(root, None, None);
        }
    }

    fn check_partition_inner(&self, x: NodeIndex<Ix>, lo: Option<&T>, hi: Option<&T>) {
        let node = &self.nodes[x.index()];
        let center = node.center();
        for span in &node.by_left {
            assert!(self.cmp.compare(span.left(), center).is_le());
            assert!(self.cmp.compare(center, span.right()).is_le());
            if let Some(lo) = lo {
                assert!(self.cmp.compare(span.left(), lo).is_gt());
            }
            if let Some(hi) = hi {
                assert!(self.cmp.compare(span.right(), hi).is_le());
            }
        }
        if let Some(left) = node.left() {
            self.check_partition_inner(left, lo, Some(center));
        }
        if let Some(right) = node.right() {
            self.check_partition_inner(right, Some(center), hi);
        }
    }
}

#[test]
fn bucketed_scenario_is_ok() {
    let mut index = BucketedIndex::new();
    index.insert(Span::new(0, 1));
    index.insert(Span::new(-5, 22));
    index.insert(Span::new(3, 4));
    assert!(index.touching(&Span::new(2, 2)));
    assert!(!index.touching(&Span::new(100, 200)));
    assert!(index.touching(&Span::new(22, 200)));
}

#[test]
fn bucketed_touching_agrees_with_brute_force() {
    with_generator(|mut gen| {
        let mut index = BucketedIndex::new();
        let mut spans = Vec::new();
        for _ in 0..1000 {
            let span = gen.next_with_range(10);
            index.insert(span);
            spans.push(span);
            let query = gen.next_with_range(10);
            let expect = spans.iter().any(|s| s.touches(&query));
            assert_eq!(index.touching(&query), expect, "{query:?}");
        }
        for _ in 0..1000 {
            let query = gen.next_with_range(30);
            assert_eq!(
                sorted(index.collect_touching(&query)),
                sorted(brute_touching(&spans, &query))
            );
        }
    });
}

#[test]
fn bucketed_insert_is_reflexive() {
    with_generator(|mut gen| {
        let mut index = BucketedIndex::new();
        for _ in 0..500 {
            let span = gen.next();
            index.insert(span);
            assert!(index.touching(&span));
        }
        assert_eq!(index.len(), 500);
    });
}

#[test]
fn bucketed_iter_sorted_is_sorted() {
    with_generator(|mut gen| {
        let mut index = BucketedIndex::new();
        for round in 0..10 {
            for _ in 0..100 {
                index.insert(gen.next());
            }
            let lefts: Vec<_> = index.iter_sorted().map(|s| s.left).collect();
            assert_eq!(lefts.len(), (round + 1) * 100);
            assert!(lefts.windows(2).all(|w| w[0] <= w[1]));
        }
    });
}

#[test]
fn bucketed_iter_sorted_is_restartable() {
    let mut index: BucketedIndex<i32> = (0..50).rev().map(|i| Span::new(i, i + 3)).collect();
    let first: Vec<_> = index.iter_sorted().copied().collect();
    let second: Vec<_> = index.iter_sorted().copied().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 50);
    assert_eq!(index.iter_sorted().len(), 50);
}

#[test]
fn rebalance_preserves_membership() {
    with_generator(|mut gen| {
        let mut index = BucketedIndex::new();
        let mut spans = Vec::new();
        let mut rebalances = 0;
        for _ in 0..2000 {
            let span = gen.next_with_range(5);
            let buckets_before = index.bucket_count();
            index.insert(span);
            spans.push(span);
            if index.bucket_count() != buckets_before && buckets_before > 0 {
                rebalances += 1;
                assert_eq!(multiset(index.iter_sorted()), multiset(&spans));
            }
        }
        let before = multiset(index.iter());
        index.rebalance();
        assert_eq!(multiset(index.iter()), before);
        assert_eq!(before, multiset(&spans));
        assert!(rebalances > 0);
        assert!(index.bucket_count() <= 45);
    });
}

#[test]
fn bucketed_custom_comparator_is_ok() {
    // Points ordered by distance from zero, ties broken by sign.
    let by_magnitude = |a: &i32, b: &i32| a.abs().cmp(&b.abs()).then(a.cmp(b));
    let mut index = BucketedIndex::with_comparator(by_magnitude);
    index.insert(Span::new_by(-3, 5, &by_magnitude));
    index.insert(Span::new_by(10, -20, &by_magnitude));
    assert!(index.touching(&Span::new_by(4, 6, &by_magnitude)));
    assert!(index.touching(&Span::new_by(-15, -15, &by_magnitude)));
    assert!(!index.touching(&Span::new_by(-7, -7, &by_magnitude)));
    assert!(!index.touching(&Span::new_by(6, 8, &by_magnitude)));
    let lefts: Vec<_> = index.iter_sorted().map(|s| s.left).collect();
    assert_eq!(lefts, vec![-3, 10]);
}

#[test]
fn centered_scenario_is_ok() {
    let tree = CenteredTree::build(vec![Span::new(0, 10), Span::new(20, 30), Span::new(15, 16)]);
    assert!(tree.touching(&Span::new(3, 5)));
    assert!(tree.touching(&Span::new(8, 12)));
    assert!(tree.touching(&Span::new(10, 11)));
    assert!(tree.touching(&Span::new(18, 22)));
    assert!(tree.touching(&Span::new(18, 20)));
    assert!(!tree.touching(&Span::new(17, 19)));

    assert!(tree.contains_point(&0));
    assert!(!tree.contains_point(&10));
    assert!(tree.contains_point(&15));
    assert!(!tree.contains_point(&16));
    assert!(!tree.contains_point(&18));
    assert!(tree.contains_point(&29));
    assert!(!tree.contains_point(&30));
}

#[test]
fn centered_touching_agrees_with_brute_force() {
    with_generator(|mut gen| {
        let spans: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(20))
            .take(1000)
            .collect();
        let tree = CenteredTree::build(spans.clone());
        for _ in 0..1000 {
            let query = gen.next_with_range(20);
            let expect = brute_touching(&spans, &query);
            assert_eq!(tree.touching(&query), !expect.is_empty(), "{query:?}");
            assert_eq!(sorted(tree.collect_touching(&query)), sorted(expect));
        }
    });
}

#[test]
fn centered_contains_point_agrees_with_brute_force() {
    with_generator(|mut gen| {
        let spans: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(15))
            .take(500)
            .collect();
        let tree = CenteredTree::build(spans.clone());
        for point in -1000..1000 {
            let expect: Vec<_> = spans.iter().filter(|s| s.contains(&point)).collect();
            assert_eq!(tree.contains_point(&point), !expect.is_empty(), "{point}");
            assert_eq!(sorted(tree.collect_containing(&point)), sorted(expect));
        }
    });
}

#[test]
fn centered_insert_is_reflexive() {
    with_generator(|mut gen| {
        let spans: Vec<_> = std::iter::repeat_with(|| gen.next()).take(1000).collect();
        let tree = CenteredTree::build(spans.clone());
        for span in &spans {
            assert!(tree.touching(span));
        }
    });
}

#[test]
fn centered_partition_is_total() {
    with_generator(|mut gen| {
        let mut spans: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(40))
            .take(1000)
            .collect();
        // Repeated and zero-width spans on top.
        spans.extend(std::iter::repeat(Span::new(7, 7)).take(30));
        spans.extend(std::iter::repeat(Span::new(7, 9)).take(30));
        let tree = CenteredTree::build(spans.clone());
        assert_eq!(tree.len(), spans.len());
        assert_eq!(multiset(tree.iter()), multiset(&spans));
        tree.check_partition();
        // Halving the count per level keeps the tree shallow on random input.
        assert!(tree.depth() <= 32, "depth {}", tree.depth());
    });
}

#[test]
fn centered_custom_comparator_is_ok() {
    let rev = |a: &i32, b: &i32| b.cmp(a);
    let spans = vec![
        Span::new_by(30, 20, &rev),
        Span::new_by(10, 0, &rev),
        Span::new_by(16, 15, &rev),
    ];
    let tree: CenteredTree<i32, Span<i32>, _> = CenteredTree::build_by(spans, rev);
    tree.check_partition();
    assert!(tree.touching(&Span::new_by(11, 10, &rev)));
    assert!(!tree.touching(&Span::new_by(19, 17, &rev)));
    // Under the reversed order [10, 0] is half-open at 0.
    assert!(tree.contains_point(&10));
    assert!(!tree.contains_point(&0));
}

#[test]
fn tuple_and_range_spans_are_indexed() {
    let tree: CenteredTree<usize, std::ops::Range<usize>> =
        CenteredTree::build(vec![0..4, 4..9, 12..20]);
    assert_eq!(tree.collect_touching(&(4..4)).len(), 2);
    assert_eq!(tree.collect_containing(&4), vec![&(4..9)]);

    let mut index: BucketedIndex<u8, (u8, u8)> = BucketedIndex::new();
    index.insert((1, 2));
    index.insert((5, 9));
    assert!(index.touching(&(2, 3)));
    assert!(!index.touching(&(3, 4)));

    let grid: GridIndex<u64, (u64, u64)> = GridIndex::build_fixed(3, vec![(1, 2), (5, 9)]);
    assert_eq!(grid.query(&(2, 5)), vec![&(1, 2), &(5, 9)]);
}

#[test]
fn grid_query_agrees_with_brute_force() {
    with_generator(|mut gen| {
        let spans: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(50))
            .take(1000)
            .collect();
        for width in [1, 7, 64, 1000] {
            let grid = GridIndex::build_fixed(width, spans.clone());
            for _ in 0..200 {
                let query = gen.next_with_range(50);
                let expect = brute_touching(&spans, &query);
                assert_eq!(grid.touching(&query), !expect.is_empty());
                assert_eq!(grid.query(&query), expect, "width {width} {query:?}");
            }
        }
    });
}

#[test]
fn grid_insert_is_reflexive() {
    with_generator(|mut gen| {
        let spans: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(30))
            .take(500)
            .collect();
        let grid = GridIndex::build_adaptive(spans.clone());
        for span in &spans {
            assert!(grid.query(span).contains(&span));
        }
    });
}

#[test]
fn adaptive_grid_matches_fixed_grid_at_final_width() {
    with_generator(|mut gen| {
        let spans: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(30))
            .take(600)
            .collect();
        let mut adaptive = GridIndex::new(i32::MAX).with_density(4);
        for (i, span) in spans.iter().enumerate() {
            assert_eq!(adaptive.insert_adaptive(*span), i);
        }
        assert!(adaptive.width() < i32::MAX);
        let fixed = GridIndex::build_fixed(adaptive.width(), spans.clone());
        assert_eq!(fixed.window_count(), adaptive.window_count());
        for _ in 0..500 {
            let query = gen.next_with_range(60);
            assert_eq!(adaptive.query(&query), fixed.query(&query), "{query:?}");
        }
    });
}

#[test]
fn all_structures_agree() {
    with_generator(|mut gen| {
        let spans: Vec<_> = std::iter::repeat_with(|| gen.next_with_range(25))
            .take(800)
            .collect();
        let mut index: BucketedIndex<i32> = spans.iter().copied().collect();
        let tree = CenteredTree::build(spans.clone());
        let grid = GridIndex::build_adaptive(spans.clone());
        for _ in 0..500 {
            let query = gen.next_with_range(25);
            let expect = sorted(brute_touching(&spans, &query));
            assert_eq!(sorted(index.collect_touching(&query)), expect);
            assert_eq!(sorted(tree.collect_touching(&query)), expect);
            assert_eq!(sorted(grid.query(&query)), expect);
        }
        let from_index: Vec<_> = index.iter_sorted().map(|s| s.left).collect();
        let mut lefts: Vec<_> = spans.iter().map(|s| s.left).collect();
        lefts.sort_unstable();
        assert_eq!(from_index, lefts);
    });
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trip() {
    use serde_json::{json, Value};

    let span = Span::new(1, 5);
    let value: Value = serde_json::to_value(span).unwrap();
    assert_eq!(value, json!({ "left": 1, "right": 5 }));

    let spans = vec![Span::new(0, 10), Span::new(20, 30), Span::new(15, 16)];

    let mut index: BucketedIndex<i32> = spans.iter().copied().collect();
    let serialized = serde_json::to_string(&index).unwrap();
    let mut restored: BucketedIndex<i32> = serde_json::from_str(&serialized).unwrap();
    let ev: Vec<_> = index.iter_sorted().copied().collect();
    let dv: Vec<_> = restored.iter_sorted().copied().collect();
    assert_eq!(ev, dv);

    let tree = CenteredTree::build(spans.clone());
    let serialized = serde_json::to_string(&tree).unwrap();
    let restored: CenteredTree<i32> = serde_json::from_str(&serialized).unwrap();
    assert_eq!(restored.depth(), tree.depth());
    assert!(restored.touching(&Span::new(18, 20)));

    let grid = GridIndex::build_fixed(8, spans);
    let serialized = serde_json::to_string(&grid).unwrap();
    let restored: GridIndex<i32> = serde_json::from_str(&serialized).unwrap();
    assert_eq!(restored.query(&Span::new(16, 20)), grid.query(&Span::new(16, 20)));
}
