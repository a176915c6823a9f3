use span_index::{BucketedIndex, CenteredTree, GridIndex, Span};

fn main() {
    let spans = vec![Span::new(3, 7), Span::new(2, 6), Span::point(5)];

    let tmp_point = Span::point(5u32);
    assert_eq!(tmp_point, Span::new(5, 5));

    // A zero-width span still touches everything sharing its coordinate.
    let mut index: BucketedIndex<u32> = spans.iter().copied().collect();
    assert_eq!(index.collect_touching(&tmp_point).len(), 3);
    assert!(index.touching(&Span::point(7)));

    // Point containment is half-open, so the zero-width span never contains anything.
    let tree = CenteredTree::build(spans.clone());
    assert_eq!(tree.collect_containing(&5).len(), 2);
    assert!(!tree.contains_point(&7));

    let grid = GridIndex::build_fixed(4, spans);
    assert_eq!(grid.query(&Span::point(6)).len(), 2);

    let lefts: Vec<_> = index.iter_sorted().map(|s| s.left).collect();
    assert_eq!(lefts, vec![2, 3, 5]);
}
