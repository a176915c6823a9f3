use std::cmp;

use span_index::{BucketedIndex, CenteredTree, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringKey {
    /// String
    String(String),
    /// Unbounded
    Unbounded,
}

impl StringKey {
    pub fn new_key(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl PartialOrd for StringKey {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StringKey {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (self, other) {
            (StringKey::String(x), StringKey::String(y)) => x.cmp(y),
            (StringKey::String(_), StringKey::Unbounded) => cmp::Ordering::Less,
            (StringKey::Unbounded, StringKey::String(_)) => cmp::Ordering::Greater,
            (StringKey::Unbounded, StringKey::Unbounded) => cmp::Ordering::Equal,
        }
    }
}

fn main() {
    // Key ranges ordered through `Ord`.
    let mut index = BucketedIndex::new();
    index.insert(Span::new(StringKey::new_key("8"), StringKey::Unbounded));
    index.insert(Span::new(StringKey::new_key("a"), StringKey::new_key("c")));
    assert!(index.touching(&Span::point(StringKey::new_key("9"))));
    assert!(!index.touching(&Span::point(StringKey::new_key("7"))));

    // Plain strings ordered by a closure that ignores ASCII case.
    let caseless = |a: &String, b: &String| {
        a.bytes()
            .map(|c| c.to_ascii_lowercase())
            .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
    };
    let span = |l: &str, r: &str| Span::new_by(l.to_string(), r.to_string(), &caseless);
    let spans = vec![span("Apple", "cherry"), span("melon", "Peach")];
    let tree: CenteredTree<String, Span<String>, _> = CenteredTree::build_by(spans, caseless);
    assert!(tree.touching(&span("banana", "BANANA")));
    assert!(tree.contains_point(&"Nectarine".to_string()));
    assert!(!tree.touching(&span("date", "lime")));
}
