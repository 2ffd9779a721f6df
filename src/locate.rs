pub trait TextTree {
    type Node: Clone;

    fn text_nodes(&self) -> Vec<(Self::Node, String)>;
}

/// One occurrence of a string inside a single text node. Offsets are UTF-16
/// code units, which is what DOM ranges are addressed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span<N> {
    pub node: N,
    pub start: u32,
    pub end: u32,
}

/// Every exact, case-sensitive occurrence of `needle`, in document order and
/// left to right within a node. The cursor jumps past each match, so
/// overlapping occurrences are not reported.
pub fn locate<T: TextTree>(tree: &T, needle: &str) -> Vec<Span<T::Node>> {
    if needle.is_empty() {
        return Vec::new();
    }

    let needle_units = utf16_len(needle);
    let mut spans = Vec::new();
    for (node, text) in tree.text_nodes() {
        let mut byte_cursor = 0usize;
        let mut unit_cursor = 0u32;
        while let Some(found) = text[byte_cursor..].find(needle) {
            let match_start = byte_cursor + found;
            let start = unit_cursor + utf16_len(&text[byte_cursor..match_start]);
            let end = start + needle_units;
            spans.push(Span {
                node: node.clone(),
                start,
                end,
            });
            byte_cursor = match_start + needle.len();
            unit_cursor = end;
        }
    }
    spans
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct FakeTree(pub Vec<&'static str>);

    impl TextTree for FakeTree {
        type Node = usize;

        fn text_nodes(&self) -> Vec<(usize, String)> {
            self.0
                .iter()
                .enumerate()
                .map(|(idx, text)| (idx, text.to_string()))
                .collect()
        }
    }

    fn offsets(spans: &[Span<usize>]) -> Vec<(usize, u32, u32)> {
        spans.iter().map(|s| (s.node, s.start, s.end)).collect()
    }

    #[test]
    fn finds_every_occurrence_in_document_order() {
        let tree = FakeTree(vec!["a cat and a cat", "no match", "cat"]);
        let spans = locate(&tree, "cat");
        assert_eq!(offsets(&spans), vec![(0, 2, 5), (0, 12, 15), (2, 0, 3)]);
        assert_eq!(locate(&tree, "cat"), spans);
    }

    #[test]
    fn skips_overlapping_matches() {
        let tree = FakeTree(vec!["aaaa"]);
        assert_eq!(offsets(&locate(&tree, "aa")), vec![(0, 0, 2), (0, 2, 4)]);
    }

    #[test]
    fn empty_needle_finds_nothing() {
        let tree = FakeTree(vec!["anything"]);
        assert!(locate(&tree, "").is_empty());
    }

    #[test]
    fn search_is_case_and_whitespace_sensitive() {
        let tree = FakeTree(vec!["Brown brown  brown"]);
        assert_eq!(offsets(&locate(&tree, "brown")), vec![(0, 6, 11), (0, 13, 18)]);
        assert!(locate(&tree, "brown brown").is_empty());
    }

    #[test]
    fn offsets_are_utf16_units() {
        // "ș" is one UTF-16 unit but two bytes; the emoji is two units.
        let tree = FakeTree(vec!["mașină 😀 mașină"]);
        assert_eq!(offsets(&locate(&tree, "mașină")), vec![(0, 0, 6), (0, 10, 16)]);
    }

    #[test]
    fn matches_do_not_cross_node_boundaries() {
        let tree = FakeTree(vec!["quick br", "own fox"]);
        assert!(locate(&tree, "brown").is_empty());
    }
}
