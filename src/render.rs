use crate::locate::{locate, Span, TextTree};
use crate::model::ExpressionPair;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Context,
    Expression,
}

pub trait HighlightSink {
    type Node;

    fn clear(&mut self);
    fn mark(&mut self, layer: Layer, span: &Span<Self::Node>);
    fn commit(&mut self);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveSpan<N> {
    pub span: Span<N>,
    pub expression: String,
}

/// Repaint both layers from scratch and return the fresh list of expression
/// occurrences (document order per pair, pairs in creation order).
pub fn render<T, S>(
    tree: &T,
    sink: &mut S,
    pairs: &[ExpressionPair],
    pending_context: Option<&str>,
) -> Vec<ActiveSpan<T::Node>>
where
    T: TextTree,
    S: HighlightSink<Node = T::Node>,
{
    sink.clear();

    let pending_context = pending_context.filter(|text| !text.is_empty());
    if pairs.is_empty() && pending_context.is_none() {
        return Vec::new();
    }

    let mut active = Vec::new();
    for pair in pairs {
        for span in locate(tree, &pair.context) {
            sink.mark(Layer::Context, &span);
        }
        for span in locate(tree, &pair.expression) {
            sink.mark(Layer::Expression, &span);
            active.push(ActiveSpan {
                span,
                expression: pair.expression.clone(),
            });
        }
    }

    if let Some(context) = pending_context {
        for span in locate(tree, context) {
            sink.mark(Layer::Context, &span);
        }
    }

    sink.commit();
    tracing::debug!(
        pairs = pairs.len(),
        expressions = active.len(),
        "rendered highlights"
    );
    active
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::locate::tests::FakeTree;

    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pending: Vec<(Layer, usize, u32, u32)>,
        pub visible: Vec<(Layer, usize, u32, u32)>,
        pub commits: usize,
    }

    impl RecordingSink {
        pub(crate) fn count(&self, layer: Layer) -> usize {
            self.visible.iter().filter(|m| m.0 == layer).count()
        }
    }

    impl HighlightSink for RecordingSink {
        type Node = usize;

        fn clear(&mut self) {
            self.pending.clear();
            self.visible.clear();
        }

        fn mark(&mut self, layer: Layer, span: &Span<usize>) {
            self.pending.push((layer, span.node, span.start, span.end));
        }

        fn commit(&mut self) {
            self.visible = std::mem::take(&mut self.pending);
            self.commits += 1;
        }
    }

    #[test]
    fn paints_context_and_expression_layers() {
        let tree = FakeTree(vec!["the quick brown fox", "brown bread"]);
        let mut sink = RecordingSink::default();
        let pairs = vec![ExpressionPair::new("quick brown fox", "brown")];

        let active = render(&tree, &mut sink, &pairs, None);

        assert_eq!(sink.count(Layer::Context), 1);
        assert_eq!(sink.count(Layer::Expression), 2);
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].span.node, 0);
        assert_eq!(active[1].span.node, 1);
        assert!(active.iter().all(|a| a.expression == "brown"));
    }

    #[test]
    fn pending_context_goes_to_context_layer() {
        let tree = FakeTree(vec!["lazy dog", "lazy cat"]);
        let mut sink = RecordingSink::default();

        let active = render(&tree, &mut sink, &[], Some("lazy"));

        assert!(active.is_empty());
        assert_eq!(sink.count(Layer::Context), 2);
        assert_eq!(sink.count(Layer::Expression), 0);
    }

    #[test]
    fn empty_state_only_clears() {
        let tree = FakeTree(vec!["lazy dog"]);
        let mut sink = RecordingSink::default();
        render(&tree, &mut sink, &[], Some("lazy"));
        assert_eq!(sink.commits, 1);

        let active = render(&tree, &mut sink, &[], None);
        assert!(active.is_empty());
        assert!(sink.visible.is_empty());
        assert_eq!(sink.commits, 1);
    }

    #[test]
    fn rendering_twice_is_idempotent() {
        let tree = FakeTree(vec!["a b a", "b a"]);
        let pairs = vec![ExpressionPair::new("a b", "a"), ExpressionPair::new("b a", "b")];
        let mut sink = RecordingSink::default();

        let first = render(&tree, &mut sink, &pairs, Some("a"));
        let first_visible = sink.visible.clone();
        let second = render(&tree, &mut sink, &pairs, Some("a"));

        assert_eq!(first, second);
        assert_eq!(first_visible, sink.visible);
    }
}
