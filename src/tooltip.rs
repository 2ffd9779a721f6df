use crate::config::Offset;
use crate::locate::Span;
use crate::model::{TranslationRecord, TranslationTable};
use crate::render::ActiveSpan;

const PLACEHOLDER: &str = "N/A";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    // Edges are inclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

pub trait SpanGeometry {
    type Node;

    fn client_rects(&self, span: &Span<Self::Node>) -> Vec<Rect>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
    pub client_x: f64,
    pub client_y: f64,
    pub page_x: f64,
    pub page_y: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum TooltipView {
    #[default]
    Hidden,
    Shown {
        left: f64,
        top: f64,
        lines: Vec<String>,
    },
}

pub fn hovered_record<'a, G: SpanGeometry>(
    geometry: &G,
    active: &[ActiveSpan<G::Node>],
    translations: &'a TranslationTable,
    x: f64,
    y: f64,
) -> Option<&'a TranslationRecord> {
    active
        .iter()
        .filter(|a| {
            geometry
                .client_rects(&a.span)
                .iter()
                .any(|rect| rect.contains(x, y))
        })
        .find_map(|a| translations.get(&a.expression))
}

pub fn evaluate<G: SpanGeometry>(
    geometry: &G,
    active: &[ActiveSpan<G::Node>],
    translations: &TranslationTable,
    pointer: Pointer,
    offset: Offset,
) -> TooltipView {
    match hovered_record(
        geometry,
        active,
        translations,
        pointer.client_x,
        pointer.client_y,
    ) {
        Some(record) => TooltipView::Shown {
            left: pointer.page_x + offset.x,
            top: pointer.page_y + offset.y,
            lines: tooltip_lines(record),
        },
        None => TooltipView::Hidden,
    }
}

pub fn tooltip_lines(record: &TranslationRecord) -> Vec<String> {
    fn or_placeholder(value: &Option<String>) -> &str {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(PLACEHOLDER)
    }

    let synonyms = record
        .synonyms
        .as_ref()
        .map(|s| s.join(", "))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    vec![
        format!("📖 Expression: \"{}\"", record.expression),
        format!("➤ Definition: {}", or_placeholder(&record.definition)),
        format!("🇷🇴 RO: {}", or_placeholder(&record.ro_translation)),
        format!("🇬🇧 UK Pron: {}", or_placeholder(&record.uk_pron)),
        format!("🇺🇸 US Pron: {}", or_placeholder(&record.us_pron)),
        format!("🗣️ Phon (RO): {}", or_placeholder(&record.en_phonetic_ro)),
        format!("🔁 Synonyms: {synonyms}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct GridGeometry;

    impl SpanGeometry for GridGeometry {
        type Node = usize;

        fn client_rects(&self, span: &Span<usize>) -> Vec<Rect> {
            let top = span.node as f64 * 10.0;
            vec![Rect {
                left: span.start as f64 * 10.0,
                top,
                right: span.end as f64 * 10.0,
                bottom: top + 10.0,
            }]
        }
    }

    fn active(node: usize, start: u32, end: u32, expression: &str) -> ActiveSpan<usize> {
        ActiveSpan {
            span: Span { node, start, end },
            expression: expression.to_string(),
        }
    }

    fn table() -> TranslationTable {
        [TranslationRecord {
            expression: "brown".into(),
            definition: Some("color".into()),
            synonyms: Some(vec!["tan".into(), "umber".into()]),
            ..Default::default()
        }]
        .into_iter()
        .collect()
    }

    fn pointer(x: f64, y: f64) -> Pointer {
        Pointer {
            client_x: x,
            client_y: y,
            page_x: x,
            page_y: y + 100.0,
        }
    }

    #[test]
    fn shows_record_under_pointer_with_offset() {
        let spans = vec![active(1, 2, 7, "brown")];
        let view = evaluate(
            &GridGeometry,
            &spans,
            &table(),
            pointer(30.0, 15.0),
            Offset { x: 15.0, y: 20.0 },
        );
        let TooltipView::Shown { left, top, lines } = view else {
            panic!("tooltip should be shown");
        };
        assert_eq!((left, top), (45.0, 135.0));
        assert_eq!(lines[0], "📖 Expression: \"brown\"");
        assert_eq!(lines[1], "➤ Definition: color");
        assert_eq!(lines[2], "🇷🇴 RO: N/A");
        assert_eq!(lines[6], "🔁 Synonyms: tan, umber");
    }

    #[test]
    fn hides_outside_any_span() {
        let spans = vec![active(0, 0, 5, "brown")];
        let view = evaluate(
            &GridGeometry,
            &spans,
            &table(),
            pointer(80.0, 5.0),
            Offset { x: 0.0, y: 0.0 },
        );
        assert_eq!(view, TooltipView::Hidden);
    }

    #[test]
    fn untranslated_span_does_not_shadow_a_translated_one() {
        let spans = vec![active(0, 0, 10, "quick brown"), active(0, 6, 11, "brown")];
        let table = table();
        let record = hovered_record(&GridGeometry, &spans, &table, 70.0, 5.0);
        assert_eq!(record.map(|r| r.expression.as_str()), Some("brown"));
    }

    #[test]
    fn rect_edges_are_inclusive() {
        let rect = Rect {
            left: 0.0,
            top: 0.0,
            right: 10.0,
            bottom: 10.0,
        };
        assert!(rect.contains(10.0, 0.0));
        assert!(!rect.contains(10.1, 5.0));
    }

    #[test]
    fn empty_synonym_list_uses_placeholder() {
        let record = TranslationRecord {
            expression: "x".into(),
            synonyms: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(tooltip_lines(&record)[6], "🔁 Synonyms: N/A");
    }
}
