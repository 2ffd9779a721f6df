//! Browser implementations of the text, highlight, geometry and storage seams.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Node, Range, Storage, Window};

use crate::controller::SelectionSnapshot;
use crate::locate::{Span, TextTree};
use crate::render::{HighlightSink, Layer};
use crate::store::{DurableStore, MemoryStore, PageLocation, StoreError};
use crate::tooltip::{Rect, SpanGeometry};

// NodeFilter.SHOW_TEXT
const SHOW_TEXT: u32 = 0x4;

#[wasm_bindgen]
extern "C" {
    /// CSS Custom Highlight API. Not exposed by `web-sys` without unstable flags.
    type Highlight;

    #[wasm_bindgen(catch, constructor)]
    fn new() -> Result<Highlight, JsValue>;

    #[wasm_bindgen(method)]
    fn add(this: &Highlight, range: &Range);

    #[wasm_bindgen(catch, js_namespace = ["CSS", "highlights"], js_name = set)]
    fn register_highlight(name: &str, highlight: &Highlight) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["CSS", "highlights"], js_name = clear)]
    fn clear_highlights() -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["navigator", "clipboard"], js_name = writeText)]
    async fn write_clipboard_text(text: &str) -> Result<JsValue, JsValue>;
}

pub async fn copy_to_clipboard(text: &str) -> Result<(), JsValue> {
    write_clipboard_text(text).await.map(|_| ())
}

fn span_range(document: &Document, span: &Span<Node>) -> Result<Range, JsValue> {
    let range = document.create_range()?;
    range.set_start(&span.node, span.start)?;
    range.set_end(&span.node, span.end)?;
    Ok(range)
}

pub struct DomTextTree {
    document: Document,
    skip: Option<Element>,
}

impl DomTextTree {
    pub fn new(document: Document, skip: Option<Element>) -> Self {
        Self { document, skip }
    }
}

impl TextTree for DomTextTree {
    type Node = Node;

    fn text_nodes(&self) -> Vec<(Node, String)> {
        let Some(body) = self.document.body() else {
            return Vec::new();
        };
        let walker = match self
            .document
            .create_tree_walker_with_what_to_show(&body, SHOW_TEXT)
        {
            Ok(walker) => walker,
            Err(err) => {
                tracing::error!(error = ?err, "failed to create tree walker");
                return Vec::new();
            }
        };

        let mut nodes = Vec::new();
        while let Ok(Some(node)) = walker.next_node() {
            if self
                .skip
                .as_ref()
                .is_some_and(|skip| skip.contains(Some(&node)))
            {
                continue;
            }
            if let Some(text) = node.node_value() {
                nodes.push((node, text));
            }
        }
        nodes
    }
}

pub struct CssHighlights {
    document: Document,
    context_name: String,
    expression_name: String,
    context: Option<Highlight>,
    expression: Option<Highlight>,
}

impl CssHighlights {
    pub fn new(document: Document, context_name: String, expression_name: String) -> Self {
        Self {
            document,
            context_name,
            expression_name,
            context: None,
            expression: None,
        }
    }
}

impl HighlightSink for CssHighlights {
    type Node = Node;

    fn clear(&mut self) {
        if let Err(err) = clear_highlights() {
            tracing::warn!(error = ?err, "CSS highlights unavailable");
        }
        self.context = Highlight::new().ok();
        self.expression = Highlight::new().ok();
    }

    fn mark(&mut self, layer: Layer, span: &Span<Node>) {
        let target = match layer {
            Layer::Context => self.context.as_ref(),
            Layer::Expression => self.expression.as_ref(),
        };
        let Some(highlight) = target else {
            return;
        };
        match span_range(&self.document, span) {
            Ok(range) => highlight.add(&range),
            Err(err) => tracing::debug!(error = ?err, "skipping stale span"),
        }
    }

    fn commit(&mut self) {
        let layers = [
            (&self.context_name, self.context.as_ref()),
            (&self.expression_name, self.expression.as_ref()),
        ];
        for (name, highlight) in layers {
            let Some(highlight) = highlight else { continue };
            if let Err(err) = register_highlight(name, highlight) {
                tracing::warn!(name = name.as_str(), error = ?err, "failed to register highlight");
            }
        }
    }
}

pub struct DomGeometry {
    document: Document,
}

impl DomGeometry {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl SpanGeometry for DomGeometry {
    type Node = Node;

    fn client_rects(&self, span: &Span<Node>) -> Vec<Rect> {
        let Some(list) = span_range(&self.document, span)
            .ok()
            .and_then(|range| range.get_client_rects())
        else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|idx| list.get(idx))
            .map(|r| Rect {
                left: r.left(),
                top: r.top(),
                right: r.right(),
                bottom: r.bottom(),
            })
            .collect()
    }
}

pub enum PageStore {
    Local(Storage),
    Memory(MemoryStore),
}

impl PageStore {
    pub fn open(window: &Window) -> Self {
        match window.local_storage() {
            Ok(Some(storage)) => PageStore::Local(storage),
            _ => {
                tracing::warn!("localStorage unavailable, highlights will not survive a reload");
                PageStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl DurableStore for PageStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            PageStore::Local(storage) => storage.get_item(key).ok().flatten(),
            PageStore::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            PageStore::Local(storage) => {
                storage
                    .set_item(key, value)
                    .map_err(|err| StoreError::Write {
                        key: key.to_string(),
                        reason: format!("{err:?}"),
                    })
            }
            PageStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            PageStore::Local(storage) => {
                storage
                    .remove_item(key)
                    .map_err(|err| StoreError::Remove {
                        key: key.to_string(),
                        reason: format!("{err:?}"),
                    })
            }
            PageStore::Memory(store) => store.remove(key),
        }
    }
}

pub fn page_location(window: &Window) -> PageLocation {
    let location = window.location();
    PageLocation {
        hostname: location.hostname().unwrap_or_default(),
        pathname: location.pathname().unwrap_or_default(),
        search: location.search().unwrap_or_default(),
    }
}

pub fn selection_snapshot(window: &Window, block_selector: Option<&str>) -> SelectionSnapshot {
    let Ok(Some(selection)) = window.get_selection() else {
        return SelectionSnapshot {
            collapsed: true,
            ..SelectionSnapshot::default()
        };
    };

    let block_context = block_selector.and_then(|selector| {
        if selection.range_count() == 0 {
            return None;
        }
        let container = selection.get_range_at(0).ok()?.common_ancestor_container().ok()?;
        let block = container.parent_element()?.closest(selector).ok()??;
        block.text_content().map(|text| text.trim().to_string())
    });

    SelectionSnapshot {
        text: selection.to_string().into(),
        collapsed: selection.is_collapsed(),
        block_context,
    }
}

pub fn clear_selection(window: &Window) {
    if let Ok(Some(selection)) = window.get_selection() {
        if let Err(err) = selection.remove_all_ranges() {
            tracing::warn!(error = ?err, "failed to clear selection");
        }
    }
}
