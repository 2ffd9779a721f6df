use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent, Node, Window};

use crate::config::Config;
use crate::controller::{Controller, Effect, KeyInput, Notice, Shortcut};
use crate::dom::{self, CssHighlights, DomGeometry, DomTextTree, PageStore};
use crate::overlay::{self, Overlay, Toaster};
use crate::render::{render, ActiveSpan};
use crate::store::Persistence;
use crate::tooltip::{self, Pointer, TooltipView};

const CONFIG_GLOBAL: &str = "lexiAnnotatorConfig";
const INJECT_GLOBAL: &str = "injectGPTTranslations";

struct Annotator {
    window: Window,
    config: Config,
    controller: Controller<PageStore>,
    tree: DomTextTree,
    sink: CssHighlights,
    geometry: DomGeometry,
    active: Vec<ActiveSpan<Node>>,
    tooltip: RwSignal<TooltipView>,
    toaster: Toaster,
}

type Shared = Rc<RefCell<Annotator>>;

impl Annotator {
    fn rerender(&mut self) {
        let session = self.controller.session();
        self.active = render(
            &self.tree,
            &mut self.sink,
            &session.pairs,
            session.pending_context.as_deref(),
        );
    }

    fn hover(&self, pointer: Pointer) {
        let view = tooltip::evaluate(
            &self.geometry,
            &self.active,
            &self.controller.session().translations,
            pointer,
            self.config.tooltip_offset,
        );
        if self.tooltip.get_untracked() != view {
            self.tooltip.set(view);
        }
    }
}

fn read_config(window: &Window) -> (Config, Option<String>) {
    let raw = js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL))
        .unwrap_or(JsValue::UNDEFINED);
    if raw.is_undefined() || raw.is_null() {
        return (Config::default(), None);
    }
    match serde_wasm_bindgen::from_value::<Config>(raw) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err.to_string())),
    }
}

pub fn launch() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let (config, config_error) = read_config(&window);
    crate::logging::init(config.max_level());
    if let Some(err) = config_error {
        tracing::warn!(error = err.as_str(), "ignoring malformed {CONFIG_GLOBAL}, using defaults");
    }

    let Some(document) = window.document() else {
        tracing::error!("no document, annotator not started");
        return;
    };
    let Some(body) = document.body() else {
        tracing::error!("no body, annotator not started");
        return;
    };

    let mounted = match mount_overlay(&document, &body, &config) {
        Ok(mounted) => mounted,
        Err(err) => {
            tracing::error!(error = ?err, "failed to mount overlay");
            return;
        }
    };

    let persistence = Persistence::new(
        PageStore::open(&window),
        &config,
        dom::page_location(&window),
    );
    let annotator = Annotator {
        controller: Controller::new(persistence),
        tree: DomTextTree::new(document.clone(), Some(mounted.root)),
        sink: CssHighlights::new(
            document.clone(),
            config.context_highlight.clone(),
            config.expression_highlight.clone(),
        ),
        geometry: DomGeometry::new(document.clone()),
        active: Vec::new(),
        tooltip: mounted.tooltip,
        toaster: mounted.toaster,
        window: window.clone(),
        config,
    };
    let shared: Shared = Rc::new(RefCell::new(annotator));

    if let Err(err) = install_listeners(&document, &shared) {
        tracing::error!(error = ?err, "failed to install listeners");
        return;
    }
    if let Err(err) = install_injection(&window, &shared) {
        tracing::error!(error = ?err, "failed to register {INJECT_GLOBAL}");
    }

    let delay = shared.borrow().config.restore_delay();
    let restore = shared.clone();
    set_timeout(
        move || {
            let effects = restore.borrow_mut().controller.restore();
            apply(&restore, effects);
        },
        delay,
    );
    tracing::info!(delay_ms = delay.as_millis() as u64, "annotator ready");
}

struct MountedOverlay {
    root: Element,
    tooltip: RwSignal<TooltipView>,
    toaster: Toaster,
}

fn mount_overlay(
    document: &Document,
    body: &HtmlElement,
    config: &Config,
) -> Result<MountedOverlay, JsValue> {
    let root = document.create_element("div")?;
    root.set_id("lexi-annotator-overlay");
    body.append_child(&root)?;

    let tooltip = RwSignal::new(TooltipView::Hidden);
    let toaster = Toaster::new(config.toast_duration());
    let styles = overlay::stylesheet(config);
    leptos::mount::mount_to(root.clone().unchecked_into(), move || {
        view! { <Overlay styles=styles tooltip=tooltip toaster=toaster/> }
    })
    .forget();
    Ok(MountedOverlay {
        root,
        tooltip,
        toaster,
    })
}

fn install_listeners(document: &Document, shared: &Shared) -> Result<(), JsValue> {
    let keys = shared.clone();
    let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
        on_keydown(&keys, &e);
    });
    document.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();

    let hover = shared.clone();
    let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |e: MouseEvent| {
        let pointer = Pointer {
            client_x: e.client_x().into(),
            client_y: e.client_y().into(),
            page_x: e.page_x().into(),
            page_y: e.page_y().into(),
        };
        hover.borrow().hover(pointer);
    });
    document.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();
    Ok(())
}

fn on_keydown(shared: &Shared, e: &KeyboardEvent) {
    let input = KeyInput {
        key: e.key(),
        ctrl: e.ctrl_key(),
        meta: e.meta_key(),
        shift: e.shift_key(),
    };
    let Some(shortcut) = Shortcut::from_key(&input) else {
        return;
    };

    let effects = {
        let mut annotator = shared.borrow_mut();
        let selector = annotator.config.block_selector();
        let selection = dom::selection_snapshot(&annotator.window, selector.as_deref());
        if shortcut.needs_selection() && selection.collapsed {
            return;
        }
        e.prevent_default();
        tracing::debug!(?shortcut, "shortcut");
        annotator.controller.handle(shortcut, &selection)
    };
    apply(shared, effects);
}

fn install_injection(window: &Window, shared: &Shared) -> Result<(), JsValue> {
    let injected = shared.clone();
    let inject = Closure::<dyn FnMut(JsValue)>::new(move |input: JsValue| {
        let effects = injected
            .borrow_mut()
            .controller
            .inject(&injection_value(input));
        apply(&injected, effects);
    });
    js_sys::Reflect::set(window, &JsValue::from_str(INJECT_GLOBAL), inject.as_ref())?;
    inject.forget();
    Ok(())
}

fn injection_value(input: JsValue) -> Value {
    if !js_sys::Array::is_array(&input) {
        return Value::Null;
    }
    let items = js_sys::Array::from(&input)
        .iter()
        .map(|item| serde_wasm_bindgen::from_value(item).unwrap_or(Value::Null))
        .collect();
    Value::Array(items)
}

fn apply(shared: &Shared, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::ClearSelection => dom::clear_selection(&shared.borrow().window),
            Effect::Render => shared.borrow_mut().rerender(),
            Effect::Notify(notice) => shared.borrow().toaster.show(notice),
            Effect::Alert(message) => {
                if let Err(err) = shared.borrow().window.alert_with_message(&message) {
                    tracing::warn!(error = ?err, "alert failed");
                }
            }
            Effect::CopyPrompt { text, announce } => {
                let annotator = shared.borrow();
                let toaster = annotator.toaster;
                let pairs = annotator.controller.session().pairs.len();
                spawn_local(async move {
                    match dom::copy_to_clipboard(&text).await {
                        Ok(()) if announce => toaster.show(Notice::prompt_copied(pairs)),
                        Ok(()) => {}
                        Err(err) => {
                            tracing::error!(error = ?err, "failed to copy prompt");
                            if announce {
                                toaster.show(Notice::prompt_failed());
                            }
                        }
                    }
                });
            }
        }
    }
}
