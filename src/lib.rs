//! In-page annotator: mark context/expression pairs on a live page, keep them
//! per page in `localStorage`, and show externally produced translations as
//! hover tooltips.

mod app;
pub mod config;
pub mod controller;
mod dom;
pub mod locate;
mod logging;
pub mod model;
mod overlay;
pub mod prompt;
pub mod render;
pub mod store;
pub mod tooltip;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    app::launch();
}
