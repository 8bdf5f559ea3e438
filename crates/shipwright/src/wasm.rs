//! WebAssembly bindings for the editor
//!
//! The page owns the rendering service: it calls `set_source`, renders the
//! returned ticket's text, and passes the markup (or error) back through
//! `complete_render`. Structured results are returned as JSON strings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::core::{EditorConfig, MarkupGeometry, Point};
use crate::editor::{Editor, LabelKey, RenderOutput, ServiceError};

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        serde_json::json!({ "type": "error", "message": err.to_string() }).to_string()
    })
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Browser-facing editor handle
#[wasm_bindgen]
pub struct WasmEditor {
    inner: Editor<MarkupGeometry>,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor, optionally from a JSON config
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmEditor, JsValue> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(js_error)?,
            None => EditorConfig::default(),
        };
        Ok(Self {
            inner: Editor::new(config, MarkupGeometry::new()),
        })
    }

    /// Text edit; returns the render request as JSON
    pub fn set_source(&mut self, source: &str) -> String {
        to_json(&self.inner.set_source(source))
    }

    /// Hand back a render result; exactly one of `markup` / `error` is set
    pub fn complete_render(
        &mut self,
        ticket_id: f64,
        markup: Option<String>,
        error: Option<String>,
    ) -> String {
        let result = match (markup, error) {
            (Some(markup), None) => Ok(RenderOutput { markup }),
            (_, Some(message)) => Err(ServiceError::new(message)),
            (None, None) => Err(ServiceError::new("Rendering service returned nothing")),
        };
        to_json(&self.inner.complete_render(ticket_id as u64, result))
    }

    pub fn pointer_down(
        &mut self,
        node_id: &str,
        x: f64,
        y: f64,
        now_ms: f64,
    ) -> Result<String, JsValue> {
        self.inner
            .pointer_down(node_id, Point::new(x, y), now_ms as u64)
            .map(|event| to_json(&event))
            .map_err(js_error)
    }

    /// Returns the node's new translation as JSON, or `null` when idle
    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        to_json(&self.inner.pointer_move(Point::new(x, y)))
    }

    pub fn pointer_up(&mut self) -> String {
        to_json(&self.inner.pointer_up())
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        self.inner.pan_by(dx, dy)
    }

    pub fn zoom_by(&mut self, factor: f64, anchor_x: f64, anchor_y: f64) -> bool {
        self.inner.zoom_by(factor, Point::new(anchor_x, anchor_y))
    }

    /// Open the rename overlay; JSON overlay or `null` if already editing
    pub fn begin_label_edit(&mut self, node_id: &str, now_ms: f64) -> Result<String, JsValue> {
        self.inner
            .begin_label_edit(node_id, now_ms as u64)
            .map(|overlay| to_json(&overlay))
            .map_err(js_error)
    }

    pub fn label_input(&mut self, text: &str) {
        self.inner.label_input(text);
    }

    /// `key` is a DOM `KeyboardEvent.key` value
    pub fn label_key(&mut self, key: &str) -> String {
        let key = match key {
            "Enter" => LabelKey::Enter,
            "Escape" => LabelKey::Escape,
            _ => LabelKey::Other,
        };
        to_json(&self.inner.label_key(key))
    }

    pub fn label_blur(&mut self, now_ms: f64) -> String {
        to_json(&self.inner.label_blur(now_ms as u64))
    }

    pub fn undo(&mut self, now_ms: f64) -> String {
        to_json(&self.inner.undo(now_ms as u64))
    }

    pub fn redo(&mut self, now_ms: f64) -> String {
        to_json(&self.inner.redo(now_ms as u64))
    }

    pub fn can_undo(&self) -> bool {
        self.inner.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.history().can_redo()
    }

    pub fn markup(&self) -> Option<String> {
        self.inner.markup()
    }

    pub fn source(&self) -> String {
        self.inner.source().to_string()
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.is_dragging()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error().map(str::to_string)
    }

    /// Current node translations as JSON
    pub fn transforms(&self) -> String {
        to_json(&self.inner.transforms())
    }
}
