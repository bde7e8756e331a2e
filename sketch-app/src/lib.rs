//! # Sketch Canvas WASM Application
//!
//! Browser bindings for the drawing canvas. The page forwards pointer and
//! touch events with their viewport coordinates, reports the canvas
//! element's layout, and receives a `(hasContent, dataUrl)` pair after every
//! change.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web sketch-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { SketchApp } from './pkg/sketch_app.js';
//!
//! await init();
//! const app = new SketchApp(canvas.width, canvas.height);
//! const r = canvas.getBoundingClientRect();
//! app.setGeometry(r.left, r.top, r.width, r.height);
//! app.onFrame((hasContent, dataUrl) => { img.src = dataUrl; button.disabled = !hasContent; });
//! canvas.onpointerdown = (e) => app.pointerDown(e.clientX, e.clientY);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use sketch_core::{
    CanvasGeometry, Color, InputEvent, PointerPhase, SketchResult, Tool, ToolConfig, TouchEvent,
    TouchPhase,
};
use sketch_renderer::{CanvasConfig, CanvasFrame, FrameSink, RenderResult, SketchCanvas};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Sketch Canvas WASM initialized");
}

/// Frame sink that remembers the latest frame and forwards it to JavaScript.
#[derive(Default)]
struct JsFrameSink {
    callback: Option<js_sys::Function>,
    latest: Option<CanvasFrame>,
}

impl FrameSink for JsFrameSink {
    fn publish(&mut self, frame: &CanvasFrame) {
        self.latest = Some(frame.clone());
        if let Some(callback) = &self.callback {
            let has_content = JsValue::from_bool(frame.has_content);
            let data_url = JsValue::from_str(&frame.snapshot.to_data_uri());
            if let Err(e) = callback.call2(&JsValue::NULL, &has_content, &data_url) {
                tracing::warn!("Frame callback threw: {:?}", e);
            }
        }
    }
}

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A drawing canvas driven from JavaScript.
#[wasm_bindgen]
pub struct SketchApp {
    canvas: SketchCanvas<JsFrameSink>,
}

#[wasm_bindgen]
impl SketchApp {
    /// Create a canvas with the given backing pixel size.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<SketchApp, JsValue> {
        Self::create(width, height).map_err(to_js)
    }

    /// Report the element's layout: viewport offset and displayed (CSS) size.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = setGeometry)]
    pub fn set_geometry(
        &mut self,
        left: f32,
        top: f32,
        displayed_width: f32,
        displayed_height: f32,
    ) -> Result<(), JsValue> {
        self.apply_geometry(left, top, displayed_width, displayed_height)
            .map_err(to_js)
    }

    /// Change the backing pixel size, keeping strokes.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.canvas.resize(width, height).map_err(to_js)
    }

    /// Select the tool by name (`pen`, `brush`, `marker`, `eraser`).
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown tool name.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> Result<(), JsValue> {
        self.apply_tool(name).map_err(to_js)
    }

    /// Set the ink colour from a hex token.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable colour.
    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&mut self, token: &str) -> Result<(), JsValue> {
        self.apply_color(token).map_err(to_js)
    }

    /// Set the base stroke width.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive width.
    #[wasm_bindgen(js_name = setWidth)]
    pub fn set_width(&mut self, width: f32) -> Result<(), JsValue> {
        self.apply_width(width).map_err(to_js)
    }

    /// Pointer pressed. Returns whether the canvas changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.dispatch(&InputEvent::pointer(PointerPhase::Down, x, y))
            .map_err(to_js)
    }

    /// Pointer moved. Returns whether the canvas changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.dispatch(&InputEvent::pointer(PointerPhase::Move, x, y))
            .map_err(to_js)
    }

    /// Pointer released. Returns whether the canvas changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.dispatch(&InputEvent::pointer(PointerPhase::Up, x, y))
            .map_err(to_js)
    }

    /// Pointer left the element. Returns whether the canvas changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.dispatch(&InputEvent::pointer(PointerPhase::Leave, x, y))
            .map_err(to_js)
    }

    /// First touch point went down.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.dispatch(&InputEvent::touch(TouchPhase::Start, x, y))
            .map_err(to_js)
    }

    /// Primary touch point moved.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.dispatch(&InputEvent::touch(TouchPhase::Move, x, y))
            .map_err(to_js)
    }

    /// Touch lifted at the last known position.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.dispatch(&InputEvent::touch(TouchPhase::End, x, y))
            .map_err(to_js)
    }

    /// Touch cancelled by the browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = touchCancel)]
    pub fn touch_cancel(&mut self) -> Result<bool, JsValue> {
        self.dispatch(&InputEvent::Touch(TouchEvent::new(
            TouchPhase::Cancel,
            Vec::new(),
        )))
        .map_err(to_js)
    }

    /// Remove every stroke.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn clear(&mut self) -> Result<(), JsValue> {
        self.canvas.clear().map(|_| ()).map_err(to_js)
    }

    /// Remove the most recent stroke. Returns whether a stroke was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.canvas
            .undo()
            .map(sketch_core::Transition::is_changed)
            .map_err(to_js)
    }

    /// Whether the canvas shows any mark.
    #[wasm_bindgen(js_name = hasContent)]
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.canvas.has_content()
    }

    /// Number of completed strokes.
    #[wasm_bindgen(js_name = strokeCount)]
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.canvas.session().stroke_count()
    }

    /// PNG data URL of the latest frame, or an empty string before the first frame.
    #[wasm_bindgen(js_name = dataUrl)]
    #[must_use]
    pub fn data_url(&self) -> String {
        self.canvas
            .sink()
            .latest
            .as_ref()
            .map(|f| f.snapshot.to_data_uri())
            .unwrap_or_default()
    }

    /// Register `callback(hasContent, dataUrl)`, invoked after every change.
    ///
    /// The callback is called once immediately with the current frame.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self, callback: &js_sys::Function) {
        let sink = self.canvas.sink_mut();
        sink.callback = Some(callback.clone());
        if let Some(frame) = sink.latest.take() {
            sink.publish(&frame);
        }
    }
}

impl SketchApp {
    fn create(width: u32, height: u32) -> RenderResult<Self> {
        let config = CanvasConfig {
            width,
            height,
            ..CanvasConfig::default()
        };
        Ok(Self {
            canvas: SketchCanvas::new(config, JsFrameSink::default())?,
        })
    }

    fn apply_geometry(
        &mut self,
        left: f32,
        top: f32,
        displayed_width: f32,
        displayed_height: f32,
    ) -> RenderResult<()> {
        let compositor = self.canvas.compositor();
        let geometry = CanvasGeometry {
            left,
            top,
            displayed_width,
            displayed_height,
            backing_width: compositor.width(),
            backing_height: compositor.height(),
        };
        self.canvas.set_geometry(geometry)
    }

    fn update_tool(&mut self, f: impl FnOnce(&mut ToolConfig)) -> SketchResult<()> {
        let mut config = *self.canvas.session().tool_config();
        f(&mut config);
        self.canvas.set_tool_config(config)
    }

    fn apply_tool(&mut self, name: &str) -> SketchResult<()> {
        let tool: Tool = name.parse()?;
        self.update_tool(|c| c.tool = tool)
    }

    fn apply_color(&mut self, token: &str) -> SketchResult<()> {
        let color = Color::parse(token)?;
        self.update_tool(|c| c.color = color)
    }

    fn apply_width(&mut self, width: f32) -> SketchResult<()> {
        self.update_tool(|c| c.width = width)
    }

    fn dispatch(&mut self, event: &InputEvent) -> RenderResult<bool> {
        self.canvas.handle_event(event).map(|t| t.is_changed())
    }
}
