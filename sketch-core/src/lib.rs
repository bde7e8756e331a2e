//! # Sketch Canvas Core
//!
//! Stroke capture for a freehand drawing canvas: maps raw pointer and touch
//! input into canvas pixels, accumulates strokes, and keeps the ordered,
//! undoable stroke log that the renderer flattens into an image.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                sketch-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Input            │  Session                │
//! │  - Pointer events │  - Idle / Drawing       │
//! │  - Touch events   │  - Active stroke        │
//! │  - Geometry map   │  - Stroke log + undo    │
//! ├─────────────────────────────────────────────┤
//! │  Model: Point, Stroke, Tool table, Color    │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod error;
pub mod event;
pub mod geometry;
pub mod log;
pub mod state;
pub mod stroke;
pub mod tool;

pub use color::Color;
pub use error::{SketchError, SketchResult};
pub use event::{InputEvent, PointerEvent, PointerPhase, TouchEvent, TouchPhase, TouchPoint};
pub use geometry::{CanvasGeometry, Point};
pub use log::StrokeLog;
pub use state::{CanvasSession, SessionState, Transition};
pub use stroke::Stroke;
pub use tool::{Compositing, Tool, ToolConfig, ToolStyle};

/// Sketch core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
