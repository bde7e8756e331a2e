//! # Sketch Canvas Renderer
//!
//! Flattens stroke data into a raster image.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌──────────────┐
//! │ CanvasSession│──▶│   Compositor    │──▶│ ImageExporter│──▶ FrameSink
//! │ log + active │   │ ink layer over  │   │ PNG / JPEG   │   (host)
//! │              │   │ background      │   │ data URI     │
//! └──────────────┘   └─────────────────┘   └──────────────┘
//! ```
//!
//! Every content-affecting change produces a full redraw and a new snapshot.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod compositor;
pub mod error;
pub mod export;

pub use canvas::{CanvasConfig, CanvasFrame, FrameSink, LatestFrame, SketchCanvas};
pub use compositor::Compositor;
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, ImageExporter, Snapshot};
