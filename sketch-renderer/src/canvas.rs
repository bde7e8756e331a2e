//! Host-facing drawing canvas.
//!
//! [`SketchCanvas`] ties the stroke session to the compositor: every event or
//! command that changes the stroke stack triggers a full redraw, an encoded
//! snapshot, and a [`CanvasFrame`] pushed to the host's [`FrameSink`].

use sketch_core::{
    CanvasGeometry, CanvasSession, Color, InputEvent, SketchResult, ToolConfig, Transition,
};

use crate::compositor::Compositor;
use crate::error::{RenderError, RenderResult};
use crate::export::{ExportConfig, ImageExporter, Snapshot};

/// Canvas size and appearance.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Backing surface width in pixels.
    pub width: u32,
    /// Backing surface height in pixels.
    pub height: u32,
    /// Opaque background colour.
    pub background: Color,
    /// Initial tool configuration.
    pub tool: ToolConfig,
    /// Snapshot encoding.
    pub export: ExportConfig,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color::WHITE,
            tool: ToolConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// What the host receives after every content-affecting change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasFrame {
    /// Whether the canvas shows any mark; gates export/share actions.
    pub has_content: bool,
    /// The flattened image.
    pub snapshot: Snapshot,
}

/// Receiver of rendered frames.
pub trait FrameSink {
    /// Deliver a freshly rendered frame.
    fn publish(&mut self, frame: &CanvasFrame);
}

impl<F: FnMut(&CanvasFrame)> FrameSink for F {
    fn publish(&mut self, frame: &CanvasFrame) {
        self(frame);
    }
}

/// Sink that keeps only the most recent frame.
#[derive(Debug, Default)]
pub struct LatestFrame {
    frame: Option<CanvasFrame>,
    published: u64,
}

impl LatestFrame {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent frame, if any has been published.
    #[must_use]
    pub fn frame(&self) -> Option<&CanvasFrame> {
        self.frame.as_ref()
    }

    /// Take ownership of the most recent frame.
    pub fn take(&mut self) -> Option<CanvasFrame> {
        self.frame.take()
    }

    /// Number of frames published so far.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl FrameSink for LatestFrame {
    fn publish(&mut self, frame: &CanvasFrame) {
        self.frame = Some(frame.clone());
        self.published += 1;
    }
}

/// A drawing canvas: session state, compositor and frame delivery.
pub struct SketchCanvas<S: FrameSink = LatestFrame> {
    session: CanvasSession,
    compositor: Compositor,
    exporter: ImageExporter,
    sink: S,
}

impl<S: FrameSink> SketchCanvas<S> {
    /// Create a canvas and publish its initial blank frame.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Config`] if the tool configuration is invalid or
    /// the background is translucent, otherwise an error if the surface cannot
    /// be allocated or the blank frame cannot be encoded.
    pub fn new(config: CanvasConfig, sink: S) -> RenderResult<Self> {
        config.tool.validate()?;
        config.background.ensure_opaque()?;
        let compositor = Compositor::new(config.width, config.height, config.background)?;
        let mut session = CanvasSession::new(config.tool, config.background);
        session.set_geometry(CanvasGeometry::identity(config.width, config.height));

        let mut canvas = Self {
            session,
            compositor,
            exporter: ImageExporter::new(config.export),
            sink,
        };
        tracing::debug!(
            "Canvas created {}x{} background {}",
            config.width,
            config.height,
            config.background
        );
        canvas.refresh()?;
        Ok(canvas)
    }

    /// Feed one input event; redraws if the stroke stack changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw cannot be encoded. The event is still applied.
    pub fn handle_event(&mut self, event: &InputEvent) -> RenderResult<Transition> {
        let transition = self.session.handle_event(event);
        self.refresh_if(transition)
    }

    /// Remove all strokes and publish a blank frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the blank frame cannot be encoded.
    pub fn clear(&mut self) -> RenderResult<Transition> {
        let transition = self.session.clear();
        self.refresh_if(transition)
    }

    /// Remove the most recent stroke.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw cannot be encoded.
    pub fn undo(&mut self) -> RenderResult<Transition> {
        let transition = self.session.undo();
        self.refresh_if(transition)
    }

    /// Replace the tool configuration used for the next stroke.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid; the previous one is kept.
    pub fn set_tool_config(&mut self, config: ToolConfig) -> SketchResult<()> {
        if let Err(e) = config.validate() {
            tracing::warn!("Rejected tool configuration: {e}");
            return Err(e);
        }
        self.session.set_tool_config(config);
        Ok(())
    }

    /// Update the element geometry; resizes and redraws if the backing size changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the new surface cannot be allocated or encoded. On
    /// allocation failure the previous geometry and surface stay in effect.
    pub fn set_geometry(&mut self, geometry: CanvasGeometry) -> RenderResult<()> {
        let size = (geometry.backing_width, geometry.backing_height);
        if size == (self.compositor.width(), self.compositor.height()) {
            self.session.set_geometry(geometry);
            return Ok(());
        }
        if let Err(e) = self.compositor.resize(size.0, size.1) {
            tracing::warn!("Keeping previous geometry: {e}");
            return Err(e);
        }
        self.session.set_geometry(geometry);
        self.refresh()
    }

    /// Resize the backing surface, keeping strokes, and redraw.
    ///
    /// The element's offset and displayed size are kept; without a measured
    /// layout the element is assumed to be displayed at its backing size.
    ///
    /// # Errors
    ///
    /// Returns an error if the new surface cannot be allocated or encoded.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        let geometry = match self.session.geometry() {
            Some(current) => CanvasGeometry {
                backing_width: width,
                backing_height: height,
                ..*current
            },
            None => CanvasGeometry::identity(width, height),
        };
        self.set_geometry(geometry)
    }

    /// Change the background colour and redraw.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Config`] for a translucent colour, keeping the
    /// previous background, or an error if the redraw cannot be encoded.
    pub fn set_background(&mut self, background: Color) -> RenderResult<()> {
        let background = background.ensure_opaque().map_err(|e| {
            tracing::warn!("Rejected background: {e}");
            RenderError::from(e)
        })?;
        self.session.set_background(background);
        self.compositor.set_background(background);
        self.refresh()
    }

    /// Replace the snapshot encoding and redraw.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw cannot be encoded.
    pub fn set_export_config(&mut self, config: ExportConfig) -> RenderResult<()> {
        self.exporter.set_config(config);
        self.refresh()
    }

    /// Redraw from the in-memory stroke stack and publish a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be encoded. No frame is published
    /// and the stroke log is untouched; the next successful call recovers.
    pub fn refresh(&mut self) -> RenderResult<()> {
        let surface = self.compositor.render_session(&self.session);
        let snapshot = match self.exporter.export(surface) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("Render pass failed: {e}");
                return Err(e);
            }
        };
        let frame = CanvasFrame {
            has_content: self.session.has_content(),
            snapshot,
        };
        tracing::trace!(
            has_content = frame.has_content,
            bytes = frame.snapshot.len(),
            "Frame published"
        );
        self.sink.publish(&frame);
        Ok(())
    }

    fn refresh_if(&mut self, transition: Transition) -> RenderResult<Transition> {
        if transition.is_changed() {
            self.refresh()?;
        }
        Ok(transition)
    }

    /// Encode the current surface without publishing a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn snapshot(&self) -> RenderResult<Snapshot> {
        self.exporter.export(self.compositor.surface())
    }

    /// Whether the canvas shows any mark.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.session.has_content()
    }

    /// The stroke session.
    #[must_use]
    pub fn session(&self) -> &CanvasSession {
        &self.session
    }

    /// The compositor holding the flattened surface.
    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// The frame sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the frame sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl SketchCanvas<LatestFrame> {
    /// Create a canvas that keeps its latest frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated or encoded.
    pub fn with_config(config: CanvasConfig) -> RenderResult<Self> {
        Self::new(config, LatestFrame::new())
    }

    /// The most recently published frame.
    #[must_use]
    pub fn latest_frame(&self) -> Option<&CanvasFrame> {
        self.sink.frame()
    }
}

impl<S: FrameSink> std::fmt::Debug for SketchCanvas<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SketchCanvas")
            .field("session", &self.session)
            .field("compositor", &self.compositor)
            .field("exporter", &self.exporter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_core::{PointerPhase, SketchError, Tool};

    fn small() -> CanvasConfig {
        CanvasConfig {
            width: 64,
            height: 64,
            ..CanvasConfig::default()
        }
    }

    #[test]
    fn test_initial_blank_frame_published() {
        let canvas = SketchCanvas::with_config(small()).expect("canvas");
        let frame = canvas.latest_frame().expect("initial frame");
        assert!(!frame.has_content);
        assert_eq!(canvas.sink().published(), 1);
    }

    #[test]
    fn test_ignored_events_publish_nothing() {
        let mut canvas = SketchCanvas::with_config(small()).expect("canvas");
        let t = canvas
            .handle_event(&InputEvent::pointer(PointerPhase::Move, 5.0, 5.0))
            .expect("event");
        assert_eq!(t, Transition::Ignored);
        assert_eq!(canvas.sink().published(), 1);
    }

    #[test]
    fn test_every_change_publishes() {
        let mut canvas = SketchCanvas::with_config(small()).expect("canvas");
        for event in [
            InputEvent::pointer(PointerPhase::Down, 5.0, 5.0),
            InputEvent::pointer(PointerPhase::Move, 20.0, 5.0),
            InputEvent::pointer(PointerPhase::Up, 20.0, 5.0),
        ] {
            canvas.handle_event(&event).expect("event");
        }
        assert_eq!(canvas.sink().published(), 4);
        assert!(canvas.latest_frame().expect("frame").has_content);
    }

    #[test]
    fn test_closure_sink() {
        let mut flags = Vec::new();
        {
            let mut canvas =
                SketchCanvas::new(small(), |f: &CanvasFrame| flags.push(f.has_content))
                    .expect("canvas");
            canvas
                .handle_event(&InputEvent::pointer(PointerPhase::Down, 1.0, 1.0))
                .expect("down");
            canvas
                .handle_event(&InputEvent::pointer(PointerPhase::Move, 9.0, 1.0))
                .expect("move");
            canvas.clear().expect("clear");
        }
        assert_eq!(flags, vec![false, false, true, false]);
    }

    #[test]
    fn test_invalid_tool_config_is_rejected() {
        let mut canvas = SketchCanvas::with_config(small()).expect("canvas");
        let bad = ToolConfig {
            width: -2.0,
            ..ToolConfig::default()
        };
        assert!(matches!(
            canvas.set_tool_config(bad),
            Err(SketchError::InvalidWidth(_))
        ));
        assert!((canvas.session().tool_config().width - 5.0).abs() < f32::EPSILON);

        let marker = ToolConfig {
            tool: Tool::Marker,
            ..ToolConfig::default()
        };
        canvas.set_tool_config(marker).expect("valid config");
        assert_eq!(canvas.session().tool_config().tool, Tool::Marker);
    }

    #[test]
    fn test_resize_publishes_new_dimensions() {
        let mut canvas = SketchCanvas::with_config(small()).expect("canvas");
        canvas.resize(32, 16).expect("resize");
        let frame = canvas.latest_frame().expect("frame");
        assert_eq!((frame.snapshot.width, frame.snapshot.height), (32, 16));
        canvas.resize(32, 16).expect("same size");
        assert_eq!(canvas.sink().published(), 2, "unchanged size does not redraw");
    }

    fn first_point_of_active(canvas: &SketchCanvas) -> sketch_core::Point {
        canvas.session().active_stroke().expect("active stroke").points()[0]
    }

    #[test]
    fn test_resize_keeps_measured_layout() {
        let mut canvas = SketchCanvas::with_config(CanvasConfig::default()).expect("canvas");
        canvas
            .set_geometry(CanvasGeometry {
                left: 20.0,
                top: 10.0,
                displayed_width: 400.0,
                displayed_height: 300.0,
                backing_width: 800,
                backing_height: 600,
            })
            .expect("geometry");
        canvas.resize(1600, 1200).expect("resize");

        let geometry = *canvas.session().geometry().expect("geometry");
        assert!((geometry.left - 20.0).abs() < f32::EPSILON);
        assert!((geometry.displayed_width - 400.0).abs() < f32::EPSILON);
        assert_eq!((geometry.backing_width, geometry.backing_height), (1600, 1200));

        canvas
            .handle_event(&InputEvent::pointer(PointerPhase::Down, 70.0, 60.0))
            .expect("down");
        let p = first_point_of_active(&canvas);
        assert!((p.x - 200.0).abs() < 1e-3, "x mapped to {}", p.x);
        assert!((p.y - 200.0).abs() < 1e-3, "y mapped to {}", p.y);
    }

    #[test]
    fn test_failed_resize_keeps_previous_geometry() {
        let mut canvas = SketchCanvas::with_config(CanvasConfig::default()).expect("canvas");
        let result = canvas.set_geometry(CanvasGeometry {
            left: 0.0,
            top: 0.0,
            displayed_width: 800.0,
            displayed_height: 600.0,
            backing_width: 0,
            backing_height: 0,
        });
        assert!(matches!(result, Err(RenderError::Surface(_))));
        assert_eq!(canvas.compositor().width(), 800);
        assert_eq!(
            canvas.session().geometry().map(|g| g.backing_width),
            Some(800)
        );

        canvas
            .handle_event(&InputEvent::pointer(PointerPhase::Down, 100.0, 100.0))
            .expect("down");
        canvas
            .handle_event(&InputEvent::pointer(PointerPhase::Move, 700.0, 100.0))
            .expect("move");
        let points = canvas.session().active_stroke().expect("active").points();
        assert!((points[0].x - 100.0).abs() < 1e-3);
        assert!((points[1].x - 700.0).abs() < 1e-3);
        assert!((points[1].y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_translucent_background_is_rejected() {
        let config = CanvasConfig {
            background: Color::TRANSPARENT,
            ..small()
        };
        assert!(matches!(
            SketchCanvas::with_config(config),
            Err(RenderError::Config(SketchError::InvalidColor(_)))
        ));

        let mut canvas = SketchCanvas::with_config(small()).expect("canvas");
        let result = canvas.set_background(Color::rgba(0, 0, 255, 128));
        assert!(matches!(result, Err(RenderError::Config(_))));
        assert_eq!(canvas.session().background(), Color::WHITE);
        assert_eq!(canvas.compositor().background(), Color::WHITE);
        assert_eq!(canvas.sink().published(), 1);
    }

    #[test]
    fn test_invalid_initial_tool_config_is_rejected() {
        let config = CanvasConfig {
            tool: ToolConfig {
                width: 0.0,
                ..ToolConfig::default()
            },
            ..small()
        };
        assert!(matches!(
            SketchCanvas::with_config(config),
            Err(RenderError::Config(SketchError::InvalidWidth(_)))
        ));
    }
}
