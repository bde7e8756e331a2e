//! Canvas session: the stroke lifecycle state machine.

use serde::{Deserialize, Serialize};

use crate::event::StrokeAction;
use crate::geometry::map_point;
use crate::{CanvasGeometry, Color, InputEvent, Point, Stroke, StrokeLog, ToolConfig};

/// Whether a stroke is currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No active stroke.
    Idle,
    /// An active stroke is collecting points.
    Drawing,
}

/// Outcome of feeding an event or command to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// The stroke log or active stroke changed; the surface must be redrawn.
    Changed,
    /// Nothing changed.
    Ignored,
}

impl Transition {
    /// Whether a re-render is needed.
    #[must_use]
    pub fn is_changed(self) -> bool {
        self == Self::Changed
    }
}

/// The stroke log, the active stroke and the host-supplied configuration.
#[derive(Debug, Clone)]
pub struct CanvasSession {
    log: StrokeLog,
    active: Option<Stroke>,
    config: ToolConfig,
    background: Color,
    geometry: Option<CanvasGeometry>,
}

impl CanvasSession {
    /// Create an idle session with an empty log.
    #[must_use]
    pub fn new(config: ToolConfig, background: Color) -> Self {
        Self {
            log: StrokeLog::new(),
            active: None,
            config,
            background,
            geometry: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Drawing
        } else {
            SessionState::Idle
        }
    }

    /// Update the element geometry (host mount or resize).
    pub fn set_geometry(&mut self, geometry: CanvasGeometry) {
        self.geometry = Some(geometry);
    }

    /// Current element geometry, if measured.
    #[must_use]
    pub fn geometry(&self) -> Option<&CanvasGeometry> {
        self.geometry.as_ref()
    }

    /// Replace the tool configuration. Takes effect at the next stroke start.
    pub fn set_tool_config(&mut self, config: ToolConfig) {
        self.config = config;
    }

    /// Current tool configuration.
    #[must_use]
    pub fn tool_config(&self) -> &ToolConfig {
        &self.config
    }

    /// Change the background colour used for new eraser strokes.
    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    /// Canvas background colour.
    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    /// Completed strokes, oldest first.
    #[must_use]
    pub fn strokes(&self) -> &StrokeLog {
        &self.log
    }

    /// The stroke being drawn, if any.
    #[must_use]
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    /// Number of completed strokes.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.log.len()
    }

    /// Whether anything visible has been drawn.
    ///
    /// True when the log is non-empty or the active stroke has more than one point.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.log.is_empty() || self.active.as_ref().is_some_and(|s| s.len() > 1)
    }

    /// Feed one input event through the state machine.
    pub fn handle_event(&mut self, event: &InputEvent) -> Transition {
        match event.action() {
            StrokeAction::Begin(x, y) => self.begin(x, y),
            StrokeAction::Extend(x, y) => self.extend(x, y),
            StrokeAction::End => self.end(),
            StrokeAction::None => Transition::Ignored,
        }
    }

    fn map(&self, x: f32, y: f32) -> Point {
        map_point(self.geometry.as_ref(), x, y)
    }

    fn begin(&mut self, x: f32, y: f32) -> Transition {
        if self.active.is_some() {
            tracing::trace!("Ignoring stroke start while drawing");
            return Transition::Ignored;
        }
        let start = self.map(x, y);
        let stroke = Stroke::begin(start, &self.config, self.background);
        tracing::debug!(
            tool = %stroke.tool(),
            color = %stroke.color(),
            width = stroke.width(),
            "Stroke started at ({}, {})",
            start.x,
            start.y
        );
        self.active = Some(stroke);
        Transition::Changed
    }

    fn extend(&mut self, x: f32, y: f32) -> Transition {
        let point = self.map(x, y);
        match self.active.as_mut() {
            Some(stroke) => {
                stroke.push(point);
                Transition::Changed
            }
            None => Transition::Ignored,
        }
    }

    fn end(&mut self) -> Transition {
        match self.active.take() {
            Some(stroke) => {
                tracing::debug!(
                    points = stroke.len(),
                    strokes = self.log.len() + 1,
                    "Stroke committed"
                );
                self.log.push(stroke);
                Transition::Changed
            }
            None => Transition::Ignored,
        }
    }

    /// Remove every stroke and discard any active stroke.
    ///
    /// Always reports [`Transition::Changed`] so the host receives a blank frame.
    pub fn clear(&mut self) -> Transition {
        tracing::debug!(strokes = self.log.len(), "Canvas cleared");
        self.log.clear();
        self.active = None;
        Transition::Changed
    }

    /// Remove the most recent completed stroke.
    ///
    /// Ignored while a stroke is being drawn or when the log is empty.
    pub fn undo(&mut self) -> Transition {
        if self.active.is_some() {
            tracing::trace!("Ignoring undo while drawing");
            return Transition::Ignored;
        }
        match self.log.undo() {
            Some(_) => {
                tracing::debug!(remaining = self.log.len(), "Stroke undone");
                Transition::Changed
            }
            None => Transition::Ignored,
        }
    }
}

impl Default for CanvasSession {
    fn default() -> Self {
        Self::new(ToolConfig::default(), Color::WHITE)
    }
}
