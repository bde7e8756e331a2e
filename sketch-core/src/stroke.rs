//! Freehand strokes.

use serde::{Deserialize, Serialize};

use crate::{Color, Point, Tool, ToolConfig};

/// One continuous freehand mark: ordered points plus the style captured at start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
    color: Color,
    width: f32,
    tool: Tool,
}

impl Stroke {
    /// Start a stroke at `start`, capturing the effective style of `config`.
    #[must_use]
    pub fn begin(start: Point, config: &ToolConfig, background: Color) -> Self {
        let (color, width) = config.effective(background);
        Self {
            points: vec![start],
            color,
            width,
            tool: config.tool,
        }
    }

    /// Build a complete stroke from explicit parts.
    ///
    /// The style is taken as given; no eraser adjustment is applied.
    #[must_use]
    pub fn from_points(points: Vec<Point>, color: Color, width: f32, tool: Tool) -> Self {
        Self {
            points,
            color,
            width,
            tool,
        }
    }

    /// Append the next point of the path.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Points in path order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of recorded points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A stroke with fewer than two points is a dot and is not drawn as a line.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    /// Captured colour.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Captured base width (already doubled for the eraser).
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Tool the stroke was drawn with.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Width after the tool's multiplier is applied.
    #[must_use]
    pub fn render_width(&self) -> f32 {
        self.width * self.tool.style().width_multiplier
    }
}
