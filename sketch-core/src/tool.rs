//! Drawing tools and the per-tool rendering table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Color, SketchError, SketchResult};

/// Rendering variant applied to a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Solid, full-opacity line.
    #[default]
    Pen,
    /// Wider, translucent line.
    Brush,
    /// Widest, half-transparent highlighter line.
    Marker,
    /// Removes ink along its path, revealing the background.
    Eraser,
}

/// How a stroke's pixels combine with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compositing {
    /// Paint the stroke colour over existing ink.
    Paint,
    /// Remove existing ink wherever the stroke covers.
    Erase,
}

/// Fixed rendering modifiers for one tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolStyle {
    /// Multiplier applied to the stroke width at render time.
    pub width_multiplier: f32,
    /// Stroke opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Blend rule.
    pub compositing: Compositing,
}

const PEN: ToolStyle = ToolStyle {
    width_multiplier: 1.0,
    opacity: 1.0,
    compositing: Compositing::Paint,
};

const BRUSH: ToolStyle = ToolStyle {
    width_multiplier: 1.5,
    opacity: 0.7,
    compositing: Compositing::Paint,
};

const MARKER: ToolStyle = ToolStyle {
    width_multiplier: 2.0,
    opacity: 0.5,
    compositing: Compositing::Paint,
};

// Eraser width is doubled when the stroke is captured, not here.
const ERASER: ToolStyle = ToolStyle {
    width_multiplier: 1.0,
    opacity: 1.0,
    compositing: Compositing::Erase,
};

impl Tool {
    /// All tools, in display order.
    pub const ALL: [Self; 4] = [Self::Pen, Self::Brush, Self::Marker, Self::Eraser];

    /// Rendering modifiers for this tool.
    #[must_use]
    pub const fn style(self) -> ToolStyle {
        match self {
            Self::Pen => PEN,
            Self::Brush => BRUSH,
            Self::Marker => MARKER,
            Self::Eraser => ERASER,
        }
    }

    /// Lowercase tool name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pen => "pen",
            Self::Brush => "brush",
            Self::Marker => "marker",
            Self::Eraser => "eraser",
        }
    }

    /// Whether this tool erases instead of painting.
    #[must_use]
    pub fn is_eraser(self) -> bool {
        self == Self::Eraser
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| SketchError::UnknownTool(s.to_string()))
    }
}

/// Tool configuration supplied by external controls.
///
/// Read by the session when a stroke starts; never mutated by the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Ink colour.
    pub color: Color,
    /// Base stroke width in backing pixels.
    pub width: f32,
    /// Selected tool.
    pub tool: Tool,
}

impl ToolConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidWidth`] if `width` is not a positive finite number.
    pub fn new(color: Color, width: f32, tool: Tool) -> SketchResult<Self> {
        let config = Self { color, width, tool };
        config.validate()?;
        Ok(config)
    }

    /// Check that the width is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidWidth`] if `width` is not a positive finite number.
    pub fn validate(&self) -> SketchResult<()> {
        if self.width.is_finite() && self.width > 0.0 {
            Ok(())
        } else {
            Err(SketchError::InvalidWidth(self.width))
        }
    }

    /// Colour and width a new stroke actually captures.
    ///
    /// The eraser paints in the background colour at twice the configured width.
    #[must_use]
    pub fn effective(&self, background: Color) -> (Color, f32) {
        if self.tool.is_eraser() {
            (background, self.width * 2.0)
        } else {
            (self.color, self.width)
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 5.0,
            tool: Tool::Pen,
        }
    }
}
