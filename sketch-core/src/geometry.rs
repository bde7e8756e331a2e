//! Mapping from displayed (CSS) pixel space to backing pixel space.

use serde::{Deserialize, Serialize};

/// A position in canvas backing-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X position in pixels from the left edge.
    pub x: f32,
    /// Y position in pixels from the top edge.
    pub y: f32,
}

impl Point {
    /// The canvas origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Layout of the canvas element as measured by the host.
///
/// The displayed size is what the page lays out; the backing size is the
/// pixel grid strokes are rendered into. The two may differ independently
/// on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasGeometry {
    /// Left edge of the element in viewport coordinates.
    pub left: f32,
    /// Top edge of the element in viewport coordinates.
    pub top: f32,
    /// Displayed width in CSS pixels.
    pub displayed_width: f32,
    /// Displayed height in CSS pixels.
    pub displayed_height: f32,
    /// Backing surface width in pixels.
    pub backing_width: u32,
    /// Backing surface height in pixels.
    pub backing_height: u32,
}

impl CanvasGeometry {
    /// Geometry of an element displayed at its backing size, at the viewport origin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            displayed_width: width as f32,
            displayed_height: height as f32,
            backing_width: width,
            backing_height: height,
        }
    }

    /// Whether the element has a usable displayed size.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.displayed_width.is_finite()
            && self.displayed_height.is_finite()
            && self.displayed_width > 0.0
            && self.displayed_height > 0.0
    }

    /// Horizontal and vertical backing-pixels-per-displayed-pixel.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scale(&self) -> (f32, f32) {
        (
            self.backing_width as f32 / self.displayed_width,
            self.backing_height as f32 / self.displayed_height,
        )
    }

    /// Project a viewport coordinate onto the backing surface.
    ///
    /// Returns the origin when the element has not been measured yet.
    #[must_use]
    pub fn map(&self, raw_x: f32, raw_y: f32) -> Point {
        if !self.is_measured() {
            return Point::ORIGIN;
        }
        let (scale_x, scale_y) = self.scale();
        Point::new((raw_x - self.left) * scale_x, (raw_y - self.top) * scale_y)
    }
}

/// Map a viewport coordinate through optional geometry.
///
/// `None` means the element is not mounted, which maps to the origin.
#[must_use]
pub fn map_point(geometry: Option<&CanvasGeometry>, raw_x: f32, raw_y: f32) -> Point {
    geometry.map_or(Point::ORIGIN, |g| g.map(raw_x, raw_y))
}
