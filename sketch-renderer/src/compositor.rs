//! Full-redraw stroke compositor.
//!
//! Every pass starts from a blank surface and replays the whole stroke stack:
//! completed strokes in log order, then the active stroke on top. Strokes are
//! drawn onto a transparent ink layer so the eraser can punch holes in ink
//! without removing the background; the ink layer is then laid over the
//! opaque background.

use sketch_core::{CanvasSession, Color, Compositing, Stroke};
use tiny_skia::{
    BlendMode, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Transform,
};

use crate::error::{RenderError, RenderResult};

/// Owns the raster surface and redraws it from stroke data.
pub struct Compositor {
    surface: Pixmap,
    ink: Pixmap,
    background: Color,
    passes: u64,
}

impl Compositor {
    /// Create a compositor with a blank surface of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if a pixmap of that size cannot be allocated.
    pub fn new(width: u32, height: u32, background: Color) -> RenderResult<Self> {
        let mut compositor = Self {
            surface: allocate(width, height)?,
            ink: allocate(width, height)?,
            background,
            passes: 0,
        };
        compositor.render_blank();
        Ok(compositor)
    }

    /// Reallocate the surface at a new size. The surface is left blank.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if a pixmap of that size cannot be allocated.
    /// The previous surface is kept in that case.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if (width, height) == (self.width(), self.height()) {
            return Ok(());
        }
        let surface = allocate(width, height)?;
        let ink = allocate(width, height)?;
        self.surface = surface;
        self.ink = ink;
        tracing::debug!("Compositor resized to {}x{}", width, height);
        self.render_blank();
        Ok(())
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Background colour filled at the start of every pass.
    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    /// Change the background colour. Takes effect on the next pass.
    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    /// Number of render passes performed so far.
    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    /// The flattened surface from the most recent pass.
    #[must_use]
    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    /// Straight-alpha RGBA of one surface pixel, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.surface.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// Reset the surface to the plain background.
    pub fn render_blank(&mut self) -> &Pixmap {
        self.render(std::iter::empty(), None)
    }

    /// Redraw the surface from a session's stroke log and active stroke.
    pub fn render_session(&mut self, session: &CanvasSession) -> &Pixmap {
        self.render(session.strokes(), session.active_stroke())
    }

    /// Redraw the surface from scratch.
    ///
    /// `strokes` are drawn in iteration order, then `active` on top.
    pub fn render<'a, I>(&mut self, strokes: I, active: Option<&'a Stroke>) -> &Pixmap
    where
        I: IntoIterator<Item = &'a Stroke>,
    {
        self.ink.fill(tiny_skia::Color::TRANSPARENT);

        let mut drawn = 0usize;
        let mut skipped = 0usize;
        for stroke in strokes.into_iter().chain(active) {
            if draw_stroke(&mut self.ink, stroke) {
                drawn += 1;
            } else {
                skipped += 1;
            }
        }

        self.surface.fill(to_skia(self.background));
        self.surface.draw_pixmap(
            0,
            0,
            self.ink.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        self.passes += 1;
        tracing::trace!(
            pass = self.passes,
            drawn,
            skipped,
            active = active.is_some(),
            "Compositor pass"
        );
        &self.surface
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("background", &self.background)
            .field("passes", &self.passes)
            .finish_non_exhaustive()
    }
}

fn allocate(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Surface(format!("cannot allocate {width}x{height} pixmap")))
}

fn to_skia(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Paint for one stroke, built fresh so no state carries over between strokes.
fn stroke_paint(stroke: &Stroke) -> Paint<'static> {
    let style = stroke.tool().style();
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    match style.compositing {
        Compositing::Paint => {
            let mut color = to_skia(stroke.color());
            color.apply_opacity(style.opacity);
            paint.set_color(color);
            paint.blend_mode = BlendMode::SourceOver;
        }
        Compositing::Erase => {
            let mut color = tiny_skia::Color::BLACK;
            color.apply_opacity(style.opacity);
            paint.set_color(color);
            paint.blend_mode = BlendMode::DestinationOut;
        }
    }
    paint
}

fn stroke_outline(stroke: &Stroke) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width: stroke.render_width(),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..tiny_skia::Stroke::default()
    }
}

/// Draw one stroke as a single connected path. Returns `false` if nothing was drawn.
fn draw_stroke(target: &mut Pixmap, stroke: &Stroke) -> bool {
    if stroke.is_degenerate() {
        return false;
    }
    let points = stroke.points();
    let mut builder = PathBuilder::new();
    builder.move_to(points[0].x, points[0].y);
    for p in &points[1..] {
        builder.line_to(p.x, p.y);
    }
    let Some(path) = builder.finish() else {
        return false;
    };

    target.stroke_path(
        &path,
        &stroke_paint(stroke),
        &stroke_outline(stroke),
        Transform::identity(),
        None,
    );
    true
}
