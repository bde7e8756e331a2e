//! Snapshot encoding of the flattened surface.
//!
//! Encodes the compositor's pixmap to PNG (via tiny-skia) or JPEG (via the
//! image crate) and wraps the bytes for delivery to the host, optionally as a
//! base64 data URI.

use base64::Engine;
use serde::{Deserialize, Serialize};
use sketch_core::Color;
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};

/// Default upper bound on an encoded snapshot (10 MiB).
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image (flattened over the background, no alpha).
    Jpeg,
}

impl ExportFormat {
    /// MIME type for data URIs.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Parse a format name (`png`, `jpg`, `jpeg`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Configuration for snapshot export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
    /// Colour non-opaque pixels are flattened onto for JPEG.
    pub matte: Color,
    /// Reject snapshots larger than this many bytes.
    pub max_bytes: Option<usize>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            jpeg_quality: 85,
            matte: Color::WHITE,
            max_bytes: Some(DEFAULT_MAX_BYTES),
        }
    }
}

/// An encoded image of the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Encoding of `bytes`.
    pub format: ExportFormat,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl Snapshot {
    /// Size of the encoded image.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the encoded image is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>` form of the image.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{payload}", self.format.mime_type())
    }
}

/// Encodes a flattened surface into a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct ImageExporter {
    config: ExportConfig,
}

impl ImageExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: ExportConfig) {
        self.config = config;
    }

    /// Encode the surface in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the result exceeds `max_bytes`.
    pub fn export(&self, surface: &Pixmap) -> RenderResult<Snapshot> {
        let bytes = match self.config.format {
            ExportFormat::Png => Self::encode_png(surface)?,
            ExportFormat::Jpeg => self.encode_jpeg(surface)?,
        };

        if let Some(limit) = self.config.max_bytes {
            if bytes.len() > limit {
                return Err(RenderError::Encode(format!(
                    "snapshot is {} bytes, limit is {limit}",
                    bytes.len()
                )));
            }
        }

        Ok(Snapshot {
            format: self.config.format,
            width: surface.width(),
            height: surface.height(),
            bytes,
        })
    }

    /// Encode the surface as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn encode_png(surface: &Pixmap) -> RenderResult<Vec<u8>> {
        surface
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
    }

    /// Encode the surface as JPEG bytes, flattening alpha onto the matte colour.
    ///
    /// # Errors
    ///
    /// Returns an error if JPEG encoding fails or JPEG support is not compiled in.
    #[cfg(feature = "jpeg")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn encode_jpeg(&self, surface: &Pixmap) -> RenderResult<Vec<u8>> {
        use image::ImageEncoder;

        let (width, height) = (surface.width(), surface.height());
        let matte = self.config.matte;
        let bg = [f32::from(matte.r), f32::from(matte.g), f32::from(matte.b)];
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        // Pixmap data is premultiplied, so colour channels are already scaled by alpha.
        for pixel in surface.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (channel, back) in pixel[..3].iter().zip(bg) {
                rgb_data.push(back.mul_add(inv, f32::from(*channel)).round().min(255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let quality = self.config.jpeg_quality.clamp(1, 100);
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// JPEG support is not compiled in.
    ///
    /// # Errors
    ///
    /// Always returns [`RenderError::Export`].
    #[cfg(not(feature = "jpeg"))]
    pub fn encode_jpeg(&self, _surface: &Pixmap) -> RenderResult<Vec<u8>> {
        Err(RenderError::Export(
            "JPEG export requires the `jpeg` feature".to_string(),
        ))
    }
}
