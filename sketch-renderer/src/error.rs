//! Renderer error types.

use sketch_core::SketchError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while compositing or exporting.
///
/// None of these touch the stroke log; a failed pass is recovered by the next one.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Surface could not be allocated (zero or oversized dimensions).
    #[error("Surface allocation failed: {0}")]
    Surface(String),

    /// Image encoding failed.
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// Canvas configuration was rejected.
    #[error("Invalid canvas configuration: {0}")]
    Config(#[from] SketchError),

    /// Requested export is not available in this build.
    #[error("Export failed: {0}")]
    Export(String),
}
