//! Error types for sketch operations.

use thiserror::Error;

/// Result type for sketch operations.
pub type SketchResult<T> = Result<T, SketchError>;

/// Errors that can occur while configuring or driving a canvas session.
///
/// Degenerate input (moves while idle, empty touch lists, an unmeasured
/// canvas element) is not an error and never produces one of these.
#[derive(Debug, Error)]
pub enum SketchError {
    /// Colour token could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Stroke width was zero, negative or not finite.
    #[error("Invalid stroke width: {0}")]
    InvalidWidth(f32),

    /// Tool name is not one of the known tools.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Event or stroke serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
