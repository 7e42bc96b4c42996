//! Error taxonomy for geometry construction and field conversion

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    /// Bad radius ordering, non-positive extent or degenerate permittivities.
    /// Raised at construction; nothing is sampled.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Component arrays disagree on the sample count.
    #[error("Shape mismatch: {points} points, {er} radial and {ez} axial components")]
    ShapeMismatch { points: usize, er: usize, ez: usize },

    /// Result does not fit the export layout
    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FieldError>;
