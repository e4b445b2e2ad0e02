//! Error types for palette extraction and mosaic rendering.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = PaletteError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PaletteError {
    /// The caller handed over something the algorithms cannot work on,
    /// e.g. a zero-sized pixel buffer or a zero display width.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream decoder rejected the image bytes.
    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("PNG encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("invalid hex color {0:?}")]
    InvalidHex(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PaletteError {
    pub(crate) fn zero_dimension(width: u32, height: u32) -> Self {
        Self::InvalidInput(format!("image dimensions cannot be zero ({width}x{height})"))
    }
}
