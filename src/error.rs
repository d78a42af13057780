use thiserror::Error;

use crate::geometry::Size;
use crate::pixel::PixelKind;

/// Errors raised by the raster store.
///
/// Every structural error is detected before the raster is mutated, so a failed
/// call leaves the pyramid exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    /// Level resolves outside `[0, levels)` after negative-index adjustment
    #[error("Invalid level {level}: raster has {levels} level(s)")]
    InvalidLevel { level: i32, levels: usize },

    /// A supplied tile does not have the raster's tile size
    #[error("Bad tile shape: expected {expected}, got {actual}")]
    BadTileShape { expected: Size, actual: Size },

    /// A supplied buffer uses a different pixel representation
    #[error("Bad pixel kind: expected {expected}, got {actual}")]
    BadPixelKind {
        expected: PixelKind,
        actual: PixelKind,
    },

    /// A source buffer is too small for the rectangle it is written to
    #[error("Bad buffer shape: rectangle needs {expected}, buffer is {actual}")]
    BadBufferShape { expected: Size, actual: Size },

    /// Tile coordinates fall outside the level's tile grid
    #[error("Tile ({col}, {row}) out of bounds at level {level}: grid is {across}x{down}")]
    TileOutOfBounds {
        level: usize,
        col: u32,
        row: u32,
        across: u32,
        down: u32,
    },

    /// Raster bounds or tile size cannot form a pyramid
    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },
}

/// Errors from converting or encoding pixel buffers at the crate boundary.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Error from the raster store while reading pixels
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    /// Source bytes could not be decoded
    #[error("Failed to decode image: {message}")]
    DecodeError { message: String },

    /// Pixels could not be encoded
    #[error("Failed to encode image: {message}")]
    EncodeError { message: String },

    /// The buffer cannot be represented in the requested output
    #[error("Unsupported conversion: {reason}")]
    Unsupported { reason: String },

    /// Filesystem error while exporting
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}
