//! Tile and level encoder.
//!
//! Buffers are converted to a `DynamicImage` and then encoded with the `image`
//! crate's PNG or JPEG encoders.
//!
//! # Lossy Paths
//!
//! - JPEG has no alpha and no wide samples: gray kinds are written as 8-bit
//!   luma, everything else as 8-bit RGB.
//! - PNG has no float samples: float kinds are written as 16-bit RGBA, with
//!   values clamped to `[0, 1]` by the `image` conversion.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;

use crate::error::CodecError;
use crate::pixel::{PixelBuffer, PixelKind, SampleFormat};

use super::convert::buffer_to_image;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Output Format
// =============================================================================

/// Encoded image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Lossless PNG
    #[default]
    Png,

    /// Baseline JPEG
    Jpeg,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Parse a format name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }
}

// =============================================================================
// Encoder
// =============================================================================

/// Encodes pixel buffers into image bytes.
///
/// # Example
///
/// ```
/// use raster_pyramid::codec::{OutputFormat, TileEncoder};
/// use raster_pyramid::{Pixel, PixelBuffer, PixelKind, Size};
///
/// let tile = PixelBuffer::filled(PixelKind::Gray8, Size::new(8, 8), Pixel::Gray8(200)).unwrap();
/// let encoder = TileEncoder::new(OutputFormat::Jpeg).with_quality(90);
/// let bytes = encoder.encode(&tile).unwrap();
/// assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TileEncoder {
    format: OutputFormat,
    quality: u8,
}

impl Default for TileEncoder {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

impl TileEncoder {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the JPEG quality. Out-of-range values are clamped; PNG ignores it.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = clamp_quality(quality);
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a buffer in this encoder's format.
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<Bytes, CodecError> {
        if buffer.is_empty() {
            return Err(CodecError::Unsupported {
                reason: "cannot encode an empty buffer".to_string(),
            });
        }

        let img = buffer_to_image(buffer)?;
        let gray = buffer.kind().channels() == 1;

        let mut output = Vec::new();
        match self.format {
            OutputFormat::Jpeg => {
                let img = if gray {
                    DynamicImage::ImageLuma8(img.to_luma8())
                } else {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                };
                let mut encoder = JpegEncoder::new_with_quality(&mut output, self.quality);
                encoder
                    .encode_image(&img)
                    .map_err(|e| CodecError::EncodeError {
                        message: e.to_string(),
                    })?;
            }
            OutputFormat::Png => {
                let img = match buffer.kind().sample_format() {
                    SampleFormat::F32 => DynamicImage::ImageRgba16(img.to_rgba16()),
                    _ => img,
                };
                img.write_with_encoder(PngEncoder::new(&mut output))
                    .map_err(|e| CodecError::EncodeError {
                        message: e.to_string(),
                    })?;
            }
        }

        Ok(Bytes::from(output))
    }
}

/// Decode image bytes, guessing the format from the content.
pub fn decode(source: &[u8]) -> Result<DynamicImage, CodecError> {
    let reader = image::ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| CodecError::DecodeError {
            message: e.to_string(),
        })?;

    reader.decode().map_err(|e| CodecError::DecodeError {
        message: e.to_string(),
    })
}

/// Clamp quality to valid range.
///
/// Values below 1 become 1, values above 100 become 100.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

/// Whether `kind` survives a PNG round trip without loss.
pub fn png_is_lossless(kind: PixelKind) -> bool {
    kind.sample_format() != SampleFormat::F32
}

// =============================================================================
// Tests
// =============================================================================
