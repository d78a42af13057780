//! Pixel representations supported by the store.
//!
//! A raster picks one [`PixelKind`] at construction and keeps it for life. The
//! kind fixes the sample type, the channel count and the value new tiles are
//! filled with, so per-call code only matches on the sample type once and then
//! runs a monomorphized kernel.

use std::fmt;

use serde::Serialize;

// =============================================================================
// Sample Trait
// =============================================================================

/// A single channel value that the downsampler knows how to combine.
pub trait Sample: Copy + Send + Sync + PartialEq + fmt::Debug + 'static {
    /// Arithmetic mean of a 2x2 block. Integer samples truncate.
    fn average4(a: Self, b: Self, c: Self, d: Self) -> Self;
}

impl Sample for u8 {
    #[inline]
    fn average4(a: Self, b: Self, c: Self, d: Self) -> Self {
        ((a as u16 + b as u16 + c as u16 + d as u16) / 4) as u8
    }
}

impl Sample for u16 {
    #[inline]
    fn average4(a: Self, b: Self, c: Self, d: Self) -> Self {
        ((a as u32 + b as u32 + c as u32 + d as u32) / 4) as u16
    }
}

impl Sample for f32 {
    #[inline]
    fn average4(a: Self, b: Self, c: Self, d: Self) -> Self {
        (a + b + c + d) / 4.0
    }
}

// =============================================================================
// Sample Format
// =============================================================================

/// Storage type of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleFormat {
    U8,
    U16,
    F32,
}

impl SampleFormat {
    pub fn bytes(&self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::U16 => 2,
            SampleFormat::F32 => 4,
        }
    }
}

// =============================================================================
// Pixel Kind
// =============================================================================

/// The closed set of pixel layouts a raster can hold.
///
/// `Scalar` is the non-color fallback used for elevation models and similar
/// grids: a single `f32` channel whose untouched value is `zero` rather than
/// `0.0` (for example a no-data marker).
#[derive(Debug, Clone, Copy)]
pub enum PixelKind {
    Gray8,
    Gray16,
    Gray32F,
    Rgba8,
    Rgba16,
    Rgba32F,
    Scalar { zero: f32 },
}

impl PixelKind {
    /// Number of channels per pixel.
    pub fn channels(&self) -> usize {
        match self {
            PixelKind::Gray8 | PixelKind::Gray16 | PixelKind::Gray32F | PixelKind::Scalar { .. } => 1,
            PixelKind::Rgba8 | PixelKind::Rgba16 | PixelKind::Rgba32F => 4,
        }
    }

    pub fn sample_format(&self) -> SampleFormat {
        match self {
            PixelKind::Gray8 | PixelKind::Rgba8 => SampleFormat::U8,
            PixelKind::Gray16 | PixelKind::Rgba16 => SampleFormat::U16,
            PixelKind::Gray32F | PixelKind::Rgba32F | PixelKind::Scalar { .. } => SampleFormat::F32,
        }
    }

    /// Bytes used by one pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels() * self.sample_format().bytes()
    }

    /// The value freshly created tiles are filled with.
    pub fn zero_pixel(&self) -> Pixel {
        match *self {
            PixelKind::Gray8 => Pixel::Gray8(0),
            PixelKind::Gray16 => Pixel::Gray16(0),
            PixelKind::Gray32F => Pixel::Gray32F(0.0),
            PixelKind::Rgba8 => Pixel::Rgba8([0; 4]),
            PixelKind::Rgba16 => Pixel::Rgba16([0; 4]),
            PixelKind::Rgba32F => Pixel::Rgba32F([0.0; 4]),
            PixelKind::Scalar { zero } => Pixel::Gray32F(zero),
        }
    }

    /// Whether `pixel` can be stored in a raster of this kind.
    pub fn accepts(&self, pixel: &Pixel) -> bool {
        matches!(
            (self, pixel),
            (PixelKind::Gray8, Pixel::Gray8(_))
                | (PixelKind::Gray16, Pixel::Gray16(_))
                | (PixelKind::Gray32F, Pixel::Gray32F(_))
                | (PixelKind::Scalar { .. }, Pixel::Gray32F(_))
                | (PixelKind::Rgba8, Pixel::Rgba8(_))
                | (PixelKind::Rgba16, Pixel::Rgba16(_))
                | (PixelKind::Rgba32F, Pixel::Rgba32F(_))
        )
    }

    /// Parse a kind name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "gray8" | "l8" => Some(PixelKind::Gray8),
            "gray16" | "l16" => Some(PixelKind::Gray16),
            "gray32f" | "l32f" => Some(PixelKind::Gray32F),
            "rgba8" => Some(PixelKind::Rgba8),
            "rgba16" => Some(PixelKind::Rgba16),
            "rgba32f" => Some(PixelKind::Rgba32F),
            "scalar" => Some(PixelKind::Scalar { zero: 0.0 }),
            _ => None,
        }
    }
}

// Zero values compare bitwise so a NaN no-data marker still matches itself.
impl PartialEq for PixelKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PixelKind::Scalar { zero: a }, PixelKind::Scalar { zero: b }) => {
                a.to_bits() == b.to_bits()
            }
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Display for PixelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelKind::Gray8 => write!(f, "Gray8"),
            PixelKind::Gray16 => write!(f, "Gray16"),
            PixelKind::Gray32F => write!(f, "Gray32F"),
            PixelKind::Rgba8 => write!(f, "Rgba8"),
            PixelKind::Rgba16 => write!(f, "Rgba16"),
            PixelKind::Rgba32F => write!(f, "Rgba32F"),
            PixelKind::Scalar { zero } => write!(f, "Scalar(zero={})", zero),
        }
    }
}

// =============================================================================
// Pixel
// =============================================================================

/// One pixel value. Scalar rasters use `Gray32F`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pixel {
    Gray8(u8),
    Gray16(u16),
    Gray32F(f32),
    Rgba8([u8; 4]),
    Rgba16([u16; 4]),
    Rgba32F([f32; 4]),
}
