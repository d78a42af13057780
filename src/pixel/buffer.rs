//! Typed pixel buffers.
//!
//! [`PixelBuffer`] is the unit that moves in and out of the store: tiles are
//! pixel buffers, `read_rect` returns one and `write_rect` consumes one. Samples
//! are stored row-major and interleaved, with a stride of `width * channels`.

use crate::error::RasterError;
use crate::geometry::{Point, Rect, Size};

use super::kind::{Pixel, PixelKind, SampleFormat};

// =============================================================================
// Samples
// =============================================================================

/// Backing storage, one variant per [`SampleFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl Samples {
    fn filled(format: SampleFormat, len: usize, pixel: &Pixel) -> Self {
        match (format, pixel) {
            (SampleFormat::U8, Pixel::Gray8(v)) => Samples::U8(vec![*v; len]),
            (SampleFormat::U8, Pixel::Rgba8(v)) => Samples::U8(repeat(v, len)),
            (SampleFormat::U16, Pixel::Gray16(v)) => Samples::U16(vec![*v; len]),
            (SampleFormat::U16, Pixel::Rgba16(v)) => Samples::U16(repeat(v, len)),
            (SampleFormat::F32, Pixel::Gray32F(v)) => Samples::F32(vec![*v; len]),
            (SampleFormat::F32, Pixel::Rgba32F(v)) => Samples::F32(repeat(v, len)),
            // Callers check `PixelKind::accepts` first.
            (SampleFormat::U8, _) => Samples::U8(vec![0; len]),
            (SampleFormat::U16, _) => Samples::U16(vec![0; len]),
            (SampleFormat::F32, _) => Samples::F32(vec![0.0; len]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Samples::U8(v) => v.len(),
            Samples::U16(v) => v.len(),
            Samples::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            Samples::U8(_) => SampleFormat::U8,
            Samples::U16(_) => SampleFormat::U16,
            Samples::F32(_) => SampleFormat::F32,
        }
    }
}

fn repeat<T: Copy>(pixel: &[T; 4], len: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        out.extend_from_slice(pixel);
    }
    out
}

// =============================================================================
// PixelBuffer
// =============================================================================

/// A rectangular block of pixels of a single [`PixelKind`].
///
/// The buffer's own coordinate space starts at `(0, 0)`; placement inside a
/// raster is always supplied separately by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    kind: PixelKind,
    width: u32,
    height: u32,
    samples: Samples,
}

impl PixelBuffer {
    /// Create a buffer filled with the kind's zero value.
    pub fn new(kind: PixelKind, size: Size) -> Self {
        let zero = kind.zero_pixel();
        Self::build(kind, size, &zero)
    }

    /// Create a buffer with every pixel set to `pixel`.
    pub fn filled(kind: PixelKind, size: Size, pixel: Pixel) -> Result<Self, RasterError> {
        if !kind.accepts(&pixel) {
            return Err(RasterError::BadPixelKind {
                expected: kind,
                actual: kind_of_pixel(&pixel),
            });
        }
        Ok(Self::build(kind, size, &pixel))
    }

    /// A 0x0 buffer, returned by reads that miss the raster entirely.
    pub fn empty(kind: PixelKind) -> Self {
        Self::new(kind, Size::default())
    }

    /// Wrap existing samples. The sample vector must match the kind's format and
    /// hold exactly `width * height * channels` values.
    pub fn from_samples(kind: PixelKind, size: Size, samples: Samples) -> Result<Self, RasterError> {
        if samples.format() != kind.sample_format() {
            return Err(RasterError::BadPixelKind {
                expected: kind,
                actual: kind_of_format(samples.format(), kind.channels()),
            });
        }
        let expected = size.area() * kind.channels();
        if samples.len() != expected {
            let pixels = samples.len() / kind.channels().max(1);
            return Err(RasterError::BadBufferShape {
                expected: size,
                actual: Size::new(pixels as u32, 1),
            });
        }
        Ok(Self {
            kind,
            width: size.width,
            height: size.height,
            samples,
        })
    }

    fn build(kind: PixelKind, size: Size, pixel: &Pixel) -> Self {
        let len = size.area() * kind.channels();
        Self {
            kind,
            width: size.width,
            height: size.height,
            samples: Samples::filled(kind.sample_format(), len, pixel),
        }
    }

    pub fn kind(&self) -> PixelKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The buffer's extent as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(Point::ORIGIN, self.size())
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Samples per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.kind.channels()
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut Samples {
        &mut self.samples
    }

    pub fn into_samples(self) -> Samples {
        self.samples
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.samples {
            Samples::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&[u16]> {
        match &self.samples {
            Samples::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.samples {
            Samples::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Read one pixel; `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let ch = self.kind.channels();
        let i = y as usize * self.stride() + x as usize * ch;
        let pixel = match (&self.samples, ch) {
            (Samples::U8(v), 1) => Pixel::Gray8(v[i]),
            (Samples::U8(v), _) => Pixel::Rgba8([v[i], v[i + 1], v[i + 2], v[i + 3]]),
            (Samples::U16(v), 1) => Pixel::Gray16(v[i]),
            (Samples::U16(v), _) => Pixel::Rgba16([v[i], v[i + 1], v[i + 2], v[i + 3]]),
            (Samples::F32(v), 1) => Pixel::Gray32F(v[i]),
            (Samples::F32(v), _) => Pixel::Rgba32F([v[i], v[i + 1], v[i + 2], v[i + 3]]),
        };
        Some(pixel)
    }

    /// Write one pixel. Positions outside the buffer are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<(), RasterError> {
        if !self.kind.accepts(&pixel) {
            return Err(RasterError::BadPixelKind {
                expected: self.kind,
                actual: kind_of_pixel(&pixel),
            });
        }
        if x >= self.width || y >= self.height {
            return Ok(());
        }
        let i = y as usize * self.stride() + x as usize * self.kind.channels();
        match (&mut self.samples, pixel) {
            (Samples::U8(v), Pixel::Gray8(p)) => v[i] = p,
            (Samples::U8(v), Pixel::Rgba8(p)) => v[i..i + 4].copy_from_slice(&p),
            (Samples::U16(v), Pixel::Gray16(p)) => v[i] = p,
            (Samples::U16(v), Pixel::Rgba16(p)) => v[i..i + 4].copy_from_slice(&p),
            (Samples::F32(v), Pixel::Gray32F(p)) => v[i] = p,
            (Samples::F32(v), Pixel::Rgba32F(p)) => v[i..i + 4].copy_from_slice(&p),
            _ => {}
        }
        Ok(())
    }

    /// Whether every pixel equals `pixel`.
    pub fn is_uniform(&self, pixel: Pixel) -> bool {
        (0..self.height).all(|y| (0..self.width).all(|x| self.pixel(x, y) == Some(pixel)))
    }
}

/// The natural kind for a stand-alone pixel value, used in error reports.
fn kind_of_pixel(pixel: &Pixel) -> PixelKind {
    match pixel {
        Pixel::Gray8(_) => PixelKind::Gray8,
        Pixel::Gray16(_) => PixelKind::Gray16,
        Pixel::Gray32F(_) => PixelKind::Gray32F,
        Pixel::Rgba8(_) => PixelKind::Rgba8,
        Pixel::Rgba16(_) => PixelKind::Rgba16,
        Pixel::Rgba32F(_) => PixelKind::Rgba32F,
    }
}

fn kind_of_format(format: SampleFormat, channels: usize) -> PixelKind {
    match (format, channels) {
        (SampleFormat::U8, 1) => PixelKind::Gray8,
        (SampleFormat::U8, _) => PixelKind::Rgba8,
        (SampleFormat::U16, 1) => PixelKind::Gray16,
        (SampleFormat::U16, _) => PixelKind::Rgba16,
        (SampleFormat::F32, 1) => PixelKind::Gray32F,
        (SampleFormat::F32, _) => PixelKind::Rgba32F,
    }
}
