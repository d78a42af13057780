//! Pixel kinds and pixel buffers.
//!
//! - [`PixelKind`]: the sample layout a raster is built with
//! - [`Pixel`]: a single pixel value
//! - [`PixelBuffer`]: a rectangular block of pixels, used for tiles and for
//!   rectangle reads and writes
//! - [`Sample`]: channel types the downsampler can average

mod buffer;
mod kind;

pub use buffer::{PixelBuffer, Samples};
pub use kind::{Pixel, PixelKind, Sample, SampleFormat};
