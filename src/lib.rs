//! # Raster Pyramid
//!
//! A tiled, multi-resolution raster store.
//!
//! A [`Raster`] covers a pixel rectangle at its finest level and keeps a chain
//! of coarser levels, each half the size of the next, down to a level that fits
//! in a single tile. Writing a rectangle at any level updates every coarser
//! level that depends on it, so a reader always sees a consistent pyramid.
//!
//! ## Features
//!
//! - **Lazy tiles**: tiles are created on first write and read as the zero value until then
//! - **Arbitrary rectangles**: reads and writes span tile boundaries and are clipped to the level
//! - **Parallel propagation**: parent updates fan out across a rayon pool, one level at a time
//! - **Several pixel kinds**: 8/16-bit and float gray or RGBA, plus scalar rasters with a custom zero
//!
//! ## Architecture
//!
//! - [`geometry`] - points, sizes and half-open rectangles
//! - [`pixel`] - pixel kinds and owned pixel buffers
//! - [`blit`] - rectangle copy and 2x downsampling kernels
//! - [`pyramid`] - level layout, tile store, propagation and the [`Raster`] type
//! - [`codec`] - conversion to `image` types, PNG/JPEG encoding and export
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```
//! use raster_pyramid::{Pixel, PixelBuffer, PixelKind, Raster, Rect, Size};
//!
//! let raster = Raster::new(Rect::new(0, 0, 1000, 600), Size::new(256, 256), PixelKind::Rgba8)?;
//! let red = PixelBuffer::filled(PixelKind::Rgba8, Size::new(300, 300), Pixel::Rgba8([255, 0, 0, 255]))?;
//! raster.write_rect(-1, Rect::new(100, 100, 400, 400), &red)?;
//!
//! assert_eq!(raster.pixel(250, 250), Pixel::Rgba8([255, 0, 0, 255]));
//! assert_eq!(raster.level_bounds(0)?, Rect::new(0, 0, 250, 150));
//! # Ok::<(), raster_pyramid::RasterError>(())
//! ```

pub mod blit;
pub mod codec;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pixel;
pub mod pyramid;

// Re-export commonly used types
pub use blit::Filter;
pub use config::{BuildConfig, Cli, Command, InfoConfig};
pub use error::{CodecError, RasterError};
pub use geometry::{Point, Rect, Size};
pub use pixel::{Pixel, PixelBuffer, PixelKind, Sample, SampleFormat, Samples};
pub use pyramid::{
    adjust_level, level_count, LevelInfo, PyramidLayout, Raster, Tile, TileRange, TileRef,
};
