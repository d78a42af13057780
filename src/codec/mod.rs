//! Image interop for rasters.
//!
//! This module is the only part of the crate that deals with encoded images
//! and files. The raster core works purely on [`PixelBuffer`](crate::PixelBuffer)s.
//!
//! # Components
//!
//! - [`buffer_from_image`] / [`buffer_to_image`]: conversion to and from `image::DynamicImage`
//! - [`TileEncoder`]: PNG or JPEG encoding to `Bytes`
//! - [`export_levels`]: write every level (and optionally every tile) of a raster to disk

mod convert;
mod encoder;
mod export;

pub use convert::{buffer_from_image, buffer_to_image};
pub use encoder::{
    clamp_quality, decode, png_is_lossless, OutputFormat, TileEncoder, DEFAULT_JPEG_QUALITY,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use export::{export_levels, level_file_name, tile_file_name, ExportSummary};
