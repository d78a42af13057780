//! Command-line configuration for the `raster-pyramid` binary.
//!
//! Options can be given as flags or through environment variables with the
//! `RASTER_` prefix:
//!
//! - `RASTER_TILE_SIZE` - Tile edge length in pixels for `build` (default: 256)
//! - `RASTER_KIND` - Pixel kind for `build` (default: rgba8)
//! - `RASTER_FILTER` - Downsampling filter (default: average)
//! - `RASTER_FORMAT` - Output image format (default: png)
//! - `RASTER_JPEG_QUALITY` - JPEG quality (default: 80)
//! - `RASTER_THREADS` - Worker threads for tile fan-out (default: all cores)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::blit::Filter;
use crate::codec::{OutputFormat, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY};
use crate::pixel::PixelKind;

// =============================================================================
// Default Values
// =============================================================================

/// Default tile edge length.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Largest tile edge accepted on the command line.
pub const MAX_TILE_SIZE: u32 = 8192;

/// Default pixel kind name.
pub const DEFAULT_KIND: &str = "rgba8";

/// Default filter name.
pub const DEFAULT_FILTER: &str = "average";

/// Default output format name.
pub const DEFAULT_FORMAT: &str = "png";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Raster Pyramid - tiled multi-resolution raster tools.
#[derive(Parser, Debug, Clone)]
#[command(name = "raster-pyramid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Worker threads for tile fan-out. Defaults to one per core.
    #[arg(long, global = true, env = "RASTER_THREADS")]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the level layout for a raster geometry.
    Info(InfoConfig),

    /// Load an image into a raster and export its pyramid.
    Build(BuildConfig),
}

// =============================================================================
// Info
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// Raster width in pixels.
    #[arg(long)]
    pub width: u32,

    /// Raster height in pixels.
    #[arg(long)]
    pub height: u32,

    /// Tile width in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_width: u32,

    /// Tile height in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_height: u32,

    /// Print the layout as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be greater than 0".to_string());
        }
        validate_tile_edge(self.tile_width)?;
        validate_tile_edge(self.tile_height)?;
        Ok(())
    }
}

// =============================================================================
// Build
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct BuildConfig {
    /// Source image (any format the `image` crate can decode).
    pub input: PathBuf,

    /// Output directory for level images and tiles.
    #[arg(short, long)]
    pub out: PathBuf,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "RASTER_TILE_SIZE")]
    pub tile_size: u32,

    /// Pixel kind: gray8, gray16, gray32f, rgba8, rgba16, rgba32f or scalar.
    #[arg(long, default_value = DEFAULT_KIND, env = "RASTER_KIND")]
    pub kind: String,

    /// Downsampling filter: average or decimate.
    #[arg(long, default_value = DEFAULT_FILTER, env = "RASTER_FILTER")]
    pub filter: String,

    /// Output format: png or jpeg.
    #[arg(long, default_value = DEFAULT_FORMAT, env = "RASTER_FORMAT")]
    pub format: String,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "RASTER_JPEG_QUALITY")]
    pub quality: u8,

    /// Also write every tile as `L-COL-ROW.ext`.
    #[arg(long, default_value_t = false)]
    pub tiles: bool,
}

impl BuildConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_tile_edge(self.tile_size)?;
        self.pixel_kind()?;
        self.filter()?;
        self.output_format()?;
        if !(MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&self.quality) {
            return Err(format!(
                "quality must be between {} and {}",
                MIN_JPEG_QUALITY, MAX_JPEG_QUALITY
            ));
        }
        Ok(())
    }

    pub fn pixel_kind(&self) -> Result<PixelKind, String> {
        PixelKind::from_name(&self.kind).ok_or_else(|| format!("unknown pixel kind '{}'", self.kind))
    }

    pub fn filter(&self) -> Result<Filter, String> {
        Filter::from_name(&self.filter).ok_or_else(|| format!("unknown filter '{}'", self.filter))
    }

    pub fn output_format(&self) -> Result<OutputFormat, String> {
        OutputFormat::from_name(&self.format)
            .ok_or_else(|| format!("unknown output format '{}'", self.format))
    }
}

fn validate_tile_edge(edge: u32) -> Result<(), String> {
    if edge == 0 || edge > MAX_TILE_SIZE {
        return Err(format!("tile size must be between 2 and {}", MAX_TILE_SIZE));
    }
    if edge % 2 != 0 {
        return Err(format!("tile size must be even, got {}", edge));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
