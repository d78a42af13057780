//! Writing a raster's levels and tiles to a directory.
//!
//! Levels are written as `level-L.ext`. When tiles are requested, every tile
//! that exists is also written as `L-COL-ROW.ext`; tiles that were never
//! created are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CodecError;
use crate::pyramid::Raster;

use super::encoder::TileEncoder;

/// What an export wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// One file per level, coarsest first
    pub levels: Vec<PathBuf>,

    /// Number of tile files written
    pub tiles: usize,

    /// Total bytes written
    pub bytes: u64,
}

/// File name for a full level image.
pub fn level_file_name(level: usize, extension: &str) -> String {
    format!("level-{}.{}", level, extension)
}

/// File name for one tile.
pub fn tile_file_name(level: usize, col: u32, row: u32, extension: &str) -> String {
    format!("{}-{}-{}.{}", level, col, row, extension)
}

/// Export every level of `raster` (and optionally its tiles) into `dir`.
///
/// `dir` is created if missing. Existing files with the same names are
/// overwritten.
pub fn export_levels(
    raster: &Raster,
    dir: &Path,
    encoder: &TileEncoder,
    tiles: bool,
) -> Result<ExportSummary, CodecError> {
    fs::create_dir_all(dir)?;
    let extension = encoder.format().extension();
    let mut summary = ExportSummary::default();

    for info in raster.level_infos() {
        let level = info.level as i32;
        let pixels = raster.read_rect(level, info.bounds)?;
        let bytes = encoder.encode(&pixels)?;

        let path = dir.join(level_file_name(info.level, extension));
        fs::write(&path, &bytes)?;
        debug!(level, path = %path.display(), bytes = bytes.len(), "wrote level");

        summary.bytes += bytes.len() as u64;
        summary.levels.push(path);

        if !tiles {
            continue;
        }
        for row in 0..info.tiles_down {
            for col in 0..info.tiles_across {
                let Some(tile) = raster.tile(level, col, row)? else {
                    continue;
                };
                let bytes = encoder.encode(&tile.snapshot())?;
                let path = dir.join(tile_file_name(info.level, col, row, extension));
                fs::write(&path, &bytes)?;
                summary.bytes += bytes.len() as u64;
                summary.tiles += 1;
            }
        }
    }

    info!(
        dir = %dir.display(),
        levels = summary.levels.len(),
        tiles = summary.tiles,
        bytes = summary.bytes,
        "export complete"
    );
    Ok(summary)
}
