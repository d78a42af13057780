//! Pyramid level identification and tile indexing.
//!
//! This module is pure arithmetic: it never touches pixel data. It decides how
//! many levels a raster needs, what each level's pixel bounds and tile grid
//! are, and which tiles a rectangle overlaps.
//!
//! # Level Numbering
//!
//! Level 0 is the coarsest level and `levels - 1` is the finest. Negative
//! level arguments count back from the finest level, so `-1` is the finest and
//! `-levels` is level 0.
//!
//! # Level Geometry
//!
//! With `s = levels - 1 - L`, level `L` covers
//!
//! ```text
//! min_L = floor(min / 2^s)
//! max_L = ceil(max / 2^s)
//! ```
//!
//! so coarse pixel `x` is always the reduction of finer pixels `2x` and `2x + 1`.
//!
//! Tiles sit on absolute multiples of the tile size: tile `(col, row)` of a
//! level's grid covers absolute pixels starting at
//! `((tile_offset.x + col) * tw, (tile_offset.y + row) * th)`. Tiles on the
//! edges of a level may extend past its bounds. Tile edges must be even so that
//! a child tile reduces into exactly one quadrant of its parent.

use std::ops::Range;

use serde::Serialize;

use crate::error::RasterError;
use crate::geometry::{Point, Rect, Size};

// =============================================================================
// Level Count
// =============================================================================

/// Number of levels needed so that one tile, scaled up by `2^(levels-1)`,
/// covers `extent` on both axes.
pub fn level_count(extent: Size, tile_size: Size) -> usize {
    fn axis(extent: u32, tile: u32) -> usize {
        let extent = extent as u64;
        let mut covered = tile.max(1) as u64;
        let mut levels = 1;
        while covered < extent {
            covered <<= 1;
            levels += 1;
        }
        levels
    }

    axis(extent.width, tile_size.width).max(axis(extent.height, tile_size.height))
}

/// Resolve a possibly negative level against a pyramid with `levels` levels.
pub fn adjust_level(level: i32, levels: usize) -> Result<usize, RasterError> {
    let count = levels as i64;
    let adjusted = if level < 0 {
        count + level as i64
    } else {
        level as i64
    };
    if adjusted < 0 || adjusted >= count {
        return Err(RasterError::InvalidLevel { level, levels });
    }
    Ok(adjusted as usize)
}

// =============================================================================
// LevelInfo
// =============================================================================

/// Geometry of a single pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    /// Index of this level (0 = coarsest)
    pub level: usize,

    /// Pixel bounds in this level's coordinate space
    pub bounds: Rect,

    /// Absolute tile index of grid cell `(0, 0)`
    pub tile_offset: Point,

    /// Width of this level in pixels
    pub width: u32,

    /// Height of this level in pixels
    pub height: u32,

    /// Number of tiles in X direction
    pub tiles_across: u32,

    /// Number of tiles in Y direction
    pub tiles_down: u32,

    /// Downsample factor relative to the finest level
    pub downsample: u64,
}

impl LevelInfo {
    /// Total number of tile slots at this level.
    pub fn tile_count(&self) -> usize {
        self.tiles_across as usize * self.tiles_down as usize
    }
}

// =============================================================================
// TileRange
// =============================================================================

/// A block of tile coordinates, half-open on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRange {
    pub cols: Range<u32>,
    pub rows: Range<u32>,
}

impl TileRange {
    pub fn empty() -> Self {
        Self {
            cols: 0..0,
            rows: 0..0,
        }
    }

    pub fn len(&self) -> usize {
        self.cols.len() * self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty() || self.rows.is_empty()
    }

    /// Tile coordinates as `(col, row)`, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.rows
            .clone()
            .flat_map(move |row| self.cols.clone().map(move |col| (col, row)))
    }
}

// =============================================================================
// PyramidLayout
// =============================================================================

/// Level geometry for a whole pyramid, computed once at construction.
#[derive(Debug, Clone)]
pub struct PyramidLayout {
    tile_size: Size,
    levels: Vec<LevelInfo>,
}

impl PyramidLayout {
    /// Compute the layout for a raster with `bounds` at its finest level.
    pub fn new(bounds: Rect, tile_size: Size) -> Result<Self, RasterError> {
        if bounds.is_empty() {
            return Err(RasterError::InvalidGeometry {
                message: format!("raster bounds {} are empty", bounds),
            });
        }
        if tile_size.is_empty() || tile_size.width % 2 != 0 || tile_size.height % 2 != 0 {
            return Err(RasterError::InvalidGeometry {
                message: format!("tile size {} must be positive and even", tile_size),
            });
        }

        let (tw, th) = (tile_size.width as i64, tile_size.height as i64);
        let count = level_count(bounds.size(), tile_size);
        let levels = (0..count)
            .map(|level| {
                let shift = (count - 1 - level) as u32;
                let min = Point::new(
                    floor_shift(bounds.min.x, shift),
                    floor_shift(bounds.min.y, shift),
                );
                let max = Point::new(
                    ceil_shift(bounds.max.x, shift),
                    ceil_shift(bounds.max.y, shift),
                );
                let (col0, row0) = ((min.x as i64).div_euclid(tw), (min.y as i64).div_euclid(th));
                let (col1, row1) = (ceil_div(max.x as i64, tw), ceil_div(max.y as i64, th));
                LevelInfo {
                    level,
                    bounds: Rect { min, max },
                    tile_offset: Point::new(col0 as i32, row0 as i32),
                    width: (max.x - min.x) as u32,
                    height: (max.y - min.y) as u32,
                    tiles_across: (col1 - col0) as u32,
                    tiles_down: (row1 - row0) as u32,
                    downsample: 1u64 << shift,
                }
            })
            .collect();

        Ok(Self { tile_size, levels })
    }

    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    /// Total number of levels.
    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    /// Geometry of a level, if it exists.
    pub fn level(&self, level: usize) -> Option<&LevelInfo> {
        self.levels.get(level)
    }

    /// Geometry of a level already resolved against this layout.
    pub(crate) fn info(&self, level: usize) -> &LevelInfo {
        &self.levels[level]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelInfo> {
        self.levels.iter()
    }

    /// Absolute pixel position of the top-left corner of tile `(0, 0)`.
    pub(crate) fn grid_origin(&self, level: usize) -> Point {
        let offset = self.levels[level].tile_offset;
        Point::new(
            offset.x * self.tile_size.width as i32,
            offset.y * self.tile_size.height as i32,
        )
    }

    /// A level's bounds relative to its grid origin.
    pub(crate) fn local_bounds(&self, level: usize) -> Rect {
        self.levels[level].bounds.relative_to(self.grid_origin(level))
    }

    /// Tiles overlapped by a grid-local rectangle, clipped to the level's grid.
    pub fn tile_range(&self, level: usize, local: Rect) -> TileRange {
        let Some(info) = self.levels.get(level) else {
            return TileRange::empty();
        };
        if local.is_empty() {
            return TileRange::empty();
        }
        let (tw, th) = (self.tile_size.width as i64, self.tile_size.height as i64);

        let col0 = (local.min.x as i64).max(0) / tw;
        let row0 = (local.min.y as i64).max(0) / th;
        let col1 = ceil_div(local.max.x as i64, tw).min(info.tiles_across as i64);
        let row1 = ceil_div(local.max.y as i64, th).min(info.tiles_down as i64);

        if col0 >= col1 || row0 >= row1 {
            return TileRange::empty();
        }
        TileRange {
            cols: col0 as u32..col1 as u32,
            rows: row0 as u32..row1 as u32,
        }
    }

    /// Grid-local pixel rectangle covered by a tile.
    pub fn tile_local_rect(&self, col: u32, row: u32) -> Rect {
        let origin = Point::new(
            (col * self.tile_size.width) as i32,
            (row * self.tile_size.height) as i32,
        );
        Rect::from_size(origin, self.tile_size)
    }

    /// Pixel rectangle covered by a tile, in the level's coordinate space.
    pub fn tile_rect(&self, level: usize, col: u32, row: u32) -> Option<Rect> {
        self.levels.get(level)?;
        let origin = self.grid_origin(level);
        Some(self.tile_local_rect(col, row).translate(origin.x, origin.y))
    }

    /// Parent grid cell of `(level, col, row)` and the quadrant of that parent the
    /// child reduces into. `level` must be at least 1.
    pub(crate) fn parent_of(&self, level: usize, col: u32, row: u32) -> (u32, u32, Rect) {
        let child = self.levels[level].tile_offset;
        let parent = self.levels[level - 1].tile_offset;
        let (abs_col, abs_row) = (child.x + col as i32, child.y + row as i32);
        (
            (abs_col.div_euclid(2) - parent.x) as u32,
            (abs_row.div_euclid(2) - parent.y) as u32,
            quadrant(self.tile_size, abs_col, abs_row),
        )
    }
}

/// Quadrant of a parent tile that the child with absolute tile index
/// `(col, row)` maps onto.
pub fn quadrant(tile_size: Size, col: i32, row: i32) -> Rect {
    let half = Size::new(tile_size.width / 2, tile_size.height / 2);
    let origin = Point::new(
        (half.width * col.rem_euclid(2) as u32) as i32,
        (half.height * row.rem_euclid(2) as u32) as i32,
    );
    Rect::from_size(origin, half)
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1).div_euclid(divisor)
}

fn ceil_shift(value: i32, shift: u32) -> i32 {
    ((value as i64 + (1i64 << shift) - 1) >> shift) as i32
}

fn floor_shift(value: i32, shift: u32) -> i32 {
    (value as i64 >> shift) as i32
}
