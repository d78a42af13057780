//! Per-level tile grids with lazy tile creation.
//!
//! Every level owns a grid of slots sized once at construction; a slot holds a
//! tile or nothing. Parent/child relationships are never stored: the parent of
//! `(L, col, row)` is always `(L - 1, col / 2, row / 2)`.
//!
//! # Locking
//!
//! Each grid has one exclusive lock, taken only to create or replace a tile.
//! Pixel access goes through the tile's own `RwLock`, so copying into one tile
//! never blocks work on another.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

use crate::error::RasterError;
use crate::geometry::Size;
use crate::pixel::{PixelBuffer, PixelKind};

use super::layout::PyramidLayout;

/// Shared handle to a tile.
pub type TileRef = Arc<Tile>;

// =============================================================================
// Tile
// =============================================================================

/// A fixed-size pixel buffer that lives in the tile grid.
#[derive(Debug)]
pub struct Tile {
    pixels: RwLock<PixelBuffer>,
}

impl Tile {
    fn new(pixels: PixelBuffer) -> Self {
        Self {
            pixels: RwLock::new(pixels),
        }
    }

    /// Lock the tile for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, PixelBuffer> {
        self.pixels.read()
    }

    /// Lock the tile for writing.
    ///
    /// Writing through this guard does not update coarser levels; call
    /// [`crate::Raster::rebuild_pyramid`] afterwards.
    pub fn write(&self) -> RwLockWriteGuard<'_, PixelBuffer> {
        self.pixels.write()
    }

    /// Copy of the tile's current pixels.
    pub fn snapshot(&self) -> PixelBuffer {
        self.pixels.read().clone()
    }
}

// =============================================================================
// TileStore
// =============================================================================

struct TileGrid {
    across: u32,
    down: u32,
    slots: Mutex<Vec<Option<TileRef>>>,
}

/// Owner of every tile in a pyramid.
pub struct TileStore {
    kind: PixelKind,
    tile_size: Size,
    grids: Vec<TileGrid>,
}

impl TileStore {
    /// Allocate empty grids for every level in `layout`.
    pub fn new(layout: &PyramidLayout, kind: PixelKind) -> Self {
        let grids = layout
            .iter()
            .map(|info| TileGrid {
                across: info.tiles_across,
                down: info.tiles_down,
                slots: Mutex::new(vec![None; info.tile_count()]),
            })
            .collect();

        Self {
            kind,
            tile_size: layout.tile_size(),
            grids,
        }
    }

    pub fn kind(&self) -> PixelKind {
        self.kind
    }

    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    fn slot(&self, level: usize, col: u32, row: u32) -> Result<(&TileGrid, usize), RasterError> {
        let grid = self.grids.get(level).ok_or(RasterError::InvalidLevel {
            level: level as i32,
            levels: self.grids.len(),
        })?;
        if col >= grid.across || row >= grid.down {
            return Err(RasterError::TileOutOfBounds {
                level,
                col,
                row,
                across: grid.across,
                down: grid.down,
            });
        }
        Ok((grid, row as usize * grid.across as usize + col as usize))
    }

    /// Return the tile at `(level, col, row)`, creating a zero-filled one if the
    /// slot is empty.
    pub fn get_or_create(&self, level: usize, col: u32, row: u32) -> Result<TileRef, RasterError> {
        let (grid, index) = self.slot(level, col, row)?;
        let mut slots = grid.slots.lock();
        if let Some(tile) = &slots[index] {
            return Ok(Arc::clone(tile));
        }

        trace!(level, col, row, "materializing tile");
        let tile = Arc::new(Tile::new(PixelBuffer::new(self.kind, self.tile_size)));
        slots[index] = Some(Arc::clone(&tile));
        Ok(tile)
    }

    /// Look up a tile without creating it.
    pub fn get(&self, level: usize, col: u32, row: u32) -> Result<Option<TileRef>, RasterError> {
        let (grid, index) = self.slot(level, col, row)?;
        let slots = grid.slots.lock();
        Ok(slots[index].clone())
    }

    /// Install a caller-supplied tile, replacing any existing one.
    pub fn install(
        &self,
        level: usize,
        col: u32,
        row: u32,
        pixels: PixelBuffer,
    ) -> Result<(), RasterError> {
        self.check_tile(&pixels)?;
        let (grid, index) = self.slot(level, col, row)?;
        let mut slots = grid.slots.lock();
        slots[index] = Some(Arc::new(Tile::new(pixels)));
        Ok(())
    }

    /// Validate that `pixels` can serve as a tile of this store.
    pub fn check_tile(&self, pixels: &PixelBuffer) -> Result<(), RasterError> {
        if pixels.size() != self.tile_size {
            return Err(RasterError::BadTileShape {
                expected: self.tile_size,
                actual: pixels.size(),
            });
        }
        if pixels.kind() != self.kind {
            return Err(RasterError::BadPixelKind {
                expected: self.kind,
                actual: pixels.kind(),
            });
        }
        Ok(())
    }

    /// Number of tiles that currently exist at `level`.
    pub fn materialized(&self, level: usize) -> usize {
        self.grids
            .get(level)
            .map(|grid| grid.slots.lock().iter().filter(|slot| slot.is_some()).count())
            .unwrap_or(0)
    }

    /// Coordinates of every tile that currently exists at `level`.
    pub fn materialized_coords(&self, level: usize) -> Vec<(u32, u32)> {
        let Some(grid) = self.grids.get(level) else {
            return Vec::new();
        };
        let slots = grid.slots.lock();
        slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| {
                let index = index as u32;
                (index % grid.across, index / grid.across)
            })
            .collect()
    }
}
