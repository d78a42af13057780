//! Keeping coarser levels consistent with finer ones.
//!
//! A child tile with absolute tile index `(C, R)` owns one quadrant of its
//! parent `(C / 2, R / 2)` at the next coarser level (division rounds down): the
//! quadrant at `(tw / 2 * (C mod 2), th / 2 * (R mod 2))` sized `(tw / 2, th / 2)`.
//! Updating a parent means reducing the whole child into that quadrant.
//!
//! After a write, [`Downsampler::propagate`] walks from the written level up to
//! level 0. At each step it recomputes the parents of every tile the changed
//! rectangle touches, then halves the rectangle in absolute coordinates
//! (rounding outward) for the next level. The set of tiles revisited at level
//! `L - 1` is exactly the set of parents updated at level `L`.

use tracing::{debug, trace};

use crate::blit::{self, Filter};
use crate::error::RasterError;
use crate::geometry::{Point, Rect, Size};

use super::coordinator::{fan_out, fan_out_coords};
use super::layout::PyramidLayout;
use super::store::TileStore;

/// Recomputes parent quadrants from child tiles.
pub(crate) struct Downsampler<'a> {
    layout: &'a PyramidLayout,
    store: &'a TileStore,
    filter: Filter,
}

impl<'a> Downsampler<'a> {
    pub fn new(layout: &'a PyramidLayout, store: &'a TileStore, filter: Filter) -> Self {
        Self {
            layout,
            store,
            filter,
        }
    }

    /// Recompute the parent quadrant owned by `(level, col, row)`.
    ///
    /// Both tiles are materialized if absent. Level 0 has no parent.
    pub fn update_parent(&self, level: usize, col: u32, row: u32) -> Result<(), RasterError> {
        if level == 0 || level >= self.layout.levels() {
            return Err(RasterError::InvalidLevel {
                level: i32::try_from(level).unwrap_or(i32::MAX),
                levels: self.layout.levels(),
            });
        }
        let child = self.store.get_or_create(level, col, row)?;
        let (parent_col, parent_row, quadrant) = self.layout.parent_of(level, col, row);
        let parent = self.store.get_or_create(level - 1, parent_col, parent_row)?;

        trace!(level, col, row, quadrant = %quadrant, "updating parent quadrant");

        // Lock order is always finer level first, then coarser.
        let child_pixels = child.read();
        self.check_shape(child_pixels.size())?;
        let mut parent_pixels = parent.write();
        self.check_shape(parent_pixels.size())?;

        blit::pyr_down(
            &mut parent_pixels,
            quadrant,
            &child_pixels,
            Point::ORIGIN,
            self.filter,
        )
    }

    /// Propagate a change to `local` (grid-local coordinates) at `level` up to
    /// level 0.
    pub fn propagate(&self, level: usize, local: Rect) -> Result<(), RasterError> {
        let mut level = level;
        let mut rect = local;

        while level > 0 && !rect.is_empty() {
            let tiles = self.layout.tile_range(level, rect);
            debug!(level, rect = %rect, tiles = tiles.len(), "propagating to coarser level");

            fan_out(&tiles, |col, row| self.update_parent(level, col, row))?;

            let origin = self.layout.grid_origin(level);
            let halved = rect.translate(origin.x, origin.y).halve_outward();
            level -= 1;
            rect = halved
                .relative_to(self.layout.grid_origin(level))
                .intersect(&self.layout.local_bounds(level));
        }

        Ok(())
    }

    /// Re-derive every coarser level from the tiles that currently exist.
    pub fn rebuild(&self, finest: usize) -> Result<(), RasterError> {
        for level in (1..=finest).rev() {
            let coords = self.store.materialized_coords(level);
            debug!(level, tiles = coords.len(), "rebuilding parents");
            fan_out_coords(coords, |col, row| self.update_parent(level, col, row))?;
        }
        Ok(())
    }

    fn check_shape(&self, actual: Size) -> Result<(), RasterError> {
        let expected = self.store.tile_size();
        if actual != expected {
            return Err(RasterError::BadTileShape { expected, actual });
        }
        Ok(())
    }
}
