//! The public multi-resolution raster.
//!
//! [`Raster`] ties the layout, the tile store and the downsampler together and
//! implements rectangle reads and writes across tile boundaries.
//!
//! # Coordinates
//!
//! Every operation takes a level and a rectangle in that level's own pixel
//! space (see [`super::layout`]). Rectangles are clipped to the level bounds; a
//! rectangle that misses the raster entirely is a successful no-op.
//!
//! # Concurrency
//!
//! `Raster` is `Send + Sync` and cheap to clone: clones share the same tiles.
//! Writes whose rectangles touch disjoint tiles at every level may run
//! concurrently. Overlapping writes must be serialized by the caller; the store
//! only guarantees that tile creation is atomic and that no pixel copy is torn.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::blit::{self, Filter};
use crate::error::RasterError;
use crate::geometry::{Point, Rect, Size};
use crate::pixel::{Pixel, PixelBuffer, PixelKind};

use super::coordinator::fan_out;
use super::layout::{adjust_level, LevelInfo, PyramidLayout};
use super::propagate::Downsampler;
use super::store::{TileRef, TileStore};

struct Pyramid {
    layout: PyramidLayout,
    store: TileStore,
    filter: Filter,
}

impl Pyramid {
    fn downsampler(&self) -> Downsampler<'_> {
        Downsampler::new(&self.layout, &self.store, self.filter)
    }
}

/// A large raster split into tiles and replicated across resolution levels.
///
/// # Example
///
/// ```
/// use raster_pyramid::{Pixel, PixelBuffer, PixelKind, Raster, Rect, Size};
///
/// let raster = Raster::new(Rect::new(0, 0, 10, 10), Size::new(4, 4), PixelKind::Gray8).unwrap();
/// assert_eq!(raster.levels(), 3);
///
/// let patch = PixelBuffer::filled(PixelKind::Gray8, Size::new(5, 5), Pixel::Gray8(150)).unwrap();
/// raster.write_rect(-1, Rect::new(0, 0, 5, 5), &patch).unwrap();
///
/// let coarse = raster.read_rect(-2, Rect::new(0, 0, 2, 2)).unwrap();
/// assert!(coarse.is_uniform(Pixel::Gray8(150)));
/// ```
#[derive(Clone)]
pub struct Raster {
    pyramid: Arc<Pyramid>,
    levels: usize,
}

impl Raster {
    /// Create a raster using the box filter for downsampling.
    pub fn new(bounds: Rect, tile_size: Size, kind: PixelKind) -> Result<Self, RasterError> {
        Self::with_filter(bounds, tile_size, kind, Filter::Average)
    }

    /// Create a raster with an explicit downsampling filter.
    pub fn with_filter(
        bounds: Rect,
        tile_size: Size,
        kind: PixelKind,
        filter: Filter,
    ) -> Result<Self, RasterError> {
        let layout = PyramidLayout::new(bounds, tile_size)?;
        let store = TileStore::new(&layout, kind);
        let levels = layout.levels();

        debug!(
            bounds = %bounds,
            tile_size = %tile_size,
            kind = %kind,
            levels,
            "created raster"
        );

        Ok(Self {
            pyramid: Arc::new(Pyramid {
                layout,
                store,
                filter,
            }),
            levels,
        })
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Number of levels visible through this raster.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Bounds of the finest visible level.
    pub fn bounds(&self) -> Rect {
        self.pyramid.layout.info(self.levels - 1).bounds
    }

    pub fn tile_size(&self) -> Size {
        self.pyramid.layout.tile_size()
    }

    pub fn pixel_kind(&self) -> PixelKind {
        self.pyramid.store.kind()
    }

    pub fn filter(&self) -> Filter {
        self.pyramid.filter
    }

    fn resolve(&self, level: i32) -> Result<usize, RasterError> {
        adjust_level(level, self.levels)
    }

    /// Geometry of one level.
    pub fn level_info(&self, level: i32) -> Result<LevelInfo, RasterError> {
        let level = self.resolve(level)?;
        Ok(*self.pyramid.layout.info(level))
    }

    /// Geometry of every visible level, coarsest first.
    pub fn level_infos(&self) -> Vec<LevelInfo> {
        self.pyramid
            .layout
            .iter()
            .take(self.levels)
            .copied()
            .collect()
    }

    pub fn level_bounds(&self, level: i32) -> Result<Rect, RasterError> {
        Ok(self.level_info(level)?.bounds)
    }

    pub fn tiles_across(&self, level: i32) -> Result<u32, RasterError> {
        Ok(self.level_info(level)?.tiles_across)
    }

    pub fn tiles_down(&self, level: i32) -> Result<u32, RasterError> {
        Ok(self.level_info(level)?.tiles_down)
    }

    /// A view of the `levels` coarsest levels.
    ///
    /// The view shares tiles with `self`; its bounds are those of its finest
    /// level. Writes through the view update the shared coarser levels but never
    /// the finer levels it hides.
    pub fn sub_levels(&self, levels: usize) -> Result<Raster, RasterError> {
        if levels == 0 || levels > self.levels {
            return Err(RasterError::InvalidLevel {
                level: i32::try_from(levels).unwrap_or(i32::MAX),
                levels: self.levels,
            });
        }
        Ok(Raster {
            pyramid: Arc::clone(&self.pyramid),
            levels,
        })
    }

    // =========================================================================
    // Tiles
    // =========================================================================

    /// Return a tile, creating a zero-filled one on first access.
    pub fn get_tile(&self, level: i32, col: u32, row: u32) -> Result<TileRef, RasterError> {
        let level = self.resolve(level)?;
        self.pyramid.store.get_or_create(level, col, row)
    }

    /// Return a tile only if it has already been created.
    pub fn tile(&self, level: i32, col: u32, row: u32) -> Result<Option<TileRef>, RasterError> {
        let level = self.resolve(level)?;
        self.pyramid.store.get(level, col, row)
    }

    /// Install a caller-supplied tile.
    ///
    /// Coarser levels are not updated; call [`Raster::rebuild_pyramid`] after a
    /// batch of installs.
    pub fn set_tile(
        &self,
        level: i32,
        col: u32,
        row: u32,
        tile: PixelBuffer,
    ) -> Result<(), RasterError> {
        let level = self.resolve(level)?;
        self.pyramid.store.install(level, col, row, tile)
    }

    /// Number of tiles created so far at `level`.
    pub fn materialized_tiles(&self, level: i32) -> Result<usize, RasterError> {
        let level = self.resolve(level)?;
        Ok(self.pyramid.store.materialized(level))
    }

    /// Recompute every coarser level from the finest level's existing tiles.
    pub fn rebuild_pyramid(&self) -> Result<(), RasterError> {
        self.pyramid.downsampler().rebuild(self.levels - 1)
    }

    // =========================================================================
    // Rectangle I/O
    // =========================================================================

    /// Read the part of `rect` that lies inside the level.
    ///
    /// The result covers `rect` clipped to the level bounds, so its origin is
    /// `rect.intersect(&bounds).min`. Tiles that were never written read as the
    /// zero value and are not created. A rectangle entirely outside the level
    /// yields an empty buffer.
    pub fn read_rect(&self, level: i32, rect: Rect) -> Result<PixelBuffer, RasterError> {
        let level = self.resolve(level)?;
        let kind = self.pixel_kind();
        let layout = &self.pyramid.layout;
        let bounds = layout.info(level).bounds;

        let clipped = rect.intersect(&bounds);
        if clipped.is_empty() {
            debug!(level, rect = %rect, "read outside raster bounds");
            return Ok(PixelBuffer::empty(kind));
        }

        let local = clipped.relative_to(layout.grid_origin(level));
        let mut out = PixelBuffer::new(kind, clipped.size());

        for (col, row) in layout.tile_range(level, local).iter() {
            let Some(tile) = self.pyramid.store.get(level, col, row)? else {
                continue;
            };
            let tile_rect = layout.tile_local_rect(col, row);
            let overlap = local.intersect(&tile_rect);
            if overlap.is_empty() {
                continue;
            }
            let sp = Point::new(
                overlap.min.x - tile_rect.min.x,
                overlap.min.y - tile_rect.min.y,
            );
            blit::copy_rect(&mut out, overlap.relative_to(local.min), &tile.read(), sp)?;
        }

        Ok(out)
    }

    /// Write `src` into `rect` and bring coarser levels up to date.
    ///
    /// Pixel `(0, 0)` of `src` lands on `rect.min`; `src` must be at least as large
    /// as `rect`. The parts of `rect` outside the level are ignored.
    pub fn write_rect(&self, level: i32, rect: Rect, src: &PixelBuffer) -> Result<(), RasterError> {
        let level = self.resolve(level)?;
        let kind = self.pixel_kind();
        if src.kind() != kind {
            return Err(RasterError::BadPixelKind {
                expected: kind,
                actual: src.kind(),
            });
        }
        if !src.size().covers(rect.size()) {
            return Err(RasterError::BadBufferShape {
                expected: rect.size(),
                actual: src.size(),
            });
        }

        let layout = &self.pyramid.layout;
        let bounds = layout.info(level).bounds;
        let clipped = rect.intersect(&bounds);
        if clipped.is_empty() {
            debug!(level, rect = %rect, "write outside raster bounds");
            return Ok(());
        }

        let origin = layout.grid_origin(level);
        let local = clipped.relative_to(origin);
        let tiles = layout.tile_range(level, local);
        debug!(level, rect = %clipped, tiles = tiles.len(), "writing rectangle");

        // Offset from grid-local coordinates to src coordinates.
        let (dx, dy) = (origin.x - rect.min.x, origin.y - rect.min.y);
        let store = &self.pyramid.store;

        fan_out(&tiles, |col, row| {
            let tile_rect = layout.tile_local_rect(col, row);
            let overlap = local.intersect(&tile_rect);
            if overlap.is_empty() {
                return Ok(());
            }
            let tile = store.get_or_create(level, col, row)?;
            let sp = Point::new(overlap.min.x + dx, overlap.min.y + dy);
            let mut pixels = tile.write();
            store.check_tile(&pixels)?;
            blit::copy_rect(&mut pixels, overlap.relative_to(tile_rect.min), src, sp)
        })?;

        self.pyramid.downsampler().propagate(level, local)
    }

    // =========================================================================
    // Single Pixels
    // =========================================================================

    /// Pixel at `(x, y)` on the finest visible level; the zero value outside the
    /// bounds or in tiles never written.
    pub fn pixel(&self, x: i32, y: i32) -> Pixel {
        let zero = self.pixel_kind().zero_pixel();
        let level = self.levels - 1;
        let bounds = self.bounds();
        if !bounds.contains(Point::new(x, y)) {
            return zero;
        }

        let tile_size = self.tile_size();
        let origin = self.pyramid.layout.grid_origin(level);
        let (lx, ly) = ((x - origin.x) as u32, (y - origin.y) as u32);
        let (col, row) = (lx / tile_size.width, ly / tile_size.height);
        match self.pyramid.store.get(level, col, row) {
            Ok(Some(tile)) => tile
                .read()
                .pixel(lx % tile_size.width, ly % tile_size.height)
                .unwrap_or(zero),
            _ => zero,
        }
    }

    /// Set one pixel on the finest visible level and propagate it. Positions
    /// outside the bounds are ignored.
    pub fn set_pixel(&self, x: i32, y: i32, pixel: Pixel) -> Result<(), RasterError> {
        let kind = self.pixel_kind();
        let patch = PixelBuffer::filled(kind, Size::new(1, 1), pixel)?;
        self.write_rect(-1, Rect::new(x, y, x + 1, y + 1), &patch)
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("bounds", &self.bounds())
            .field("tile_size", &self.tile_size())
            .field("kind", &self.pixel_kind())
            .field("filter", &self.filter())
            .field("levels", &self.levels)
            .finish()
    }
}
