//! Tiled multi-resolution storage.
//!
//! # Architecture
//!
//! ```text
//! Raster (public handle, Arc-shared)
//!   ├── PyramidLayout   level bounds, tile grids, tile lookup
//!   ├── TileStore       lazily created tiles, one grid per level
//!   └── Downsampler     parent quadrant updates, level by level
//!         └── coordinator::fan_out   rayon fan-out with a barrier per level
//! ```
//!
//! Level 0 is the coarsest level. Each level is half the size of the next finer
//! one, and every tile at level `L` is reduced into one quadrant of its parent at
//! level `L - 1`.

mod coordinator;
mod layout;
mod propagate;
mod raster;
mod store;

pub use layout::{adjust_level, level_count, LevelInfo, PyramidLayout, TileRange};
pub use raster::Raster;
pub use store::{Tile, TileRef, TileStore};
