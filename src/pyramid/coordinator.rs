//! Per-level fan-out of tile work.
//!
//! All tiles of one level are handed to the rayon pool together and the call
//! returns only once every one of them has finished, which gives the pyramid
//! its level barrier: nothing at level `L - 1` starts until level `L` is done.

use rayon::prelude::*;

use crate::error::RasterError;

use super::layout::TileRange;

/// Run `op` for every tile in `tiles` and wait for all of them.
///
/// The first error wins; tiles already dispatched still run to completion.
pub fn fan_out<F>(tiles: &TileRange, op: F) -> Result<(), RasterError>
where
    F: Fn(u32, u32) -> Result<(), RasterError> + Send + Sync,
{
    match tiles.len() {
        0 => Ok(()),
        1 => tiles.iter().try_for_each(|(col, row)| op(col, row)),
        _ => {
            let coords: Vec<(u32, u32)> = tiles.iter().collect();
            coords.into_par_iter().try_for_each(|(col, row)| op(col, row))
        }
    }
}

/// Same as [`fan_out`] over an explicit list of tile coordinates.
pub fn fan_out_coords<F>(coords: Vec<(u32, u32)>, op: F) -> Result<(), RasterError>
where
    F: Fn(u32, u32) -> Result<(), RasterError> + Send + Sync,
{
    coords.into_par_iter().try_for_each(|(col, row)| op(col, row))
}
