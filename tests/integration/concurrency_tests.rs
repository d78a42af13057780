//! Concurrent write tests.
//!
//! Tests verify:
//! - Writes to disjoint regions from many threads match the sequential result
//! - Concurrent readers never observe a failure while writers run
//! - Lazy tile creation under contention yields a single tile

use std::sync::Arc;
use std::thread;

use rayon::prelude::*;

use raster_pyramid::{PixelBuffer, Raster, Rect};

use super::test_utils::{gray_raster, pattern_gray, read_level};

fn all_levels(raster: &Raster) -> Vec<PixelBuffer> {
    (0..raster.levels() as i32)
        .map(|level| read_level(raster, level))
        .collect()
}

/// Horizontal stripes of `height` rows covering a `width`-wide raster.
fn stripes(width: i32, total: i32, height: i32) -> Vec<(Rect, PixelBuffer)> {
    (0..total)
        .step_by(height as usize)
        .enumerate()
        .map(|(i, y)| {
            let rect = Rect::new(0, y, width, (y + height).min(total));
            let src = pattern_gray(i as u32, rect.width(), rect.height());
            (rect, src)
        })
        .collect()
}

#[test]
fn test_disjoint_tile_aligned_writes_match_sequential() {
    let quadrants: Vec<(Rect, PixelBuffer)> = [(0, 0), (32, 0), (0, 32), (32, 32)]
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            (
                Rect::new(x, y, x + 32, y + 32),
                pattern_gray(i as u32 + 10, 32, 32),
            )
        })
        .collect();

    let sequential = gray_raster(64, 64, 8);
    for (rect, src) in &quadrants {
        sequential.write_rect(-1, *rect, src).unwrap();
    }

    let concurrent = gray_raster(64, 64, 8);
    thread::scope(|scope| {
        for (rect, src) in &quadrants {
            let raster = concurrent.clone();
            scope.spawn(move || raster.write_rect(-1, *rect, src).unwrap());
        }
    });

    assert_eq!(all_levels(&concurrent), all_levels(&sequential));
}

#[test]
fn test_disjoint_unaligned_stripes_match_sequential() {
    // Five-row stripes share tiles with their neighbours at every level.
    let work = stripes(50, 50, 5);

    let sequential = gray_raster(50, 50, 8);
    for (rect, src) in &work {
        sequential.write_rect(-1, *rect, src).unwrap();
    }

    let concurrent = gray_raster(50, 50, 8);
    work.par_iter()
        .try_for_each(|(rect, src)| concurrent.write_rect(-1, *rect, src))
        .unwrap();

    assert_eq!(all_levels(&concurrent), all_levels(&sequential));
}

#[test]
fn test_readers_run_alongside_writers() {
    let raster = Arc::new(gray_raster(64, 64, 8));
    let work = stripes(64, 64, 8);

    thread::scope(|scope| {
        for (rect, src) in &work {
            let raster = Arc::clone(&raster);
            scope.spawn(move || raster.write_rect(-1, *rect, src).unwrap());
        }
        for level in 0..raster.levels() as i32 {
            let raster = Arc::clone(&raster);
            scope.spawn(move || {
                for _ in 0..20 {
                    let out = raster.read_rect(level, raster.level_bounds(level).unwrap());
                    assert!(out.is_ok());
                }
            });
        }
    });

    for (rect, src) in &work {
        assert_eq!(&raster.read_rect(-1, *rect).unwrap(), src);
    }
}

#[test]
fn test_concurrent_get_tile_creates_one_tile() {
    let raster = gray_raster(64, 64, 8);

    let tiles: Vec<_> = (0..16)
        .into_par_iter()
        .map(|_| raster.get_tile(-1, 3, 5).unwrap())
        .collect();

    assert!(tiles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(raster.materialized_tiles(-1).unwrap(), 1);
}
