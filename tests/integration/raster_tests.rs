//! Raster behavior tests.
//!
//! Tests verify:
//! - Writes read back unchanged at the finest level
//! - Coarser levels hold the 2x2 average of finer levels
//! - Level indexing, clipping and sub-level views

use raster_pyramid::{
    Filter, Pixel, PixelBuffer, PixelKind, Raster, RasterError, Rect, Size,
};

use super::test_utils::{gray_at, gray_raster, pattern_gray, pattern_rgba, read_level, solid_gray};

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_round_trip_unaligned_rect() {
    let raster = gray_raster(100, 70, 16);
    let src = pattern_gray(3, 45, 33);
    let rect = Rect::new(13, 29, 58, 62);

    raster.write_rect(-1, rect, &src).unwrap();

    assert_eq!(raster.read_rect(-1, rect).unwrap(), src);
}

#[test]
fn test_round_trip_rgba_at_coarser_level() {
    let raster = Raster::new(
        Rect::new(0, 0, 64, 64),
        Size::new(8, 8),
        PixelKind::Rgba8,
    )
    .unwrap();
    let src = pattern_rgba(20, 12);
    let rect = Rect::new(5, 9, 25, 21);

    raster.write_rect(2, rect, &src).unwrap();

    assert_eq!(raster.read_rect(2, rect).unwrap(), src);
}

#[test]
fn test_offset_bounds_round_trip() {
    let raster = Raster::new(
        Rect::new(-50, -20, 30, 40),
        Size::new(16, 16),
        PixelKind::Gray8,
    )
    .unwrap();
    let src = pattern_gray(9, 80, 60);

    raster.write_rect(-1, raster.bounds(), &src).unwrap();

    assert_eq!(read_level(&raster, -1), src);
    assert_eq!(raster.pixel(-50, -20), Pixel::Gray8(gray_at(&src, 0, 0)));
    assert_eq!(raster.pixel(29, 39), Pixel::Gray8(gray_at(&src, 79, 59)));
}

// =============================================================================
// Pyramid Law
// =============================================================================

#[test]
fn test_pyramid_law_after_aligned_write() {
    let raster = gray_raster(32, 32, 8);
    assert_eq!(raster.levels(), 3);
    raster
        .write_rect(-1, Rect::new(0, 0, 32, 32), &pattern_gray(1, 32, 32))
        .unwrap();

    for level in 1..raster.levels() as i32 {
        let fine = read_level(&raster, level);
        let coarse = read_level(&raster, level - 1);
        assert_eq!(coarse.width() * 2, fine.width());

        for y in 0..coarse.height() {
            for x in 0..coarse.width() {
                let sum = gray_at(&fine, 2 * x, 2 * y) as u32
                    + gray_at(&fine, 2 * x + 1, 2 * y) as u32
                    + gray_at(&fine, 2 * x, 2 * y + 1) as u32
                    + gray_at(&fine, 2 * x + 1, 2 * y + 1) as u32;
                assert_eq!(
                    gray_at(&coarse, x, y) as u32,
                    sum / 4,
                    "level {} pixel ({}, {})",
                    level - 1,
                    x,
                    y
                );
            }
        }
    }
}

#[test]
fn test_pyramid_law_with_odd_origin() {
    let raster = Raster::new(Rect::new(3, -5, 35, 27), Size::new(8, 8), PixelKind::Gray8).unwrap();
    raster
        .write_rect(-1, raster.bounds(), &pattern_gray(6, 32, 32))
        .unwrap();

    for level in 1..raster.levels() as i32 {
        let fine_bounds = raster.level_bounds(level).unwrap();
        let coarse_bounds = raster.level_bounds(level - 1).unwrap();
        let fine = read_level(&raster, level);
        let coarse = read_level(&raster, level - 1);
        let fine_at = |x: i32, y: i32| {
            gray_at(&fine, (x - fine_bounds.min.x) as u32, (y - fine_bounds.min.y) as u32) as u32
        };

        // Coarse pixels whose four children all lie inside the finer level.
        for y in coarse_bounds.min.y..coarse_bounds.max.y {
            for x in coarse_bounds.min.x..coarse_bounds.max.x {
                let children = Rect::new(2 * x, 2 * y, 2 * x + 2, 2 * y + 2);
                if !fine_bounds.contains_rect(&children) {
                    continue;
                }
                let sum = fine_at(2 * x, 2 * y)
                    + fine_at(2 * x + 1, 2 * y)
                    + fine_at(2 * x, 2 * y + 1)
                    + fine_at(2 * x + 1, 2 * y + 1);
                let actual = gray_at(
                    &coarse,
                    (x - coarse_bounds.min.x) as u32,
                    (y - coarse_bounds.min.y) as u32,
                ) as u32;
                assert_eq!(actual, sum / 4, "level {} pixel ({}, {})", level - 1, x, y);
            }
        }
    }
}

#[test]
fn test_partial_write_updates_only_dependent_pixels() {
    let raster = gray_raster(32, 32, 8);
    raster
        .write_rect(-1, Rect::new(0, 0, 32, 32), &solid_gray(100, 32, 32))
        .unwrap();
    raster
        .write_rect(-1, Rect::new(8, 8, 16, 16), &solid_gray(200, 8, 8))
        .unwrap();

    let level1 = read_level(&raster, 1);
    assert_eq!(gray_at(&level1, 4, 4), 200);
    assert_eq!(gray_at(&level1, 7, 7), 200);
    assert_eq!(gray_at(&level1, 3, 3), 100);
    assert_eq!(gray_at(&level1, 8, 8), 100);

    let level0 = read_level(&raster, 0);
    assert_eq!(gray_at(&level0, 2, 2), 200);
    assert_eq!(gray_at(&level0, 0, 0), 100);
    assert_eq!(gray_at(&level0, 4, 4), 100);
}

#[test]
fn test_decimate_picks_top_left_sample() {
    let raster = Raster::with_filter(
        Rect::new(0, 0, 16, 16),
        Size::new(8, 8),
        PixelKind::Gray8,
        Filter::Decimate,
    )
    .unwrap();
    let src = pattern_gray(2, 16, 16);
    raster.write_rect(-1, Rect::new(0, 0, 16, 16), &src).unwrap();

    let coarse = read_level(&raster, 0);
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(gray_at(&coarse, x, y), gray_at(&src, 2 * x, 2 * y));
        }
    }
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_repeated_write_is_idempotent() {
    let raster = gray_raster(40, 40, 8);
    let src = pattern_gray(5, 17, 23);
    let rect = Rect::new(6, 3, 23, 26);

    raster.write_rect(-1, rect, &src).unwrap();
    let first: Vec<PixelBuffer> = (0..raster.levels() as i32)
        .map(|level| read_level(&raster, level))
        .collect();

    raster.write_rect(-1, rect, &src).unwrap();
    let second: Vec<PixelBuffer> = (0..raster.levels() as i32)
        .map(|level| read_level(&raster, level))
        .collect();

    assert_eq!(first, second);
}

// =============================================================================
// Level Indexing
// =============================================================================

#[test]
fn test_concrete_ten_by_ten_scenario() {
    let raster = gray_raster(10, 10, 4);
    assert_eq!(raster.levels(), 3);

    let across: Vec<u32> = (0..3).map(|l| raster.tiles_across(l).unwrap()).collect();
    let down: Vec<u32> = (0..3).map(|l| raster.tiles_down(l).unwrap()).collect();
    assert_eq!(across, vec![1, 2, 3]);
    assert_eq!(down, vec![1, 2, 3]);

    raster
        .write_rect(-1, Rect::new(0, 0, 5, 5), &solid_gray(42, 5, 5))
        .unwrap();

    assert!(raster
        .read_rect(-2, Rect::new(0, 0, 2, 2))
        .unwrap()
        .is_uniform(Pixel::Gray8(42)));
    assert!(raster
        .read_rect(-3, Rect::new(0, 0, 1, 1))
        .unwrap()
        .is_uniform(Pixel::Gray8(42)));
}

#[test]
fn test_negative_levels_alias_positive() {
    let raster = gray_raster(64, 32, 8);
    let levels = raster.levels() as i32;
    raster
        .write_rect(-1, Rect::new(0, 0, 64, 32), &pattern_gray(7, 64, 32))
        .unwrap();

    for level in 0..levels {
        let negative = level - levels;
        assert_eq!(
            raster.level_bounds(level).unwrap(),
            raster.level_bounds(negative).unwrap()
        );
        assert_eq!(read_level(&raster, level), read_level(&raster, negative));
    }
}

#[test]
fn test_out_of_range_levels_are_rejected() {
    let raster = gray_raster(10, 10, 4);
    let src = solid_gray(1, 1, 1);
    let before = read_level(&raster, -1);

    for level in [3, 4, -4, i32::MAX, i32::MIN] {
        assert!(matches!(
            raster.write_rect(level, Rect::new(0, 0, 1, 1), &src),
            Err(RasterError::InvalidLevel { .. })
        ));
        assert!(matches!(
            raster.tiles_across(level),
            Err(RasterError::InvalidLevel { .. })
        ));
        assert!(raster.get_tile(level, 0, 0).is_err());
    }

    assert_eq!(read_level(&raster, -1), before);
    assert_eq!(raster.materialized_tiles(-1).unwrap(), 0);
}

#[test]
fn test_invalid_geometry() {
    let result = Raster::new(Rect::new(0, 0, 0, 0), Size::new(4, 4), PixelKind::Gray8);
    assert!(matches!(result, Err(RasterError::InvalidGeometry { .. })));

    let result = Raster::new(Rect::new(0, 0, 8, 8), Size::new(4, 0), PixelKind::Gray8);
    assert!(matches!(result, Err(RasterError::InvalidGeometry { .. })));
}

#[test]
fn test_wide_raster_level_count() {
    // One level per doubling of the longer axis.
    let raster = gray_raster(1000, 10, 10);
    assert_eq!(raster.levels(), 8);
    assert_eq!(raster.tiles_across(0).unwrap(), 1);
    assert_eq!(raster.tiles_down(-1).unwrap(), 1);
    assert_eq!(raster.level_bounds(0).unwrap(), Rect::new(0, 0, 8, 1));
}

// =============================================================================
// Clipping
// =============================================================================

#[test]
fn test_read_clips_to_level_bounds() {
    let raster = gray_raster(10, 10, 4);
    raster
        .write_rect(-1, Rect::new(0, 0, 10, 10), &solid_gray(9, 10, 10))
        .unwrap();

    let out = raster.read_rect(-1, Rect::new(8, -3, 20, 2)).unwrap();
    assert_eq!(out.size(), Size::new(2, 2));
    assert!(out.is_uniform(Pixel::Gray8(9)));

    let out = raster.read_rect(-1, Rect::new(10, 10, 12, 12)).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_write_straddling_edge() {
    let raster = gray_raster(10, 10, 4);
    raster
        .write_rect(-1, Rect::new(7, 7, 13, 13), &pattern_gray(4, 6, 6))
        .unwrap();

    let src = pattern_gray(4, 6, 6);
    assert_eq!(raster.pixel(9, 9), Pixel::Gray8(gray_at(&src, 2, 2)));
    assert_eq!(raster.pixel(7, 7), Pixel::Gray8(gray_at(&src, 0, 0)));
}

#[test]
fn test_write_rejects_small_source() {
    let raster = gray_raster(10, 10, 4);
    let err = raster
        .write_rect(-1, Rect::new(0, 0, 6, 6), &solid_gray(1, 5, 6))
        .unwrap_err();
    assert_eq!(
        err,
        RasterError::BadBufferShape {
            expected: Size::new(6, 6),
            actual: Size::new(5, 6),
        }
    );
}

// =============================================================================
// Views and Tiles
// =============================================================================

#[test]
fn test_sub_levels_share_storage() {
    let raster = gray_raster(32, 32, 8);
    let coarse = raster.sub_levels(2).unwrap();
    assert_eq!(coarse.bounds(), raster.level_bounds(1).unwrap());

    // Writing through the view updates the shared coarser levels only.
    coarse
        .write_rect(-1, Rect::new(0, 0, 16, 16), &solid_gray(77, 16, 16))
        .unwrap();
    assert!(read_level(&raster, 0).is_uniform(Pixel::Gray8(77)));
    assert_eq!(raster.materialized_tiles(-1).unwrap(), 0);

    // Writing through the full raster is visible through the view.
    raster
        .write_rect(-1, Rect::new(0, 0, 32, 32), &solid_gray(5, 32, 32))
        .unwrap();
    assert_eq!(coarse.pixel(3, 3), Pixel::Gray8(5));
}

#[test]
fn test_set_tile_and_rebuild() {
    let raster = gray_raster(16, 16, 8);
    for row in 0..2 {
        for col in 0..2 {
            let value = (col + row * 2) as u8 * 40;
            raster.set_tile(-1, col, row, solid_gray(value, 8, 8)).unwrap();
        }
    }
    raster.rebuild_pyramid().unwrap();

    let top = read_level(&raster, 0);
    assert_eq!(gray_at(&top, 0, 0), 0);
    assert_eq!(gray_at(&top, 7, 0), 40);
    assert_eq!(gray_at(&top, 0, 7), 80);
    assert_eq!(gray_at(&top, 7, 7), 120);
}

#[test]
fn test_scalar_raster_propagates_floats() {
    let kind = PixelKind::Scalar { zero: -1.0 };
    let raster = Raster::new(Rect::new(0, 0, 8, 8), Size::new(4, 4), kind).unwrap();
    let mut src = PixelBuffer::new(kind, Size::new(2, 2));
    src.set_pixel(0, 0, Pixel::Gray32F(1.0)).unwrap();
    src.set_pixel(1, 0, Pixel::Gray32F(2.0)).unwrap();
    src.set_pixel(0, 1, Pixel::Gray32F(3.0)).unwrap();
    src.set_pixel(1, 1, Pixel::Gray32F(4.0)).unwrap();

    raster.write_rect(-1, Rect::new(0, 0, 2, 2), &src).unwrap();

    let coarse = raster.read_rect(0, Rect::new(0, 0, 2, 2)).unwrap();
    assert_eq!(coarse.pixel(0, 0), Some(Pixel::Gray32F(2.5)));
    assert_eq!(coarse.pixel(1, 1), Some(Pixel::Gray32F(-1.0)));
}
