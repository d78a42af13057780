//! Test utilities for integration tests.
//!
//! Helpers for building rasters and deterministic pixel buffers.

use raster_pyramid::{Pixel, PixelBuffer, PixelKind, Raster, Rect, Samples, Size};

/// A Gray8 raster covering `(0, 0, width, height)`.
pub fn gray_raster(width: i32, height: i32, tile: u32) -> Raster {
    Raster::new(
        Rect::new(0, 0, width, height),
        Size::new(tile, tile),
        PixelKind::Gray8,
    )
    .unwrap()
}

/// A solid Gray8 buffer.
pub fn solid_gray(value: u8, width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::filled(PixelKind::Gray8, Size::new(width, height), Pixel::Gray8(value)).unwrap()
}

/// A Gray8 buffer whose pixel `(x, y)` depends on `seed`, `x` and `y`.
pub fn pattern_gray(seed: u32, width: u32, height: u32) -> PixelBuffer {
    let mut samples = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            samples.push(((x * 7 + y * 13 + seed * 31) % 256) as u8);
        }
    }
    PixelBuffer::from_samples(PixelKind::Gray8, Size::new(width, height), Samples::U8(samples))
        .unwrap()
}

/// A Rgba8 buffer with distinct values per channel.
pub fn pattern_rgba(width: u32, height: u32) -> PixelBuffer {
    let mut samples = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            samples.extend_from_slice(&[(x * 3) as u8, (y * 5) as u8, ((x + y) * 2) as u8, 255]);
        }
    }
    PixelBuffer::from_samples(PixelKind::Rgba8, Size::new(width, height), Samples::U8(samples))
        .unwrap()
}

/// Read a whole level.
pub fn read_level(raster: &Raster, level: i32) -> PixelBuffer {
    let bounds = raster.level_bounds(level).unwrap();
    raster.read_rect(level, bounds).unwrap()
}

/// Gray8 value at `(x, y)` of a buffer.
pub fn gray_at(buffer: &PixelBuffer, x: u32, y: u32) -> u8 {
    match buffer.pixel(x, y) {
        Some(Pixel::Gray8(v)) => v,
        other => panic!("Expected Gray8 pixel at ({}, {}), got {:?}", x, y, other),
    }
}
