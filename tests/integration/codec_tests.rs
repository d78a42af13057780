//! Image interop and export tests.
//!
//! Tests verify:
//! - Decoded images load into rasters of any pixel kind
//! - Level and tile export writes decodable files with the expected names

use image::{DynamicImage, Rgba, RgbaImage};

use raster_pyramid::codec::{
    buffer_from_image, buffer_to_image, decode, export_levels, level_file_name, tile_file_name,
    OutputFormat, TileEncoder,
};
use raster_pyramid::{Pixel, PixelKind, Raster, Rect, Size};

fn checkerboard(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    }))
}

#[test]
fn test_image_into_raster_and_back() {
    let img = checkerboard(24, 16);
    let pixels = buffer_from_image(&img, PixelKind::Rgba8).unwrap();

    let raster = Raster::new(Rect::new(0, 0, 24, 16), Size::new(8, 8), PixelKind::Rgba8).unwrap();
    raster.write_rect(-1, raster.bounds(), &pixels).unwrap();

    let back = buffer_to_image(&raster.read_rect(-1, raster.bounds()).unwrap()).unwrap();
    assert_eq!(back.to_rgba8(), img.to_rgba8());

    // Two levels down, one pixel covers exactly one checker cell.
    let coarse = raster.read_rect(0, Rect::new(0, 0, 2, 1)).unwrap();
    assert_eq!(coarse.pixel(0, 0), Some(Pixel::Rgba8([255, 255, 255, 255])));
    assert_eq!(coarse.pixel(1, 0), Some(Pixel::Rgba8([0, 0, 0, 255])));
}

#[test]
fn test_export_levels_and_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = buffer_from_image(&checkerboard(40, 20), PixelKind::Gray8).unwrap();

    let raster = Raster::new(Rect::new(0, 0, 40, 20), Size::new(16, 16), PixelKind::Gray8).unwrap();
    raster.write_rect(-1, raster.bounds(), &pixels).unwrap();

    let encoder = TileEncoder::new(OutputFormat::Png);
    let summary = export_levels(&raster, dir.path(), &encoder, true).unwrap();

    assert_eq!(summary.levels.len(), raster.levels());
    let expected_tiles: usize = (0..raster.levels() as i32)
        .map(|level| raster.materialized_tiles(level).unwrap())
        .sum();
    assert_eq!(summary.tiles, expected_tiles);

    let finest = raster.levels() - 1;
    let bytes = std::fs::read(dir.path().join(level_file_name(finest, "png"))).unwrap();
    let img = decode(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (40, 20));
    assert_eq!(buffer_from_image(&img, PixelKind::Gray8).unwrap(), pixels);

    let tile_path = dir.path().join(tile_file_name(finest, 2, 1, "png"));
    let tile = decode(&std::fs::read(tile_path).unwrap()).unwrap();
    assert_eq!((tile.width(), tile.height()), (16, 16));
}

#[test]
fn test_export_jpeg_levels_only() {
    let dir = tempfile::tempdir().unwrap();
    let raster = Raster::new(Rect::new(0, 0, 32, 32), Size::new(16, 16), PixelKind::Rgba16).unwrap();
    raster.set_pixel(5, 5, Pixel::Rgba16([65535, 0, 0, 65535])).unwrap();

    let encoder = TileEncoder::new(OutputFormat::Jpeg).with_quality(95);
    let summary = export_levels(&raster, dir.path(), &encoder, false).unwrap();

    assert_eq!(summary.tiles, 0);
    for path in &summary.levels {
        assert_eq!(path.extension().unwrap(), "jpg");
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
