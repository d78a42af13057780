//! Conversions between [`PixelBuffer`] and `image::DynamicImage`.

use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};

use crate::error::CodecError;
use crate::geometry::Size;
use crate::pixel::{PixelBuffer, PixelKind, Samples};

/// Convert a decoded image into a buffer of the requested kind.
///
/// The image is first converted to the `image` buffer type matching `kind`, so
/// any decodable image can be loaded into any raster.
pub fn buffer_from_image(img: &DynamicImage, kind: PixelKind) -> Result<PixelBuffer, CodecError> {
    let size = Size::new(img.width(), img.height());
    let samples = match kind {
        PixelKind::Gray8 => Samples::U8(img.to_luma8().into_raw()),
        PixelKind::Gray16 => Samples::U16(img.to_luma16().into_raw()),
        PixelKind::Gray32F | PixelKind::Scalar { .. } => Samples::F32(img.to_luma32f().into_raw()),
        PixelKind::Rgba8 => Samples::U8(img.to_rgba8().into_raw()),
        PixelKind::Rgba16 => Samples::U16(img.to_rgba16().into_raw()),
        PixelKind::Rgba32F => Samples::F32(img.to_rgba32f().into_raw()),
    };
    Ok(PixelBuffer::from_samples(kind, size, samples)?)
}

/// Convert a buffer into a `DynamicImage`.
///
/// Single-channel float buffers become `ImageRgb32F` with the sample repeated in
/// every channel, since `image` has no single-channel float variant.
pub fn buffer_to_image(buffer: &PixelBuffer) -> Result<DynamicImage, CodecError> {
    let (width, height) = (buffer.width(), buffer.height());
    let mismatch = || CodecError::Unsupported {
        reason: format!(
            "{} buffer of {}x{} does not match its sample storage",
            buffer.kind(),
            width,
            height
        ),
    };

    let img = match (buffer.kind(), buffer.samples()) {
        (PixelKind::Gray8, Samples::U8(data)) => DynamicImage::ImageLuma8(
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data.clone()).ok_or_else(mismatch)?,
        ),
        (PixelKind::Gray16, Samples::U16(data)) => DynamicImage::ImageLuma16(
            ImageBuffer::<Luma<u16>, _>::from_raw(width, height, data.clone())
                .ok_or_else(mismatch)?,
        ),
        (PixelKind::Rgba8, Samples::U8(data)) => DynamicImage::ImageRgba8(
            ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, data.clone()).ok_or_else(mismatch)?,
        ),
        (PixelKind::Rgba16, Samples::U16(data)) => DynamicImage::ImageRgba16(
            ImageBuffer::<Rgba<u16>, _>::from_raw(width, height, data.clone())
                .ok_or_else(mismatch)?,
        ),
        (PixelKind::Rgba32F, Samples::F32(data)) => DynamicImage::ImageRgba32F(
            ImageBuffer::<Rgba<f32>, _>::from_raw(width, height, data.clone())
                .ok_or_else(mismatch)?,
        ),
        (PixelKind::Gray32F | PixelKind::Scalar { .. }, Samples::F32(data)) => {
            let rgb: Vec<f32> = data.iter().flat_map(|&v| [v, v, v]).collect();
            DynamicImage::ImageRgb32F(
                ImageBuffer::<Rgb<f32>, _>::from_raw(width, height, rgb).ok_or_else(mismatch)?,
            )
        }
        _ => return Err(mismatch()),
    };
    Ok(img)
}
