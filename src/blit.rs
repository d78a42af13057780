//! 2-D blit primitives shared by tile copies and the downsampler.
//!
//! Both operations follow the same convention: `r` is the destination rectangle
//! in `dst` coordinates and `sp` is the point in `src` aligned with `r.min`.
//! Arguments are clipped against both buffers first, so the primitives are total
//! over any rectangle. The store itself only ever passes in-bounds rectangles.

use serde::Serialize;

use crate::error::RasterError;
use crate::geometry::{Point, Rect};
use crate::pixel::{PixelBuffer, Sample, Samples};

// =============================================================================
// Filter
// =============================================================================

/// How four finer samples are reduced to one coarser sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Filter {
    /// Arithmetic mean of the 2x2 block.
    #[default]
    Average,
    /// Keep the top-left sample of the 2x2 block.
    Decimate,
}

impl Filter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "average" | "box" => Some(Filter::Average),
            "decimate" | "interlace" | "nearest" => Some(Filter::Decimate),
            _ => None,
        }
    }
}

// =============================================================================
// Rectangle Copy
// =============================================================================

/// Copy the block of `src` starting at `sp` into `r` in `dst`.
pub fn copy_rect(
    dst: &mut PixelBuffer,
    r: Rect,
    src: &PixelBuffer,
    sp: Point,
) -> Result<(), RasterError> {
    check_kinds(dst, src)?;

    let (dx, dy) = (sp.x - r.min.x, sp.y - r.min.y);
    let r = r
        .intersect(&dst.bounds())
        .intersect(&src.bounds().translate(-dx, -dy));
    if r.is_empty() {
        return Ok(());
    }
    let sp = Point::new(r.min.x + dx, r.min.y + dy);

    let mismatch = kind_mismatch(dst, src);
    let channels = dst.kind().channels();
    let dst_stride = dst.stride();
    let src_stride = src.stride();
    match (dst.samples_mut(), src.samples()) {
        (Samples::U8(d), Samples::U8(s)) => {
            copy_kernel(d, dst_stride, s, src_stride, channels, r, sp)
        }
        (Samples::U16(d), Samples::U16(s)) => {
            copy_kernel(d, dst_stride, s, src_stride, channels, r, sp)
        }
        (Samples::F32(d), Samples::F32(s)) => {
            copy_kernel(d, dst_stride, s, src_stride, channels, r, sp)
        }
        _ => return Err(mismatch),
    }
    Ok(())
}

fn copy_kernel<S: Copy>(
    dst: &mut [S],
    dst_stride: usize,
    src: &[S],
    src_stride: usize,
    channels: usize,
    r: Rect,
    sp: Point,
) {
    let row_len = r.width() as usize * channels;
    for row in 0..r.height() as usize {
        let d = (r.min.y as usize + row) * dst_stride + r.min.x as usize * channels;
        let s = (sp.y as usize + row) * src_stride + sp.x as usize * channels;
        dst[d..d + row_len].copy_from_slice(&src[s..s + row_len]);
    }
}

// =============================================================================
// 2x Reduction
// =============================================================================

/// Replace `r` in `dst` with a 2x reduction of the block of `src` at `sp`.
///
/// Destination pixel `(r.min.x + i, r.min.y + j)` is computed from the source
/// block whose top-left corner is `(sp.x + 2i, sp.y + 2j)`.
pub fn pyr_down(
    dst: &mut PixelBuffer,
    r: Rect,
    src: &PixelBuffer,
    sp: Point,
    filter: Filter,
) -> Result<(), RasterError> {
    check_kinds(dst, src)?;

    // Clip against dst, moving sp by twice the amount r.min moved.
    let clipped = r.intersect(&dst.bounds());
    if clipped.is_empty() {
        return Ok(());
    }
    let mut sp = Point::new(
        sp.x + 2 * (clipped.min.x - r.min.x),
        sp.y + 2 * (clipped.min.y - r.min.y),
    );
    let mut r = clipped;

    // Skip destination columns/rows whose source block starts before the origin.
    if sp.x < 0 {
        let skip = (1 - sp.x) / 2;
        r.min.x += skip;
        sp.x += 2 * skip;
    }
    if sp.y < 0 {
        let skip = (1 - sp.y) / 2;
        r.min.y += skip;
        sp.y += 2 * skip;
    }

    // Average reads a full 2x2 block; decimation only needs the first sample.
    let (avail_w, avail_h) = (src.width() as i32 - sp.x, src.height() as i32 - sp.y);
    let (max_w, max_h) = match filter {
        Filter::Average => (avail_w / 2, avail_h / 2),
        Filter::Decimate => ((avail_w + 1) / 2, (avail_h + 1) / 2),
    };
    r.max.x = r.max.x.min(r.min.x + max_w.max(0));
    r.max.y = r.max.y.min(r.min.y + max_h.max(0));
    if r.is_empty() {
        return Ok(());
    }

    let mismatch = kind_mismatch(dst, src);
    let channels = dst.kind().channels();
    let dst_stride = dst.stride();
    let src_stride = src.stride();
    match (dst.samples_mut(), src.samples()) {
        (Samples::U8(d), Samples::U8(s)) => {
            pyr_down_kernel(d, dst_stride, s, src_stride, channels, r, sp, filter)
        }
        (Samples::U16(d), Samples::U16(s)) => {
            pyr_down_kernel(d, dst_stride, s, src_stride, channels, r, sp, filter)
        }
        (Samples::F32(d), Samples::F32(s)) => {
            pyr_down_kernel(d, dst_stride, s, src_stride, channels, r, sp, filter)
        }
        _ => return Err(mismatch),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn pyr_down_kernel<S: Sample>(
    dst: &mut [S],
    dst_stride: usize,
    src: &[S],
    src_stride: usize,
    channels: usize,
    r: Rect,
    sp: Point,
    filter: Filter,
) {
    let ch = channels;
    for j in 0..r.height() as usize {
        let d_row = (r.min.y as usize + j) * dst_stride;
        let sy = sp.y as usize + 2 * j;
        let row0 = sy * src_stride;
        for i in 0..r.width() as usize {
            let d = d_row + (r.min.x as usize + i) * ch;
            let s0 = row0 + (sp.x as usize + 2 * i) * ch;
            match filter {
                Filter::Average => {
                    let s1 = s0 + src_stride;
                    for c in 0..ch {
                        dst[d + c] = S::average4(
                            src[s0 + c],
                            src[s0 + ch + c],
                            src[s1 + c],
                            src[s1 + ch + c],
                        );
                    }
                }
                Filter::Decimate => {
                    dst[d..d + ch].copy_from_slice(&src[s0..s0 + ch]);
                }
            }
        }
    }
}

fn check_kinds(dst: &PixelBuffer, src: &PixelBuffer) -> Result<(), RasterError> {
    if dst.kind() != src.kind() {
        return Err(kind_mismatch(dst, src));
    }
    Ok(())
}

fn kind_mismatch(dst: &PixelBuffer, src: &PixelBuffer) -> RasterError {
    RasterError::BadPixelKind {
        expected: dst.kind(),
        actual: src.kind(),
    }
}
