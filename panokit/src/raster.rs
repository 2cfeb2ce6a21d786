//! Raster type and pixel-region helpers.
//!
//! Every raster handled by the engine is an 8-bit RGB buffer, row-major with
//! a top-left origin. [`image::RgbImage`] already guarantees the
//! `width × height × 3` buffer invariant, so it is used directly rather than
//! wrapped.
//!
//! The helpers here are thin, clipping wrappers over `image::imageops` so the
//! projection and overlap code can speak in rectangles instead of pixel loops.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageResult, Rgb, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// An equirectangular panorama, cube face, or border strip.
pub type Raster = RgbImage;

/// Neutral mid-gray used for missing tiles and projection fallbacks.
pub const NEUTRAL_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// Default JPEG quality for persisted rasters.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Creates a raster filled with a single color.
pub fn solid(width: u32, height: u32, color: Rgb<u8>) -> Raster {
    RgbImage::from_pixel(width, height, color)
}

/// Copies a rectangle out of `src`.
///
/// The rectangle is clipped to the source bounds, so the result may be
/// smaller than requested.
pub fn crop(src: &Raster, x: u32, y: u32, width: u32, height: u32) -> Raster {
    imageops::crop_imm(src, x, y, width, height).to_image()
}

/// Pastes `src` into `dst` with its top-left corner at `(x, y)`.
///
/// Pixels that fall outside `dst` are discarded.
pub fn paste(dst: &mut Raster, src: &Raster, x: u32, y: u32) {
    imageops::replace(dst, src, i64::from(x), i64::from(y));
}

/// Fills a rectangle of `dst` with `color`, clipped to the raster bounds.
pub fn fill_rect(dst: &mut Raster, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(dst.width());
    let y_end = y.saturating_add(height).min(dst.height());
    for py in y..y_end {
        for px in x..x_end {
            dst.put_pixel(px, py, color);
        }
    }
}

/// Resamples `src` to exactly `width × height` with a Lanczos3 filter.
///
/// Zero-sized targets produce an empty raster instead of calling into the
/// resampler.
pub fn resize(src: &Raster, width: u32, height: u32) -> Raster {
    if width == 0 || height == 0 || src.width() == 0 || src.height() == 0 {
        return RgbImage::new(width, height);
    }
    if src.width() == width && src.height() == height {
        return src.clone();
    }
    imageops::resize(src, width, height, FilterType::Lanczos3)
}

/// Places `right` immediately after `left`, top-aligned.
///
/// The result is as tall as the taller input; any uncovered area stays black.
pub fn hconcat(left: &Raster, right: &Raster) -> Raster {
    let height = left.height().max(right.height());
    let mut out = RgbImage::new(left.width() + right.width(), height);
    paste(&mut out, left, 0, 0);
    paste(&mut out, right, left.width(), 0);
    out
}

/// Rotates the raster horizontally by `shift` columns, wrapping at the edges.
///
/// A positive shift moves content to the right; what leaves the right edge
/// re-enters on the left, as it does for a 360° panorama.
pub fn roll_horizontal(src: &Raster, shift: i64) -> Raster {
    let width = src.width();
    if width == 0 {
        return src.clone();
    }
    let shift = shift.rem_euclid(i64::from(width)) as u32;
    RgbImage::from_fn(width, src.height(), |x, y| {
        let sx = (x + width - shift) % width;
        *src.get_pixel(sx, y)
    })
}

/// Mean absolute per-channel difference between two equally sized rasters.
///
/// Returns `None` when the dimensions differ.
pub fn mean_abs_error(a: &Raster, b: &Raster) -> Option<f64> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    let samples = a.as_raw().len();
    if samples == 0 {
        return Some(0.0);
    }
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&p, &q)| u64::from(p.abs_diff(q)))
        .sum();
    Some(total as f64 / samples as f64)
}

/// Writes the raster as a baseline JPEG.
pub fn save_jpeg(raster: &Raster, path: &Path, quality: u8) -> ImageResult<()> {
    let file = File::create(path)?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality.clamp(1, 100));
    encoder.encode(
        raster.as_raw(),
        raster.width(),
        raster.height(),
        ExtendedColorType::Rgb8,
    )
}

/// Opens any supported image file and converts it to RGB.
pub fn open_rgb(path: &Path) -> ImageResult<Raster> {
    Ok(image::open(path)?.to_rgb8())
}
