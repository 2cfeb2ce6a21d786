//! Bilinear raster sampling.
//!
//! Continuous coordinates put pixel centers at `i + 0.5`, matching the way
//! output pixels are mapped into the source.

use crate::raster::Raster;
use image::Rgb;

/// Samples an equirectangular raster, wrapping `x` and clamping `y`.
pub fn sample_equirect(src: &Raster, x: f64, y: f64) -> Rgb<u8> {
    let (w, h) = src.dimensions();
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0f = fx.floor();
    let y0f = fy.floor();
    let tx = fx - x0f;
    let ty = fy - y0f;

    let wi = i64::from(w);
    let x0 = (x0f as i64).rem_euclid(wi) as u32;
    let x1 = (x0f as i64 + 1).rem_euclid(wi) as u32;
    let y0 = clamp_index(y0f as i64, h);
    let y1 = clamp_index(y0f as i64 + 1, h);

    blend4(src, (x0, x1, y0, y1), tx, ty)
}

/// Samples a raster, clamping both axes to the edge pixels.
pub fn sample_clamped(src: &Raster, x: f64, y: f64) -> Rgb<u8> {
    let (w, h) = src.dimensions();
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0f = fx.floor();
    let y0f = fy.floor();
    let tx = fx - x0f;
    let ty = fy - y0f;

    let x0 = clamp_index(x0f as i64, w);
    let x1 = clamp_index(x0f as i64 + 1, w);
    let y0 = clamp_index(y0f as i64, h);
    let y1 = clamp_index(y0f as i64 + 1, h);

    blend4(src, (x0, x1, y0, y1), tx, ty)
}

fn clamp_index(i: i64, len: u32) -> u32 {
    i.clamp(0, i64::from(len) - 1) as u32
}

fn blend4(src: &Raster, (x0, x1, y0, y1): (u32, u32, u32, u32), tx: f64, ty: f64) -> Rgb<u8> {
    let p00 = src.get_pixel(x0, y0);
    let p10 = src.get_pixel(x1, y0);
    let p01 = src.get_pixel(x0, y1);
    let p11 = src.get_pixel(x1, y1);

    let mut out = [0u8; 3];
    for (c, slot) in out.iter_mut().enumerate() {
        let top = f64::from(p00[c]) * (1.0 - tx) + f64::from(p10[c]) * tx;
        let bottom = f64::from(p01[c]) * (1.0 - tx) + f64::from(p11[c]) * tx;
        let value = top * (1.0 - ty) + bottom * ty;
        *slot = value.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}
