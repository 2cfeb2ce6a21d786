//! Neighbor-free border fills.
//!
//! Longitude wraps, so the strip past the right edge of a panorama is its
//! left edge and vice versa. Latitude does not wrap; the top and bottom
//! borders are stretched from a thin equatorial band instead.

use super::OverlapGeometry;
use crate::raster::{self, Raster};

/// Half-height of the equatorial band used for top/bottom borders.
pub const EQUATOR_HALF_BAND: u32 = 10;

/// Strip for the left border: the base's rightmost `width` columns.
pub fn left_wrap_strip(base: &Raster, width: u32) -> Raster {
    let w = width.min(base.width());
    raster::crop(base, base.width() - w, 0, w, base.height())
}

/// Strip for the right border: the base's leftmost `width` columns.
pub fn right_wrap_strip(base: &Raster, width: u32) -> Raster {
    let w = width.min(base.width());
    raster::crop(base, 0, 0, w, base.height())
}

/// Equatorial band `[h/2 - 10, h/2 + 10)` resized to `base.width() × height`.
pub fn equatorial_strip(base: &Raster, height: u32) -> Raster {
    let equator = base.height() / 2;
    let y0 = equator.saturating_sub(EQUATOR_HALF_BAND);
    let y1 = (equator + EQUATOR_HALF_BAND).min(base.height());
    let band = raster::crop(base, 0, y0, base.width(), y1 - y0);
    raster::resize(&band, base.width(), height)
}

/// Fills the top and bottom borders above and below the base.
pub fn fill_vertical(canvas: &mut Raster, base: &Raster, geometry: &OverlapGeometry) {
    let (ox, oy) = geometry.base_offset();
    if geometry.top > 0 {
        raster::paste(canvas, &equatorial_strip(base, geometry.top), ox, 0);
    }
    if geometry.bottom > 0 {
        let strip = equatorial_strip(base, geometry.bottom);
        raster::paste(canvas, &strip, ox, oy + base.height());
    }
}

/// Fills the four corners with the horizontally wrapped corners of the base.
///
/// The top-left corner takes the base's top-right corner, and so on; no
/// blending is applied.
pub fn fill_corners(canvas: &mut Raster, base: &Raster, geometry: &OverlapGeometry) {
    let (w, h) = base.dimensions();
    let right_x = geometry.left + w;
    let bottom_y = geometry.top + h;
    let OverlapGeometry {
        left,
        right,
        top,
        bottom,
        ..
    } = *geometry;

    let corners = [
        (left, top, w.saturating_sub(left), 0, 0, 0),
        (right, top, 0, 0, right_x, 0),
        (left, bottom, w.saturating_sub(left), h.saturating_sub(bottom), 0, bottom_y),
        (right, bottom, 0, h.saturating_sub(bottom), right_x, bottom_y),
    ];
    for (cw, ch, sx, sy, dx, dy) in corners {
        if cw > 0 && ch > 0 {
            let corner = raster::crop(base, sx, sy, cw, ch);
            raster::paste(canvas, &corner, dx, dy);
        }
    }
}
