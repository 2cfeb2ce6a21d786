//! Strip warping and compositing.

use crate::cubemap::sample_clamped;
use crate::raster::Raster;
use glam::{DAffine2, DVec2};
use image::{Rgb, RgbImage};

/// Which way the feather ramp runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDirection {
    /// Base is to the left of the strip (right border).
    FromLeft,
    /// Base is to the right of the strip (left border).
    FromRight,
}

/// Resamples `moving` into the frame of `reference` through `transform`.
///
/// Pixels whose source falls outside `moving` keep the reference pixel.
pub fn warp_affine(moving: &Raster, transform: &DAffine2, reference: &Raster) -> Raster {
    let (mw, mh) = (f64::from(moving.width()), f64::from(moving.height()));
    RgbImage::from_fn(reference.width(), reference.height(), |x, y| {
        let src = transform.transform_point2(DVec2::new(f64::from(x), f64::from(y)));
        if src.x < -0.5 || src.y < -0.5 || src.x > mw - 0.5 || src.y > mh - 0.5 {
            *reference.get_pixel(x, y)
        } else {
            // Integer coordinates name pixel corners here; sample at centers.
            sample_clamped(moving, src.x + 0.5, src.y + 0.5)
        }
    })
}

/// Feathers `inner` into `outer` across the strip width.
///
/// Column `i` (counted from the base edge) uses
/// `α = (i + 0.5) / width`: mostly `inner` next to the base, mostly `outer`
/// at the canvas edge.
pub fn feather(inner: &Raster, outer: &Raster, direction: RampDirection) -> Raster {
    let (w, h) = inner.dimensions();
    let wf = f64::from(w);
    RgbImage::from_fn(w, h, |x, y| {
        let i = match direction {
            RampDirection::FromLeft => x,
            RampDirection::FromRight => w - 1 - x,
        };
        let alpha = (f64::from(i) + 0.5) / wf;
        mix(*inner.get_pixel(x, y), *outer.get_pixel(x, y), alpha)
    })
}

/// Flat 50/50 blend of two equally sized strips.
pub fn cross_dissolve(a: &Raster, b: &Raster) -> Raster {
    RgbImage::from_fn(a.width(), a.height(), |x, y| {
        mix(*a.get_pixel(x, y), *b.get_pixel(x, y), 0.5)
    })
}

fn mix(a: Rgb<u8>, b: Rgb<u8>, alpha: f64) -> Rgb<u8> {
    let mut out = [0u8; 3];
    for (c, slot) in out.iter_mut().enumerate() {
        let v = f64::from(a[c]) * (1.0 - alpha) + f64::from(b[c]) * alpha;
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster;

    #[test]
    fn test_feather_ramp_direction() {
        let black = raster::solid(4, 1, Rgb([0, 0, 0]));
        let white = raster::solid(4, 1, Rgb([200, 200, 200]));

        let right = feather(&black, &white, RampDirection::FromLeft);
        let values: Vec<u8> = (0..4).map(|x| right.get_pixel(x, 0)[0]).collect();
        assert_eq!(values, vec![25, 75, 125, 175]);

        let left = feather(&black, &white, RampDirection::FromRight);
        let values: Vec<u8> = (0..4).map(|x| left.get_pixel(x, 0)[0]).collect();
        assert_eq!(values, vec![175, 125, 75, 25]);
    }

    #[test]
    fn test_cross_dissolve_is_midpoint() {
        let a = raster::solid(3, 3, Rgb([0, 100, 200]));
        let b = raster::solid(3, 3, Rgb([100, 100, 0]));
        let out = cross_dissolve(&a, &b);
        assert!(out.pixels().all(|p| *p == Rgb([50, 100, 100])));
    }

    #[test]
    fn test_warp_identity_and_translation() {
        let moving = RgbImage::from_fn(8, 4, |x, _| Rgb([x as u8 * 10, 0, 0]));
        let reference = raster::solid(8, 4, Rgb([0, 0, 99]));

        let same = warp_affine(&moving, &DAffine2::IDENTITY, &reference);
        assert_eq!(same, moving);

        let shifted = warp_affine(&moving, &DAffine2::from_translation(DVec2::new(2.0, 0.0)), &reference);
        assert_eq!(shifted.get_pixel(0, 0)[0], 20);
        // Past the moving strip's edge, the reference shows through.
        assert_eq!(*shifted.get_pixel(7, 0), Rgb([0, 0, 99]));
    }
}
