//! Equirectangular → cube face rendering.

use super::sampling::sample_equirect;
use crate::projection::{cube_uv_to_direction, direction_to_equirect, CubeFace};
use crate::raster::{self, Raster};
use image::RgbImage;
use rayon::prelude::*;

/// Fraction of the source height taken as the polar cap for up/down.
pub const POLE_STRIP_DIVISOR: u32 = 4;

/// Width of the back-face seam slices, as a fraction of source width.
pub const BACK_SLICE_DIVISOR: u32 = 8;

/// Which pole a strip is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    North,
    South,
}

/// True when the source is too small to project from.
pub fn is_degenerate(src: &Raster, face_size: u32) -> bool {
    src.width() < 2 || src.height() < 2 || face_size == 0
}

/// Renders a face by full spherical reprojection with bilinear sampling.
///
/// Rows are rendered in parallel.
pub fn reproject_face(src: &Raster, face: CubeFace, face_size: u32) -> Raster {
    let (w, h) = src.dimensions();
    let n = f64::from(face_size);
    let row_len = face_size as usize * 3;
    let mut buf = vec![0u8; row_len * face_size as usize];

    buf.par_chunks_mut(row_len).enumerate().for_each(|(j, row)| {
        let v = (j as f64 + 0.5) / n;
        for (i, px) in row.chunks_exact_mut(3).enumerate() {
            let u = (i as f64 + 0.5) / n;
            let dir = cube_uv_to_direction(u, v, face);
            let (x, y) = direction_to_equirect(dir, w, h);
            px.copy_from_slice(&sample_equirect(src, x, y).0);
        }
    });

    // Buffer length is exactly face_size² × 3.
    RgbImage::from_raw(face_size, face_size, buf)
        .unwrap_or_else(|| RgbImage::new(face_size, face_size))
}

/// Renders up/down from the full-width strip nearest the pole.
pub fn pole_strip_face(src: &Raster, pole: Pole, face_size: u32) -> Raster {
    let (w, h) = src.dimensions();
    let strip = (h / POLE_STRIP_DIVISOR).max(1);
    let y = match pole {
        Pole::North => 0,
        Pole::South => h - strip,
    };
    let band = raster::crop(src, 0, y, w, strip);
    raster::resize(&band, face_size, face_size)
}

/// Renders the back face by splicing the two edges of the source across the
/// 180° seam.
///
/// The right-edge slice and the left-edge slice of the equatorial band are
/// concatenated (right first) with a small safety overlap on each, then
/// resized to the face.
pub fn seam_splice_face(src: &Raster, face_size: u32) -> Raster {
    let (w, h) = src.dimensions();
    let overlap = (w / 512).max(1);
    let slice = w / BACK_SLICE_DIVISOR;

    let band_top = h / 4;
    let band_height = (3 * h / 4 - band_top).max(1);

    let right_x = w.saturating_sub(slice + overlap);
    let right = raster::crop(src, right_x, band_top, w - right_x, band_height);
    let left = raster::crop(src, 0, band_top, (slice + overlap).min(w), band_height);

    raster::resize(&raster::hconcat(&right, &left), face_size, face_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_reproject_uniform_stays_uniform() {
        let src = raster::solid(64, 32, Rgb([40, 90, 160]));
        let face = reproject_face(&src, CubeFace::Front, 16);
        assert_eq!(face.dimensions(), (16, 16));
        assert!(face.pixels().all(|p| *p == Rgb([40, 90, 160])));
    }

    #[test]
    fn test_front_face_reads_center_column() {
        // Left half red, right half blue: front face straddles the center.
        let src = RgbImage::from_fn(64, 32, |x, _| {
            if x < 32 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let face = reproject_face(&src, CubeFace::Front, 16);
        assert_eq!(face.get_pixel(1, 8)[0], 255);
        assert_eq!(face.get_pixel(14, 8)[2], 255);
    }

    #[test]
    fn test_pole_strips_use_matching_rows() {
        let src = RgbImage::from_fn(64, 32, |_, y| {
            if y < 8 {
                Rgb([255, 255, 255])
            } else if y >= 24 {
                Rgb([0, 0, 0])
            } else {
                Rgb([128, 128, 128])
            }
        });
        let up = pole_strip_face(&src, Pole::North, 16);
        let down = pole_strip_face(&src, Pole::South, 16);
        assert_eq!(up.dimensions(), (16, 16));
        assert!(up.pixels().all(|p| *p == Rgb([255, 255, 255])));
        assert!(down.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_seam_splice_puts_right_edge_first() {
        // Left edge green, right edge red, middle gray.
        let src = RgbImage::from_fn(1024, 512, |x, _| {
            if x < 200 {
                Rgb([0, 255, 0])
            } else if x >= 824 {
                Rgb([255, 0, 0])
            } else {
                Rgb([128, 128, 128])
            }
        });
        let back = seam_splice_face(&src, 64);
        assert_eq!(back.dimensions(), (64, 64));
        assert_eq!(*back.get_pixel(4, 32), Rgb([255, 0, 0]));
        assert_eq!(*back.get_pixel(60, 32), Rgb([0, 255, 0]));
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(is_degenerate(&raster::solid(1, 10, Rgb([0, 0, 0])), 8));
        assert!(is_degenerate(&raster::solid(10, 10, Rgb([0, 0, 0])), 0));
        assert!(!is_degenerate(&raster::solid(4, 2, Rgb([0, 0, 0])), 1));
    }
}
