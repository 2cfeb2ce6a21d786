//! Cube faces → equirectangular reprojection.

use super::sampling::sample_clamped;
use super::Cubemap;
use crate::diagnostics::ProjectionReport;
use crate::projection::{direction_to_cube_face, equirect_to_direction, CubeFace};
use crate::raster::{Raster, NEUTRAL_GRAY};
use image::RgbImage;
use rayon::prelude::*;

/// Renders an equirectangular raster from cube faces.
///
/// Every output pixel is reprojected; there is no shortcut on this path.
/// Pixels that land on a missing or empty face are filled with neutral gray
/// and the face is recorded as a fallback.
pub fn render_equirect(cubemap: &Cubemap, width: u32, height: u32) -> (Raster, ProjectionReport) {
    let mut report = ProjectionReport::default();
    for face in CubeFace::ALL {
        if usable_face(cubemap, face).is_none() {
            report.record_fallback(face);
        }
    }

    if width == 0 || height == 0 {
        return (RgbImage::new(width, height), report);
    }

    let row_len = width as usize * 3;
    let mut buf = vec![0u8; row_len * height as usize];

    buf.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        let py = y as f64 + 0.5;
        for (x, px) in row.chunks_exact_mut(3).enumerate() {
            let dir = equirect_to_direction(x as f64 + 0.5, py, width, height);
            let (face, u, v) = direction_to_cube_face(dir);
            let color = match usable_face(cubemap, face) {
                Some(src) => {
                    sample_clamped(src, u * f64::from(src.width()), v * f64::from(src.height()))
                }
                None => NEUTRAL_GRAY,
            };
            px.copy_from_slice(&color.0);
        }
    });

    let raster = RgbImage::from_raw(width, height, buf)
        .unwrap_or_else(|| RgbImage::from_pixel(width, height, NEUTRAL_GRAY));
    (raster, report)
}

fn usable_face(cubemap: &Cubemap, face: CubeFace) -> Option<&Raster> {
    cubemap
        .get(face)
        .filter(|raster| raster.width() > 0 && raster.height() > 0)
}
