//! Per-face rendering strategy.
//!
//! Front, right and left are reprojected pixel by pixel. Up, down and back
//! are cut directly from the source instead: generic reprojection smears
//! the poles and the 180° wrap seam, and these faces are mostly seen at
//! grazing angles downstream. The shortcut is intentional and is only used
//! on the equirectangular → cubemap path.

use super::forward::{self, Pole};
use crate::projection::CubeFace;
use crate::raster::Raster;

/// How a single cube face is produced from an equirectangular source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceStrategy {
    /// Spherical reprojection with bilinear sampling.
    Reproject,
    /// Polar cap strip resized to the face.
    PoleStrip(Pole),
    /// Right and left edge slices spliced across the wrap seam.
    SeamSplice,
}

impl FaceStrategy {
    pub const fn for_face(face: CubeFace) -> Self {
        match face {
            CubeFace::Front | CubeFace::Right | CubeFace::Left => FaceStrategy::Reproject,
            CubeFace::Up => FaceStrategy::PoleStrip(Pole::North),
            CubeFace::Down => FaceStrategy::PoleStrip(Pole::South),
            CubeFace::Back => FaceStrategy::SeamSplice,
        }
    }

    /// Renders `face` from `src`, or `None` if the source is degenerate.
    pub fn render(self, src: &Raster, face: CubeFace, face_size: u32) -> Option<Raster> {
        if forward::is_degenerate(src, face_size) {
            return None;
        }
        Some(match self {
            FaceStrategy::Reproject => forward::reproject_face(src, face, face_size),
            FaceStrategy::PoleStrip(pole) => forward::pole_strip_face(src, pole, face_size),
            FaceStrategy::SeamSplice => forward::seam_splice_face(src, face_size),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaceStrategy::Reproject => "reproject",
            FaceStrategy::PoleStrip(Pole::North) => "north-strip",
            FaceStrategy::PoleStrip(Pole::South) => "south-strip",
            FaceStrategy::SeamSplice => "seam-splice",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster;
    use image::Rgb;

    #[test]
    fn test_dispatch_table() {
        assert_eq!(FaceStrategy::for_face(CubeFace::Front), FaceStrategy::Reproject);
        assert_eq!(FaceStrategy::for_face(CubeFace::Right), FaceStrategy::Reproject);
        assert_eq!(FaceStrategy::for_face(CubeFace::Left), FaceStrategy::Reproject);
        assert_eq!(FaceStrategy::for_face(CubeFace::Back), FaceStrategy::SeamSplice);
        assert_eq!(
            FaceStrategy::for_face(CubeFace::Up),
            FaceStrategy::PoleStrip(Pole::North)
        );
        assert_eq!(
            FaceStrategy::for_face(CubeFace::Down),
            FaceStrategy::PoleStrip(Pole::South)
        );
    }

    #[test]
    fn test_render_degenerate_is_none() {
        let src = raster::solid(1, 1, Rgb([0, 0, 0]));
        for face in CubeFace::ALL {
            assert!(FaceStrategy::for_face(face).render(&src, face, 8).is_none());
        }
    }

    #[test]
    fn test_every_strategy_renders_requested_size() {
        let src = raster::solid(128, 64, Rgb([1, 2, 3]));
        for face in CubeFace::ALL {
            let out = FaceStrategy::for_face(face).render(&src, face, 20).unwrap();
            assert_eq!(out.dimensions(), (20, 20), "{face}");
        }
    }
}
