//! Equirectangular ↔ cubemap conversion.
//!
//! The forward direction dispatches per face on a [`FaceStrategy`]; the
//! inverse direction always reprojects. Both directions are total: faces or
//! regions that cannot be produced are filled with neutral gray and counted
//! in a [`ProjectionReport`].

mod forward;
mod inverse;
mod sampling;
mod strategy;

pub use forward::Pole;
pub use sampling::{sample_clamped, sample_equirect};
pub use strategy::FaceStrategy;

use crate::diagnostics::ProjectionReport;
use crate::projection::CubeFace;
use crate::raster::{self, Raster, NEUTRAL_GRAY};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Six face rasters keyed by face.
///
/// A cubemap may be incomplete while it is being loaded; conversion treats
/// missing faces as fallbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cubemap {
    faces: BTreeMap<CubeFace, Raster>,
}

impl Cubemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, face: CubeFace, raster: Raster) -> Option<Raster> {
        self.faces.insert(face, raster)
    }

    pub fn remove(&mut self, face: CubeFace) -> Option<Raster> {
        self.faces.remove(&face)
    }

    pub fn get(&self, face: CubeFace) -> Option<&Raster> {
        self.faces.get(&face)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// True when all six faces are present.
    pub fn is_complete(&self) -> bool {
        CubeFace::ALL.iter().all(|f| self.faces.contains_key(f))
    }

    /// Faces in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CubeFace, &Raster)> {
        self.faces.iter().map(|(face, raster)| (*face, raster))
    }

    /// Edge length of the front face, or of the first face present.
    pub fn face_size(&self) -> Option<u32> {
        self.faces
            .get(&CubeFace::Front)
            .or_else(|| self.faces.values().next())
            .map(|r| r.width())
    }
}

impl FromIterator<(CubeFace, Raster)> for Cubemap {
    fn from_iter<I: IntoIterator<Item = (CubeFace, Raster)>>(iter: I) -> Self {
        Self {
            faces: iter.into_iter().collect(),
        }
    }
}

/// Result of an equirectangular → cubemap conversion.
#[derive(Debug, Clone)]
pub struct ProjectedCubemap {
    pub cubemap: Cubemap,
    pub face_size: u32,
    pub report: ProjectionReport,
}

/// Result of a cubemap → equirectangular conversion.
#[derive(Debug, Clone)]
pub struct ProjectedEquirect {
    pub raster: Raster,
    pub report: ProjectionReport,
}

/// Converts between equirectangular panoramas and cubemaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubemapConverter;

impl CubemapConverter {
    pub fn new() -> Self {
        Self
    }

    /// Face size used when none is requested: half the source height.
    pub fn default_face_size(equirect: &Raster) -> u32 {
        equirect.height() / 2
    }

    /// Converts an equirectangular raster into six faces.
    ///
    /// `face_size` of `None` or `Some(0)` means [`Self::default_face_size`].
    /// Faces are rendered in parallel. A degenerate source yields six gray
    /// faces (at least 1×1) and six fallbacks.
    pub fn to_cubemap(&self, equirect: &Raster, face_size: Option<u32>) -> ProjectedCubemap {
        let face_size = face_size
            .filter(|&s| s > 0)
            .unwrap_or_else(|| Self::default_face_size(equirect));

        let rendered: Vec<(CubeFace, Option<Raster>)> = CubeFace::ALL
            .par_iter()
            .map(|&face| {
                let strategy = FaceStrategy::for_face(face);
                debug!(face = %face, strategy = strategy.as_str(), face_size, "Rendering cube face");
                (face, strategy.render(equirect, face, face_size))
            })
            .collect();

        let mut report = ProjectionReport::default();
        let fallback_size = face_size.max(1);
        let cubemap = rendered
            .into_iter()
            .map(|(face, raster)| {
                let raster = raster.unwrap_or_else(|| {
                    report.record_fallback(face);
                    raster::solid(fallback_size, fallback_size, NEUTRAL_GRAY)
                });
                (face, raster)
            })
            .collect();

        if report.projection_fallbacks > 0 {
            warn!(
                width = equirect.width(),
                height = equirect.height(),
                face_size,
                fallbacks = report.projection_fallbacks,
                "Source too small to project; faces filled with gray"
            );
        }

        ProjectedCubemap {
            cubemap,
            face_size: fallback_size,
            report,
        }
    }

    /// Reprojects cube faces into a `width × height` equirectangular raster.
    pub fn to_equirect(&self, cubemap: &Cubemap, width: u32, height: u32) -> ProjectedEquirect {
        let (raster, report) = inverse::render_equirect(cubemap, width, height);
        if report.projection_fallbacks > 0 {
            warn!(
                missing = ?report.fallback_faces,
                "Cube faces missing; regions filled with gray"
            );
        }
        ProjectedEquirect { raster, report }
    }
}
