//! Overlap canvas synthesis.

use super::align::{FeatureAligner, PatchFeatureAligner};
use super::blend::{self, RampDirection};
use super::fill;
use super::layout::{clamp_percent, OverlapLayout};
use crate::diagnostics::{BorderStrategy, OverlapReport, Side};
use crate::neighbor::{place_neighbors, Neighbor};
use crate::raster::{self, Raster};
use image::RgbImage;
use std::sync::Arc;
use tracing::{debug, info};

/// An expanded panorama and how each border was produced.
#[derive(Debug, Clone)]
pub struct ExpandedPanorama {
    pub raster: Raster,
    pub report: OverlapReport,
}

/// Expands a panorama with wrap-around and neighbor-blended borders.
#[derive(Clone)]
pub struct OverlapSynthesizer {
    aligner: Arc<dyn FeatureAligner>,
    layout: OverlapLayout,
}

impl Default for OverlapSynthesizer {
    fn default() -> Self {
        Self::new(Arc::new(PatchFeatureAligner::new()))
    }
}

impl std::fmt::Debug for OverlapSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlapSynthesizer")
            .field("aligner", &self.aligner.name())
            .field("layout", &self.layout)
            .finish()
    }
}

impl OverlapSynthesizer {
    pub fn new(aligner: Arc<dyn FeatureAligner>) -> Self {
        Self {
            aligner,
            layout: OverlapLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: OverlapLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> OverlapLayout {
        self.layout
    }

    pub fn aligner_name(&self) -> &'static str {
        self.aligner.name()
    }

    /// Expands `base` by `percent` (clamped to `[0, 50]`).
    ///
    /// Left and right borders wrap around the panorama unless a neighbor is
    /// placed on that side, in which case the neighbor's facing strip is
    /// aligned and feathered over the wrap strip (or cross-dissolved when
    /// alignment fails). Top and bottom borders stretch the equatorial band;
    /// corners copy the horizontally wrapped corners. `percent == 0` returns
    /// the base unchanged.
    pub fn expand(&self, base: &Raster, percent: u32, neighbors: Vec<Neighbor>) -> ExpandedPanorama {
        let percent = clamp_percent(percent);
        let geometry = self.layout.geometry(base.width(), base.height(), percent);
        let placed = place_neighbors(neighbors);

        if geometry.is_identity() {
            let mut report = OverlapReport::unchanged(self.layout, base.dimensions());
            report.neighbors_dropped = placed.dropped
                + usize::from(placed.left.is_some())
                + usize::from(placed.right.is_some());
            return ExpandedPanorama {
                raster: base.clone(),
                report,
            };
        }

        let (ox, oy) = geometry.base_offset();
        let mut canvas = RgbImage::new(geometry.canvas_width, geometry.canvas_height);
        raster::paste(&mut canvas, base, ox, oy);

        let ((left, left_strategy), (right, right_strategy)) = rayon::join(
            || self.side_strip(base, Side::Left, geometry.left, placed.left.as_ref()),
            || self.side_strip(base, Side::Right, geometry.right, placed.right.as_ref()),
        );
        raster::paste(&mut canvas, &left, 0, oy);
        raster::paste(&mut canvas, &right, ox + base.width(), oy);

        fill::fill_vertical(&mut canvas, base, &geometry);
        fill::fill_corners(&mut canvas, base, &geometry);

        let vertical = |size: u32| {
            if size > 0 {
                BorderStrategy::EquatorialStretch
            } else {
                BorderStrategy::None
            }
        };
        let alignment_failures = [left_strategy, right_strategy]
            .iter()
            .filter(|s| **s == BorderStrategy::NeighborCrossDissolve)
            .count();

        let report = OverlapReport {
            percent,
            layout: self.layout,
            canvas_size: geometry.canvas_size(),
            base_offset: (ox, oy),
            left: left_strategy,
            right: right_strategy,
            top: vertical(geometry.top),
            bottom: vertical(geometry.bottom),
            alignment_failures,
            neighbors_dropped: placed.dropped,
        };
        info!(%report, aligner = self.aligner.name(), "Overlap expansion complete");

        ExpandedPanorama {
            raster: canvas,
            report,
        }
    }

    fn side_strip(
        &self,
        base: &Raster,
        side: Side,
        width: u32,
        neighbor: Option<&Neighbor>,
    ) -> (Raster, BorderStrategy) {
        if width == 0 {
            return (RgbImage::new(0, base.height()), BorderStrategy::None);
        }
        let (wrap, direction) = match side {
            Side::Right => (fill::right_wrap_strip(base, width), RampDirection::FromLeft),
            _ => (fill::left_wrap_strip(base, width), RampDirection::FromRight),
        };

        let Some(neighbor) = neighbor.filter(|n| n.raster.width() > 0 && n.raster.height() > 0)
        else {
            return (wrap, BorderStrategy::Wrap);
        };

        let strip = facing_strip(&neighbor.raster, side, base, wrap.width());
        match self.aligner.align(&wrap, &strip) {
            Ok(transform) => {
                debug!(side = side.as_str(), ?transform, "Neighbor strip aligned");
                let aligned = blend::warp_affine(&strip, &transform, &wrap);
                (
                    blend::feather(&wrap, &aligned, direction),
                    BorderStrategy::NeighborAligned,
                )
            }
            Err(e) => {
                debug!(side = side.as_str(), error = %e, "Alignment failed, cross-dissolving");
                (
                    blend::cross_dissolve(&wrap, &strip),
                    BorderStrategy::NeighborCrossDissolve,
                )
            }
        }
    }
}

/// Cuts the strip of `neighbor` that faces the base and scales it to the
/// border size.
///
/// A right-hand neighbor faces the base with its left edge and vice versa.
/// The strip covers the same fraction of the neighbor's width as the border
/// does of the base's.
fn facing_strip(neighbor: &Raster, side: Side, base: &Raster, width: u32) -> Raster {
    let (nw, nh) = neighbor.dimensions();
    let scaled = (f64::from(width) * f64::from(nw) / f64::from(base.width().max(1))).round() as u32;
    let sw = scaled.clamp(1, nw);
    let x = match side {
        Side::Right => 0,
        _ => nw - sw,
    };
    let strip = raster::crop(neighbor, x, 0, sw, nh);
    raster::resize(&strip, width, base.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbor::{NeighborHint, ShiftNeighborResolver};
    use crate::overlap::DisabledAligner;
    use image::Rgb;

    /// Hashed 4×4 blocks, so strips have plenty of distinct corners.
    fn blocks(width: u32, height: u32) -> Raster {
        RgbImage::from_fn(width, height, |x, y| {
            let mut h = (x / 4).wrapping_mul(73_856_093) ^ (y / 4).wrapping_mul(19_349_663);
            h ^= h >> 13;
            h = h.wrapping_mul(0x5bd1_e995);
            h ^= h >> 15;
            let v = (h & 0xff) as u8;
            Rgb([v, v / 2, 255 - v])
        })
    }

    fn gradient(width: u32, height: u32) -> Raster {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 77]))
    }

    fn wrap_only() -> OverlapSynthesizer {
        OverlapSynthesizer::new(Arc::new(DisabledAligner))
    }

    #[test]
    fn test_zero_percent_is_identity() {
        let base = gradient(64, 32);
        let out = wrap_only().expand(&base, 0, Vec::new());
        assert_eq!(out.raster, base);
        assert_eq!(out.report.left, BorderStrategy::None);
    }

    #[test]
    fn test_wrap_invariant() {
        let base = gradient(200, 100);
        let out = wrap_only().expand(&base, 40, Vec::new());
        let r = &out.report;
        let bw = r.base_offset.0;
        let (cw, _) = r.canvas_size;
        assert_eq!(out.raster.width(), 2 * out.raster.height());

        let right = raster::crop(&out.raster, cw - bw, r.base_offset.1, bw, 100);
        assert_eq!(right, raster::crop(&base, 0, 0, bw, 100));
        let left = raster::crop(&out.raster, 0, r.base_offset.1, bw, 100);
        assert_eq!(left, raster::crop(&base, 200 - bw, 0, bw, 100));

        assert_eq!(r.left, BorderStrategy::Wrap);
        assert_eq!(r.top, BorderStrategy::EquatorialStretch);
    }

    #[test]
    fn test_base_is_pasted_at_offset() {
        let base = gradient(128, 64);
        let out = wrap_only()
            .with_layout(OverlapLayout::Legacy)
            .expand(&base, 30, Vec::new());
        let (ox, oy) = out.report.base_offset;
        assert_eq!(raster::crop(&out.raster, ox, oy, 128, 64), base);
    }

    #[test]
    fn test_failed_alignment_cross_dissolves() {
        let base = raster::solid(100, 50, Rgb([0, 0, 0]));
        let neighbor = Neighbor::new(raster::solid(100, 50, Rgb([200, 200, 200])), NeighborHint::yaw(90.0));
        let out = wrap_only().expand(&base, 40, vec![neighbor]);

        assert_eq!(out.report.right, BorderStrategy::NeighborCrossDissolve);
        assert_eq!(out.report.left, BorderStrategy::Wrap);
        assert_eq!(out.report.alignment_failures, 1);
        let (cw, _) = out.report.canvas_size;
        let oy = out.report.base_offset.1;
        assert_eq!(*out.raster.get_pixel(cw - 1, oy + 10), Rgb([100, 100, 100]));
    }

    #[test]
    fn test_shifted_neighbors_align_onto_wrap() {
        let base = blocks(400, 200);
        let neighbors = ShiftNeighborResolver::new().synthesize(&base);
        let out = OverlapSynthesizer::default().expand(&base, 40, neighbors);
        let r = &out.report;

        assert_eq!(r.left, BorderStrategy::NeighborAligned);
        assert_eq!(r.right, BorderStrategy::NeighborAligned);
        assert_eq!(r.alignment_failures, 0);
        assert_eq!(r.neighbors_dropped, 0);

        // A shifted copy aligned back into place reproduces the wrap strip.
        let (bw, oy) = r.base_offset;
        let (cw, _) = r.canvas_size;
        let right = raster::crop(&out.raster, cw - bw, oy, bw, 200);
        let error = raster::mean_abs_error(&right, &raster::crop(&base, 0, 0, bw, 200)).unwrap();
        assert!(error < 1.0, "right border error {}", error);
        let left = raster::crop(&out.raster, 0, oy, bw, 200);
        let error = raster::mean_abs_error(&left, &raster::crop(&base, 400 - bw, 0, bw, 200)).unwrap();
        assert!(error < 1.0, "left border error {}", error);
    }

    #[test]
    fn test_extra_neighbors_are_reported() {
        let base = gradient(64, 32);
        let neighbors = (0..3)
            .map(|_| Neighbor::new(gradient(64, 32), NeighborHint::default()))
            .collect();
        let out = wrap_only().expand(&base, 20, neighbors);
        assert_eq!(out.report.neighbors_dropped, 1);
    }

    #[test]
    fn test_facing_strip_sides() {
        let neighbor = RgbImage::from_fn(100, 10, |x, _| Rgb([x as u8, 0, 0]));
        let base = raster::solid(100, 10, Rgb([0, 0, 0]));
        let right = facing_strip(&neighbor, Side::Right, &base, 10);
        let left = facing_strip(&neighbor, Side::Left, &base, 10);
        assert_eq!(right.get_pixel(0, 0)[0], 0);
        assert_eq!(left.get_pixel(9, 0)[0], 99);
    }
}
