//! Feature-based strip alignment.
//!
//! A [`FeatureAligner`] finds point correspondences between two strips and
//! estimates the 2D affine transform between them. The synthesizer takes the
//! aligner as a trait object, so the matching backend is chosen when the
//! engine is built: [`PatchFeatureAligner`] is a self-contained corner
//! matcher, [`DisabledAligner`] turns alignment off.
//!
//! # Pipeline
//!
//! 1. Harris corner response on the luma channel
//! 2. Non-maximum suppression, strongest corners kept
//! 3. Mean/variance-normalized square patch descriptors
//! 4. Mutual nearest-neighbor matching with a correlation floor
//! 5. RANSAC over three-point affine hypotheses (fixed seed), then a
//!    least-squares refit on the inliers

use crate::raster::Raster;
use glam::{DAffine2, DMat2, DVec2};
use thiserror::Error;
use tracing::debug;

/// Why two strips could not be aligned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    #[error("feature alignment is disabled")]
    Unavailable,

    #[error("strip too small to align ({width}x{height})")]
    StripTooSmall { width: u32, height: u32 },

    #[error("too few features: found {found}, need {required}")]
    TooFewFeatures { found: usize, required: usize },

    #[error("too few matches: found {found}, need {required}")]
    TooFewMatches { found: usize, required: usize },

    #[error("no consistent affine transform")]
    Degenerate,
}

/// Estimates the transform between a reference strip and a moving strip.
pub trait FeatureAligner: Send + Sync {
    /// Returns `T` such that `T(p)` in `moving` shows what `p` shows in
    /// `reference`.
    fn align(&self, reference: &Raster, moving: &Raster) -> Result<DAffine2, AlignmentError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Aligner that never aligns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAligner;

impl FeatureAligner for DisabledAligner {
    fn align(&self, _reference: &Raster, _moving: &Raster) -> Result<DAffine2, AlignmentError> {
        Err(AlignmentError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Tunables for [`PatchFeatureAligner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignerConfig {
    /// Inliers required to accept a transform.
    pub min_matches: usize,
    /// Corners kept per strip, strongest first.
    pub max_features: usize,
    /// Descriptor patch is `(2r + 1)²` pixels.
    pub patch_radius: u32,
    /// Suppression window radius.
    pub nms_radius: u32,
    /// Harris sensitivity constant.
    pub harris_k: f32,
    /// Corners weaker than this fraction of the strongest are ignored.
    pub response_threshold: f32,
    /// Minimum normalized cross-correlation for a match.
    pub min_correlation: f32,
    pub ransac_iterations: usize,
    /// Reprojection error, in pixels, below which a match is an inlier.
    pub inlier_threshold: f64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            min_matches: 6,
            max_features: 300,
            patch_radius: 4,
            nms_radius: 3,
            harris_k: 0.04,
            response_threshold: 0.01,
            min_correlation: 0.8,
            ransac_iterations: 400,
            inlier_threshold: 1.5,
        }
    }
}

/// Harris corners + patch correlation + RANSAC affine.
#[derive(Debug, Clone, Default)]
pub struct PatchFeatureAligner {
    config: AlignerConfig,
}

impl PatchFeatureAligner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AlignerConfig) -> Self {
        Self { config }
    }

    pub fn with_min_matches(mut self, min_matches: usize) -> Self {
        self.config.min_matches = min_matches.max(3);
        self
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }
}

impl FeatureAligner for PatchFeatureAligner {
    fn align(&self, reference: &Raster, moving: &Raster) -> Result<DAffine2, AlignmentError> {
        let cfg = &self.config;
        let min_side = 2 * (cfg.patch_radius + 2) + 1;
        for strip in [reference, moving] {
            if strip.width() < min_side || strip.height() < min_side {
                return Err(AlignmentError::StripTooSmall {
                    width: strip.width(),
                    height: strip.height(),
                });
            }
        }

        let ref_gray = Luma::from_raster(reference);
        let mov_gray = Luma::from_raster(moving);
        let ref_features = describe(&ref_gray, &detect_corners(&ref_gray, cfg), cfg.patch_radius);
        let mov_features = describe(&mov_gray, &detect_corners(&mov_gray, cfg), cfg.patch_radius);

        let found = ref_features.len().min(mov_features.len());
        if found < cfg.min_matches {
            return Err(AlignmentError::TooFewFeatures {
                found,
                required: cfg.min_matches,
            });
        }

        let matches = mutual_matches(&ref_features, &mov_features, cfg.min_correlation);
        debug!(
            reference_features = ref_features.len(),
            moving_features = mov_features.len(),
            matches = matches.len(),
            "Feature matching complete"
        );
        if matches.len() < cfg.min_matches {
            return Err(AlignmentError::TooFewMatches {
                found: matches.len(),
                required: cfg.min_matches,
            });
        }

        let (transform, inliers) = ransac_affine(&matches, cfg).ok_or(AlignmentError::Degenerate)?;
        if inliers < cfg.min_matches {
            return Err(AlignmentError::TooFewMatches {
                found: inliers,
                required: cfg.min_matches,
            });
        }
        Ok(transform)
    }

    fn name(&self) -> &'static str {
        "patch"
    }
}

/// Single-channel float image.
struct Luma {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Luma {
    fn from_raster(src: &Raster) -> Self {
        let data = src
            .pixels()
            .map(|p| 0.299 * f32::from(p[0]) + 0.587 * f32::from(p[1]) + 0.114 * f32::from(p[2]))
            .collect();
        Self {
            width: src.width() as usize,
            height: src.height() as usize,
            data,
        }
    }

    fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

#[derive(Debug, Clone, Copy)]
struct Corner {
    x: usize,
    y: usize,
    response: f32,
}

struct Feature {
    point: DVec2,
    descriptor: Vec<f32>,
}

#[derive(Debug, Clone, Copy)]
struct Match {
    reference: DVec2,
    moving: DVec2,
}

fn detect_corners(img: &Luma, cfg: &AlignerConfig) -> Vec<Corner> {
    let (w, h) = (img.width, img.height);
    let mut ixx = vec![0f32; w * h];
    let mut iyy = vec![0f32; w * h];
    let mut ixy = vec![0f32; w * h];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = (img.at(x + 1, y) - img.at(x - 1, y)) * 0.5;
            let gy = (img.at(x, y + 1) - img.at(x, y - 1)) * 0.5;
            let i = y * w + x;
            ixx[i] = gx * gx;
            iyy[i] = gy * gy;
            ixy[i] = gx * gy;
        }
    }

    // 3×3 structure tensor window.
    let mut response = vec![0f32; w * h];
    let mut max_response = 0f32;
    for y in 2..h - 2 {
        for x in 2..w - 2 {
            let (mut sxx, mut syy, mut sxy) = (0f32, 0f32, 0f32);
            for wy in y - 1..=y + 1 {
                for wx in x - 1..=x + 1 {
                    let i = wy * w + wx;
                    sxx += ixx[i];
                    syy += iyy[i];
                    sxy += ixy[i];
                }
            }
            let trace = sxx + syy;
            let r = sxx * syy - sxy * sxy - cfg.harris_k * trace * trace;
            response[y * w + x] = r;
            max_response = max_response.max(r);
        }
    }
    if max_response <= 0.0 {
        return Vec::new();
    }

    let threshold = max_response * cfg.response_threshold;
    let border = cfg.patch_radius as usize + 2;
    let nms = cfg.nms_radius as usize;
    let mut corners = Vec::new();

    for y in border..h.saturating_sub(border) {
        for x in border..w.saturating_sub(border) {
            let i = y * w + x;
            let r = response[i];
            if r <= threshold {
                continue;
            }
            let is_max = (y.saturating_sub(nms)..=(y + nms).min(h - 1)).all(|ny| {
                (x.saturating_sub(nms)..=(x + nms).min(w - 1)).all(|nx| {
                    let j = ny * w + nx;
                    // Equal responses keep the earliest in scan order.
                    j == i || response[j] < r || (response[j] == r && j > i)
                })
            });
            if is_max {
                corners.push(Corner { x, y, response: r });
            }
        }
    }

    corners.sort_by(|a, b| b.response.total_cmp(&a.response));
    corners.truncate(cfg.max_features);
    corners
}

fn describe(img: &Luma, corners: &[Corner], radius: u32) -> Vec<Feature> {
    let r = radius as usize;
    corners
        .iter()
        .filter_map(|c| {
            let mut patch = Vec::with_capacity((2 * r + 1) * (2 * r + 1));
            for y in c.y - r..=c.y + r {
                for x in c.x - r..=c.x + r {
                    patch.push(img.at(x, y));
                }
            }
            let mean = patch.iter().sum::<f32>() / patch.len() as f32;
            patch.iter_mut().for_each(|v| *v -= mean);
            let norm = patch.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm < 1e-3 {
                return None;
            }
            patch.iter_mut().for_each(|v| *v /= norm);
            Some(Feature {
                point: DVec2::new(c.x as f64, c.y as f64),
                descriptor: patch,
            })
        })
        .collect()
}

fn correlation(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn best_match(feature: &Feature, candidates: &[Feature]) -> Option<(usize, f32)> {
    candidates
        .iter()
        .enumerate()
        .map(|(j, other)| (j, correlation(&feature.descriptor, &other.descriptor)))
        .fold(None, |best, (j, score)| match best {
            Some((_, s)) if s >= score => best,
            _ => Some((j, score)),
        })
}

fn mutual_matches(reference: &[Feature], moving: &[Feature], min_correlation: f32) -> Vec<Match> {
    reference
        .iter()
        .enumerate()
        .filter_map(|(i, f)| {
            let (j, score) = best_match(f, moving)?;
            if score < min_correlation {
                return None;
            }
            let (back, _) = best_match(&moving[j], reference)?;
            (back == i).then(|| Match {
                reference: f.point,
                moving: moving[j].point,
            })
        })
        .collect()
}

/// Small deterministic generator for hypothesis sampling.
struct XorShift(u64);

impl XorShift {
    fn next_index(&mut self, bound: usize) -> usize {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % bound as u64) as usize
    }
}

fn ransac_affine(matches: &[Match], cfg: &AlignerConfig) -> Option<(DAffine2, usize)> {
    let n = matches.len();
    if n < 3 {
        return None;
    }
    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
    let mut best: Option<(DAffine2, Vec<usize>)> = None;

    for _ in 0..cfg.ransac_iterations {
        let a = rng.next_index(n);
        let b = rng.next_index(n);
        let c = rng.next_index(n);
        if a == b || b == c || a == c {
            continue;
        }
        let Some(model) = fit_affine(&[matches[a], matches[b], matches[c]]) else {
            continue;
        };
        let inliers = inlier_indices(&model, matches, cfg.inlier_threshold);
        if best.as_ref().map_or(true, |(_, current)| inliers.len() > current.len()) {
            let done = inliers.len() == n;
            best = Some((model, inliers));
            if done {
                break;
            }
        }
    }

    let (model, inliers) = best?;
    let subset: Vec<Match> = inliers.iter().map(|&i| matches[i]).collect();
    let refined = fit_affine(&subset).unwrap_or(model);
    let count = inlier_indices(&refined, matches, cfg.inlier_threshold).len();
    Some((refined, count.max(inliers.len())))
}

fn inlier_indices(model: &DAffine2, matches: &[Match], threshold: f64) -> Vec<usize> {
    matches
        .iter()
        .enumerate()
        .filter(|(_, m)| model.transform_point2(m.reference).distance(m.moving) <= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Least-squares affine fit mapping reference points onto moving points.
///
/// Solves the 3×3 normal equations once per output axis; three points give
/// the exact solution. Returns `None` for collinear input.
fn fit_affine(matches: &[Match]) -> Option<DAffine2> {
    if matches.len() < 3 {
        return None;
    }
    // Center for conditioning.
    let n = matches.len() as f64;
    let c_ref = matches.iter().map(|m| m.reference).sum::<DVec2>() / n;
    let c_mov = matches.iter().map(|m| m.moving).sum::<DVec2>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    let (mut ux, mut uy, mut vx, mut vy) = (0.0, 0.0, 0.0, 0.0);
    for m in matches {
        let p = m.reference - c_ref;
        let q = m.moving - c_mov;
        sxx += p.x * p.x;
        sxy += p.x * p.y;
        syy += p.y * p.y;
        ux += p.x * q.x;
        uy += p.y * q.x;
        vx += p.x * q.y;
        vy += p.y * q.y;
    }

    let normal = DMat2::from_cols(DVec2::new(sxx, sxy), DVec2::new(sxy, syy));
    if normal.determinant().abs() < 1e-9 {
        return None;
    }
    let inv = normal.inverse();
    let row_x = inv * DVec2::new(ux, uy);
    let row_y = inv * DVec2::new(vx, vy);

    let linear = DMat2::from_cols(DVec2::new(row_x.x, row_y.x), DVec2::new(row_x.y, row_y.y));
    let translation = c_mov - linear * c_ref;
    Some(DAffine2::from_mat2_translation(linear, translation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Random 4×4 blocks; corners at block junctions are distinctive.
    fn textured(width: u32, height: u32, seed: u32) -> Raster {
        RgbImage::from_fn(width, height, |x, y| {
            let mut h = (x / 4).wrapping_mul(73_856_093) ^ (y / 4).wrapping_mul(19_349_663) ^ seed;
            h ^= h >> 13;
            h = h.wrapping_mul(0x5bd1_e995);
            h ^= h >> 15;
            let v = (h & 0xff) as u8;
            Rgb([v, v, v])
        })
    }

    fn shifted(src: &Raster, dx: u32, dy: u32, width: u32, height: u32) -> Raster {
        crate::raster::crop(src, dx, dy, width, height)
    }

    #[test]
    fn test_recovers_translation() {
        let world = textured(160, 200, 7);
        let reference = shifted(&world, 10, 10, 96, 160);
        let moving = shifted(&world, 5, 13, 96, 160);

        let t = PatchFeatureAligner::new().align(&reference, &moving).unwrap();
        // Reference (0,0) is world (10,10) which is moving (5,-3).
        let p = t.transform_point2(DVec2::new(20.0, 30.0));
        assert!((p.x - 25.0).abs() < 0.5, "x = {}", p.x);
        assert!((p.y - 27.0).abs() < 0.5, "y = {}", p.y);
        assert!((t.matrix2.x_axis.x - 1.0).abs() < 0.01);
        assert!((t.matrix2.y_axis.y - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_flat_strips_have_no_features() {
        let flat = crate::raster::solid(64, 64, Rgb([100, 100, 100]));
        let err = PatchFeatureAligner::new().align(&flat, &flat).unwrap_err();
        assert!(matches!(err, AlignmentError::TooFewFeatures { found: 0, .. }));
    }

    #[test]
    fn test_unrelated_strips_do_not_align() {
        let a = textured(96, 160, 1);
        let b = textured(96, 160, 99);
        let result = PatchFeatureAligner::new().with_min_matches(40).align(&a, &b);
        assert!(result.is_err());
    }

    #[test]
    fn test_tiny_strip_rejected() {
        let tiny = crate::raster::solid(5, 100, Rgb([0, 0, 0]));
        let err = PatchFeatureAligner::new().align(&tiny, &tiny).unwrap_err();
        assert_eq!(err, AlignmentError::StripTooSmall { width: 5, height: 100 });
    }

    #[test]
    fn test_disabled_aligner() {
        let img = textured(32, 32, 3);
        assert_eq!(
            DisabledAligner.align(&img, &img).unwrap_err(),
            AlignmentError::Unavailable
        );
        assert_eq!(DisabledAligner.name(), "disabled");
    }

    #[test]
    fn test_fit_affine_exact_for_three_points() {
        let truth = DAffine2::from_mat2_translation(
            DMat2::from_cols(DVec2::new(1.1, 0.1), DVec2::new(-0.2, 0.9)),
            DVec2::new(4.0, -2.0),
        );
        let matches: Vec<Match> = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0)]
            .into_iter()
            .map(|p| Match {
                reference: p,
                moving: truth.transform_point2(p),
            })
            .collect();
        let fit = fit_affine(&matches).unwrap();
        assert!(fit.abs_diff_eq(truth, 1e-9));
    }

    #[test]
    fn test_fit_affine_rejects_collinear() {
        let matches: Vec<Match> = (0..4)
            .map(|i| {
                let p = DVec2::new(i as f64, 2.0 * i as f64);
                Match { reference: p, moving: p }
            })
            .collect();
        assert!(fit_affine(&matches).is_none());
    }
}
