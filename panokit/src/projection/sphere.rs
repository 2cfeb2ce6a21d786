//! Sphere ↔ equirectangular ↔ cube face mappings.
//!
//! Coordinate convention: +Y is up, the equirectangular center column looks
//! along +X, and longitude grows toward +Z. Image rows grow downward, so the
//! face-local `v` axis is negated when building 3D vectors.
//!
//! Face bases, with `a = 2u - 1` and `b = 2v - 1` in `[-1, 1]`:
//!
//! | face  | direction      |
//! |-------|----------------|
//! | front | ( 1, -b,  a)   |
//! | right | (-a, -b,  1)   |
//! | back  | (-1, -b, -a)   |
//! | left  | ( a, -b, -1)   |
//! | up    | ( b,  1,  a)   |
//! | down  | (-b, -1,  a)   |
//!
//! On every horizontal face `u` grows toward increasing equirectangular `x`,
//! and the up/down faces share their bottom/top edge with the front face.

use super::CubeFace;
use glam::DVec3;
use std::f64::consts::{PI, TAU};

/// Direction through face-local `(u, v) ∈ [0, 1]²` of `face`, normalized.
pub fn cube_uv_to_direction(u: f64, v: f64, face: CubeFace) -> DVec3 {
    let a = 2.0 * u - 1.0;
    let b = 2.0 * v - 1.0;
    let dir = match face {
        CubeFace::Front => DVec3::new(1.0, -b, a),
        CubeFace::Right => DVec3::new(-a, -b, 1.0),
        CubeFace::Back => DVec3::new(-1.0, -b, -a),
        CubeFace::Left => DVec3::new(a, -b, -1.0),
        CubeFace::Up => DVec3::new(b, 1.0, a),
        CubeFace::Down => DVec3::new(-b, -1.0, a),
    };
    dir.normalize()
}

/// Continuous equirectangular coordinates of a direction.
///
/// `x` wraps into `[0, width)`; `y` is clamped to `[0, height - 1]` since the
/// poles are endpoints. Zero vectors map to the image center.
pub fn direction_to_equirect(dir: DVec3, width: u32, height: u32) -> (f64, f64) {
    let w = f64::from(width);
    let h = f64::from(height);
    let n = dir.normalize_or_zero();
    if n == DVec3::ZERO {
        return (w * 0.5, h * 0.5);
    }

    let theta = n.z.atan2(n.x);
    let phi = n.y.clamp(-1.0, 1.0).acos();

    let x = ((theta / TAU + 0.5) * w).rem_euclid(w);
    let y = (phi / PI * h).clamp(0.0, (h - 1.0).max(0.0));
    (x, y)
}

/// Unit direction of continuous equirectangular coordinates.
///
/// The inverse of [`direction_to_equirect`] away from the clamped pole rows.
pub fn equirect_to_direction(x: f64, y: f64, width: u32, height: u32) -> DVec3 {
    let theta = (x / f64::from(width) - 0.5) * TAU;
    let phi = (y / f64::from(height)) * PI;
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    DVec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
}

/// Face and face-local `(u, v)` hit by a direction.
///
/// The face is the one whose axis has the largest absolute component. Exact
/// ties resolve front/back first, then right/left, then up/down. The zero
/// vector maps to the center of the front face.
pub fn direction_to_cube_face(dir: DVec3) -> (CubeFace, f64, f64) {
    let abs = dir.abs();
    if abs.max_element() == 0.0 {
        return (CubeFace::Front, 0.5, 0.5);
    }

    let (face, a, b) = if abs.x >= abs.z && abs.x >= abs.y {
        if dir.x > 0.0 {
            (CubeFace::Front, dir.z / dir.x, -dir.y / dir.x)
        } else {
            (CubeFace::Back, dir.z / dir.x, dir.y / dir.x)
        }
    } else if abs.z >= abs.y {
        if dir.z > 0.0 {
            (CubeFace::Right, -dir.x / dir.z, -dir.y / dir.z)
        } else {
            (CubeFace::Left, -dir.x / dir.z, dir.y / dir.z)
        }
    } else if dir.y > 0.0 {
        (CubeFace::Up, dir.z / dir.y, dir.x / dir.y)
    } else {
        (CubeFace::Down, -dir.z / dir.y, dir.x / dir.y)
    };

    let u = ((a + 1.0) * 0.5).clamp(0.0, 1.0);
    let v = ((b + 1.0) * 0.5).clamp(0.0, 1.0);
    (face, u, v)
}
