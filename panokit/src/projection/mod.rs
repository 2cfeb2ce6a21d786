//! Spherical projection math.
//!
//! Pure functions mapping between unit-sphere directions, equirectangular
//! pixel coordinates and cube face coordinates. No I/O and no state.

mod face;
mod sphere;

pub use face::CubeFace;
pub use sphere::{
    cube_uv_to_direction, direction_to_cube_face, direction_to_equirect, equirect_to_direction,
};
