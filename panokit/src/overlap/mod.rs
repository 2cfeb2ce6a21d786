//! Border overlap synthesis.
//!
//! Expands a panorama's canvas so adjacent capture positions share visual
//! content at their edges. Borders are filled from the panorama itself
//! (horizontal wrap, equatorial stretch, wrapped corners) and, where a
//! neighbor panorama is available, from the neighbor's facing strip aligned
//! by feature matching and feathered in.
//!
//! No combination of missing neighbors or failed alignment is an error;
//! the [`OverlapReport`](crate::diagnostics::OverlapReport) records which
//! strategy filled each side.

mod align;
mod blend;
mod fill;
mod layout;
mod synthesizer;

pub use align::{AlignerConfig, AlignmentError, DisabledAligner, FeatureAligner, PatchFeatureAligner};
pub use blend::{cross_dissolve, feather, warp_affine, RampDirection};
pub use fill::{equatorial_strip, left_wrap_strip, right_wrap_strip, EQUATOR_HALF_BAND};
pub use layout::{clamp_percent, OverlapGeometry, OverlapLayout, MAX_OVERLAP_PERCENT};
pub use synthesizer::{ExpandedPanorama, OverlapSynthesizer};
