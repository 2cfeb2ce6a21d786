//! Neighbor resolution strategies.

use super::{Neighbor, NeighborHint};
use crate::raster::{self, Raster};
use crate::tile::ZoomLevel;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default horizontal shift for synthesized neighbors, as a fraction of width.
pub const DEFAULT_SHIFT_FRACTION: f64 = 0.05;

/// Where overlap neighbors come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborMode {
    /// Wrap-around fill only.
    #[default]
    None,
    /// Horizontally shifted copies of the base panorama.
    Shift,
    /// Linked panoramas from the metadata endpoint.
    Metadata,
}

impl NeighborMode {
    pub fn as_str(self) -> &'static str {
        match self {
            NeighborMode::None => "none",
            NeighborMode::Shift => "shift",
            NeighborMode::Metadata => "metadata",
        }
    }
}

impl fmt::Display for NeighborMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NeighborMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(NeighborMode::None),
            "shift" => Ok(NeighborMode::Shift),
            "metadata" => Ok(NeighborMode::Metadata),
            _ => Err(format!("unknown neighbor mode '{}'", s)),
        }
    }
}

/// What a resolver knows about the panorama being expanded.
#[derive(Debug, Clone, Copy)]
pub struct NeighborRequest<'a> {
    pub panorama_id: &'a str,
    pub zoom: ZoomLevel,
    pub base: &'a Raster,
    /// Fired when the caller abandons the download.
    pub cancellation: &'a CancellationToken,
}

/// Finds candidate neighbors for a panorama.
///
/// Resolvers never fail: anything that goes wrong means fewer neighbors.
/// A resolver that does network work stops as soon as
/// `request.cancellation` fires and returns what it has.
pub trait NeighborResolver: Send + Sync {
    fn resolve(&self, request: NeighborRequest<'_>) -> impl Future<Output = Vec<Neighbor>> + Send;

    fn name(&self) -> &'static str;
}

/// Resolver that never supplies neighbors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNeighbors;

impl NeighborResolver for NoNeighbors {
    async fn resolve(&self, _request: NeighborRequest<'_>) -> Vec<Neighbor> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Synthesizes two neighbors by rotating the base panorama.
///
/// The right neighbor is the base rolled right by `shift_fraction` of its
/// width (yaw 90°), the left neighbor rolled left by the same amount
/// (yaw 270°).
#[derive(Debug, Clone, Copy)]
pub struct ShiftNeighborResolver {
    shift_fraction: f64,
}

impl Default for ShiftNeighborResolver {
    fn default() -> Self {
        Self {
            shift_fraction: DEFAULT_SHIFT_FRACTION,
        }
    }
}

impl ShiftNeighborResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shift_fraction(mut self, fraction: f64) -> Self {
        self.shift_fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 0.5)
        } else {
            DEFAULT_SHIFT_FRACTION
        };
        self
    }

    pub fn shift_fraction(&self) -> f64 {
        self.shift_fraction
    }

    /// Builds the two shifted neighbors synchronously.
    pub fn synthesize(&self, base: &Raster) -> Vec<Neighbor> {
        let shift = (f64::from(base.width()) * self.shift_fraction).round() as i64;
        if shift == 0 {
            return Vec::new();
        }
        debug!(shift, "Synthesizing shifted neighbors");
        vec![
            Neighbor::new(raster::roll_horizontal(base, shift), NeighborHint::yaw(90.0)),
            Neighbor::new(raster::roll_horizontal(base, -shift), NeighborHint::yaw(270.0)),
        ]
    }
}

impl NeighborResolver for ShiftNeighborResolver {
    async fn resolve(&self, request: NeighborRequest<'_>) -> Vec<Neighbor> {
        self.synthesize(request.base)
    }

    fn name(&self) -> &'static str {
        "shift"
    }
}
