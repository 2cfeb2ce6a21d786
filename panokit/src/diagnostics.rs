//! Diagnostics records returned alongside rasters.
//!
//! Only a full transport outage or cancellation fails an engine call. Every
//! other problem (a missing tile, an undecodable body, a face that could not
//! be projected, a neighbor that would not align) is absorbed into the output
//! as a visible degradation and counted here, so callers can tell a clean
//! result from a patched one.

use crate::overlap::OverlapLayout;
use crate::projection::CubeFace;
use crate::provider::FailureKind;
use crate::tile::ZoomLevel;
use std::fmt;
use std::time::Duration;

/// Per-kind counts of exhausted tile failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounts {
    pub status: usize,
    pub transport: usize,
    pub timeout: usize,
    pub decode: usize,
}

impl FailureCounts {
    pub fn record(&mut self, kind: FailureKind) {
        match kind {
            FailureKind::Status => self.status += 1,
            FailureKind::Transport => self.transport += 1,
            FailureKind::Timeout => self.timeout += 1,
            FailureKind::Decode => self.decode += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.status + self.transport + self.timeout + self.decode
    }
}

/// Outcome of one tile grid assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    pub panorama_id: String,
    /// Zoom actually used, after clamping.
    pub zoom: ZoomLevel,
    pub tiles_total: usize,
    /// Tiles replaced by the gray placeholder.
    pub tile_failures: usize,
    /// Final failure kind of each placeholder tile.
    pub failures: FailureCounts,
    /// Attempts beyond the first, across all tiles.
    pub retries: usize,
    pub elapsed: Duration,
}

impl AssemblyReport {
    pub fn tiles_fetched(&self) -> usize {
        self.tiles_total - self.tile_failures
    }

    /// True when every tile was fetched and decoded.
    pub fn is_complete(&self) -> bool {
        self.tile_failures == 0
    }
}

impl fmt::Display for AssemblyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at zoom {}: {}/{} tiles ({} failed, {} retries) in {:.1}s",
            self.panorama_id,
            self.zoom,
            self.tiles_fetched(),
            self.tiles_total,
            self.tile_failures,
            self.retries,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Outcome of a cubemap conversion in either direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    /// Faces or regions replaced with the gray fallback.
    pub projection_fallbacks: usize,
    /// Which faces fell back, in face order.
    pub fallback_faces: Vec<CubeFace>,
}

impl ProjectionReport {
    pub fn record_fallback(&mut self, face: CubeFace) {
        self.projection_fallbacks += 1;
        if !self.fallback_faces.contains(&face) {
            self.fallback_faces.push(face);
        }
    }
}

/// A border of the expanded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

/// How a border region was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStrategy {
    /// No border on this side.
    None,
    /// Copied from the opposite edge of the base.
    Wrap,
    /// Equatorial band resized to the border height.
    EquatorialStretch,
    /// Neighbor strip aligned by feature matching and feathered in.
    NeighborAligned,
    /// Neighbor strip cross-dissolved 50/50 after alignment failed.
    NeighborCrossDissolve,
}

impl BorderStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            BorderStrategy::None => "none",
            BorderStrategy::Wrap => "wrap",
            BorderStrategy::EquatorialStretch => "equatorial-stretch",
            BorderStrategy::NeighborAligned => "neighbor-aligned",
            BorderStrategy::NeighborCrossDissolve => "neighbor-cross-dissolve",
        }
    }
}

/// Outcome of an overlap expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapReport {
    /// Percentage actually applied, after clamping.
    pub percent: u32,
    pub layout: OverlapLayout,
    pub canvas_size: (u32, u32),
    /// Where the base raster sits on the canvas.
    pub base_offset: (u32, u32),
    pub left: BorderStrategy,
    pub right: BorderStrategy,
    pub top: BorderStrategy,
    pub bottom: BorderStrategy,
    /// Neighbor strips that fell back to cross-dissolve.
    pub alignment_failures: usize,
    /// Neighbors supplied but not placed.
    pub neighbors_dropped: usize,
}

impl OverlapReport {
    /// Report for an expansion that changed nothing.
    pub fn unchanged(layout: OverlapLayout, size: (u32, u32)) -> Self {
        Self {
            percent: 0,
            layout,
            canvas_size: size,
            base_offset: (0, 0),
            left: BorderStrategy::None,
            right: BorderStrategy::None,
            top: BorderStrategy::None,
            bottom: BorderStrategy::None,
            alignment_failures: 0,
            neighbors_dropped: 0,
        }
    }

    pub fn strategy(&self, side: Side) -> BorderStrategy {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }
}

impl fmt::Display for OverlapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% {} overlap -> {}x{} (left: {}, right: {}, top: {}, bottom: {})",
            self.percent,
            self.layout.as_str(),
            self.canvas_size.0,
            self.canvas_size.1,
            self.left.as_str(),
            self.right.as_str(),
            self.top.as_str(),
            self.bottom.as_str()
        )
    }
}

/// Combined diagnostics for a multi-step run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub assembly: Option<AssemblyReport>,
    pub overlap: Option<OverlapReport>,
    pub projection: Option<ProjectionReport>,
}

impl Diagnostics {
    /// True when no step degraded its output.
    pub fn is_clean(&self) -> bool {
        self.assembly.as_ref().map_or(true, |a| a.is_complete())
            && self.overlap.as_ref().map_or(true, |o| o.alignment_failures == 0)
            && self
                .projection
                .as_ref()
                .map_or(true, |p| p.projection_fallbacks == 0)
    }
}
