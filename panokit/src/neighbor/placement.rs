//! Assigning neighbors to canvas sides.

use crate::diagnostics::Side;
use crate::raster::Raster;
use tracing::debug;

/// Placement hint for a neighbor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NeighborHint {
    /// Bearing from the base panorama, in degrees.
    pub yaw_degrees: Option<f64>,
}

impl NeighborHint {
    pub fn yaw(degrees: f64) -> Self {
        Self {
            yaw_degrees: Some(degrees),
        }
    }

    /// Side implied by the yaw, if it names one.
    ///
    /// Bearings strictly between 0° and 180° are on the right, strictly
    /// between 180° and 360° on the left. Exactly 0°/180°, non-finite or
    /// missing bearings give no preference.
    pub fn preferred_side(&self) -> Option<Side> {
        let yaw = self.yaw_degrees.filter(|y| y.is_finite())?.rem_euclid(360.0);
        if yaw > 0.0 && yaw < 180.0 {
            Some(Side::Right)
        } else if yaw > 180.0 {
            Some(Side::Left)
        } else {
            None
        }
    }
}

/// A panorama adjacent to the one being expanded.
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// Source panorama, when it came from metadata.
    pub panorama_id: Option<String>,
    pub raster: Raster,
    pub hint: NeighborHint,
}

impl Neighbor {
    pub fn new(raster: Raster, hint: NeighborHint) -> Self {
        Self {
            panorama_id: None,
            raster,
            hint,
        }
    }

    pub fn with_panorama_id(mut self, panorama_id: impl Into<String>) -> Self {
        self.panorama_id = Some(panorama_id.into());
        self
    }
}

/// Neighbors assigned to the left and right borders.
#[derive(Debug, Clone, Default)]
pub struct PlacedNeighbors {
    pub left: Option<Neighbor>,
    pub right: Option<Neighbor>,
    /// Candidates that found no free side.
    pub dropped: usize,
}

impl PlacedNeighbors {
    pub fn get(&self, side: Side) -> Option<&Neighbor> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
            Side::Top | Side::Bottom => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Places neighbors on the left and right borders.
///
/// Candidates are taken in order. A yaw-hinted candidate goes to its side if
/// that side is free; an unhinted one takes the first free side, left
/// before right. Everything else is dropped.
pub fn place_neighbors(neighbors: impl IntoIterator<Item = Neighbor>) -> PlacedNeighbors {
    let mut placed = PlacedNeighbors::default();

    for neighbor in neighbors {
        let side = match neighbor.hint.preferred_side() {
            Some(side) => side,
            None if placed.left.is_none() => Side::Left,
            None => Side::Right,
        };
        let slot = match side {
            Side::Right => &mut placed.right,
            _ => &mut placed.left,
        };
        if slot.is_none() {
            *slot = Some(neighbor);
        } else {
            debug!(
                side = side.as_str(),
                panorama_id = neighbor.panorama_id.as_deref().unwrap_or("-"),
                yaw = ?neighbor.hint.yaw_degrees,
                "Neighbor side already taken, dropping"
            );
            placed.dropped += 1;
        }
    }

    placed
}
