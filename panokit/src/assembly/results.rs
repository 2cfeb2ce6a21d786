//! Per-tile results collected during assembly.

use crate::diagnostics::{AssemblyReport, FailureCounts};
use crate::provider::FailureKind;
use crate::raster::{self, Raster, NEUTRAL_GRAY};
use crate::tile::{TileCoord, ZoomLevel, TILE_SIZE};

/// A tile that was fetched and decoded.
#[derive(Debug, Clone)]
pub struct TileSuccess {
    pub tile: TileCoord,
    pub image: Raster,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// A tile that exhausted its attempts.
#[derive(Debug, Clone)]
pub struct TileFailure {
    pub tile: TileCoord,
    pub attempts: u32,
    /// Kind of the last failed attempt.
    pub kind: FailureKind,
    pub last_error: String,
}

/// Results of fetching every tile of one grid.
#[derive(Debug, Clone, Default)]
pub struct TileResults {
    pub successes: Vec<TileSuccess>,
    pub failures: Vec<TileFailure>,
}

impl TileResults {
    pub fn with_capacity(tiles: usize) -> Self {
        Self {
            successes: Vec::with_capacity(tiles),
            failures: Vec::new(),
        }
    }

    pub fn add_success(&mut self, success: TileSuccess) {
        self.successes.push(success);
    }

    pub fn add_failure(&mut self, failure: TileFailure) {
        self.failures.push(failure);
    }

    #[inline]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[inline]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    #[inline]
    pub fn total_count(&self) -> usize {
        self.success_count() + self.failure_count()
    }

    /// Attempts beyond the first across all tiles.
    pub fn retries(&self) -> usize {
        let extra = |attempts: u32| attempts.saturating_sub(1) as usize;
        self.successes.iter().map(|s| extra(s.attempts)).sum::<usize>()
            + self.failures.iter().map(|f| extra(f.attempts)).sum::<usize>()
    }

    pub fn failure_counts(&self) -> FailureCounts {
        let mut counts = FailureCounts::default();
        for failure in &self.failures {
            counts.record(failure.kind);
        }
        counts
    }

    /// True when nothing succeeded and every failure was a transport failure.
    pub fn is_transport_outage(&self) -> bool {
        self.successes.is_empty()
            && !self.failures.is_empty()
            && self
                .failures
                .iter()
                .all(|f| f.kind == FailureKind::Transport)
    }
}

/// An assembled panorama with its diagnostics.
#[derive(Debug, Clone)]
pub struct AssembledPanorama {
    pub raster: Raster,
    pub report: AssemblyReport,
}

/// Composes the output raster from tile results.
///
/// The canvas starts as the placeholder color, so tiles that failed (or were
/// never recorded) stay gray. Oversized tiles are clipped to their cell.
pub(super) fn compose(zoom: ZoomLevel, results: &TileResults) -> Raster {
    let (width, height) = zoom.raster_size();
    let mut canvas = raster::solid(width, height, NEUTRAL_GRAY);

    for success in &results.successes {
        let (x, y) = success.tile.pixel_origin();
        if success.image.width() > TILE_SIZE || success.image.height() > TILE_SIZE {
            let cell = raster::crop(&success.image, 0, 0, TILE_SIZE, TILE_SIZE);
            raster::paste(&mut canvas, &cell, x, y);
        } else {
            raster::paste(&mut canvas, &success.image, x, y);
        }
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn failure(kind: FailureKind) -> TileFailure {
        TileFailure {
            tile: TileCoord::new(0, 0),
            attempts: 3,
            kind,
            last_error: "x".into(),
        }
    }

    #[test]
    fn test_compose_empty_is_placeholder() {
        let raster = compose(ZoomLevel::new(1), &TileResults::default());
        assert_eq!(raster.dimensions(), (1024, 512));
        assert!(raster.pixels().all(|p| *p == NEUTRAL_GRAY));
    }

    #[test]
    fn test_compose_places_tile() {
        let mut results = TileResults::default();
        results.add_success(TileSuccess {
            tile: TileCoord::new(1, 0),
            image: raster::solid(512, 512, Rgb([0, 255, 0])),
            attempts: 1,
        });
        let raster = compose(ZoomLevel::new(1), &results);
        assert_eq!(*raster.get_pixel(512, 0), Rgb([0, 255, 0]));
        assert_eq!(*raster.get_pixel(511, 0), NEUTRAL_GRAY);
    }

    #[test]
    fn test_compose_clips_oversized_tile() {
        let mut results = TileResults::default();
        results.add_success(TileSuccess {
            tile: TileCoord::new(0, 0),
            image: raster::solid(600, 600, Rgb([255, 0, 0])),
            attempts: 1,
        });
        let raster = compose(ZoomLevel::new(1), &results);
        assert_eq!(*raster.get_pixel(512, 0), NEUTRAL_GRAY);
    }

    #[test]
    fn test_transport_outage_detection() {
        let mut results = TileResults::default();
        results.add_failure(failure(FailureKind::Transport));
        results.add_failure(failure(FailureKind::Transport));
        assert!(results.is_transport_outage());

        results.add_failure(failure(FailureKind::Status));
        assert!(!results.is_transport_outage());
        assert!(!TileResults::default().is_transport_outage());
    }

    #[test]
    fn test_retries_counted() {
        let mut results = TileResults::default();
        results.add_failure(failure(FailureKind::Timeout));
        results.add_success(TileSuccess {
            tile: TileCoord::new(1, 0),
            image: raster::solid(1, 1, NEUTRAL_GRAY),
            attempts: 2,
        });
        assert_eq!(results.retries(), 3);
        assert_eq!(results.failure_counts().timeout, 1);
    }
}
