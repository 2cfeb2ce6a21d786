//! Panorama availability checks.

use super::types::{ProviderError, TileSource};
use crate::panoid;
use crate::tile::{TileCoord, ZoomLevel};
use std::time::Duration;
use tracing::{debug, info};

/// Zoom levels a panorama is published at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanoramaInfo {
    pub panorama_id: String,
    /// Zoom levels whose first tile could be fetched, ascending.
    pub available_zooms: Vec<ZoomLevel>,
}

impl PanoramaInfo {
    /// Highest available zoom level.
    pub fn max_zoom(&self) -> Option<ZoomLevel> {
        self.available_zooms.last().copied()
    }

    /// Raster size at the highest available zoom.
    pub fn estimated_size(&self) -> Option<(u32, u32)> {
        self.max_zoom().map(ZoomLevel::raster_size)
    }

    pub fn is_available(&self) -> bool {
        !self.available_zooms.is_empty()
    }
}

/// Fetches tile (0, 0) at every zoom level and records which respond.
///
/// Each probe is a single attempt bounded by `timeout`.
pub async fn probe_zoom_levels<S: TileSource>(
    source: &S,
    panorama_id: &str,
    timeout: Duration,
) -> PanoramaInfo {
    let mut available_zooms = Vec::new();

    for zoom in ZoomLevel::all() {
        let attempt = tokio::time::timeout(
            timeout,
            source.fetch_tile(panorama_id, TileCoord::new(0, 0), zoom),
        )
        .await;
        match attempt {
            Ok(Ok(_)) => available_zooms.push(zoom),
            Ok(Err(e)) => debug!(zoom = zoom.level(), error = %e, "Zoom level unavailable"),
            Err(_) => debug!(zoom = zoom.level(), "Zoom probe timed out"),
        }
    }

    info!(
        panorama_id = panorama_id,
        available = available_zooms.len(),
        "Zoom levels probed"
    );

    PanoramaInfo {
        panorama_id: panorama_id.to_string(),
        available_zooms,
    }
}

/// Checks the ID's format, then fetches tile (0, 0) at zoom 0.
pub async fn validate_panorama<S: TileSource>(
    source: &S,
    panorama_id: &str,
    timeout: Duration,
) -> Result<(), ProviderError> {
    if !panoid::is_valid_format(panorama_id) {
        return Err(ProviderError::InvalidPanoramaId(panorama_id.to_string()));
    }

    match tokio::time::timeout(
        timeout,
        source.fetch_tile(panorama_id, TileCoord::new(0, 0), ZoomLevel::new(0)),
    )
    .await
    {
        Ok(result) => result.map(|_| ()),
        Err(_) => Err(ProviderError::Timeout(format!(
            "validation of {} exceeded {:?}",
            panorama_id, timeout
        ))),
    }
}
