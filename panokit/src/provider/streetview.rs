//! Street View tile source.
//!
//! Panoramas are published as a grid of 512×512 JPEG tiles addressed by
//! panorama ID, column, row and zoom:
//!
//! - Tiles: `https://streetviewpixels-pa.googleapis.com/v1/tile?cb_client=maps_sv.tactile&panoid={id}&x={x}&y={y}&zoom={z}&nbt=1&fover=2`
//!
//! The endpoint needs no authentication. Missing tiles answer with a
//! non-success status, which the assembler treats like any other failed
//! attempt.

use super::probe::{self, PanoramaInfo};
use crate::provider::{AsyncHttpClient, ProviderError, TileSource};
use crate::tile::{TileCoord, ZoomLevel};
use std::time::Duration;

/// Default tile endpoint, including its fixed query parameters.
pub const DEFAULT_TILE_URL: &str =
    "https://streetviewpixels-pa.googleapis.com/v1/tile?cb_client=maps_sv.tactile";

/// Street View panorama tile source.
///
/// # Example
///
/// ```no_run
/// use panokit::provider::{AsyncReqwestClient, StreetViewTileSource};
///
/// let client = AsyncReqwestClient::new().unwrap();
/// let source = StreetViewTileSource::new(client);
/// // Hand the source to a TileGridAssembler...
/// ```
pub struct StreetViewTileSource<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> StreetViewTileSource<C> {
    /// Creates a source against the public tile endpoint.
    pub fn new(http_client: C) -> Self {
        Self::with_base_url(http_client, DEFAULT_TILE_URL)
    }

    /// Creates a source against a custom endpoint.
    ///
    /// The base may already carry query parameters; tile parameters are
    /// appended with the correct separator.
    pub fn with_base_url(http_client: C, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Builds the tile URL for the given coordinates.
    pub fn build_url(&self, panorama_id: &str, tile: TileCoord, zoom: ZoomLevel) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}panoid={}&x={}&y={}&zoom={}&nbt=1&fover=2",
            self.base_url,
            separator,
            panorama_id,
            tile.x,
            tile.y,
            zoom.level()
        )
    }

    /// Reports which zoom levels the panorama is published at.
    pub async fn probe_zoom_levels(&self, panorama_id: &str, timeout: Duration) -> PanoramaInfo {
        probe::probe_zoom_levels(self, panorama_id, timeout).await
    }

    /// Checks the ID's format and that its first tile can be fetched.
    pub async fn validate_panorama(
        &self,
        panorama_id: &str,
        timeout: Duration,
    ) -> Result<(), ProviderError> {
        probe::validate_panorama(self, panorama_id, timeout).await
    }
}

impl<C: AsyncHttpClient> TileSource for StreetViewTileSource<C> {
    async fn fetch_tile(
        &self,
        panorama_id: &str,
        tile: TileCoord,
        zoom: ZoomLevel,
    ) -> Result<Vec<u8>, ProviderError> {
        let url = self.build_url(panorama_id, tile, zoom);
        self.http_client.get(&url).await
    }

    fn name(&self) -> &str {
        "streetview"
    }
}
