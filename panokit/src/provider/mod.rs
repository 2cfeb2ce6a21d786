//! Panorama tile service abstraction
//!
//! This module provides the traits the engine consumes at its I/O boundary
//! and their HTTP-backed implementations:
//!
//! - [`TileSource`]: one encoded tile per call
//! - [`MetadataSource`]: adjacency links used to find neighbor panoramas
//!
//! ```ignore
//! use panokit::provider::{AsyncReqwestClient, StreetViewTileSource};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let source = StreetViewTileSource::new(http_client);
//! ```

mod http;
mod metadata;
mod probe;
mod streetview;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use metadata::{parse_links, HttpMetadataSource, PANOID_PLACEHOLDER};
pub use probe::{probe_zoom_levels, validate_panorama, PanoramaInfo};
pub use streetview::{StreetViewTileSource, DEFAULT_TILE_URL};
pub use types::{FailureKind, MetadataSource, PanoramaLink, ProviderError, TileSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
