//! Provider types and traits

use crate::tile::{TileCoord, ZoomLevel};
use std::future::Future;
use thiserror::Error;

/// Errors that can occur while talking to a panorama service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },
    /// Connection-level failure: DNS, refused, reset, TLS.
    #[error("Transport error: {0}")]
    Transport(String),
    /// No complete response before the attempt deadline.
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// The body arrived but could not be used.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The panorama ID does not have a valid shape.
    #[error("Invalid panorama ID: {0}")]
    InvalidPanoramaId(String),
}

impl ProviderError {
    /// Classifies the error for retry accounting and transport detection.
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::HttpStatus { .. } | ProviderError::InvalidPanoramaId(_) => {
                FailureKind::Status
            }
            ProviderError::Transport(_) => FailureKind::Transport,
            ProviderError::Timeout(_) => FailureKind::Timeout,
            ProviderError::InvalidResponse(_) => FailureKind::Decode,
        }
    }
}

/// Why a single tile attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Non-success HTTP status.
    Status,
    /// The endpoint could not be reached.
    Transport,
    /// The attempt deadline expired.
    Timeout,
    /// The body was not a decodable bitmap.
    Decode,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Status => "status",
            FailureKind::Transport => "transport",
            FailureKind::Timeout => "timeout",
            FailureKind::Decode => "decode",
        }
    }
}

/// Source of encoded panorama tiles.
///
/// Implementors fetch one tile per call and return the raw encoded bytes
/// (typically JPEG). Decoding, retries and placeholder substitution are the
/// assembler's job, so implementations should make exactly one request.
pub trait TileSource: Send + Sync + 'static {
    /// Fetches one tile of a panorama.
    fn fetch_tile(
        &self,
        panorama_id: &str,
        tile: TileCoord,
        zoom: ZoomLevel,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Returns the source's name for logging and identification.
    fn name(&self) -> &str;
}

/// A link from one panorama to an adjacent capture position.
#[derive(Debug, Clone, PartialEq)]
pub struct PanoramaLink {
    pub panorama_id: String,
    /// Bearing of the linked panorama in degrees, when published.
    pub yaw_degrees: Option<f64>,
}

/// Source of panorama adjacency metadata.
pub trait MetadataSource: Send + Sync + 'static {
    /// Returns the panoramas linked from `panorama_id`.
    fn fetch_links(
        &self,
        panorama_id: &str,
    ) -> impl Future<Output = Result<Vec<PanoramaLink>, ProviderError>> + Send;
}
