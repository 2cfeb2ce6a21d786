//! Panorama adjacency metadata.
//!
//! The metadata endpoint is optional and has no fixed public contract, so the
//! client accepts a URL template and a small JSON document:
//!
//! ```json
//! {"links": [{"panoId": "...", "yaw": 90.0}, {"pano": "...", "heading": 270}]}
//! ```
//!
//! `panoId` may also be spelled `pano` or `panoid`, and `yaw` may be spelled
//! `heading`. Unknown fields are ignored.

use super::types::{MetadataSource, PanoramaLink, ProviderError};
use super::AsyncHttpClient;
use serde::Deserialize;
use tracing::debug;

/// Placeholder replaced by the panorama ID in metadata URL templates.
pub const PANOID_PLACEHOLDER: &str = "{panoid}";

#[derive(Debug, Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    links: Vec<LinkRecord>,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    #[serde(rename = "panoId", alias = "pano", alias = "panoid")]
    pano_id: String,
    #[serde(default, alias = "heading")]
    yaw: Option<f64>,
}

/// Parses a metadata document into panorama links.
///
/// Links with an empty ID are skipped.
pub fn parse_links(body: &[u8]) -> Result<Vec<PanoramaLink>, ProviderError> {
    let doc: MetadataDocument = serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Invalid metadata JSON: {}", e)))?;

    Ok(doc
        .links
        .into_iter()
        .filter(|link| !link.pano_id.is_empty())
        .map(|link| PanoramaLink {
            panorama_id: link.pano_id,
            yaw_degrees: link.yaw.filter(|y| y.is_finite()),
        })
        .collect())
}

/// Metadata client backed by an HTTP endpoint.
pub struct HttpMetadataSource<C: AsyncHttpClient> {
    http_client: C,
    url_template: String,
}

impl<C: AsyncHttpClient> HttpMetadataSource<C> {
    /// Creates a client for the given URL template.
    ///
    /// `{panoid}` in the template is replaced by the panorama ID; without it,
    /// a `panoid` query parameter is appended.
    pub fn new(http_client: C, url_template: impl Into<String>) -> Self {
        Self {
            http_client,
            url_template: url_template.into(),
        }
    }

    pub fn build_url(&self, panorama_id: &str) -> String {
        if self.url_template.contains(PANOID_PLACEHOLDER) {
            self.url_template.replace(PANOID_PLACEHOLDER, panorama_id)
        } else {
            let separator = if self.url_template.contains('?') { '&' } else { '?' };
            format!("{}{}panoid={}", self.url_template, separator, panorama_id)
        }
    }
}

impl<C: AsyncHttpClient> MetadataSource for HttpMetadataSource<C> {
    async fn fetch_links(&self, panorama_id: &str) -> Result<Vec<PanoramaLink>, ProviderError> {
        let url = self.build_url(panorama_id);
        let body = self.http_client.get(&url).await?;
        let links = parse_links(&body)?;
        debug!(panorama_id = panorama_id, links = links.len(), "Metadata links parsed");
        Ok(links)
    }
}
