//! Neighbors from panorama adjacency metadata.

use super::{Neighbor, NeighborHint, NeighborRequest, NeighborResolver};
use crate::assembly::{AssemblyError, NoProgress, TileGridAssembler};
use crate::diagnostics::Side;
use crate::provider::{MetadataSource, PanoramaLink, TileSource};
use tracing::{debug, info, warn};

/// Most linked panoramas fetched per expansion: one per horizontal side.
pub const MAX_METADATA_NEIGHBORS: usize = 2;

/// Resolves neighbors by following metadata links and assembling the linked
/// panoramas at the base zoom.
///
/// A missing or malformed metadata response, or a linked panorama that
/// cannot be assembled, just means fewer neighbors. Links are taken in
/// order, one per side; cancellation stops at the next await point.
pub struct MetadataNeighborResolver<M: MetadataSource, S: TileSource> {
    metadata: M,
    assembler: TileGridAssembler<S>,
    max_neighbors: usize,
}

impl<M: MetadataSource, S: TileSource> MetadataNeighborResolver<M, S> {
    pub fn new(metadata: M, assembler: TileGridAssembler<S>) -> Self {
        Self {
            metadata,
            assembler,
            max_neighbors: MAX_METADATA_NEIGHBORS,
        }
    }

    pub fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    async fn links_for(&self, request: &NeighborRequest<'_>) -> Option<Vec<PanoramaLink>> {
        let result = tokio::select! {
            biased;
            _ = request.cancellation.cancelled() => return None,
            result = self.metadata.fetch_links(request.panorama_id) => result,
        };
        match result {
            Ok(links) => Some(links),
            Err(e) => {
                warn!(panorama_id = %request.panorama_id, error = %e, "Metadata unavailable, no neighbors");
                None
            }
        }
    }
}

/// Side a link would occupy given the sides already filled, mirroring
/// [`place_neighbors`](super::place_neighbors).
fn free_side(link: &PanoramaLink, left_taken: bool, right_taken: bool) -> Option<Side> {
    let hint = NeighborHint {
        yaw_degrees: link.yaw_degrees,
    };
    match hint.preferred_side() {
        Some(Side::Right) if !right_taken => Some(Side::Right),
        Some(Side::Left) if !left_taken => Some(Side::Left),
        Some(_) => None,
        None if !left_taken => Some(Side::Left),
        None if !right_taken => Some(Side::Right),
        None => None,
    }
}

impl<M: MetadataSource, S: TileSource> NeighborResolver for MetadataNeighborResolver<M, S> {
    async fn resolve(&self, request: NeighborRequest<'_>) -> Vec<Neighbor> {
        let Some(links) = self.links_for(&request).await else {
            return Vec::new();
        };

        let mut neighbors = Vec::new();
        let (mut left_taken, mut right_taken) = (false, false);
        for link in links
            .into_iter()
            .filter(|link| link.panorama_id != request.panorama_id)
        {
            if neighbors.len() >= self.max_neighbors || (left_taken && right_taken) {
                break;
            }
            // Links for a side that is already filled would only be dropped.
            let Some(side) = free_side(&link, left_taken, right_taken) else {
                debug!(neighbor = %link.panorama_id, yaw = ?link.yaw_degrees, "Side already filled, skipping link");
                continue;
            };

            let assembled = self
                .assembler
                .assemble_cancellable(
                    &link.panorama_id,
                    request.zoom,
                    &NoProgress,
                    request.cancellation.clone(),
                )
                .await;
            match assembled {
                Ok(assembled) if assembled.report.tiles_fetched() > 0 => {
                    debug!(
                        neighbor = %link.panorama_id,
                        yaw = ?link.yaw_degrees,
                        side = side.as_str(),
                        "Neighbor assembled"
                    );
                    match side {
                        Side::Right => right_taken = true,
                        _ => left_taken = true,
                    }
                    neighbors.push(
                        Neighbor::new(
                            assembled.raster,
                            NeighborHint {
                                yaw_degrees: link.yaw_degrees,
                            },
                        )
                        .with_panorama_id(link.panorama_id),
                    );
                }
                Ok(_) => {
                    debug!(neighbor = %link.panorama_id, "Neighbor has no tiles, skipping");
                }
                Err(AssemblyError::Cancelled { .. }) => {
                    info!(neighbor = %link.panorama_id, "Neighbor assembly cancelled");
                    break;
                }
                Err(e) => {
                    warn!(neighbor = %link.panorama_id, error = %e, "Neighbor assembly failed, skipping");
                }
            }
        }

        info!(
            panorama_id = %request.panorama_id,
            neighbors = neighbors.len(),
            "Metadata neighbors resolved"
        );
        neighbors
    }

    fn name(&self) -> &'static str {
        "metadata"
    }
}
