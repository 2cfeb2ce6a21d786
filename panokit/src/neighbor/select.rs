//! Resolver chosen by [`NeighborMode`].

use super::{
    MetadataNeighborResolver, Neighbor, NeighborMode, NeighborRequest, NeighborResolver,
    NoNeighbors, ShiftNeighborResolver,
};
use crate::provider::{MetadataSource, TileSource};
use tracing::warn;

/// One of the built-in resolvers, picked at runtime from configuration.
pub enum SelectedResolver<M: MetadataSource, S: TileSource> {
    None(NoNeighbors),
    Shift(ShiftNeighborResolver),
    Metadata(MetadataNeighborResolver<M, S>),
}

impl<M: MetadataSource, S: TileSource> SelectedResolver<M, S> {
    /// Builds the resolver for `mode`.
    ///
    /// Metadata mode without a metadata resolver degrades to no neighbors.
    pub fn from_mode(
        mode: NeighborMode,
        shift: ShiftNeighborResolver,
        metadata: Option<MetadataNeighborResolver<M, S>>,
    ) -> Self {
        match (mode, metadata) {
            (NeighborMode::None, _) => SelectedResolver::None(NoNeighbors),
            (NeighborMode::Shift, _) => SelectedResolver::Shift(shift),
            (NeighborMode::Metadata, Some(resolver)) => SelectedResolver::Metadata(resolver),
            (NeighborMode::Metadata, None) => {
                warn!("Metadata neighbors requested but no metadata URL configured");
                SelectedResolver::None(NoNeighbors)
            }
        }
    }
}

impl<M: MetadataSource, S: TileSource> NeighborResolver for SelectedResolver<M, S> {
    async fn resolve(&self, request: NeighborRequest<'_>) -> Vec<Neighbor> {
        match self {
            SelectedResolver::None(r) => r.resolve(request).await,
            SelectedResolver::Shift(r) => r.resolve(request).await,
            SelectedResolver::Metadata(r) => r.resolve(request).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SelectedResolver::None(r) => r.name(),
            SelectedResolver::Shift(r) => r.name(),
            SelectedResolver::Metadata(r) => r.name(),
        }
    }
}
