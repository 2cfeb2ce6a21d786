//! Neighbor panoramas for overlap synthesis.
//!
//! A [`NeighborResolver`] produces candidate neighbors; [`place_neighbors`]
//! assigns them to the left and right borders by yaw.

mod metadata;
mod placement;
mod resolver;
mod select;

pub use metadata::{MetadataNeighborResolver, MAX_METADATA_NEIGHBORS};
pub use placement::{place_neighbors, Neighbor, NeighborHint, PlacedNeighbors};
pub use resolver::{
    NeighborMode, NeighborRequest, NeighborResolver, NoNeighbors, ShiftNeighborResolver,
    DEFAULT_SHIFT_FRACTION,
};
pub use select::SelectedResolver;
