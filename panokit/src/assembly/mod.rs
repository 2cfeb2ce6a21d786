//! Tiled-fetch-with-retry panorama assembly.
//!
//! The [`TileGridAssembler`] fetches every tile of a zoom level's grid
//! through a [`TileSource`](crate::provider::TileSource), retrying each tile
//! independently, and stitches the decoded tiles into one equirectangular
//! raster. Tiles that cannot be fetched become neutral-gray placeholders;
//! the assembly itself only fails on a complete transport outage or on
//! cancellation.

mod assembler;
mod error;
mod fetch;
mod progress;
mod results;

pub use assembler::TileGridAssembler;
pub use error::AssemblyError;
pub use progress::{AssemblyProgress, NoProgress, ProgressSink};
pub use results::{AssembledPanorama, TileFailure, TileResults, TileSuccess};
