//! Tile grid geometry.
//!
//! A panorama at a given zoom level is published as a fixed grid of square
//! 512×512 tiles. This module owns the zoom table and the tile coordinate
//! type; fetching and stitching live in [`crate::assembly`].

mod zoom;

pub use zoom::{TileCoord, ZoomLevel, DEFAULT_ZOOM, MAX_ZOOM, TILE_SIZE};
