//! Zoom table and tile coordinates.

use std::fmt;
use tracing::warn;

/// Edge length of every published tile, in pixels.
pub const TILE_SIZE: u32 = 512;

/// Highest zoom level in the grid table.
pub const MAX_ZOOM: u8 = 5;

/// Zoom level used when none is requested.
pub const DEFAULT_ZOOM: u8 = 2;

/// Tiles per row and column for each zoom level.
///
/// Levels 0 and 1 are not 2:1; the assembled raster keeps the grid's true
/// aspect ratio.
const GRID: [(u32, u32); MAX_ZOOM as usize + 1] =
    [(1, 1), (2, 1), (4, 2), (8, 4), (16, 8), (32, 16)];

/// A validated zoom level.
///
/// Construction clamps out-of-table values to [`MAX_ZOOM`], so every
/// `ZoomLevel` can be looked up in the grid table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    /// Creates a zoom level, clamping values above [`MAX_ZOOM`].
    pub fn new(level: u8) -> Self {
        if level > MAX_ZOOM {
            warn!(
                requested = level,
                clamped = MAX_ZOOM,
                "Zoom level outside table, clamping"
            );
        }
        Self(level.min(MAX_ZOOM))
    }

    /// The numeric level as sent to the tile service.
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Tile grid dimensions `(tiles_x, tiles_y)`.
    pub fn grid(self) -> (u32, u32) {
        GRID[self.0 as usize]
    }

    /// Number of tiles in the grid.
    pub fn tile_count(self) -> usize {
        let (x, y) = self.grid();
        (x * y) as usize
    }

    /// Pixel dimensions of the fully assembled raster.
    pub fn raster_size(self) -> (u32, u32) {
        let (x, y) = self.grid();
        (x * TILE_SIZE, y * TILE_SIZE)
    }

    /// Every tile coordinate in row-major order.
    pub fn tiles(self) -> impl Iterator<Item = TileCoord> {
        let (tiles_x, tiles_y) = self.grid();
        (0..tiles_y).flat_map(move |y| (0..tiles_x).map(move |x| TileCoord { x, y }))
    }

    /// All zoom levels from 0 through [`MAX_ZOOM`].
    pub fn all() -> impl Iterator<Item = ZoomLevel> {
        (0..=MAX_ZOOM).map(ZoomLevel)
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(DEFAULT_ZOOM)
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of one tile in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column, left to right.
    pub x: u32,
    /// Row, top to bottom.
    pub y: u32,
}

impl TileCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Top-left pixel of this tile in the assembled raster.
    pub const fn pixel_origin(self) -> (u32, u32) {
        (self.x * TILE_SIZE, self.y * TILE_SIZE)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
