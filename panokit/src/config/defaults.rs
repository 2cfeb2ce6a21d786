//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::neighbor::NeighborMode;
use crate::overlap::OverlapLayout;
use crate::provider::DEFAULT_TILE_URL;

// =============================================================================
// [download]
// =============================================================================

/// Per-attempt tile request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Attempts per tile before it is substituted with a placeholder.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound accepted for `max_attempts`.
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Fixed delay between attempts of the same tile, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Tile requests in flight at once.
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 8;

/// Minimum parallel downloads.
pub const MIN_PARALLEL_DOWNLOADS: usize = 1;

/// Maximum parallel downloads. The tile endpoint throttles aggressive clients.
pub const MAX_PARALLEL_DOWNLOADS: usize = 64;

// =============================================================================
// [cubemap] / [overlap] / [output]
// =============================================================================

/// Face edge length; 0 means half the source height.
pub const DEFAULT_FACE_SIZE: u32 = 0;

/// Overlap percentage; 0 disables expansion.
pub const DEFAULT_OVERLAP_PERCENT: u32 = 0;

/// Highest overlap percentage accepted.
pub const MAX_OVERLAP_PERCENT: u32 = crate::overlap::MAX_OVERLAP_PERCENT;

/// JPEG quality for saved rasters.
pub const DEFAULT_JPEG_QUALITY: u8 = crate::raster::DEFAULT_JPEG_QUALITY;

/// Default log file location (~/.panokit/panokit.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join("panokit.log")
}

/// Clamps the download parallelism to the valid range and logs when it does.
pub(super) fn clamp_parallel_downloads(value: usize) -> usize {
    if value < MIN_PARALLEL_DOWNLOADS || value > MAX_PARALLEL_DOWNLOADS {
        let clamped = value.clamp(MIN_PARALLEL_DOWNLOADS, MAX_PARALLEL_DOWNLOADS);
        tracing::warn!(
            requested = value,
            min = MIN_PARALLEL_DOWNLOADS,
            max = MAX_PARALLEL_DOWNLOADS,
            "download.parallel outside valid range, clamping to {}",
            clamped
        );
        return clamped;
    }
    value
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            download: DownloadSettings {
                timeout: DEFAULT_TIMEOUT_SECS,
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
                parallel: DEFAULT_PARALLEL_DOWNLOADS,
                tile_url: DEFAULT_TILE_URL.to_string(),
                metadata_url: None,
            },
            cubemap: CubemapSettings {
                face_size: DEFAULT_FACE_SIZE,
            },
            overlap: OverlapSettings {
                percent: DEFAULT_OVERLAP_PERCENT,
                layout: OverlapLayout::default(),
                neighbors: NeighborMode::default(),
                alignment: true,
            },
            output: OutputSettings {
                jpeg_quality: DEFAULT_JPEG_QUALITY,
                directory: None,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
