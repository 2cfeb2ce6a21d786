//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use super::download::DownloadConfig;
use crate::neighbor::NeighborMode;
use crate::overlap::OverlapLayout;
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Tile download settings
    pub download: DownloadSettings,
    /// Cubemap conversion settings
    pub cubemap: CubemapSettings,
    /// Overlap synthesis settings
    pub overlap: OverlapSettings,
    /// Output settings
    pub output: OutputSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Download configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Per-attempt timeout in seconds.
    pub timeout: u64,
    /// Attempts per tile.
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
    /// Concurrent tile requests.
    pub parallel: usize,
    /// Tile endpoint base URL.
    pub tile_url: String,
    /// Metadata endpoint template; `None` disables metadata neighbors.
    pub metadata_url: Option<String>,
}

/// Cubemap configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapSettings {
    /// Face edge length; 0 means half the source height.
    pub face_size: u32,
}

/// Overlap configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapSettings {
    /// Border percentage, 0..=50.
    pub percent: u32,
    pub layout: OverlapLayout,
    /// Where neighbor panoramas come from.
    pub neighbors: NeighborMode,
    /// Feature-align neighbor strips before blending.
    pub alignment: bool,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub jpeg_quality: u8,
    /// Default directory for written files; `None` means the working directory.
    pub directory: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}

impl ConfigFile {
    /// Builds the assembler's download configuration from the `[download]` section.
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig::new()
            .with_timeout(Duration::from_secs(self.download.timeout))
            .with_max_attempts(self.download.max_attempts)
            .with_retry_delay(Duration::from_millis(self.download.retry_delay_ms))
            .with_parallel_downloads(self.download.parallel)
    }

    /// Face size to use for a source of the given height.
    pub fn face_size_for(&self, source_height: u32) -> u32 {
        if self.cubemap.face_size == 0 {
            (source_height / 2).max(1)
        } else {
            self.cubemap.face_size
        }
    }
}
