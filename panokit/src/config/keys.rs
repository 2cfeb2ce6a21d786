//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by dotted key name (e.g. `overlap.percent`).

use std::str::FromStr;
use thiserror::Error;

use super::defaults::clamp_parallel_downloads;
use super::file::ConfigFileError;
use super::parser::{
    expand_tilde, parse_bool, parse_jpeg_quality, parse_max_attempts, parse_overlap_percent,
    parse_timeout, parse_url,
};
use super::settings::ConfigFile;
use super::writer::path_to_string;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

impl From<ConfigFileError> for ConfigKeyError {
    fn from(err: ConfigFileError) -> Self {
        match err {
            ConfigFileError::InvalidValue {
                section,
                key,
                reason,
                ..
            } => ConfigKeyError::ValidationFailed {
                key: format!("{section}.{key}"),
                reason,
            },
            other => ConfigKeyError::ValidationFailed {
                key: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DownloadTimeout,
    DownloadMaxAttempts,
    DownloadRetryDelayMs,
    DownloadParallel,
    DownloadTileUrl,
    DownloadMetadataUrl,
    CubemapFaceSize,
    OverlapPercent,
    OverlapLayout,
    OverlapNeighbors,
    OverlapAlignment,
    OutputJpegQuality,
    OutputDirectory,
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Every key, in config file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::DownloadTimeout,
            ConfigKey::DownloadMaxAttempts,
            ConfigKey::DownloadRetryDelayMs,
            ConfigKey::DownloadParallel,
            ConfigKey::DownloadTileUrl,
            ConfigKey::DownloadMetadataUrl,
            ConfigKey::CubemapFaceSize,
            ConfigKey::OverlapPercent,
            ConfigKey::OverlapLayout,
            ConfigKey::OverlapNeighbors,
            ConfigKey::OverlapAlignment,
            ConfigKey::OutputJpegQuality,
            ConfigKey::OutputDirectory,
            ConfigKey::LoggingFile,
        ]
    }

    /// Get the canonical key name (e.g., "overlap.percent").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::DownloadTimeout => "download.timeout",
            ConfigKey::DownloadMaxAttempts => "download.max_attempts",
            ConfigKey::DownloadRetryDelayMs => "download.retry_delay_ms",
            ConfigKey::DownloadParallel => "download.parallel",
            ConfigKey::DownloadTileUrl => "download.tile_url",
            ConfigKey::DownloadMetadataUrl => "download.metadata_url",
            ConfigKey::CubemapFaceSize => "cubemap.face_size",
            ConfigKey::OverlapPercent => "overlap.percent",
            ConfigKey::OverlapLayout => "overlap.layout",
            ConfigKey::OverlapNeighbors => "overlap.neighbors",
            ConfigKey::OverlapAlignment => "overlap.alignment",
            ConfigKey::OutputJpegQuality => "output.jpeg_quality",
            ConfigKey::OutputDirectory => "output.directory",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "overlap").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::DownloadTimeout => config.download.timeout.to_string(),
            ConfigKey::DownloadMaxAttempts => config.download.max_attempts.to_string(),
            ConfigKey::DownloadRetryDelayMs => config.download.retry_delay_ms.to_string(),
            ConfigKey::DownloadParallel => config.download.parallel.to_string(),
            ConfigKey::DownloadTileUrl => config.download.tile_url.clone(),
            ConfigKey::DownloadMetadataUrl => {
                config.download.metadata_url.clone().unwrap_or_default()
            }
            ConfigKey::CubemapFaceSize => config.cubemap.face_size.to_string(),
            ConfigKey::OverlapPercent => config.overlap.percent.to_string(),
            ConfigKey::OverlapLayout => config.overlap.layout.as_str().to_string(),
            ConfigKey::OverlapNeighbors => config.overlap.neighbors.as_str().to_string(),
            ConfigKey::OverlapAlignment => config.overlap.alignment.to_string(),
            ConfigKey::OutputJpegQuality => config.output.jpeg_quality.to_string(),
            ConfigKey::OutputDirectory => config
                .output
                .directory
                .as_ref()
                .map(|p| path_to_string(p))
                .unwrap_or_default(),
            ConfigKey::LoggingFile => path_to_string(&config.logging.file),
        }
    }

    /// Validate and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        let failed = |reason: &str| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::DownloadTimeout => config.download.timeout = parse_timeout(value)?,
            ConfigKey::DownloadMaxAttempts => {
                config.download.max_attempts = parse_max_attempts(value)?
            }
            ConfigKey::DownloadRetryDelayMs => {
                config.download.retry_delay_ms = value
                    .parse()
                    .map_err(|_| failed("must be a non-negative integer (milliseconds)"))?
            }
            ConfigKey::DownloadParallel => {
                let parallel: usize = value
                    .parse()
                    .map_err(|_| failed("must be a positive integer"))?;
                config.download.parallel = clamp_parallel_downloads(parallel);
            }
            ConfigKey::DownloadTileUrl => {
                config.download.tile_url = parse_url("download", "tile_url", value)?
            }
            ConfigKey::DownloadMetadataUrl => {
                config.download.metadata_url = if value.is_empty() {
                    None
                } else {
                    Some(parse_url("download", "metadata_url", value)?)
                }
            }
            ConfigKey::CubemapFaceSize => {
                config.cubemap.face_size = value
                    .parse()
                    .map_err(|_| failed("must be a non-negative integer"))?
            }
            ConfigKey::OverlapPercent => config.overlap.percent = parse_overlap_percent(value)?,
            ConfigKey::OverlapLayout => {
                config.overlap.layout = value
                    .parse()
                    .map_err(|_| failed("must be 'symmetric' or 'legacy'"))?
            }
            ConfigKey::OverlapNeighbors => {
                config.overlap.neighbors = value
                    .parse()
                    .map_err(|_| failed("must be one of: none, shift, metadata"))?
            }
            ConfigKey::OverlapAlignment => config.overlap.alignment = parse_bool(value),
            ConfigKey::OutputJpegQuality => {
                config.output.jpeg_quality = parse_jpeg_quality(value)?
            }
            ConfigKey::OutputDirectory => {
                config.output.directory = if value.is_empty() {
                    None
                } else {
                    Some(expand_tilde(value))
                }
            }
            ConfigKey::LoggingFile => {
                if value.is_empty() {
                    return Err(failed("must not be empty"));
                }
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }
}
