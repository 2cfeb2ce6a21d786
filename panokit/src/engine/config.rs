//! Engine configuration.

use crate::config::{ConfigFile, DownloadConfig};
use crate::overlap::OverlapLayout;

/// Settings for a [`PanoramaEngine`](super::PanoramaEngine).
///
/// # Example
///
/// ```
/// use panokit::engine::EngineConfig;
/// use panokit::overlap::OverlapLayout;
///
/// let config = EngineConfig::builder()
///     .face_size(512)
///     .overlap_layout(OverlapLayout::Legacy)
///     .alignment(false)
///     .build();
///
/// assert_eq!(config.face_size(), Some(512));
/// assert!(!config.alignment());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    download: DownloadConfig,
    /// Cube face edge; `None` means half the source height.
    face_size: Option<u32>,
    overlap_layout: OverlapLayout,
    /// Use the feature aligner for neighbor strips.
    alignment: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            download: DownloadConfig::default(),
            face_size: None,
            overlap_layout: OverlapLayout::default(),
            alignment: true,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn download(&self) -> &DownloadConfig {
        &self.download
    }

    pub fn face_size(&self) -> Option<u32> {
        self.face_size
    }

    pub fn overlap_layout(&self) -> OverlapLayout {
        self.overlap_layout
    }

    pub fn alignment(&self) -> bool {
        self.alignment
    }
}

impl From<&ConfigFile> for EngineConfig {
    fn from(config: &ConfigFile) -> Self {
        Self {
            download: config.download_config(),
            face_size: Some(config.cubemap.face_size).filter(|&s| s > 0),
            overlap_layout: config.overlap.layout,
            alignment: config.overlap.alignment,
        }
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    download: Option<DownloadConfig>,
    face_size: Option<u32>,
    overlap_layout: Option<OverlapLayout>,
    alignment: Option<bool>,
}

impl EngineConfigBuilder {
    pub fn download(mut self, config: DownloadConfig) -> Self {
        self.download = Some(config);
        self
    }

    /// Fixed face size; 0 restores the default.
    pub fn face_size(mut self, size: u32) -> Self {
        self.face_size = Some(size);
        self
    }

    pub fn overlap_layout(mut self, layout: OverlapLayout) -> Self {
        self.overlap_layout = Some(layout);
        self
    }

    pub fn alignment(mut self, enabled: bool) -> Self {
        self.alignment = Some(enabled);
        self
    }

    pub fn build(self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            download: self.download.unwrap_or(defaults.download),
            face_size: self.face_size.filter(|&s| s > 0),
            overlap_layout: self.overlap_layout.unwrap_or(defaults.overlap_layout),
            alignment: self.alignment.unwrap_or(defaults.alignment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::builder().build();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.face_size(), None);
        assert!(config.alignment());
    }

    #[test]
    fn test_zero_face_size_means_default() {
        assert_eq!(EngineConfig::builder().face_size(0).build().face_size(), None);
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.download.max_attempts = 2;
        file.download.timeout = 3;
        file.cubemap.face_size = 700;
        file.overlap.layout = OverlapLayout::Legacy;
        file.overlap.alignment = false;

        let config = EngineConfig::from(&file);
        assert_eq!(config.download().max_attempts(), 2);
        assert_eq!(config.download().timeout(), Duration::from_secs(3));
        assert_eq!(config.face_size(), Some(700));
        assert_eq!(config.overlap_layout(), OverlapLayout::Legacy);
        assert!(!config.alignment());
    }
}
