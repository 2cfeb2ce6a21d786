//! Reading and writing `~/.panokit/config.ini`.
//!
//! A missing file is not an error: every setting has a built-in value, so a
//! fresh install runs without ever writing the file. `panokit config init`
//! is what materializes it.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;

/// Name of the per-user directory under `$HOME`.
const CONFIG_DIR_NAME: &str = ".panokit";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not valid INI.
    #[error("Cannot parse config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Cannot write config file: {0}")]
    WriteError(String),

    /// A key parsed but its value is out of range or malformed.
    #[error("Bad value for {section}.{key}: '{value}' ({reason})")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Cannot create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Reads the user's config, falling back to built-in values.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Reads `path`; a nonexistent file yields [`ConfigFile::default`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Writes every setting to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Writes the built-in values unless a config file is already present.
    /// An existing file is left untouched.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }
}

/// `~/.panokit`, or `./.panokit` when no home directory is known.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.download.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.download.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(config.download.metadata_url.is_none());
        assert_eq!(config.overlap.percent, 0);
        assert_eq!(config.output.jpeg_quality, 95);
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_then_load_preserves_values() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.download.parallel = 4;
        config.overlap.percent = 25;
        config.download.metadata_url = Some("http://meta/{panoid}".to_string());
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded.download.parallel, 4);
        assert_eq!(loaded.overlap.percent, 25);
        assert_eq!(
            loaded.download.metadata_url.as_deref(),
            Some("http://meta/{panoid}")
        );
    }

    #[test]
    fn test_malformed_value_names_the_key() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, "[overlap]\npercent = lots\n").unwrap();

        let err = ConfigFile::load_from(&config_path).unwrap_err();
        assert!(err.to_string().contains("overlap.percent"), "{}", err);
    }

    #[test]
    fn test_config_file_path() {
        assert!(config_file_path().ends_with(".panokit/config.ini"));
    }
}
