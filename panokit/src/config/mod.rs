//! Configuration types for panokit components.
//!
//! Two layers live here:
//!
//! - [`ConfigFile`]: the user's `~/.panokit/config.ini`, one settings struct
//!   per INI section, loaded with defaults-overlay semantics.
//! - Typed component configs such as [`DownloadConfig`], built from the file
//!   or directly with builder methods.
//!
//! # Example
//!
//! ```
//! use panokit::config::{ConfigFile, DownloadConfig};
//!
//! let file = ConfigFile::default();
//! let download: DownloadConfig = file.download_config();
//! assert_eq!(download.max_attempts(), 3);
//! ```

mod defaults;
mod download;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use download::DownloadConfig;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    ConfigFile, CubemapSettings, DownloadSettings, LoggingSettings, OutputSettings,
    OverlapSettings,
};
