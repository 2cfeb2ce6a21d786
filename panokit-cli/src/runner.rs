//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, engine creation, and file operations
//! to reduce duplication across command handlers.

use crate::error::CliError;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::info;
use panokit::config::ConfigFile;
use panokit::engine::{EngineConfig, PanoramaEngine};
use panokit::logging::{init_logging, LoggingGuard};
use panokit::neighbor::{MetadataNeighborResolver, NeighborMode, SelectedResolver, ShiftNeighborResolver};
use panokit::overlap::OverlapLayout;
use panokit::provider::{AsyncReqwestClient, HttpMetadataSource, StreetViewTileSource};
use panokit::raster::{self, Raster};

/// Tile source used by every networked command.
pub type CliTileSource = StreetViewTileSource<AsyncReqwestClient>;

/// Engine over the HTTP tile source.
pub type CliEngine = PanoramaEngine<CliTileSource>;

/// Neighbor resolver picked from configuration.
pub type CliResolver = SelectedResolver<HttpMetadataSource<AsyncReqwestClient>, CliTileSource>;

/// Per-command overrides of the engine settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct EngineOverrides {
    pub face_size: Option<u32>,
    pub layout: Option<OverlapLayout>,
    pub no_align: bool,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// Log records always go to the configured log file; `verbose` also
    /// prints them to stderr at debug level.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&config.logging.file, verbose, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("panokit v{}", panokit::VERSION);
        info!("panokit CLI: {} command", command);
    }

    /// Run a future to completion on a fresh multi-threaded runtime.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output, CliError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;
        Ok(runtime.block_on(future))
    }

    /// Engine settings from the config file with command-line overrides.
    pub fn engine_config(&self, overrides: EngineOverrides) -> EngineConfig {
        let base = EngineConfig::from(&self.config);
        let mut builder = EngineConfig::builder()
            .download(*base.download())
            .overlap_layout(overrides.layout.unwrap_or(base.overlap_layout()))
            .alignment(base.alignment() && !overrides.no_align);
        if let Some(size) = overrides.face_size.or(base.face_size()) {
            builder = builder.face_size(size);
        }
        builder.build()
    }

    /// Create the tile source for the configured endpoint.
    pub fn tile_source(&self) -> Result<CliTileSource, CliError> {
        let client = AsyncReqwestClient::new()?;
        Ok(StreetViewTileSource::with_base_url(
            client,
            self.config.download.tile_url.clone(),
        ))
    }

    /// Create an engine over the configured tile endpoint.
    pub fn create_engine(&self, overrides: EngineOverrides) -> Result<CliEngine, CliError> {
        let source = self.tile_source()?;
        let config = self.engine_config(overrides);
        info!(
            source = %self.config.download.tile_url,
            layout = %config.overlap_layout(),
            alignment = config.alignment(),
            "Engine created"
        );
        Ok(PanoramaEngine::new(source, config))
    }

    /// Build the neighbor resolver for `mode`.
    ///
    /// Metadata neighbors need `download.metadata_url`; without it the
    /// resolver falls back to no neighbors.
    pub fn neighbor_resolver(&self, mode: NeighborMode, engine: &CliEngine) -> Result<CliResolver, CliError> {
        let metadata = match (&self.config.download.metadata_url, mode) {
            (Some(url), NeighborMode::Metadata) => {
                let source = HttpMetadataSource::new(AsyncReqwestClient::new()?, url.clone());
                Some(MetadataNeighborResolver::new(source, engine.assembler().clone()))
            }
            _ => None,
        };
        Ok(SelectedResolver::from_mode(
            mode,
            ShiftNeighborResolver::new(),
            metadata,
        ))
    }

    /// Resolve a relative output path against `output.directory`.
    pub fn output_path(&self, path: &Path) -> PathBuf {
        match &self.config.output.directory {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Save a raster as JPEG at the configured quality.
    pub fn save_raster(&self, path: &Path, raster: &Raster) -> Result<(), CliError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CliError::Image {
                path: parent.to_path_buf(),
                error: image::ImageError::IoError(e),
            })?;
        }

        let quality = self.config.output.jpeg_quality;
        raster::save_jpeg(raster, path, quality).map_err(|error| CliError::Image {
            path: path.to_path_buf(),
            error,
        })?;

        let size_mb = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0) as f64 / 1_048_576.0;
        info!(path = %path.display(), size_mb, "Raster saved");
        println!(
            "✓ Saved: {} ({}×{}, {:.2} MB)",
            path.display(),
            raster.width(),
            raster.height(),
            size_mb
        );
        Ok(())
    }
}

/// Open an image as RGB.
pub fn open_raster(path: &Path) -> Result<Raster, CliError> {
    raster::open_rgb(path).map_err(|error| CliError::Image {
        path: path.to_path_buf(),
        error,
    })
}
