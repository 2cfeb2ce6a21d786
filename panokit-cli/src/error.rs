//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;
use panokit::assembly::AssemblyError;
use panokit::batch::BatchError;
use panokit::config::ConfigFileError;
use panokit::engine::EngineError;
use panokit::provider::ProviderError;

/// Exit code used when the user interrupts a download.
const EXIT_INTERRUPTED: i32 = 130;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Bad command-line input
    InvalidInput(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Panorama service error outside assembly
    Provider(ProviderError),
    /// Assembly or worker failure
    Engine(EngineError),
    /// Folder conversion could not start
    Batch(BatchError),
    /// Failed to read or write an image
    Image { path: PathBuf, error: image::ImageError },
    /// Interrupted with Ctrl-C
    Cancelled,
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Engine(EngineError::Assembly(AssemblyError::Transport { .. }))
            | CliError::Provider(ProviderError::Transport(_)) => {
                eprintln!();
                eprintln!("The tile endpoint could not be reached. Check that:");
                eprintln!("  1. You are online");
                eprintln!("  2. download.tile_url in config.ini points to a reachable server");
            }
            CliError::Provider(ProviderError::InvalidPanoramaId(_)) => {
                eprintln!();
                eprintln!("Pass a panorama ID or a Street View URL that contains one.");
                eprintln!("Use 'panokit extract-id <URL>' to check what is detected.");
            }
            CliError::Cancelled => process::exit(EXIT_INTERRUPTED),
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidInput(msg) => write!(f, "{}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Provider(e) => write!(f, "Panorama service error: {}", e),
            CliError::Engine(e) => write!(f, "Download failed: {}", e),
            CliError::Batch(e) => write!(f, "Batch conversion failed: {}", e),
            CliError::Image { path, error } => {
                write!(f, "Image error on '{}': {}", path.display(), error)
            }
            CliError::Cancelled => write!(f, "Interrupted"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::Provider(e) => Some(e),
            CliError::Engine(e) => Some(e),
            CliError::Batch(e) => Some(e),
            CliError::Image { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        if e.is_cancelled() {
            CliError::Cancelled
        } else {
            CliError::Engine(e)
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<BatchError> for CliError {
    fn from(e: BatchError) -> Self {
        CliError::Batch(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}
