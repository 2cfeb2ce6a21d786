//! Engine API exposed to callers.
//!
//! [`PanoramaEngine`] wires the tile assembler, cubemap converter and overlap
//! synthesizer together behind four operations: `assemble`, `to_cubemap`,
//! `to_equirect` and `expand`. Each returns its raster together with a
//! diagnostics record.
//!
//! # Example
//!
//! ```ignore
//! use panokit::engine::{EngineConfig, PanoramaEngine};
//! use panokit::provider::{AsyncReqwestClient, StreetViewTileSource};
//! use panokit::tile::ZoomLevel;
//!
//! let source = StreetViewTileSource::new(AsyncReqwestClient::new()?);
//! let engine = PanoramaEngine::new(source, EngineConfig::default());
//!
//! let assembled = engine.assemble("CAoSLEFGMVFpcE5hYmNERUYxMjM0", ZoomLevel::new(3)).await?;
//! let faces = engine.to_cubemap(&assembled.raster, None);
//! ```

mod config;
mod error;
mod facade;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::EngineError;
pub use facade::{DownloadOutcome, PanoramaEngine};
