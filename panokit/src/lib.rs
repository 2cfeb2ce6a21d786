//! panokit - street-level panorama assembly and projection
//!
//! This library downloads panorama tiles, assembles them into an
//! equirectangular image, converts between equirectangular and cubemap
//! projections, and expands panoramas with overlap borders built from
//! wrap-around content or neighboring panoramas.
//!
//! # High-Level API
//!
//! The [`engine`] module wires the pieces together:
//!
//! ```ignore
//! use panokit::engine::{EngineConfig, PanoramaEngine};
//! use panokit::provider::{AsyncReqwestClient, StreetViewTileSource};
//! use panokit::tile::ZoomLevel;
//!
//! let source = StreetViewTileSource::new(AsyncReqwestClient::new()?);
//! let engine = PanoramaEngine::new(source, EngineConfig::default());
//!
//! let assembled = engine.assemble(panorama_id, ZoomLevel::new(3)).await?;
//! let expanded = engine.expand(&assembled.raster, 30, Vec::new());
//! ```

pub mod assembly;
pub mod batch;
pub mod config;
pub mod cubemap;
pub mod diagnostics;
pub mod engine;
pub mod logging;
pub mod neighbor;
pub mod overlap;
pub mod panoid;
pub mod projection;
pub mod provider;
pub mod raster;
pub mod tile;

/// Version of the panokit library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
