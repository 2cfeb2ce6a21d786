//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`batch`] - Folder conversion in either direction
//! - [`config`] - Configuration management (path, init, list, get, set)
//! - [`cubemap`] - Equirectangular image to six faces
//! - [`download`] - Panorama download with optional overlap and faces
//! - [`equirect`] - Six faces back to an equirectangular image
//! - [`extract_id`] - Panorama ID detection
//! - [`info`] - Zoom level probing
//! - [`overlap`] - Overlap expansion of a local image

pub mod batch;
pub mod common;
pub mod config;
pub mod cubemap;
pub mod download;
pub mod equirect;
pub mod extract_id;
pub mod info;
pub mod overlap;
