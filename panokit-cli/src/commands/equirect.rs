//! Equirect command - reassemble cube faces into an equirectangular image.

use std::path::PathBuf;

use panokit::batch::{load_cubemap, DEFAULT_EQUIRECT_SIZE};
use panokit::cubemap::CubemapConverter;

use super::common::print_projection;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the equirect command.
pub struct EquirectArgs {
    pub input_dir: PathBuf,
    pub base: String,
    pub output: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub verbose: bool,
}

/// Run the equirect command.
pub fn run(args: EquirectArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("equirect");

    let cubemap = load_cubemap(&args.input_dir, &args.base)?;
    let (width, height) = output_size(cubemap.face_size(), args.width, args.height);

    println!(
        "Reassembling {} face(s) of '{}' into {}×{}...",
        cubemap.len(),
        args.base,
        width,
        height
    );
    if !cubemap.is_complete() {
        println!("Warning: missing faces will be filled with gray");
    }

    let projected = CubemapConverter::new().to_equirect(&cubemap, width, height);
    let output = runner.output_path(&args.output);
    runner.save_raster(&output, &projected.raster)?;
    print_projection(&projected.report);

    Ok(())
}

/// Output size: explicit values win, otherwise 4×2 faces.
///
/// A single explicit dimension implies the other at 2:1.
fn output_size(face_size: Option<u32>, width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    match (width, height) {
        (Some(w), Some(h)) => (w.max(1), h.max(1)),
        (Some(w), None) => (w.max(2), (w / 2).max(1)),
        (None, Some(h)) => (h.max(1) * 2, h.max(1)),
        (None, None) => face_size
            .map(|s| (s * 4, s * 2))
            .unwrap_or(DEFAULT_EQUIRECT_SIZE),
    }
}
