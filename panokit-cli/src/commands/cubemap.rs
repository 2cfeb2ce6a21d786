//! Cubemap command - split an equirectangular image into six faces.

use std::path::PathBuf;

use panokit::batch::save_cubemap;
use panokit::cubemap::CubemapConverter;

use super::common::print_projection;
use crate::error::CliError;
use crate::runner::{open_raster, CliRunner};

/// Arguments for the cubemap command.
pub struct CubemapArgs {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub face_size: Option<u32>,
    pub verbose: bool,
}

/// Run the cubemap command.
pub fn run(args: CubemapArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("cubemap");
    let config = runner.config();

    let equirect = open_raster(&args.input)?;
    let face_size = args
        .face_size
        .unwrap_or_else(|| config.face_size_for(equirect.height()));

    println!(
        "Converting {} ({}×{}) to {}px faces...",
        args.input.display(),
        equirect.width(),
        equirect.height(),
        face_size
    );

    let projected = CubemapConverter::new().to_cubemap(&equirect, Some(face_size));
    let stem = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "panorama".to_string());
    let output_dir = runner.output_path(&args.output_dir);
    let written = save_cubemap(
        &projected.cubemap,
        &output_dir,
        &stem,
        config.output.jpeg_quality,
    )?;

    for path in &written {
        println!("✓ Saved: {}", path.display());
    }
    print_projection(&projected.report);

    Ok(())
}
