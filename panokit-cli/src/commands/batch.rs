//! Batch command - convert every image in a folder.

use std::path::PathBuf;

use panokit::batch::{BatchConverter, BatchMode};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the batch command.
pub struct BatchArgs {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mode: BatchMode,
    pub face_size: Option<u32>,
    pub verbose: bool,
}

/// Run the batch command.
pub fn run(args: BatchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("batch");
    let config = runner.config();

    let face_size = args
        .face_size
        .or(Some(config.cubemap.face_size).filter(|&s| s > 0));
    let converter = BatchConverter::new()
        .with_face_size(face_size)
        .with_jpeg_quality(config.output.jpeg_quality);

    println!(
        "Batch {}: {} -> {}",
        args.mode,
        args.input_dir.display(),
        args.output_dir.display()
    );

    let output_dir = runner.output_path(&args.output_dir);
    let report = converter.run(args.mode, &args.input_dir, &output_dir, |index, total, path| {
        println!("[{}/{}] {}", index + 1, total, path.display());
    })?;

    println!();
    println!("{}", report);
    for (path, reason) in &report.failures {
        println!("  ✗ {}: {}", path.display(), reason);
    }
    if report.projection_fallbacks > 0 {
        println!("  Gray fallbacks: {}", report.projection_fallbacks);
    }

    Ok(())
}
