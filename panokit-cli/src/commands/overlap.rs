//! Overlap command - expand a local panorama with overlap borders.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use panokit::neighbor::{Neighbor, NeighborHint, ShiftNeighborResolver};
use panokit::overlap::{DisabledAligner, FeatureAligner, OverlapSynthesizer, PatchFeatureAligner};

use super::common::{print_overlap, LayoutArg};
use crate::error::CliError;
use crate::runner::{open_raster, CliRunner};

/// Yaw hint for a neighbor placed on the right.
const RIGHT_YAW: f64 = 90.0;
/// Yaw hint for a neighbor placed on the left.
const LEFT_YAW: f64 = 270.0;

/// Arguments for the overlap command.
pub struct OverlapArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub percent: u32,
    pub layout: Option<LayoutArg>,
    pub left: Option<PathBuf>,
    pub right: Option<PathBuf>,
    pub shift_neighbors: bool,
    pub no_align: bool,
    pub verbose: bool,
}

/// Run the overlap command.
pub fn run(args: OverlapArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("overlap");
    let config = runner.config();

    if args.shift_neighbors && (args.left.is_some() || args.right.is_some()) {
        return Err(CliError::InvalidInput(
            "--shift-neighbors cannot be combined with --left/--right".to_string(),
        ));
    }

    let base = open_raster(&args.input)?;
    let neighbors = if args.shift_neighbors {
        ShiftNeighborResolver::new().synthesize(&base)
    } else {
        let mut neighbors = Vec::new();
        if let Some(path) = &args.left {
            neighbors.push(neighbor_from_file(path, LEFT_YAW)?);
        }
        if let Some(path) = &args.right {
            neighbors.push(neighbor_from_file(path, RIGHT_YAW)?);
        }
        neighbors
    };

    let aligner: Arc<dyn FeatureAligner> = if config.overlap.alignment && !args.no_align {
        Arc::new(PatchFeatureAligner::new())
    } else {
        Arc::new(DisabledAligner)
    };
    let layout = args.layout.map(Into::into).unwrap_or(config.overlap.layout);
    let synthesizer = OverlapSynthesizer::new(aligner).with_layout(layout);

    println!(
        "Expanding {} ({}×{}) by {}% with {} neighbor(s)...",
        args.input.display(),
        base.width(),
        base.height(),
        args.percent,
        neighbors.len()
    );

    let expanded = synthesizer.expand(&base, args.percent, neighbors);
    let output = runner.output_path(&args.output);
    runner.save_raster(&output, &expanded.raster)?;
    print_overlap(&expanded.report);

    Ok(())
}

fn neighbor_from_file(path: &Path, yaw: f64) -> Result<Neighbor, CliError> {
    let raster = open_raster(path)?;
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Neighbor::new(raster, NeighborHint::yaw(yaw)).with_panorama_id(id))
}
