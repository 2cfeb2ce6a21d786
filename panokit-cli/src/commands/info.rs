//! Info command - probe which zoom levels a panorama is published at.

use std::time::Duration;

use panokit::provider::{probe_zoom_levels, validate_panorama};

use super::common::resolve_panorama_id;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the info command.
pub struct InfoArgs {
    pub panorama: String,
    pub verbose: bool,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("info");

    let panorama_id = resolve_panorama_id(&args.panorama)?;
    let source = runner.tile_source()?;
    let timeout = Duration::from_secs(runner.config().download.timeout);

    println!("Probing panorama {}...", panorama_id);
    let info = runner.block_on(async {
        validate_panorama(&source, &panorama_id, timeout).await?;
        Ok::<_, CliError>(probe_zoom_levels(&source, &panorama_id, timeout).await)
    })??;

    if !info.is_available() {
        println!("No zoom levels responded.");
        return Ok(());
    }

    let levels: Vec<String> = info
        .available_zooms
        .iter()
        .map(|z| z.level().to_string())
        .collect();
    println!("  Zoom levels: {}", levels.join(", "));
    if let (Some(max), Some((width, height))) = (info.max_zoom(), info.estimated_size()) {
        println!("  Max zoom: {} ({}×{} px)", max.level(), width, height);
    }

    Ok(())
}
