//! Download command - assemble a panorama, optionally expand it and export
//! cube faces.

use std::io::Write;
use std::path::PathBuf;

use panokit::assembly::AssemblyProgress;
use panokit::batch::save_cubemap;
use panokit::diagnostics::Diagnostics;
use panokit::neighbor::{NeighborMode, NoNeighbors};
use panokit::tile::ZoomLevel;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{
    print_assembly, print_overlap, print_projection, progress_line, resolve_panorama_id,
    LayoutArg, NeighborsArg,
};
use crate::error::CliError;
use crate::runner::{CliRunner, EngineOverrides};

/// Arguments for the download command.
pub struct DownloadArgs {
    pub panorama: String,
    pub zoom: u8,
    pub output: PathBuf,
    pub overlap: Option<u32>,
    pub layout: Option<LayoutArg>,
    pub neighbors: Option<NeighborsArg>,
    pub cubemap_dir: Option<PathBuf>,
    pub face_size: Option<u32>,
    pub no_align: bool,
    pub verbose: bool,
}

/// Run the download command.
pub fn run(args: DownloadArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("download");
    let config = runner.config();

    let panorama_id = resolve_panorama_id(&args.panorama)?;
    let zoom = ZoomLevel::new(args.zoom);
    let percent = args.overlap.unwrap_or(config.overlap.percent);
    let mode = args
        .neighbors
        .map(NeighborMode::from)
        .unwrap_or(config.overlap.neighbors);

    let engine = runner.create_engine(EngineOverrides {
        face_size: args.face_size,
        layout: args.layout.map(Into::into),
        no_align: args.no_align,
    })?;
    let resolver = runner.neighbor_resolver(mode, &engine)?;

    let (tiles_x, tiles_y) = zoom.grid();
    let (width, height) = zoom.raster_size();
    println!("Downloading panorama:");
    println!("  ID: {}", panorama_id);
    println!("  Zoom: {} ({}×{} tiles, {}×{} px)", zoom.level(), tiles_x, tiles_y, width, height);
    if percent > 0 {
        println!("  Overlap: {}% ({} neighbors)", percent, mode);
    }
    println!();

    let cancellation = CancellationToken::new();
    let handler_token = cancellation.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let interactive = atty::is(atty::Stream::Stdout);
    let progress = move |update: AssemblyProgress| {
        if interactive {
            print!("\r{}", progress_line(&update));
            let _ = std::io::stdout().flush();
        } else if update.completed == update.total {
            println!("{}", progress_line(&update));
        }
    };

    let (raster, diagnostics, base) = runner.block_on(async {
        let downloaded = engine
            .download(&panorama_id, zoom, 0, &NoNeighbors, &progress, cancellation.clone())
            .await?;
        if interactive {
            println!();
        }

        let mut diagnostics = downloaded.diagnostics;
        if percent == 0 {
            return Ok::<_, CliError>((downloaded.raster, diagnostics, None));
        }

        let base = downloaded.raster;
        let expanded = engine
            .expand_with(&resolver, &panorama_id, zoom, base.clone(), percent, cancellation)
            .await?;
        diagnostics.overlap = Some(expanded.report);
        Ok((expanded.raster, diagnostics, Some(base)))
    })??;

    let output = runner.output_path(&args.output);
    runner.save_raster(&output, &raster)?;

    let mut diagnostics = diagnostics;
    if let Some(dir) = &args.cubemap_dir {
        let equirect = base.as_ref().unwrap_or(&raster);
        let projected = engine.to_cubemap(equirect, args.face_size);
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| panorama_id.clone());
        let dir = runner.output_path(dir);
        let written = save_cubemap(&projected.cubemap, &dir, &stem, config.output.jpeg_quality)?;
        println!(
            "✓ Saved {} faces of {}px to {}",
            written.len(),
            projected.face_size,
            dir.display()
        );
        diagnostics.projection = Some(projected.report);
    }

    println!();
    print_diagnostics(&diagnostics);
    info!(clean = diagnostics.is_clean(), "Download command complete");

    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if let Some(assembly) = &diagnostics.assembly {
        print_assembly(assembly);
    }
    if let Some(overlap) = &diagnostics.overlap {
        print_overlap(overlap);
    }
    if let Some(projection) = &diagnostics.projection {
        print_projection(projection);
    }
}
