//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use panokit::assembly::AssemblyProgress;
use panokit::diagnostics::{AssemblyReport, OverlapReport, ProjectionReport};
use panokit::neighbor::NeighborMode;
use panokit::overlap::OverlapLayout;
use panokit::panoid;

use crate::error::CliError;

/// Overlap layout selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum LayoutArg {
    /// Equal borders on all sides; 2:1 inputs stay 2:1
    Symmetric,
    /// Width grows by p%, height by p/2 %
    Legacy,
}

impl From<LayoutArg> for OverlapLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Symmetric => OverlapLayout::Symmetric,
            LayoutArg::Legacy => OverlapLayout::Legacy,
        }
    }
}

/// Neighbor source selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum NeighborsArg {
    /// Wrap-around borders only
    None,
    /// Shifted copies of the panorama itself
    Shift,
    /// Linked panoramas from the metadata endpoint
    Metadata,
}

impl From<NeighborsArg> for NeighborMode {
    fn from(arg: NeighborsArg) -> Self {
        match arg {
            NeighborsArg::None => NeighborMode::None,
            NeighborsArg::Shift => NeighborMode::Shift,
            NeighborsArg::Metadata => NeighborMode::Metadata,
        }
    }
}

/// Find the panorama ID in an ID, URL or page snippet.
pub fn resolve_panorama_id(input: &str) -> Result<String, CliError> {
    panoid::extract_panorama_id(input.trim()).ok_or_else(|| {
        CliError::InvalidInput(format!("No panorama ID found in '{}'", input))
    })
}

/// Single-line progress text for a tile update.
pub fn progress_line(progress: &AssemblyProgress) -> String {
    format!(
        "Tiles: {}/{} ({:.0}%)",
        progress.completed,
        progress.total,
        progress.fraction() * 100.0
    )
}

/// Print an assembly report.
pub fn print_assembly(report: &AssemblyReport) {
    println!("Assembly:");
    println!("  Panorama: {}", report.panorama_id);
    println!("  Zoom: {}", report.zoom.level());
    println!("  Tiles: {}/{} fetched", report.tiles_fetched(), report.tiles_total);
    if report.tile_failures > 0 {
        println!(
            "  Placeholders: {} (status {}, transport {}, timeout {}, decode {})",
            report.tile_failures,
            report.failures.status,
            report.failures.transport,
            report.failures.timeout,
            report.failures.decode
        );
    }
    if report.retries > 0 {
        println!("  Retries: {}", report.retries);
    }
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
}

/// Print an overlap report.
pub fn print_overlap(report: &OverlapReport) {
    println!("Overlap:");
    println!("  {}", report);
}

/// Print a projection report when anything fell back to gray.
pub fn print_projection(report: &ProjectionReport) {
    if report.projection_fallbacks == 0 {
        return;
    }
    let faces: Vec<String> = report.fallback_faces.iter().map(|f| f.to_string()).collect();
    println!(
        "Projection: {} fallback(s), gray faces: {}",
        report.projection_fallbacks,
        faces.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use panokit::tile::TileCoord;

    #[test]
    fn test_layout_conversion() {
        assert_eq!(OverlapLayout::from(LayoutArg::Legacy), OverlapLayout::Legacy);
        assert_eq!(OverlapLayout::from(LayoutArg::Symmetric), OverlapLayout::Symmetric);
    }

    #[test]
    fn test_neighbors_conversion() {
        assert_eq!(NeighborMode::from(NeighborsArg::Shift), NeighborMode::Shift);
        assert_eq!(NeighborMode::from(NeighborsArg::None), NeighborMode::None);
    }

    #[test]
    fn test_resolve_panorama_id_from_url() {
        let url = "https://www.google.com/maps/@48.85,2.29,3a,75y,90t/data=!3m6!1e1!3m4!1sAF1QipN_abcdefghijklmnop!2e0";
        assert_eq!(resolve_panorama_id(url).unwrap(), "AF1QipN_abcdefghijklmnop");
    }

    #[test]
    fn test_resolve_panorama_id_rejects_garbage() {
        assert!(matches!(
            resolve_panorama_id("hello"),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_progress_line() {
        let progress = AssemblyProgress {
            completed: 4,
            total: 8,
            tile: TileCoord::new(1, 1),
            succeeded: true,
        };
        assert_eq!(progress_line(&progress), "Tiles: 4/8 (50%)");
    }
}
