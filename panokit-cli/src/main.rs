//! panokit CLI - Command-line interface
//!
//! This binary provides a command-line interface to the panokit library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::common::{LayoutArg, NeighborsArg};
use commands::config::ConfigCommands;
use panokit::batch::BatchMode;
use panokit::tile::DEFAULT_ZOOM;

#[derive(Parser)]
#[command(name = "panokit")]
#[command(version = panokit::VERSION)]
#[command(about = "Download, reproject and expand street-level panoramas", long_about = None)]
struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a panorama and save it as an equirectangular JPEG
    Download {
        /// Panorama ID or a URL containing one
        panorama: String,

        /// Zoom level (0-5)
        #[arg(long, default_value_t = DEFAULT_ZOOM)]
        zoom: u8,

        /// Output file path
        #[arg(long, short)]
        output: PathBuf,

        /// Overlap border percentage (0-50, default from config)
        #[arg(long)]
        overlap: Option<u32>,

        /// Overlap layout (default from config)
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,

        /// Neighbor source for side borders (default from config)
        #[arg(long, value_enum)]
        neighbors: Option<NeighborsArg>,

        /// Also write cube faces to this directory
        #[arg(long)]
        cubemap_dir: Option<PathBuf>,

        /// Cube face size in pixels (default: half the panorama height)
        #[arg(long)]
        face_size: Option<u32>,

        /// Blend neighbors without feature alignment
        #[arg(long)]
        no_align: bool,
    },

    /// Split an equirectangular image into six cube faces
    Cubemap {
        /// Equirectangular input image
        #[arg(long, short)]
        input: PathBuf,

        /// Directory for the face images
        #[arg(long)]
        output_dir: PathBuf,

        /// Cube face size in pixels
        #[arg(long)]
        face_size: Option<u32>,
    },

    /// Reassemble cube faces into an equirectangular image
    Equirect {
        /// Directory holding {base}_{face}.jpg files
        #[arg(long)]
        input_dir: PathBuf,

        /// Base name of the face files
        #[arg(long)]
        base: String,

        /// Output file path
        #[arg(long, short)]
        output: PathBuf,

        /// Output width (default: 4 × face size)
        #[arg(long)]
        width: Option<u32>,

        /// Output height (default: 2 × face size)
        #[arg(long)]
        height: Option<u32>,
    },

    /// Expand a panorama with overlap borders
    Overlap {
        /// Input panorama
        #[arg(long, short)]
        input: PathBuf,

        /// Output file path
        #[arg(long, short)]
        output: PathBuf,

        /// Border percentage (0-50)
        #[arg(long)]
        percent: u32,

        /// Overlap layout (default from config)
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,

        /// Neighbor panorama for the left border
        #[arg(long)]
        left: Option<PathBuf>,

        /// Neighbor panorama for the right border
        #[arg(long)]
        right: Option<PathBuf>,

        /// Use shifted copies of the input as neighbors
        #[arg(long)]
        shift_neighbors: bool,

        /// Blend neighbors without feature alignment
        #[arg(long)]
        no_align: bool,
    },

    /// Convert every image in a folder
    Batch {
        /// Folder of input images
        #[arg(long)]
        input_dir: PathBuf,

        /// Folder for the results
        #[arg(long)]
        output_dir: PathBuf,

        /// Conversion direction: to-cubemap or to-equirect
        #[arg(long)]
        mode: BatchMode,

        /// Cube face size in pixels
        #[arg(long)]
        face_size: Option<u32>,
    },

    /// Show which zoom levels a panorama is available at
    Info {
        /// Panorama ID or a URL containing one
        panorama: String,
    },

    /// Print the panorama ID found in a URL or text
    ExtractId {
        /// URL, ID or page snippet
        text: String,
    },

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Download {
            panorama,
            zoom,
            output,
            overlap,
            layout,
            neighbors,
            cubemap_dir,
            face_size,
            no_align,
        } => commands::download::run(commands::download::DownloadArgs {
            panorama,
            zoom,
            output,
            overlap,
            layout,
            neighbors,
            cubemap_dir,
            face_size,
            no_align,
            verbose,
        }),
        Commands::Cubemap {
            input,
            output_dir,
            face_size,
        } => commands::cubemap::run(commands::cubemap::CubemapArgs {
            input,
            output_dir,
            face_size,
            verbose,
        }),
        Commands::Equirect {
            input_dir,
            base,
            output,
            width,
            height,
        } => commands::equirect::run(commands::equirect::EquirectArgs {
            input_dir,
            base,
            output,
            width,
            height,
            verbose,
        }),
        Commands::Overlap {
            input,
            output,
            percent,
            layout,
            left,
            right,
            shift_neighbors,
            no_align,
        } => commands::overlap::run(commands::overlap::OverlapArgs {
            input,
            output,
            percent,
            layout,
            left,
            right,
            shift_neighbors,
            no_align,
            verbose,
        }),
        Commands::Batch {
            input_dir,
            output_dir,
            mode,
            face_size,
        } => commands::batch::run(commands::batch::BatchArgs {
            input_dir,
            output_dir,
            mode,
            face_size,
            verbose,
        }),
        Commands::Info { panorama } => {
            commands::info::run(commands::info::InfoArgs { panorama, verbose })
        }
        Commands::ExtractId { text } => commands::extract_id::run(&text),
        Commands::Config(command) => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
