// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "foodcam")]
#[command(about = "Capture a photo and submit it for food analysis")]
#[command(version)]
struct Cli {
    /// Override the analysis server base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Take a photo and save it as JPEG
    Capture {
        /// Camera index to use (from 'foodcam list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Output file path (default: ~/Pictures/foodcam/food_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Take a photo (or load one) and submit it for detection
    Analyze {
        /// Camera index to use (from 'foodcam list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Analyze an image file instead of capturing from a camera
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Ask the server for general advice
    Advice,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=foodcam=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let args = Cli::parse();

    let mut config = foodcam::Config::load();
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }

    match args.command {
        Commands::List => cli::list_devices(),
        Commands::Capture { camera, output } => cli::capture_photo(&config, camera, output),
        Commands::Analyze { camera, input } => cli::analyze(&config, camera, input),
        Commands::Advice => cli::advice(&config),
    }
}
