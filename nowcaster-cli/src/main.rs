//! Nowcaster CLI - Command-line interface
//!
//! Queries radar tile servers for the weather at a point and renders
//! previews, using the sources configured in `~/.nowcaster/config.ini`.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nowcaster::config::config_file_path;

use commands::config::ConfigCommands;
use commands::preview::PreviewArgs;
use commands::weather::QueryArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "nowcaster")]
#[command(version = nowcaster::VERSION)]
#[command(about = "Weather nowcasts from radar tile colors", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.nowcaster/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// A geographic point.
#[derive(Debug, Args)]
struct PointArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Count legend colors around a point, per layer
    Sample {
        #[command(flatten)]
        point: PointArgs,

        /// Layer to sample (repeatable; default: all enabled layers)
        #[arg(long = "layer")]
        layers: Vec<String>,

        /// Search radius in pixels (default: from config)
        #[arg(long)]
        radius: Option<u32>,
    },

    /// Classify the exact pixel under a point, per layer
    Point {
        #[command(flatten)]
        point: PointArgs,

        /// Layer to sample (repeatable; default: all layers with point sampling)
        #[arg(long = "layer")]
        layers: Vec<String>,
    },

    /// Point and area results of every enabled layer, grouped by source
    Nowcast {
        #[command(flatten)]
        point: PointArgs,

        /// Search radius in pixels (default: from config)
        #[arg(long)]
        radius: Option<u32>,
    },

    /// Check which weather types occur at or around a point
    Match {
        #[command(flatten)]
        point: PointArgs,

        /// Weather types to look for (matched as substrings of legend labels)
        #[arg(required = true)]
        weather_types: Vec<String>,

        /// Search radius in pixels (default: from config)
        #[arg(long)]
        radius: Option<u32>,
    },

    /// Render a radar layer over the base map to a PNG file
    Preview {
        #[command(flatten)]
        point: PointArgs,

        /// Layer to render ("<source> - <layer>" or a layer name)
        #[arg(long)]
        layer: String,

        /// Output PNG path
        #[arg(long, short, default_value = "preview.png")]
        output: PathBuf,
    },

    /// List configured sources and layers
    Layers,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Config {
        command: ConfigCommands::Path,
    } = cli.command
    {
        let path = cli.config.unwrap_or_else(config_file_path);
        return commands::config::run_path(&path);
    }

    let runner = CliRunner::new(cli.config, cli.debug)?;

    match cli.command {
        Commands::Sample {
            point,
            layers,
            radius,
        } => commands::weather::run_sample(&runner, query(point, layers, radius)),
        Commands::Point { point, layers } => {
            commands::weather::run_point(&runner, query(point, layers, None))
        }
        Commands::Nowcast { point, radius } => {
            commands::weather::run_nowcast(&runner, query(point, Vec::new(), radius))
        }
        Commands::Match {
            point,
            weather_types,
            radius,
        } => commands::weather::run_match(
            &runner,
            query(point, Vec::new(), radius),
            &weather_types,
        ),
        Commands::Preview {
            point,
            layer,
            output,
        } => commands::preview::run(
            &runner,
            PreviewArgs {
                lat: point.lat,
                lon: point.lon,
                layer,
                output,
            },
        ),
        Commands::Layers => commands::layers::run(&runner),
        Commands::Config { command } => match command {
            ConfigCommands::Check => commands::config::run_check(&runner),
            ConfigCommands::Path => commands::config::run_path(runner.config_path()),
        },
    }
}

fn query(point: PointArgs, layers: Vec<String>, radius: Option<u32>) -> QueryArgs {
    QueryArgs {
        lat: point.lat,
        lon: point.lon,
        layers,
        radius,
    }
}
