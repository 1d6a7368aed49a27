mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timeline-ics", version)]
#[command(about = "Turn your location-history timeline into iCalendar files")]
struct Cli {
    /// Config file (default: ~/.config/timeline-ics/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every timeline file under the source directory
    Export {
        /// Semantic Location History directory
        #[arg(long)]
        source: Option<PathBuf>,

        /// Directory the .ics files are written to
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Export only this file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Leave place visits out
        #[arg(long)]
        no_places: bool,

        /// Leave activity segments out
        #[arg(long)]
        no_activities: bool,

        /// Look up place names with the Places API
        #[arg(long, overrides_with = "no_lookup")]
        lookup: bool,

        /// Never call the Places API
        #[arg(long, overrides_with = "lookup")]
        no_lookup: bool,
    },
    /// Show the config file location and effective settings
    Config,
    /// Create a default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Export {
            source,
            dest,
            file,
            no_places,
            no_activities,
            lookup,
            no_lookup,
        } => {
            let options = commands::export::ExportOptions {
                source,
                dest,
                file,
                no_places,
                no_activities,
                lookup: match (lookup, no_lookup) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            commands::export::run(cli.config.as_deref(), options).await
        }
        Commands::Config => commands::config::run(cli.config.as_deref()),
        Commands::Init => commands::init::run(cli.config.as_deref()),
    }
}

/// Logs go to stderr so spinners and summaries on stdout stay readable.
/// `-v` wins over `RUST_LOG`; without it `RUST_LOG` applies, else `warn`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
