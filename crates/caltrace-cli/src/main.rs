mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "caltrace", about = "Calcium-imaging trace extraction and analysis")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show recording and mask metadata
    Info(commands::info::InfoArgs),
    /// Extract per-cell raw traces from a recording and its mask
    Extract(commands::extract::ExtractArgs),
    /// Normalize raw traces to smoothed ∆F/F
    Process(commands::process::ProcessArgs),
    /// Detect transients in processed traces
    Peaks(commands::peaks::PeaksArgs),
    /// Run the full extract/normalize/peaks pipeline
    Run(commands::pipeline::RunArgs),
    /// Print or save a default pipeline config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Extract(args) => commands::extract::run(args),
        Commands::Process(args) => commands::process::run(args),
        Commands::Peaks(args) => commands::peaks::run(args),
        Commands::Run(args) => commands::pipeline::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
