use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use caltrace_core::io::csv_io;
use caltrace_core::peaks::{detect_all, PeakParams};

use super::extract::sibling_csv;
use crate::summary::print_distribution_summary;

#[derive(Args)]
pub struct PeaksArgs {
    /// Processed trace CSV
    pub file: PathBuf,

    /// Minimum absolute ∆F/F height
    #[arg(long, default_value = "0.1")]
    pub min_height: f64,

    /// Minimum prominence
    #[arg(long, default_value = "0.1")]
    pub min_prominence: f64,

    /// Relative height for width measurement (0.5 = half-prominence)
    #[arg(long, default_value = "0.5")]
    pub rel_height: f64,

    /// Output CSV (default: <stem>_peaks.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &PeaksArgs) -> Result<()> {
    let processed = csv_io::read_processed(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let params = PeakParams {
        min_height: args.min_height,
        min_prominence: args.min_prominence,
        rel_height: args.rel_height,
    };
    let (records, distributions) = detect_all(&processed, &params);

    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_csv(&args.file, "_peaks"));
    csv_io::write_peaks(&out_path, &records)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    print_distribution_summary(&distributions, records.len());
    println!("Peaks:       {}", out_path.display());

    Ok(())
}
