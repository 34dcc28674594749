use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use caltrace_core::io::csv_io;
use caltrace_core::normalize::{process_traces, NormalizeParams};
use caltrace_core::trace::Quantity;

use super::extract::sibling_csv;

#[derive(Clone, Copy, ValueEnum)]
pub enum QuantityArg {
    Mean,
    Max,
    Top10,
}

impl From<QuantityArg> for Quantity {
    fn from(arg: QuantityArg) -> Self {
        match arg {
            QuantityArg::Mean => Quantity::Mean,
            QuantityArg::Max => Quantity::Max,
            QuantityArg::Top10 => Quantity::Top10,
        }
    }
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Raw trace CSV (cell_id,frame,mean,max,top10)
    pub file: PathBuf,

    /// Background CSV (default: <stem>_bg.csv)
    #[arg(long)]
    pub bg: Option<PathBuf>,

    /// Aggregate quantity to normalize
    #[arg(long, value_enum, default_value = "top10")]
    pub quantity: QuantityArg,

    /// Rolling baseline window (odd)
    #[arg(long, default_value = "11")]
    pub window_size: usize,

    /// Fraction of lowest window values averaged into the baseline
    #[arg(long, default_value = "0.5")]
    pub k_percent: f64,

    /// Moving-average smoothing window
    #[arg(long, default_value = "3")]
    pub smoothing: usize,

    /// Skip background subtraction
    #[arg(long)]
    pub no_subtract_bg: bool,

    /// Output CSV (default: <stem>_processed.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ProcessArgs) -> Result<()> {
    let traces = csv_io::read_raw(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let params = NormalizeParams {
        quantity: args.quantity.into(),
        subtract_background: !args.no_subtract_bg,
        window_size: args.window_size,
        k_percent: args.k_percent,
        smoothing: args.smoothing,
    };

    let background = if params.subtract_background {
        let bg_path = args.bg.clone().unwrap_or_else(|| sibling_csv(&args.file, "_bg"));
        Some(
            csv_io::read_background(&bg_path)
                .with_context(|| format!("Failed to read background {}", bg_path.display()))?,
        )
    } else {
        None
    };

    let processed = process_traces(&traces, background.as_ref(), &params)?;

    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| sibling_csv(&args.file, "_processed"));
    csv_io::write_processed(&out_path, &processed)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    println!(
        "Processed {} cells ({} quantity) -> {}",
        processed.cell_ids().len(),
        params.quantity,
        out_path.display()
    );

    Ok(())
}
