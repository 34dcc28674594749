use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use caltrace_core::normalize::NormalizeParams;
use caltrace_core::peaks::PeakParams;
use caltrace_core::pipeline::config::PipelineConfig;
use caltrace_core::pipeline::{run_pipeline_reported, PipelineStage, ProgressReporter};

use super::process::QuantityArg;
use crate::summary::{print_distribution_summary, print_pipeline_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Input SER recording
    pub file: PathBuf,

    /// Pipeline config file (TOML); other flags are ignored when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Label mask image (default: <stem>_cp_masks.png)
    #[arg(long)]
    pub mask: Option<PathBuf>,

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

    /// Minimum absolute ∆F/F peak height
    #[arg(long, default_value = "0.1")]
    pub min_height: f64,

    /// Minimum peak prominence
    #[arg(long, default_value = "0.1")]
    pub min_prominence: f64,

    /// Write a heatmap PNG of the processed traces
    #[arg(long)]
    pub heatmap: Option<PathBuf>,

    /// Replace existing outputs
    #[arg(long)]
    pub overwrite: bool,

    /// Processed-trace CSV output
    #[arg(short, long, default_value = "traces.csv")]
    pub output: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        build_config_from_args(args)
    };

    print_pipeline_summary(&config);

    let reporter = Arc::new(CliReporter::default());
    let output = run_pipeline_reported(&config, reporter)?;

    println!(
        "\nProcessed {} cells over {} frames",
        output.cells, output.frames
    );
    print_distribution_summary(&output.distributions, output.peak_count);
    println!("Output:      {}", config.output.display());

    Ok(())
}

fn build_config_from_args(args: &RunArgs) -> PipelineConfig {
    PipelineConfig {
        input: args.file.clone(),
        mask: args.mask.clone(),
        output: args.output.clone(),
        overwrite: args.overwrite,
        heatmap: args.heatmap.clone(),
        normalize: NormalizeParams {
            quantity: args.quantity.into(),
            subtract_background: !args.no_subtract_bg,
            window_size: args.window_size,
            k_percent: args.k_percent,
            smoothing: args.smoothing,
        },
        peaks: PeakParams {
            min_height: args.min_height,
            min_prominence: args.min_prominence,
            ..Default::default()
        },
    }
}

/// Progress reporter backed by an indicatif bar: a position bar for stages
/// with a known item count, a spinner otherwise.
#[derive(Default)]
struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter for CliReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        let pb = match total_items {
            Some(total) => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg} [{bar:40}] {pos}/{len}")
                        .expect("static template is valid")
                        .progress_chars("=> "),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                pb
            }
        };
        pb.set_message(stage.to_string());
        *self.bar.lock().expect("reporter mutex poisoned") = Some(pb);
    }

    fn advance(&self, items_done: usize) {
        if let Some(pb) = self.bar.lock().expect("reporter mutex poisoned").as_ref() {
            pb.set_position(items_done as u64);
        }
    }

    fn finish_stage(&self) {
        if let Some(pb) = self.bar.lock().expect("reporter mutex poisoned").take() {
            pb.finish_and_clear();
        }
    }
}
