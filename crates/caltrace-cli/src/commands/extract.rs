use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use caltrace_core::extract::{default_mask_path, extract_traces, validate_paths};
use caltrace_core::io::csv_io;
use caltrace_core::io::mask::CellMask;
use caltrace_core::io::ser::SerReader;

#[derive(Args)]
pub struct ExtractArgs {
    /// Input SER recording
    pub file: PathBuf,

    /// Label mask image (default: <stem>_cp_masks.png)
    #[arg(long)]
    pub mask: Option<PathBuf>,

    /// Output CSV for raw traces; background and positions CSVs are
    /// written next to it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace existing outputs
    #[arg(long)]
    pub overwrite: bool,
}

pub fn run(args: &ExtractArgs) -> Result<()> {
    let mask_path = args.mask.clone().unwrap_or_else(|| default_mask_path(&args.file));
    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.file.with_extension("csv"));

    validate_paths(&args.file, &mask_path, &out_path, args.overwrite)?;

    let reader = SerReader::open(&args.file)?;
    let mask = CellMask::load(&mask_path)?;
    let total = reader.frame_count();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message(format!("Extracting {} cells", mask.cell_count()));

    let extracted = extract_traces(&reader, &mask, Some(&|done| pb.set_position(done as u64)))?;
    pb.finish_with_message("Extraction complete");

    let bg_path = sibling_csv(&out_path, "_bg");
    let positions_path = sibling_csv(&out_path, "_positions");

    csv_io::write_raw(&out_path, &extracted.traces)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    csv_io::write_background(&bg_path, &extracted.background)?;
    csv_io::write_positions(&positions_path, &extracted.positions)?;

    println!("Traces:      {}", out_path.display());
    println!("Background:  {}", bg_path.display());
    println!("Positions:   {}", positions_path.display());

    Ok(())
}

pub fn sibling_csv(out: &std::path::Path, suffix: &str) -> PathBuf {
    let stem = out.file_stem().unwrap_or_default().to_string_lossy();
    out.with_file_name(format!("{stem}{suffix}.csv"))
}
