use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use caltrace_core::extract::default_mask_path;
use caltrace_core::io::mask::CellMask;
use caltrace_core::io::ser::SerReader;

#[derive(Args)]
pub struct InfoArgs {
    /// Input SER recording
    pub file: PathBuf,

    /// Label mask image (default: <stem>_cp_masks.png)
    #[arg(long)]
    pub mask: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = SerReader::open(&args.file)?;
    let info = reader.info(&args.file);

    println!("File:        {}", info.filename.display());
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Bit depth:   {}", info.bit_depth);

    if let Some(ref obs) = info.observer {
        println!("Observer:    {}", obs);
    }
    if let Some(ref inst) = info.instrument {
        println!("Instrument:  {}", inst);
    }

    let frame_bytes = reader.header.frame_byte_size();
    let total_mb = (frame_bytes * info.total_frames) as f64 / (1024.0 * 1024.0);
    println!("Data size:   {:.1} MB", total_mb);

    let mask_path = args.mask.clone().unwrap_or_else(|| default_mask_path(&args.file));
    if mask_path.exists() {
        let mask = CellMask::load(&mask_path)?;
        println!("Mask:        {}", mask_path.display());
        println!("Cells:       {}", mask.cell_count());
    } else {
        println!("Mask:        not found ({})", mask_path.display());
    }

    Ok(())
}
