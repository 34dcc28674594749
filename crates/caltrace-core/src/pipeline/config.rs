use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::extract::default_mask_path;
use crate::normalize::NormalizeParams;
use crate::peaks::PeakParams;

/// Full pipeline configuration, loadable from TOML.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input SER recording.
    pub input: PathBuf,
    /// Label mask image. Defaults to `<input stem>_cp_masks.png`.
    #[serde(default)]
    pub mask: Option<PathBuf>,
    /// Processed-trace CSV output. Sibling outputs (`_bg`, `_positions`,
    /// `_peaks` CSVs) derive from this path.
    pub output: PathBuf,
    /// Replace existing outputs instead of failing.
    #[serde(default)]
    pub overwrite: bool,
    /// Optional heatmap PNG of the processed set.
    #[serde(default)]
    pub heatmap: Option<PathBuf>,
    #[serde(default)]
    pub normalize: NormalizeParams,
    #[serde(default)]
    pub peaks: PeakParams,
}

impl PipelineConfig {
    pub fn mask_path(&self) -> PathBuf {
        self.mask
            .clone()
            .unwrap_or_else(|| default_mask_path(&self.input))
    }

    pub fn background_path(&self) -> PathBuf {
        sibling(&self.output, "_bg")
    }

    pub fn positions_path(&self) -> PathBuf {
        sibling(&self.output, "_positions")
    }

    pub fn peaks_path(&self) -> PathBuf {
        sibling(&self.output, "_peaks")
    }
}

/// `out.csv` -> `out<suffix>.csv`, the original tooling's sibling naming.
fn sibling(out: &std::path::Path, suffix: &str) -> PathBuf {
    let stem = out.file_stem().unwrap_or_default().to_string_lossy();
    out.with_file_name(format!("{stem}{suffix}.csv"))
}
