use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CaltraceError, Result};

/// Which per-frame aggregate of a cell's pixels to analyze.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Mean,
    Max,
    /// Mean of the brightest 10% of pixels under the mask. Robust proxy for
    /// peak intensity, less noise-sensitive than the single maximum.
    #[default]
    Top10,
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::Max => write!(f, "max"),
            Self::Top10 => write!(f, "top10"),
        }
    }
}

/// One row of the raw per-cell temporal CSV: the three aggregate
/// intensities of one cell in one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub cell_id: u32,
    pub frame: usize,
    pub mean: f64,
    pub max: f64,
    pub top10: f64,
}

impl RawRecord {
    pub fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Mean => self.mean,
            Quantity::Max => self.max,
            Quantity::Top10 => self.top10,
        }
    }
}

/// Raw record plus the normalized+smoothed ∆F/F value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub cell_id: u32,
    pub frame: usize,
    pub mean: f64,
    pub max: f64,
    pub top10: f64,
    pub processed: f64,
}

/// One row of the background CSV: mean intensity of all unmasked pixels
/// in one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundRecord {
    pub frame: usize,
    pub mean: f64,
}

/// Centroid of one labeled mask region, in pixel coordinates (x = column).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub cell_id: u32,
    pub x: f64,
    pub y: f64,
}

/// One detected transient in a processed trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    pub cell_id: u32,
    pub frame: usize,
    pub height: f64,
    pub prominence: f64,
    pub width: f64,
}

/// Row of a combined (multi-condition) processed set. `original_cell_id`
/// is empty for rows from the first input and carries the pre-renumber id
/// for rows from the second.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub cell_id: u32,
    pub original_cell_id: Option<u32>,
    pub frame: usize,
    pub mean: f64,
    pub max: f64,
    pub top10: f64,
    pub processed: f64,
}

/// All raw traces of one video, sorted by (cell_id, frame).
///
/// Frames are validated to be 0-based and contiguous per cell, so a cell's
/// rows can be sliced out as a dense time series.
#[derive(Clone, Debug, Default)]
pub struct TraceSet {
    records: Vec<RawRecord>,
}

impl TraceSet {
    /// Build from unordered rows, validating per-cell frame contiguity.
    pub fn from_records(mut records: Vec<RawRecord>) -> Result<Self> {
        records.sort_by(|a, b| (a.cell_id, a.frame).cmp(&(b.cell_id, b.frame)));
        validate_contiguous(records.iter().map(|r| (r.cell_id, r.frame)))?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct cell ids, ascending.
    pub fn cell_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.records.iter().map(|r| r.cell_id).collect();
        ids.dedup();
        ids
    }

    /// Dense time series of one cell for the chosen quantity.
    pub fn cell_values(&self, cell_id: u32, quantity: Quantity) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.cell_id == cell_id)
            .map(|r| r.value(quantity))
            .collect()
    }

    /// Rows of one cell, in frame order.
    pub fn cell_records(&self, cell_id: u32) -> Vec<&RawRecord> {
        self.records.iter().filter(|r| r.cell_id == cell_id).collect()
    }
}

/// All processed traces of one video, sorted by (cell_id, frame).
#[derive(Clone, Debug, Default)]
pub struct ProcessedSet {
    records: Vec<ProcessedRecord>,
}

impl ProcessedSet {
    pub fn from_records(mut records: Vec<ProcessedRecord>) -> Result<Self> {
        records.sort_by(|a, b| (a.cell_id, a.frame).cmp(&(b.cell_id, b.frame)));
        validate_contiguous(records.iter().map(|r| (r.cell_id, r.frame)))?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ProcessedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ProcessedRecord> {
        self.records
    }

    pub fn cell_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.records.iter().map(|r| r.cell_id).collect();
        ids.dedup();
        ids
    }

    /// Dense processed time series of one cell.
    pub fn cell_trace(&self, cell_id: u32) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.cell_id == cell_id)
            .map(|r| r.processed)
            .collect()
    }

    /// Per-cell traces in cell-id order, as (cell_id, samples) pairs.
    pub fn traces(&self) -> Vec<(u32, Vec<f64>)> {
        let mut by_cell: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for r in &self.records {
            by_cell.entry(r.cell_id).or_default().push(r.processed);
        }
        by_cell.into_iter().collect()
    }
}

/// Per-frame background trace.
#[derive(Clone, Debug, Default)]
pub struct BackgroundTrace {
    values: Vec<f64>,
}

impl BackgroundTrace {
    /// Build from CSV rows, validating 0-based contiguous frames.
    pub fn from_records(mut records: Vec<BackgroundRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.frame);
        for (i, r) in records.iter().enumerate() {
            if r.frame != i {
                return Err(CaltraceError::MalformedTrace(format!(
                    "background frame {} at row {} (expected contiguous 0-based frames)",
                    r.frame, i
                )));
            }
        }
        Ok(Self {
            values: records.into_iter().map(|r| r.mean).collect(),
        })
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Merge two processed sets for cross-condition comparison.
///
/// Cells of the first set keep their ids; cells of the second are renumbered
/// to follow on, with the pre-renumber id preserved in `original_cell_id`
/// (empty for the first set).
pub fn combine(first: &ProcessedSet, second: &ProcessedSet) -> Vec<CombinedRecord> {
    let offset = first.cell_ids().last().map_or(0, |id| id + 1);

    // Second-set ids may be sparse; renumber in ascending order.
    let remap: BTreeMap<u32, u32> = second
        .cell_ids()
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, offset + i as u32))
        .collect();

    let mut combined: Vec<CombinedRecord> = first
        .records()
        .iter()
        .map(|r| CombinedRecord {
            cell_id: r.cell_id,
            original_cell_id: None,
            frame: r.frame,
            mean: r.mean,
            max: r.max,
            top10: r.top10,
            processed: r.processed,
        })
        .collect();

    combined.extend(second.records().iter().map(|r| CombinedRecord {
        cell_id: remap[&r.cell_id],
        original_cell_id: Some(r.cell_id),
        frame: r.frame,
        mean: r.mean,
        max: r.max,
        top10: r.top10,
        processed: r.processed,
    }));

    combined
}

fn validate_contiguous(rows: impl Iterator<Item = (u32, usize)>) -> Result<()> {
    let mut current: Option<(u32, usize)> = None;
    for (cell_id, frame) in rows {
        let expected = match current {
            Some((id, next)) if id == cell_id => next,
            _ => 0,
        };
        if frame != expected {
            return Err(CaltraceError::MalformedTrace(format!(
                "cell {cell_id}: frame {frame} where {expected} was expected \
                 (frames must be 0-based and contiguous per cell)"
            )));
        }
        current = Some((cell_id, frame + 1));
    }
    Ok(())
}
