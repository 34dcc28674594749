//! CSV readers and writers for every tabular schema in the pipeline.
//!
//! All reads collect and validate the whole file before anything downstream
//! runs; a malformed row fails the invocation up front.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::trace::{
    BackgroundRecord, BackgroundTrace, CombinedRecord, PeakRecord, PositionRecord, ProcessedSet,
    RawRecord, TraceSet,
};

fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn write_all<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the raw per-cell temporal CSV (`cell_id,frame,mean,max,top10`).
pub fn read_raw(path: &Path) -> Result<TraceSet> {
    TraceSet::from_records(read_all::<RawRecord>(path)?)
}

pub fn write_raw(path: &Path, traces: &TraceSet) -> Result<()> {
    write_all(path, traces.records())
}

/// Read the background CSV (`frame,mean`).
pub fn read_background(path: &Path) -> Result<BackgroundTrace> {
    BackgroundTrace::from_records(read_all::<BackgroundRecord>(path)?)
}

pub fn write_background(path: &Path, background: &BackgroundTrace) -> Result<()> {
    let rows: Vec<BackgroundRecord> = background
        .values()
        .iter()
        .enumerate()
        .map(|(frame, &mean)| BackgroundRecord { frame, mean })
        .collect();
    write_all(path, &rows)
}

/// Read a processed CSV (raw columns plus `processed`).
pub fn read_processed(path: &Path) -> Result<ProcessedSet> {
    ProcessedSet::from_records(read_all(path)?)
}

pub fn write_processed(path: &Path, processed: &ProcessedSet) -> Result<()> {
    write_all(path, processed.records())
}

pub fn write_positions(path: &Path, positions: &[PositionRecord]) -> Result<()> {
    write_all(path, positions)
}

pub fn write_peaks(path: &Path, peaks: &[PeakRecord]) -> Result<()> {
    write_all(path, peaks)
}

/// Write a combined set; `original_cell_id` serializes as an empty field
/// for rows from the first input.
pub fn write_combined(path: &Path, combined: &[CombinedRecord]) -> Result<()> {
    write_all(path, combined)
}
