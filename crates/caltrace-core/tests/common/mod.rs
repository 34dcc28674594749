//! Shared helpers for building synthetic SER recordings and trace sets.

use caltrace_core::trace::{ProcessedRecord, ProcessedSet, RawRecord, TraceSet};

pub const SER_HEADER_SIZE: usize = 178;

/// Build a minimal mono SER file in memory.
///
/// `frames` holds the raw bytes of each frame (1 byte/px for 8-bit,
/// 2 bytes/px little-endian for 16-bit).
pub fn build_synthetic_ser(width: u32, height: u32, bit_depth: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    build_synthetic_ser_color(width, height, bit_depth, 0, frames)
}

pub fn build_synthetic_ser_color(
    width: u32,
    height: u32,
    bit_depth: u32,
    color_id: i32,
    frames: &[Vec<u8>],
) -> Vec<u8> {
    let mut buf = Vec::new();

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0 (little-endian per Siril convention)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // Width
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    // Height
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    // PixelDepth
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    // FrameCount
    buf.extend_from_slice(&(frames.len() as i32).to_le_bytes());
    // Observer (40 bytes)
    let mut observer = [0u8; 40];
    observer[..4].copy_from_slice(b"Test");
    buf.extend_from_slice(&observer);
    // Instrument (40 bytes)
    buf.extend_from_slice(&[0u8; 40]);
    // Telescope (40 bytes)
    buf.extend_from_slice(&[0u8; 40]);
    // DateTime (8 bytes)
    buf.extend_from_slice(&0u64.to_le_bytes());
    // DateTimeUTC (8 bytes)
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);

    for frame in frames {
        buf.extend_from_slice(frame);
    }

    buf
}

/// Build a raw trace set where every quantity column carries the same
/// per-frame values.
#[allow(dead_code)]
pub fn make_traces(cells: &[(u32, Vec<f64>)]) -> TraceSet {
    let mut records = Vec::new();
    for (cell_id, values) in cells {
        for (frame, &v) in values.iter().enumerate() {
            records.push(RawRecord {
                cell_id: *cell_id,
                frame,
                mean: v,
                max: v,
                top10: v,
            });
        }
    }
    TraceSet::from_records(records).unwrap()
}

/// Build a processed set from per-cell processed samples; raw columns are
/// zeroed.
#[allow(dead_code)]
pub fn make_processed(cells: &[(u32, Vec<f64>)]) -> ProcessedSet {
    let mut records = Vec::new();
    for (cell_id, values) in cells {
        for (frame, &v) in values.iter().enumerate() {
            records.push(ProcessedRecord {
                cell_id: *cell_id,
                frame,
                mean: 0.0,
                max: 0.0,
                top10: 0.0,
                processed: v,
            });
        }
    }
    ProcessedSet::from_records(records).unwrap()
}
