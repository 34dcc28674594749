mod common;

use caltrace_core::trace::{
    combine, BackgroundRecord, BackgroundTrace, Quantity, RawRecord, TraceSet,
};
use common::{make_processed, make_traces};

#[test]
fn test_records_sorted_by_cell_then_frame() {
    let records = vec![
        RawRecord { cell_id: 1, frame: 1, mean: 4.0, max: 4.0, top10: 4.0 },
        RawRecord { cell_id: 0, frame: 0, mean: 1.0, max: 1.0, top10: 1.0 },
        RawRecord { cell_id: 1, frame: 0, mean: 3.0, max: 3.0, top10: 3.0 },
        RawRecord { cell_id: 0, frame: 1, mean: 2.0, max: 2.0, top10: 2.0 },
    ];
    let traces = TraceSet::from_records(records).unwrap();
    assert_eq!(traces.cell_ids(), vec![0, 1]);
    assert_eq!(traces.cell_values(0, Quantity::Mean), vec![1.0, 2.0]);
    assert_eq!(traces.cell_values(1, Quantity::Mean), vec![3.0, 4.0]);
}

#[test]
fn test_noncontiguous_frames_rejected() {
    let records = vec![
        RawRecord { cell_id: 0, frame: 0, mean: 1.0, max: 1.0, top10: 1.0 },
        RawRecord { cell_id: 0, frame: 2, mean: 2.0, max: 2.0, top10: 2.0 },
    ];
    assert!(TraceSet::from_records(records).is_err());
}

#[test]
fn test_frames_not_zero_based_rejected() {
    let records = vec![RawRecord { cell_id: 0, frame: 1, mean: 1.0, max: 1.0, top10: 1.0 }];
    assert!(TraceSet::from_records(records).is_err());
}

#[test]
fn test_quantity_selection() {
    let records = vec![RawRecord { cell_id: 0, frame: 0, mean: 1.0, max: 3.0, top10: 2.0 }];
    let traces = TraceSet::from_records(records).unwrap();
    assert_eq!(traces.cell_values(0, Quantity::Mean), vec![1.0]);
    assert_eq!(traces.cell_values(0, Quantity::Max), vec![3.0]);
    assert_eq!(traces.cell_values(0, Quantity::Top10), vec![2.0]);
}

#[test]
fn test_background_contiguity_validated() {
    let ok = vec![
        BackgroundRecord { frame: 1, mean: 2.0 },
        BackgroundRecord { frame: 0, mean: 1.0 },
    ];
    let bg = BackgroundTrace::from_records(ok).unwrap();
    assert_eq!(bg.values(), &[1.0, 2.0]);

    let gap = vec![
        BackgroundRecord { frame: 0, mean: 1.0 },
        BackgroundRecord { frame: 2, mean: 2.0 },
    ];
    assert!(BackgroundTrace::from_records(gap).is_err());
}

#[test]
fn test_combine_renumbers_second_set() {
    let first = make_processed(&[(0, vec![0.1, 0.2]), (1, vec![0.3, 0.4])]);
    let second = make_processed(&[(0, vec![0.5, 0.6]), (1, vec![0.7, 0.8])]);

    let combined = combine(&first, &second);

    let mut ids: Vec<u32> = combined.iter().map(|r| r.cell_id).collect();
    ids.dedup();
    assert_eq!(ids, vec![0, 1, 2, 3]);

    // First group keeps no original id; second group records its
    // pre-renumber id.
    let mut pairs: Vec<(u32, Option<u32>)> = combined
        .iter()
        .map(|r| (r.cell_id, r.original_cell_id))
        .collect();
    pairs.dedup();
    assert_eq!(
        pairs,
        vec![(0, None), (1, None), (2, Some(0)), (3, Some(1))]
    );
}

#[test]
fn test_combine_preserves_processed_values() {
    let first = make_processed(&[(0, vec![0.1])]);
    let second = make_processed(&[(5, vec![0.9])]);
    let combined = combine(&first, &second);
    assert_eq!(combined.len(), 2);
    assert_eq!(combined[1].cell_id, 1);
    assert_eq!(combined[1].original_cell_id, Some(5));
    assert_eq!(combined[1].processed, 0.9);
}

#[test]
fn test_traces_grouping() {
    let processed = make_processed(&[(2, vec![1.0, 2.0]), (7, vec![3.0])]);
    let traces = processed.traces();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0], (2, vec![1.0, 2.0]));
    assert_eq!(traces[1], (7, vec![3.0]));
}

#[test]
fn test_make_traces_helper_roundtrip() {
    let traces = make_traces(&[(0, vec![1.0, 2.0, 3.0])]);
    assert_eq!(traces.records().len(), 3);
    assert_eq!(traces.cell_values(0, Quantity::Top10), vec![1.0, 2.0, 3.0]);
}
