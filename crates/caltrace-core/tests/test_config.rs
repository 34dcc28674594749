use std::path::PathBuf;

use caltrace_core::pipeline::config::PipelineConfig;

fn base_config() -> PipelineConfig {
    PipelineConfig {
        input: PathBuf::from("/data/exp1/GPN1_001.ser"),
        mask: None,
        output: PathBuf::from("/data/processed/GPN1_001.csv"),
        overwrite: false,
        heatmap: None,
        normalize: Default::default(),
        peaks: Default::default(),
    }
}

#[test]
fn test_default_mask_derived_from_input() {
    let config = base_config();
    assert_eq!(
        config.mask_path(),
        PathBuf::from("/data/exp1/GPN1_001_cp_masks.png")
    );
}

#[test]
fn test_explicit_mask_wins() {
    let mut config = base_config();
    config.mask = Some(PathBuf::from("/elsewhere/m.png"));
    assert_eq!(config.mask_path(), PathBuf::from("/elsewhere/m.png"));
}

#[test]
fn test_sibling_output_paths() {
    let config = base_config();
    assert_eq!(
        config.background_path(),
        PathBuf::from("/data/processed/GPN1_001_bg.csv")
    );
    assert_eq!(
        config.positions_path(),
        PathBuf::from("/data/processed/GPN1_001_positions.csv")
    );
    assert_eq!(
        config.peaks_path(),
        PathBuf::from("/data/processed/GPN1_001_peaks.csv")
    );
}

#[test]
fn test_serde_roundtrip() {
    let mut config = base_config();
    config.normalize.window_size = 21;
    config.peaks.min_height = 0.25;

    let json = serde_json::to_string(&config).unwrap();
    let back: PipelineConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(back.input, config.input);
    assert_eq!(back.normalize.window_size, 21);
    assert_eq!(back.peaks.min_height, 0.25);
}

#[test]
fn test_optional_sections_default() {
    // A minimal config names only the input and output.
    let json = r#"{
        "input": "rec.ser",
        "output": "out.csv"
    }"#;
    let config: PipelineConfig = serde_json::from_str(json).unwrap();
    assert!(!config.overwrite);
    assert_eq!(config.normalize.window_size, 11);
    assert_eq!(config.peaks.rel_height, 0.5);
}
