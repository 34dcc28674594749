use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaltraceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid mask: {0}")]
    InvalidMask(String),

    #[error("Window size must be odd and >= 1, got {0}")]
    InvalidWindow(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Mask dimensions {mask_width}x{mask_height} do not match video {video_width}x{video_height}")]
    DimensionMismatch {
        mask_width: usize,
        mask_height: usize,
        video_width: usize,
        video_height: usize,
    },

    #[error("Trace length {trace_len} does not match background length {background_len}")]
    LengthMismatch {
        trace_len: usize,
        background_len: usize,
    },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Output already exists: {0}")]
    OutputExists(PathBuf),

    #[error("Expected a {expected} file: {path}")]
    WrongExtension { expected: &'static str, path: PathBuf },

    #[error("File not found: {0}")]
    MissingFile(PathBuf),

    #[error("Malformed trace data: {0}")]
    MalformedTrace(String),
}

pub type Result<T> = std::result::Result<T, CaltraceError>;
