// THEORY:
// Tracking a frame never fails: "no object" and "too small" outcomes are reported
// through sentinel values on the `TrackingResult`. The errors below only cover the
// plumbing around the pipeline: configuration, host buffers, file I/O and the
// async worker pool.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),

    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("worker pool is not accepting tasks")]
    WorkerUnavailable,

    #[error("worker dropped the frame before replying")]
    WorkerDropped,
}

pub type Result<T> = std::result::Result<T, TrackerError>;
