// THEORY:
// This file is the main entry point for the `hsv_tracker` library crate.
// It exports the `ObjectTracker` and its associated data structures
// (`TrackerConfig`, `Thresholds`, `TrackingResult`) as the high-level interface a
// host perception loop calls once per frame. The stage-by-stage building blocks
// live in `core_modules` and stay public for hosts that want to run or test a
// single stage.

pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod parallel_pipeline;

pub use error::{Result, TrackerError};
pub use pipeline::{
    track, ObjectTracker, Thresholds, TrackerConfig, TrackingResult, TrackingStatus,
};
