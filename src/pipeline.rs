// THEORY:
// The `pipeline` module is the top-level API of the tracker. It chains the stages
// in `core_modules` into one stateless call:
//
//   frame -> HSV -> threshold mask -> cleanup -> contours -> largest candidate
//         -> (centroid, area, bounding box) -> mean over the box -> result
//
// and, as a visible side effect, swaps the caller's frame for the cleaned mask so
// the host can display what the tracker "saw".
//
// Every call starts from a sentinel result and only overwrites it after a region
// passes every check, so a rejected or empty frame can never leak values from an
// earlier call. Nothing is cached between calls except the immutable structuring
// elements built from the configuration.

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::contour::{extract_contours, select_largest};
use crate::core_modules::moment::Moments;
use crate::core_modules::morphology::{MaskCleaner, MAX_ELEMENT_SIZE};
use crate::core_modules::pixel::pixel::to_hsv;
use crate::core_modules::threshold::in_range;
use crate::core_modules::utils::image_helper::image_helper::render_mask;
use crate::error::{Result, TrackerError};
use image::{DynamicImage, RgbImage};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

// Re-export key data structures for the public API.
pub use crate::core_modules::moment::DEFAULT_MIN_MASS;
pub use crate::core_modules::pixel::pixel::ChannelOrder;
pub use crate::core_modules::smart_blob::{BoundingRect, DetectedObject};
pub use crate::core_modules::threshold::Thresholds;

pub const DEFAULT_SMALL_KERNEL: u32 = 5;
pub const DEFAULT_LARGE_KERNEL: u32 = 15;
pub const DEFAULT_APPROXIMATION_FACTOR: f64 = 0.02;

pub const SENTINEL_POSITION: (f32, f32) = (-1.0, -1.0);
pub const SENTINEL_AREA: f32 = -1.0;
pub const SENTINEL_MEAN: f32 = -1.0;

/// Configuration for the ObjectTracker. The defaults are the tuned constants;
/// hosts normally leave them alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Side of the small elliptical structuring element (odd).
    pub small_kernel: u32,
    /// Side of the large elliptical structuring element (odd).
    pub large_kernel: u32,
    /// Contour simplification tolerance, as a fraction of the contour perimeter.
    pub approximation_factor: f64,
    /// A region's zeroth moment must exceed this to be reported.
    pub min_mass: f64,
    pub channel_order: ChannelOrder,
    /// Replace the caller's frame with the cleaned mask after tracking.
    pub render_debug_mask: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            small_kernel: DEFAULT_SMALL_KERNEL,
            large_kernel: DEFAULT_LARGE_KERNEL,
            approximation_factor: DEFAULT_APPROXIMATION_FACTOR,
            min_mass: DEFAULT_MIN_MASS,
            channel_order: ChannelOrder::default(),
            render_debug_mask: true,
        }
    }
}

impl TrackerConfig {
    /// Parses a JSON document; missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, size) in [("small_kernel", self.small_kernel), ("large_kernel", self.large_kernel)] {
            if size == 0 || size % 2 == 0 || size > MAX_ELEMENT_SIZE {
                warn!("rejecting {name} = {size}");
                return Err(TrackerError::InvalidConfig(format!(
                    "{name} must be an odd size in 1..={MAX_ELEMENT_SIZE}, got {size}"
                )));
            }
        }
        if !self.approximation_factor.is_finite() || self.approximation_factor < 0.0 {
            warn!("rejecting approximation_factor = {}", self.approximation_factor);
            return Err(TrackerError::InvalidConfig(format!(
                "approximation_factor must be a finite, non-negative fraction, got {}",
                self.approximation_factor
            )));
        }
        if !self.min_mass.is_finite() || self.min_mass < 0.0 {
            warn!("rejecting min_mass = {}", self.min_mass);
            return Err(TrackerError::InvalidConfig(format!(
                "min_mass must be finite and non-negative, got {}",
                self.min_mass
            )));
        }
        Ok(())
    }
}

/// How a tracking call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingStatus {
    /// A region passed every check; the result carries real values.
    Detected,
    /// The cleaned mask held no regions at all.
    NoObjectFound,
    /// The largest region was too light to be more than noise.
    NoiseRejected,
}

/// The primary output of the tracker for a single frame. Outside of `Detected`,
/// `position`, `area` and `mean` hold the sentinel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingResult {
    pub status: TrackingStatus,
    pub position: (f32, f32),
    pub area: f32,
    pub mean: f32,
    pub bounding_rect: Option<BoundingRect>,
}

impl TrackingResult {
    pub fn sentinel(status: TrackingStatus) -> Self {
        Self {
            status,
            position: SENTINEL_POSITION,
            area: SENTINEL_AREA,
            mean: SENTINEL_MEAN,
            bounding_rect: None,
        }
    }

    pub fn is_detected(&self) -> bool {
        self.status == TrackingStatus::Detected
    }

    pub fn detection(&self) -> Option<DetectedObject> {
        if !self.is_detected() {
            return None;
        }
        Some(DetectedObject {
            centroid: self.position,
            area: self.area,
            mean: self.mean,
            bounding_rect: self.bounding_rect?,
        })
    }
}

/// The main, top-level struct for the tracker.
#[derive(Debug, Clone)]
pub struct ObjectTracker {
    config: TrackerConfig,
    cleaner: MaskCleaner,
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::from_valid_config(TrackerConfig::default())
    }
}

impl ObjectTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TrackerConfig) -> Self {
        Self {
            cleaner: MaskCleaner::new(config.small_kernel, config.large_kernel),
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Locates the largest region inside `thresholds` and reports its centroid,
    /// simplified area and mean intensity. Unless disabled in the configuration,
    /// `frame` is replaced by the cleaned single-channel mask on return.
    pub fn track(&self, frame: &mut DynamicImage, thresholds: &Thresholds) -> TrackingResult {
        let mut result = TrackingResult::sentinel(TrackingStatus::NoObjectFound);

        let mask = {
            let color: Cow<'_, RgbImage> = match frame.as_rgb8() {
                Some(rgb) => Cow::Borrowed(rgb),
                None => Cow::Owned(frame.to_rgb8()),
            };

            // --- 1. Color-space conversion ---
            let hsv = to_hsv(&color, self.config.channel_order);

            // --- 2. Thresholding ---
            let mut mask = in_range(&hsv, thresholds);

            // --- 3. Cleanup ---
            self.cleaner.clean(&mut mask);

            // --- 4. Contour extraction & selection ---
            let contours = extract_contours(&mask);
            debug!("{} contours in {}x{} mask", contours.len(), mask.width(), mask.height());

            if let Some(candidate) = select_largest(&contours, self.config.approximation_factor) {
                let contour = &contours[candidate.index];

                // --- 5. Geometry ---
                let moments = Moments::of_polygon(contour);
                let centroid = moments.centroid();
                let rect = BoundingRect::of_points(contour);

                match (moments.exceeds(self.config.min_mass), centroid, rect) {
                    (true, Some((cx, cy)), Some(rect)) => {
                        // --- 6. Region statistics ---
                        let mean = Chunk::from_rect(&color, rect)
                            .map(|chunk| chunk.mean_of_means() as f32)
                            .unwrap_or(SENTINEL_MEAN);

                        result = TrackingResult {
                            status: TrackingStatus::Detected,
                            position: (cx as f32, cy as f32),
                            area: candidate.area as f32,
                            mean,
                            bounding_rect: Some(rect),
                        };
                        debug!(
                            "contour {} selected: centroid ({cx:.1}, {cy:.1}), area {:.1}, mean {mean:.1}",
                            candidate.index, candidate.area
                        );
                    }
                    _ => {
                        result.status = TrackingStatus::NoiseRejected;
                        debug!(
                            "contour {} rejected: mass {:.1} <= {}",
                            candidate.index, moments.m00, self.config.min_mass
                        );
                    }
                }
            }

            mask
        };

        // --- 7. Debug rendering ---
        if self.config.render_debug_mask {
            render_mask(frame, mask);
        }

        result
    }
}

/// Tracks with the default configuration.
pub fn track(frame: &mut DynamicImage, thresholds: &Thresholds) -> TrackingResult {
    ObjectTracker::default().track(frame, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn defaults_are_the_tuned_constants() {
        let config = TrackerConfig::default();
        assert_eq!(config.small_kernel, 5);
        assert_eq!(config.large_kernel, 15);
        assert_eq!(config.approximation_factor, 0.02);
        assert_eq!(config.min_mass, 2000.0);
        assert!(config.render_debug_mask);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_config_fills_missing_fields() {
        let config =
            TrackerConfig::from_json_str(r#"{ "min_mass": 500.0, "channel_order": "bgr" }"#).unwrap();
        assert_eq!(config.min_mass, 500.0);
        assert_eq!(config.channel_order, ChannelOrder::Bgr);
        assert_eq!(config.large_kernel, DEFAULT_LARGE_KERNEL);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let even = TrackerConfig { small_kernel: 4, ..TrackerConfig::default() };
        assert!(matches!(ObjectTracker::new(even), Err(TrackerError::InvalidConfig(_))));

        let huge = TrackerConfig { large_kernel: 513, ..TrackerConfig::default() };
        assert!(matches!(huge.validate(), Err(TrackerError::InvalidConfig(_))));

        let negative = TrackerConfig { min_mass: -1.0, ..TrackerConfig::default() };
        assert!(matches!(negative.validate(), Err(TrackerError::InvalidConfig(_))));

        let nan = TrackerConfig { approximation_factor: f64::NAN, ..TrackerConfig::default() };
        assert!(nan.validate().is_err());

        assert!(matches!(
            TrackerConfig::from_json_str("{ not json"),
            Err(TrackerError::ConfigFormat(_))
        ));
    }

    #[test]
    fn empty_frame_reports_sentinels() {
        let mut frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([0, 0, 255])));
        let result = track(&mut frame, &Thresholds::new([0, 100, 100], [10, 255, 255]));

        assert_eq!(result.status, TrackingStatus::NoObjectFound);
        assert_eq!(result.position, SENTINEL_POSITION);
        assert_eq!(result.area, SENTINEL_AREA);
        assert_eq!(result.mean, SENTINEL_MEAN);
        assert!(result.detection().is_none());
    }

    #[test]
    fn frame_is_replaced_by_the_mask() {
        let mut frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([0, 0, 255])));
        track(&mut frame, &Thresholds::new([0, 0, 0], [179, 255, 255]));

        let mask = frame.as_luma8().expect("mask replaces the frame");
        assert_eq!(mask.dimensions(), (40, 30));
        assert!(mask.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn rendering_can_be_disabled() {
        let tracker = ObjectTracker::new(TrackerConfig {
            render_debug_mask: false,
            ..TrackerConfig::default()
        })
        .unwrap();
        let mut frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([9, 9, 9])));
        tracker.track(&mut frame, &Thresholds::new([0, 0, 0], [179, 255, 255]));
        assert!(frame.as_rgb8().is_some());
    }

    #[test]
    fn non_rgb_frames_are_converted() {
        let mut frame = DynamicImage::new_rgba8(16, 16);
        let result = track(&mut frame, &Thresholds::new([0, 0, 0], [179, 255, 255]));
        // A fully selected 16x16 frame is far below the mass floor.
        assert_eq!(result.status, TrackingStatus::NoiseRejected);
        assert!(frame.as_luma8().is_some());
    }
}
