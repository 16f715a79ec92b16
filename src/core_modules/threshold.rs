// THEORY:
// The threshold segmenter turns an HSV frame into a binary mask. A pixel is
// "selected" (255) when each of its three channels lies inside the inclusive
// [min, max] window for that channel, and "not selected" (0) otherwise.
//
// Bounds are supplied fresh by the caller on every frame. A window with
// min > max simply selects nothing; that is a caller configuration concern and
// surfaces downstream as "no object found".

use crate::core_modules::pixel::pixel::{Channel, HsvImage};
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Mask value for a selected pixel.
pub const SELECTED: u8 = 255;
/// Mask value for a pixel outside the bounds.
pub const NOT_SELECTED: u8 = 0;

/// The six caller-supplied bounds, per channel (hue, saturation, value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min: [Channel; 3],
    pub max: [Channel; 3],
}

impl Thresholds {
    pub fn new(min: [Channel; 3], max: [Channel; 3]) -> Self {
        Self { min, max }
    }

    /// Inclusive membership test for one (hue, saturation, value) triple.
    #[inline]
    pub fn contains(&self, channels: [Channel; 3]) -> bool {
        channels
            .iter()
            .zip(self.min.iter().zip(self.max.iter()))
            .all(|(value, (low, high))| low <= value && value <= high)
    }

    /// True when at least one channel window is inverted and can never match.
    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(self.max.iter()).any(|(low, high)| low > high)
    }
}

/// Flat order used by hosts: (min_h, min_s, min_v, max_h, max_s, max_v).
impl From<[Channel; 6]> for Thresholds {
    fn from(values: [Channel; 6]) -> Self {
        Self {
            min: [values[0], values[1], values[2]],
            max: [values[3], values[4], values[5]],
        }
    }
}

/// Produces the binary mask of every pixel inside `thresholds`.
pub fn in_range(hsv: &HsvImage, thresholds: &Thresholds) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    if thresholds.is_empty() {
        return mask;
    }
    for (source, target) in hsv.pixels().zip(mask.pixels_mut()) {
        if thresholds.contains(source.0) {
            *target = Luma([SELECTED]);
        }
    }
    mask
}
