// THEORY:
// The `smart_blob` module holds the "dumb" data containers shared by the
// contour, geometry and statistics stages. None of them carry behavior beyond
// simple construction helpers, and none outlive a single tracking call:
//
// - `Point`: an integer pixel coordinate on a traced boundary.
// - `BoundingRect`: the axis-aligned box enclosing a contour.
// - `Candidate`: a contour index paired with its simplified area, used only to
//   rank regions before one is picked.
// - `DetectedObject`: the summary of the single region the tracker reports.

use serde::{Deserialize, Serialize};

/// An integer pixel coordinate, as produced by `imageproc` contour tracing.
pub type Point = imageproc::point::Point<i32>;

/// Axis-aligned rectangle; `width` and `height` count pixels, so a single point
/// has a 1x1 rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRect {
    /// The smallest rectangle containing every point, or `None` for no points.
    pub fn of_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A contour ranked by the area of its simplified polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position of the contour in extraction order.
    pub index: usize,
    pub area: f64,
}

/// The region reported by a successful tracking call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Mass centroid of the raw contour, in pixel coordinates.
    pub centroid: (f32, f32),
    /// Enclosed area of the simplified contour, in square pixels.
    pub area: f32,
    /// Mean of the per-channel means over `bounding_rect`.
    pub mean: f32,
    pub bounding_rect: BoundingRect,
}
