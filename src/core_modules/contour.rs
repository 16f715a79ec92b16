// THEORY:
// The contour stage is the heart of the tracker. It turns the cleaned mask into
// a flat list of traced region boundaries, simplifies every boundary, and ranks
// the regions by the area of their simplified polygon so that exactly one
// region (the largest) can be handed to the geometry stage.
//
// Algorithm steps:
// 1.  **Extraction**: border following over the mask yields every boundary,
//     outer borders and hole borders alike, as one flat list. Nesting is ignored.
// 2.  **Simplification**: each closed boundary is reduced with Douglas-Peucker,
//     using a tolerance proportional to its own perimeter. Vertex jitter from the
//     pixel grid disappears; the overall shape survives.
// 3.  **Ranking**: the enclosed area of each simplified polygon is computed with
//     the shoelace formula and contours are ordered by it, largest first. Ties
//     keep extraction order, so the earlier contour wins.

use crate::core_modules::smart_blob::{Candidate, Point};
use image::{imageops, GrayImage};
use imageproc::contours::find_contours;
use imageproc::geometry::{arc_length, contour_area};
use log::trace;

/// Traces every region boundary in `mask`. Non-zero pixels are foreground.
///
/// The area outside the frame counts as background, so a region spanning the
/// full width or height still has an outer border.
pub fn extract_contours(mask: &GrayImage) -> Vec<Vec<Point>> {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);

    let offset = Point::new(1, 1);
    find_contours::<i32>(&padded)
        .into_iter()
        .map(|contour| contour.points.into_iter().map(|point| point - offset).collect())
        .collect()
}

/// Simplifies a closed contour: no dropped vertex lies farther than `epsilon`
/// from the polygon edge that replaces it.
pub fn approximate_polygon(contour: &[Point], epsilon: f64) -> Vec<Point> {
    let count = contour.len();
    if count < 3 {
        return contour.to_vec();
    }

    // Split the loop between two far-apart vertices, then simplify both arcs.
    let first_anchor = farthest_from(contour, 0);
    let second_anchor = farthest_from(contour, first_anchor);
    if contour[first_anchor] == contour[second_anchor] {
        return vec![contour[first_anchor]];
    }

    let mut keep = vec![false; count];
    keep[first_anchor] = true;
    keep[second_anchor] = true;
    simplify_arc(contour, first_anchor, second_anchor, epsilon, &mut keep);
    simplify_arc(contour, second_anchor, first_anchor, epsilon, &mut keep);

    (0..count)
        .map(|offset| (first_anchor + offset) % count)
        .filter(|&index| keep[index])
        .map(|index| contour[index])
        .collect()
}

/// Scores every contour by simplified area and returns them largest first.
/// `Vec::sort_by` is stable, so equal areas keep extraction order.
pub fn rank_candidates(contours: &[Vec<Point>], approximation_factor: f64) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = contours
        .iter()
        .enumerate()
        .map(|(index, contour)| {
            let epsilon = approximation_factor * arc_length(contour, true);
            let simplified = approximate_polygon(contour, epsilon);
            let area = contour_area(&simplified);
            trace!(
                "contour {index}: {} points -> {} vertices, area {area:.1}",
                contour.len(),
                simplified.len()
            );
            Candidate { index, area }
        })
        .collect();

    candidates.sort_by(|a, b| b.area.total_cmp(&a.area));
    candidates
}

/// The top-ranked contour, or `None` when the mask held no regions.
pub fn select_largest(contours: &[Vec<Point>], approximation_factor: f64) -> Option<Candidate> {
    rank_candidates(contours, approximation_factor).into_iter().next()
}

fn distance(a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

fn farthest_from(points: &[Point], origin: usize) -> usize {
    let anchor = points[origin];
    let mut best = origin;
    let mut best_distance = 0i64;
    for (index, point) in points.iter().enumerate() {
        let dx = (point.x - anchor.x) as i64;
        let dy = (point.y - anchor.y) as i64;
        let distance_sq = dx * dx + dy * dy;
        if distance_sq > best_distance {
            best_distance = distance_sq;
            best = index;
        }
    }
    best
}

/// Distance from `point` to the infinite line through `start` and `end`.
fn distance_to_line(point: Point, start: Point, end: Point) -> f64 {
    let dx = (end.x - start.x) as f64;
    let dy = (end.y - start.y) as f64;
    let norm = (dx * dx + dy * dy).sqrt();
    if norm == 0.0 {
        return distance(point, start);
    }
    ((point.y - start.y) as f64 * dx - (point.x - start.x) as f64 * dy).abs() / norm
}

/// Douglas-Peucker over the arc that runs forward (wrapping) from `first` to `last`.
fn simplify_arc(contour: &[Point], first: usize, last: usize, epsilon: f64, keep: &mut [bool]) {
    let count = contour.len();
    let mut pending = vec![(first, last)];

    while let Some((start, end)) = pending.pop() {
        let span = (end + count - start) % count;
        if span < 2 {
            continue;
        }

        let mut farthest = None;
        let mut farthest_distance = epsilon;
        for offset in 1..span {
            let index = (start + offset) % count;
            let d = distance_to_line(contour[index], contour[start], contour[end]);
            if d > farthest_distance {
                farthest_distance = d;
                farthest = Some(index);
            }
        }

        if let Some(index) = farthest {
            keep[index] = true;
            pending.push((start, index));
            pending.push((index, end));
        }
    }
}
