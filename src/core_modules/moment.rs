// THEORY:
// The `moment` module is the geometry estimator. Given the raw contour of the
// selected region (not its simplified polygon), it computes the zeroth and
// first-order area moments by integrating along the boundary (Green's theorem):
//
//   m00 = 1/2 * sum(x_i * y_j - x_j * y_i)
//   m10 = 1/6 * sum((x_i + x_j) * (x_i * y_j - x_j * y_i))
//   m01 = 1/6 * sum((y_i + y_j) * (x_i * y_j - x_j * y_i))      with j = i + 1
//
// m00 is the enclosed area and (m10 / m00, m01 / m00) the mass centroid. The
// tracker rejects regions whose m00 does not exceed a fixed noise floor.

use crate::core_modules::smart_blob::Point;

/// Noise floor for the zeroth moment; regions at or below it are rejected.
pub const DEFAULT_MIN_MASS: f64 = 2000.0;

/// Area moments of a closed polygon, normalized so that `m00 >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    pub fn of_polygon(points: &[Point]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut moments = Self::default();
        for (current, next) in points.iter().zip(points.iter().cycle().skip(1)) {
            let (xi, yi) = (current.x as f64, current.y as f64);
            let (xj, yj) = (next.x as f64, next.y as f64);
            let cross = xi * yj - xj * yi;
            moments.m00 += cross;
            moments.m10 += (xi + xj) * cross;
            moments.m01 += (yi + yj) * cross;
        }
        moments.m00 /= 2.0;
        moments.m10 /= 6.0;
        moments.m01 /= 6.0;

        // Counter-clockwise and clockwise traces describe the same region.
        if moments.m00 < 0.0 {
            moments.m00 = -moments.m00;
            moments.m10 = -moments.m10;
            moments.m01 = -moments.m01;
        }
        moments
    }

    /// Mass centroid, or `None` for a region without area.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }

    /// True when the region is heavy enough to be more than sensor noise.
    pub fn exceeds(&self, min_mass: f64) -> bool {
        self.m00 > min_mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(points: &[(i32, i32)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn square_moments() {
        let square = polygon(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let moments = Moments::of_polygon(&square);
        assert!((moments.m00 - 100.0).abs() < 1e-9);
        assert!((moments.m10 - 500.0).abs() < 1e-9);
        assert!((moments.m01 - 500.0).abs() < 1e-9);
        assert_eq!(moments.centroid(), Some((5.0, 5.0)));
    }

    #[test]
    fn orientation_does_not_flip_the_sign() {
        let mut square = polygon(&[(2, 3), (12, 3), (12, 13), (2, 13)]);
        let forward = Moments::of_polygon(&square);
        square.reverse();
        let backward = Moments::of_polygon(&square);
        assert!(backward.m00 > 0.0);
        assert_eq!(forward, backward);
    }

    #[test]
    fn triangle_centroid_is_the_vertex_mean() {
        let triangle = polygon(&[(0, 0), (6, 0), (0, 6)]);
        let (cx, cy) = Moments::of_polygon(&triangle).centroid().unwrap();
        assert!((cx - 2.0).abs() < 1e-9);
        assert!((cy - 2.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_contours_have_no_centroid() {
        let line = polygon(&[(0, 0), (5, 5)]);
        assert_eq!(Moments::of_polygon(&line), Moments::default());
        assert!(Moments::of_polygon(&line).centroid().is_none());
    }

    #[test]
    fn noise_floor_is_strict() {
        let moments = Moments { m00: DEFAULT_MIN_MASS, m10: 0.0, m01: 0.0 };
        assert!(!moments.exceeds(DEFAULT_MIN_MASS));
        let heavier = Moments { m00: DEFAULT_MIN_MASS + 0.5, ..moments };
        assert!(heavier.exceeds(DEFAULT_MIN_MASS));
    }
}
