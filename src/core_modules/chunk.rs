// THEORY:
// The `Chunk` module computes region statistics. A chunk is the rectangular block
// of the original color frame covered by the selected region's bounding box.
//
// Its one summary is a brightness-like scalar obtained in two stages: first the
// arithmetic mean of each color channel over the block, then the mean of those
// three channel means. The two-stage reduction is kept as-is rather than being
// folded into a single mean over all bytes.
//
// A chunk only exists for a qualifying region. When nothing was detected there is
// no rectangle to average over, and the tracker reports a sentinel instead.

pub mod chunk {
    use crate::core_modules::smart_blob::BoundingRect;
    use image::RgbImage;

    /// A view of the frame pixels inside a bounding rectangle.
    pub struct Chunk<'a> {
        frame: &'a RgbImage,
        /// The rectangle, clipped to the frame.
        pub rect: BoundingRect,
    }

    impl<'a> Chunk<'a> {
        /// Clips `rect` to the frame; `None` when nothing of it is left.
        pub fn from_rect(frame: &'a RgbImage, rect: BoundingRect) -> Option<Self> {
            let x0 = rect.x.max(0) as i64;
            let y0 = rect.y.max(0) as i64;
            let x1 = (rect.x as i64 + rect.width as i64).min(frame.width() as i64);
            let y1 = (rect.y as i64 + rect.height as i64).min(frame.height() as i64);
            if x1 <= x0 || y1 <= y0 {
                return None;
            }

            Some(Self {
                frame,
                rect: BoundingRect {
                    x: x0 as i32,
                    y: y0 as i32,
                    width: (x1 - x0) as u32,
                    height: (y1 - y0) as u32,
                },
            })
        }

        pub fn pixel_count(&self) -> u64 {
            self.rect.area()
        }

        /// Arithmetic mean of each stored channel over the chunk.
        pub fn channel_means(&self) -> [f64; 3] {
            let mut sums = [0u64; 3];
            let (x0, y0) = (self.rect.x as u32, self.rect.y as u32);
            for y in y0..y0 + self.rect.height {
                for x in x0..x0 + self.rect.width {
                    let pixel = self.frame.get_pixel(x, y).0;
                    sums[0] += pixel[0] as u64;
                    sums[1] += pixel[1] as u64;
                    sums[2] += pixel[2] as u64;
                }
            }

            let count = self.pixel_count() as f64;
            sums.map(|sum| sum as f64 / count)
        }

        /// Mean of the three channel means.
        pub fn mean_of_means(&self) -> f64 {
            let means = self.channel_means();
            means.iter().sum::<f64>() / means.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::chunk::Chunk;
    use crate::core_modules::smart_blob::BoundingRect;
    use image::{Rgb, RgbImage};

    fn rect(x: i32, y: i32, width: u32, height: u32) -> BoundingRect {
        BoundingRect { x, y, width, height }
    }

    #[test]
    fn uniform_gray_returns_its_level() {
        let frame = RgbImage::from_pixel(20, 20, Rgb([77, 77, 77]));
        let chunk = Chunk::from_rect(&frame, rect(3, 4, 10, 6)).unwrap();
        assert_eq!(chunk.mean_of_means(), 77.0);
    }

    #[test]
    fn mean_averages_the_channel_means() {
        let frame = RgbImage::from_pixel(4, 4, Rgb([30, 60, 90]));
        let chunk = Chunk::from_rect(&frame, rect(0, 0, 4, 4)).unwrap();
        assert_eq!(chunk.channel_means(), [30.0, 60.0, 90.0]);
        assert_eq!(chunk.mean_of_means(), 60.0);
    }

    #[test]
    fn only_pixels_inside_the_rect_count() {
        let mut frame = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        for y in 2..4 {
            for x in 2..4 {
                frame.put_pixel(x, y, Rgb([200, 100, 0]));
            }
        }
        let chunk = Chunk::from_rect(&frame, rect(2, 2, 2, 2)).unwrap();
        assert_eq!(chunk.pixel_count(), 4);
        assert_eq!(chunk.channel_means(), [200.0, 100.0, 0.0]);
        assert_eq!(chunk.mean_of_means(), 100.0);
    }

    #[test]
    fn rect_is_clipped_to_the_frame() {
        let frame = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let chunk = Chunk::from_rect(&frame, rect(-2, 5, 20, 20)).unwrap();
        assert_eq!(chunk.rect, rect(0, 5, 8, 3));
        assert!(Chunk::from_rect(&frame, rect(9, 9, 3, 3)).is_none());
        assert!(Chunk::from_rect(&frame, rect(1, 1, 0, 4)).is_none());
    }
}
