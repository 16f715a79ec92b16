// THEORY:
// The mask cleaner removes sensor speckle from the thresholded mask and fills
// small holes inside the surviving regions. It runs four binary morphology
// passes with two elliptical structuring elements of different sizes:
//
//   1. erode  (small)  \  asymmetric "opening": specks vanish, survivors
//   2. dilate (large)  /  regrow past their original extent
//   3. dilate (small)  \  asymmetric "closing": gaps fill, then the
//   4. erode  (large)  /  region shrinks back
//
// The order and the two sizes are part of the tracker's observable behavior and
// must not be collapsed into a plain open/close with one kernel.
//
// Pixels outside the image never influence the result: erosion treats them as
// selected and dilation treats them as empty, so regions touching the border are
// not eaten away from the outside.

use crate::core_modules::threshold::{NOT_SELECTED, SELECTED};
use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

/// Largest element side `Mask` can hold.
pub const MAX_ELEMENT_SIZE: u32 = 511;

/// An elliptical structuring element. The ellipse is rasterized into a small
/// binary image first, then handed to imageproc as a centered `Mask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    shape: GrayImage,
    mask: Mask,
}

impl StructuringElement {
    /// Builds a `size` x `size` ellipse inscribed in its bounding square.
    pub fn ellipse(size: u32) -> Self {
        let size = size.clamp(1, MAX_ELEMENT_SIZE);
        let radius = (size / 2) as i32;
        let inverse_radius_sq = if radius > 0 {
            1.0 / (radius * radius) as f64
        } else {
            0.0
        };

        let mut shape = GrayImage::new(size, size);
        for row in 0..size as i32 {
            let dy = row - radius;
            let half_width = (radius as f64
                * (((radius * radius - dy * dy) as f64) * inverse_radius_sq).sqrt())
            .round() as i32;
            let first = (radius - half_width).max(0);
            let last = (radius + half_width).min(size as i32 - 1);
            for col in first..=last {
                shape.put_pixel(col as u32, row as u32, Luma([SELECTED]));
            }
        }

        // radius <= 255 because size <= MAX_ELEMENT_SIZE.
        let mask = Mask::from_image(&shape, radius as u8, radius as u8);
        Self { shape, mask }
    }

    #[cfg(test)]
    fn size(&self) -> u32 {
        self.shape.width()
    }

    #[cfg(test)]
    fn contains(&self, dx: i32, dy: i32) -> bool {
        let radius = (self.shape.width() / 2) as i32;
        let (col, row) = (dx + radius, dy + radius);
        let side = self.shape.width() as i32;
        (0..side).contains(&col)
            && (0..side).contains(&row)
            && self.shape.get_pixel(col as u32, row as u32).0[0] != NOT_SELECTED
    }

    /// Number of pixels covered by the element.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.shape.pixels().filter(|p| p.0[0] != NOT_SELECTED).count()
    }
}

/// A pixel survives only if every in-frame pixel under the element is selected.
pub fn erode(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    grayscale_erode(mask, &element.mask)
}

/// A pixel becomes selected if any in-frame pixel under the element is selected.
pub fn dilate(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    grayscale_dilate(mask, &element.mask)
}

/// Holds the two structuring elements so they are built once per tracker.
#[derive(Debug, Clone)]
pub struct MaskCleaner {
    small: StructuringElement,
    large: StructuringElement,
}

impl MaskCleaner {
    pub fn new(small_size: u32, large_size: u32) -> Self {
        Self {
            small: StructuringElement::ellipse(small_size),
            large: StructuringElement::ellipse(large_size),
        }
    }

    /// Runs the four-pass cleanup in place.
    pub fn clean(&self, mask: &mut GrayImage) {
        clean_mask(mask, &self.small, &self.large);
    }
}

pub fn clean_mask(mask: &mut GrayImage, small: &StructuringElement, large: &StructuringElement) {
    // --- Opening: drop specks, regrow survivors ---
    *mask = erode(mask, small);
    *mask = dilate(mask, large);

    // --- Closing: fill gaps, shrink back ---
    *mask = dilate(mask, small);
    *mask = erode(mask, large);
}
