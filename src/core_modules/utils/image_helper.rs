// Frame plumbing around the pipeline: wrapping host buffers, the debug renderer
// that swaps the caller's frame for the cleaned mask, and PNG export of masks.

pub mod image_helper {
    use crate::error::{Result, TrackerError};
    use image::{DynamicImage, GrayImage, ImageEncoder, RgbImage};
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    const FRAME_CHANNELS: usize = 3;

    /// Wraps a packed three-byte-per-pixel host buffer as a frame.
    pub fn frame_from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<DynamicImage> {
        let expected = width as usize * height as usize * FRAME_CHANNELS;
        let actual = bytes.len();
        // `from_raw` accepts oversized buffers, so the length is checked exactly first.
        if actual != expected {
            return Err(TrackerError::BufferSize { expected, actual });
        }
        RgbImage::from_raw(width, height, bytes)
            .map(DynamicImage::ImageRgb8)
            .ok_or(TrackerError::BufferSize { expected, actual })
    }

    /// Debug renderer: the caller's color frame is replaced by the single-channel mask.
    pub fn render_mask(frame: &mut DynamicImage, mask: GrayImage) {
        *frame = DynamicImage::ImageLuma8(mask);
    }

    pub fn save_mask(path: impl AsRef<Path>, mask: &GrayImage) -> Result<()> {
        let output = BufWriter::new(File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            mask.as_raw(),
            mask.width(),
            mask.height(),
            image::ExtendedColorType::L8,
        )?;

        Ok(())
    }
}
