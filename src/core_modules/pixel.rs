// THEORY (Color-Space Conversion):
// The `pixel` module is the first stage of the tracker. It maps each RGB pixel of a
// frame onto a Hue-Saturation-Value triple, which separates "what color" (hue) from
// "how vivid" (saturation) and "how bright" (value). Thresholding on hue is far less
// sensitive to lighting changes than thresholding raw RGB.
//
// Encoding (8-bit packed HSV, the convention vision toolkits use for byte images):
// - Value:      V = max(R, G, B)
// - Saturation: S = 255 * (V - min(R, G, B)) / V, and 0 for black
// - Hue:        the hue angle in degrees halved, so [0, 360) fits into [0, 180)
//
// Threshold bounds supplied by callers are expressed in these same units.
//
// Key principles:
// 1) Single-pixel scope: conversion never reads neighbors.
// 2) The caller decides the byte order of the frame (`ChannelOrder`); the
//    converter only needs to know which byte is red and which is blue.

pub mod pixel {
    use image::{ImageBuffer, Rgb, RgbImage};
    use serde::{Deserialize, Serialize};

    pub type Channel = u8;
    pub type Hue = u8;
    pub type Saturation = u8;
    pub type Value = u8;

    /// An image whose three channels hold (hue, saturation, value).
    pub type HsvImage = ImageBuffer<Rgb<Channel>, Vec<Channel>>;

    /// Number of distinct packed hue values, i.e. 360 degrees / 2.
    pub const HUE_RANGE: i32 = 180;

    /// Byte order of the three color channels stored in a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ChannelOrder {
        /// red, green, blue (the `image` crate convention).
        #[default]
        Rgb,
        /// blue, green, red (common for buffers coming from capture libraries).
        Bgr,
    }

    impl ChannelOrder {
        /// Reorders stored bytes into (red, green, blue).
        #[inline]
        pub fn to_red_green_blue(self, bytes: [Channel; 3]) -> (Channel, Channel, Channel) {
            match self {
                ChannelOrder::Rgb => (bytes[0], bytes[1], bytes[2]),
                ChannelOrder::Bgr => (bytes[2], bytes[1], bytes[0]),
            }
        }
    }

    /// A single pixel in packed HSV form.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HsvPixel {
        /// Hue in [0, 180), half of the angle on the color wheel.
        pub hue: Hue,
        /// Saturation in [0, 255]; 0 for grays.
        pub saturation: Saturation,
        /// Value in [0, 255]; the brightest of the three channels.
        pub value: Value,
    }

    impl HsvPixel {
        pub fn from_rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            let (r, g, b) = (red as i32, green as i32, blue as i32);
            let maximum_channel = r.max(g).max(b);
            let minimum_channel = r.min(g).min(b);
            let chroma = maximum_channel - minimum_channel;

            let saturation = if maximum_channel == 0 {
                0
            } else {
                (255.0 * chroma as f32 / maximum_channel as f32).round() as Saturation
            };

            let hue = if chroma == 0 {
                0
            } else {
                // Offset of the hue inside the color wheel, in units of chroma/60 degrees.
                let sector_position = if maximum_channel == r {
                    g - b
                } else if maximum_channel == g {
                    b - r + 2 * chroma
                } else {
                    r - g + 4 * chroma
                };

                let mut packed = (30.0 * sector_position as f32 / chroma as f32).round() as i32;
                if packed < 0 {
                    packed += HUE_RANGE;
                }
                if packed >= HUE_RANGE {
                    packed -= HUE_RANGE;
                }
                packed as Hue
            };

            HsvPixel {
                hue,
                saturation,
                value: maximum_channel as Value,
            }
        }

        /// Converts three stored bytes, honoring the frame's channel order.
        pub fn from_bytes(bytes: [Channel; 3], order: ChannelOrder) -> Self {
            let (red, green, blue) = order.to_red_green_blue(bytes);
            Self::from_rgb(red, green, blue)
        }

        pub fn channels(&self) -> [Channel; 3] {
            [self.hue, self.saturation, self.value]
        }
    }

    /// Converts a whole frame into its HSV representation.
    /// The output is a fresh buffer with the same dimensions as `frame`.
    pub fn to_hsv(frame: &RgbImage, order: ChannelOrder) -> HsvImage {
        let mut hsv = HsvImage::new(frame.width(), frame.height());
        for (source, target) in frame.pixels().zip(hsv.pixels_mut()) {
            *target = Rgb(HsvPixel::from_bytes(source.0, order).channels());
        }
        hsv
    }
}
