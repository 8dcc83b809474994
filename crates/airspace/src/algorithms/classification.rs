use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use tracing::warn;

use crate::{
    error::Result,
    traits::MaskClassifier,
    types::{ColorClass, Hsv, RegionMask, HUE_PERIOD},
};

pub const FOREGROUND: Luma<u8> = Luma([255]);
pub const BACKGROUND: Luma<u8> = Luma([0]);

/// Convert an 8-bit RGB pixel to 8-bit HSV (hue halved to fit `[0, 180)`).
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> Hsv {
    let [r, g, b] = pixel.0.map(f32::from);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let degrees = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };
    let hue = ((degrees / 2.0).round() as u16) % HUE_PERIOD;

    Hsv {
        h: hue as u8,
        s: saturation.round() as u8,
        v: max as u8,
    }
}

/// The source chart converted once to HSV; channels hold hue, saturation, value.
#[derive(Debug, Clone)]
pub struct HsvImage {
    pixels: RgbImage,
}

impl HsvImage {
    pub fn from_rgb(image: &RgbImage) -> Self {
        let pixels = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            let hsv = rgb_to_hsv(*image.get_pixel(x, y));
            Rgb([hsv.h, hsv.s, hsv.v])
        });
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Hsv {
        let Rgb([h, s, v]) = *self.pixels.get_pixel(x, y);
        Hsv { h, s, v }
    }
}

/// Marks pixels falling inside any of a class's HSV ranges
#[derive(Debug, Clone, Default)]
pub struct HsvRangeClassifier;

impl MaskClassifier for HsvRangeClassifier {
    fn classify(&self, image: &HsvImage, class: &ColorClass) -> Result<RegionMask> {
        for range in class.ranges.iter().filter(|range| range.is_empty()) {
            warn!(
                class = %class.name,
                lower = ?range.lower,
                upper = ?range.upper,
                "color range is empty on saturation or value and matches no pixel"
            );
        }

        let (width, height) = image.dimensions();
        Ok(GrayImage::from_fn(width, height, |x, y| {
            if class.contains(image.get_pixel(x, y)) {
                FOREGROUND
            } else {
                BACKGROUND
            }
        }))
    }
}
