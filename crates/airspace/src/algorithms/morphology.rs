use image::GrayImage;
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
    algorithms::classification::{BACKGROUND, FOREGROUND},
    error::Result,
    traits::MaskFilter,
    types::RegionMask,
};

/// Shape of the structuring element used for closing/opening
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StructuringShape {
    #[default]
    Ellipse,
    Rect,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StructuringElement {
    #[serde(default)]
    pub shape: StructuringShape,
    #[schemars(description = "Half size of the element; the element spans 2 * radius + 1 pixels")]
    pub radius: u8,
}

impl Default for StructuringElement {
    fn default() -> Self {
        Self {
            shape: StructuringShape::Ellipse,
            radius: 2,
        }
    }
}

impl StructuringElement {
    /// Render the element as a square image, nonzero where the element is set
    pub fn kernel_image(&self) -> GrayImage {
        let r = u32::from(self.radius);
        let size = 2 * r + 1;
        let mut kernel = GrayImage::from_pixel(size, size, BACKGROUND);

        match self.shape {
            StructuringShape::Rect => {
                for pixel in kernel.pixels_mut() {
                    *pixel = FOREGROUND;
                }
            }
            StructuringShape::Cross => {
                for i in 0..size {
                    kernel.put_pixel(r, i, FOREGROUND);
                    kernel.put_pixel(i, r, FOREGROUND);
                }
            }
            StructuringShape::Ellipse => {
                // Row half-widths of an ellipse inscribed in the square
                let radius = f64::from(self.radius);
                for row in 0..size {
                    let dy = f64::from(row) - radius;
                    let half_width = if r == 0 {
                        0
                    } else {
                        (radius * (1.0 - (dy * dy) / (radius * radius)).max(0.0).sqrt()).round() as u32
                    };
                    for col in r.saturating_sub(half_width)..=(r + half_width).min(size - 1) {
                        kernel.put_pixel(col, row, FOREGROUND);
                    }
                }
            }
        }

        kernel
    }

    pub fn to_mask(&self) -> Mask {
        Mask::from_image(&self.kernel_image(), self.radius, self.radius)
    }
}

/// Dilate then erode: bridges gaps narrower than the element
pub fn close(mask: &RegionMask, element: &Mask) -> RegionMask {
    grayscale_erode(&grayscale_dilate(mask, element), element)
}

/// Erode then dilate: removes specks smaller than the element
pub fn open(mask: &RegionMask, element: &Mask) -> RegionMask {
    grayscale_dilate(&grayscale_erode(mask, element), element)
}

/// Closing followed by opening with the same structuring element.
///
/// Closing runs first so nearly touching fragments of one region are merged
/// before opening strips isolated speckle.
#[derive(Debug, Clone, Default)]
pub struct MorphologicalCleaner {
    pub element: StructuringElement,
}

impl MorphologicalCleaner {
    pub fn new(element: StructuringElement) -> Self {
        Self { element }
    }
}

impl MaskFilter for MorphologicalCleaner {
    fn filter(&self, mask: &RegionMask) -> Result<RegionMask> {
        let element = self.element.to_mask();
        Ok(open(&close(mask, &element), &element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(image: &GrayImage) -> Vec<String> {
        (0..image.height())
            .map(|y| {
                (0..image.width())
                    .map(|x| if image.get_pixel(x, y)[0] > 0 { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    fn fill(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, FOREGROUND);
            }
        }
    }

    fn count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p[0] > 0).count()
    }

    #[test]
    fn test_default_ellipse_kernel() {
        let kernel = StructuringElement::default().kernel_image();
        assert_eq!(rows(&kernel), vec!["..#..", "#####", "#####", "#####", "..#.."]);
    }

    #[test]
    fn test_cross_and_rect_kernels() {
        let cross = StructuringElement { shape: StructuringShape::Cross, radius: 1 };
        assert_eq!(rows(&cross.kernel_image()), vec![".#.", "###", ".#."]);

        let rect = StructuringElement { shape: StructuringShape::Rect, radius: 1 };
        assert_eq!(rows(&rect.kernel_image()), vec!["###", "###", "###"]);
    }

    #[test]
    fn test_cleaner_removes_speckle() {
        let mut mask = GrayImage::new(40, 40);
        fill(&mut mask, 5, 5, 20, 20);
        mask.put_pixel(35, 35, FOREGROUND);
        mask.put_pixel(33, 8, FOREGROUND);

        let cleaned = MorphologicalCleaner::default().filter(&mask).unwrap();
        assert_eq!(cleaned.dimensions(), (40, 40));
        assert_eq!(cleaned.get_pixel(35, 35)[0], 0);
        assert_eq!(cleaned.get_pixel(33, 8)[0], 0);
        assert_eq!(cleaned.get_pixel(15, 15)[0], 255);
    }

    #[test]
    fn test_cleaner_bridges_narrow_gap() {
        let mut mask = GrayImage::new(60, 30);
        fill(&mut mask, 5, 5, 20, 20);
        fill(&mut mask, 26, 5, 20, 20);

        let cleaned = MorphologicalCleaner::default().filter(&mask).unwrap();
        for y in 8..22 {
            assert_eq!(cleaned.get_pixel(25, y)[0], 255, "gap not bridged at row {y}");
        }
    }

    #[test]
    fn test_closing_runs_before_opening() {
        // Two 3 px bars one pixel apart: too thin to survive opening on their own
        let mut mask = GrayImage::new(30, 40);
        fill(&mut mask, 10, 5, 3, 30);
        fill(&mut mask, 14, 5, 3, 30);
        let element = StructuringElement::default().to_mask();

        assert_eq!(count(&close(&open(&mask, &element), &element)), 0);

        let cleaned = MorphologicalCleaner::default().filter(&mask).unwrap();
        assert_eq!(cleaned, open(&close(&mask, &element), &element));
        assert!(count(&cleaned) > 0);
        for y in 10..30 {
            assert_eq!(cleaned.get_pixel(13, y)[0], 255, "bars not merged at row {y}");
        }
    }

    #[test]
    fn test_opening_trims_rectangle_corners_only() {
        let mut mask = GrayImage::new(60, 50);
        fill(&mut mask, 10, 10, 40, 30);

        let cleaned = MorphologicalCleaner::default().filter(&mask).unwrap();
        assert_eq!(count(&cleaned), 1200 - 8);
        assert_eq!(cleaned.get_pixel(10, 10)[0], 0);
        assert_eq!(cleaned.get_pixel(10, 11)[0], 255);
        assert_eq!(cleaned.get_pixel(30, 25)[0], 255);
    }

    #[test]
    fn test_empty_mask_stays_empty() {
        let mask = GrayImage::new(16, 16);
        let cleaned = MorphologicalCleaner::default().filter(&mask).unwrap();
        assert_eq!(count(&cleaned), 0);
    }
}
