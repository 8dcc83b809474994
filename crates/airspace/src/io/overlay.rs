use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut, Canvas},
    point::Point,
};
use tracing::debug;

use crate::{
    error::Result,
    types::{AirspaceCollection, ColorClass, Polygon},
};

/// Used for classes without a configured color
pub const FALLBACK_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub line_thickness: u32,
    pub vertex_radius: i32,
    pub centroid_radius: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_thickness: 2,
            vertex_radius: 4,
            centroid_radius: 6,
        }
    }
}

/// Draws extracted polygons on top of the source chart
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    pub style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    /// Copy of `chart` with every polygon outlined in its class color
    pub fn render(&self, chart: &RgbImage, collection: &AirspaceCollection, classes: &[ColorClass]) -> RgbImage {
        let mut canvas = chart.clone();
        for class in &collection.classes {
            let color = class_color(classes, &class.name);
            for polygon in &class.polygons {
                self.draw_polygon(&mut canvas, polygon, color);
            }
        }
        canvas
    }

    /// Copy of `chart` showing a single class
    pub fn render_class(
        &self,
        chart: &RgbImage,
        collection: &AirspaceCollection,
        classes: &[ColorClass],
        class: &str,
    ) -> RgbImage {
        let mut canvas = chart.clone();
        let color = class_color(classes, class);
        for polygon in collection.get(class).unwrap_or_default() {
            self.draw_polygon(&mut canvas, polygon, color);
        }
        canvas
    }

    /// Transparent `width` x `height` image with `polygon` filled and outlined
    pub fn render_polygon(&self, width: u32, height: u32, polygon: &Polygon, color: Rgb<u8>) -> RgbaImage {
        let mut canvas = RgbaImage::new(width, height);
        let [r, g, b] = color.0;
        let color = Rgba([r, g, b, 255]);

        let points: Vec<Point<i32>> = polygon.vertices.iter().map(|&[x, y]| Point::new(x, y)).collect();
        // draw_polygon_mut rejects empty or explicitly closed point lists
        if points.len() >= 3 && points.first() != points.last() {
            draw_polygon_mut(&mut canvas, &points, color);
        }
        self.draw_polygon(&mut canvas, polygon, color);
        canvas
    }

    pub fn draw_polygon<C: Canvas>(&self, canvas: &mut C, polygon: &Polygon, color: C::Pixel) {
        let n = polygon.vertices.len();
        for i in 0..n {
            let [x0, y0] = polygon.vertices[i];
            let [x1, y1] = polygon.vertices[(i + 1) % n];
            self.draw_thick_segment(canvas, (x0 as f32, y0 as f32), (x1 as f32, y1 as f32), color);
        }

        for &[x, y] in &polygon.vertices {
            draw_filled_circle_mut(canvas, (x, y), self.style.vertex_radius, color);
        }

        let [cx, cy] = polygon.centroid;
        draw_filled_circle_mut(canvas, (cx as i32, cy as i32), self.style.centroid_radius, color);
    }

    fn draw_thick_segment<C: Canvas>(&self, canvas: &mut C, start: (f32, f32), end: (f32, f32), color: C::Pixel) {
        // Offset copies along the axis that is most perpendicular to the segment
        let horizontal = (end.0 - start.0).abs() >= (end.1 - start.1).abs();
        for offset in 0..self.style.line_thickness.max(1) {
            let d = offset as f32 - (self.style.line_thickness.max(1) - 1) as f32 / 2.0;
            let (dx, dy) = if horizontal { (0.0, d) } else { (d, 0.0) };
            draw_line_segment_mut(canvas, (start.0 + dx, start.1 + dy), (end.0 + dx, end.1 + dy), color);
        }
    }

    pub fn save<P: AsRef<Path>>(
        &self,
        chart: &RgbImage,
        collection: &AirspaceCollection,
        classes: &[ColorClass],
        path: P,
    ) -> Result<()> {
        self.render(chart, collection, classes).save(path)?;
        Ok(())
    }

    /// One `<class>_all_polygons.png` per non-empty class in `dir`
    pub fn save_class_overlays<P: AsRef<Path>>(
        &self,
        chart: &RgbImage,
        collection: &AirspaceCollection,
        classes: &[ColorClass],
        dir: P,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for class in collection.classes.iter().filter(|class| !class.polygons.is_empty()) {
            let path = dir.join(format!("{}_all_polygons.png", class.name));
            self.render_class(chart, collection, classes, &class.name).save(&path)?;
            debug!(class = %class.name, path = %path.display(), "wrote class overlay");
            written.push(path);
        }
        Ok(written)
    }

    /// One transparent `<class>/<class>_polygon_<id>.png` per polygon in `dir`
    pub fn save_polygon_images<P: AsRef<Path>>(
        &self,
        collection: &AirspaceCollection,
        classes: &[ColorClass],
        dir: P,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut written = Vec::new();

        for class in collection.classes.iter().filter(|class| !class.polygons.is_empty()) {
            let class_dir = dir.join(&class.name);
            fs::create_dir_all(&class_dir)?;
            let color = class_color(classes, &class.name);

            for polygon in &class.polygons {
                let path = class_dir.join(format!("{}_polygon_{:03}.png", class.name, polygon.id));
                self.render_polygon(collection.image_width, collection.image_height, polygon, color)
                    .save(&path)?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

pub fn class_color(classes: &[ColorClass], name: &str) -> Rgb<u8> {
    classes
        .iter()
        .find(|class| class.name == name)
        .and_then(|class| class.color)
        .map(Rgb)
        .unwrap_or(FALLBACK_COLOR)
}
