pub mod builder;

use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    algorithms::{analysis::GeometryAnalyzer, classification::HsvImage},
    error::Result,
    traits::{ContourExtractor, MaskClassifier, MaskFilter, PolygonSimplifier},
    types::{AirspaceClass, AirspaceCollection, ColorClass},
};

/// Per-class extraction chain: classify, clean, trace, simplify, measure.
///
/// Every class runs the same chain against one shared HSV conversion of the
/// chart, so classes never observe each other.
pub struct Pipeline {
    classifier: Box<dyn MaskClassifier>,
    filters: Vec<Box<dyn MaskFilter>>,
    contour_extractor: Box<dyn ContourExtractor>,
    simplifier: Box<dyn PolygonSimplifier>,
    analyzer: GeometryAnalyzer,
    parallel: bool,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        classifier: Box<dyn MaskClassifier>,
        filters: Vec<Box<dyn MaskFilter>>,
        contour_extractor: Box<dyn ContourExtractor>,
        simplifier: Box<dyn PolygonSimplifier>,
        parallel: bool,
    ) -> Self {
        Self {
            classifier,
            filters,
            contour_extractor,
            simplifier,
            analyzer: GeometryAnalyzer,
            parallel,
        }
    }

    /// Extract the polygons of every class, keeping the order of `classes`
    pub fn process(&self, image: &RgbImage, classes: &[ColorClass]) -> Result<AirspaceCollection> {
        let hsv = HsvImage::from_rgb(image);

        let classes = if self.parallel {
            classes
                .par_iter()
                .map(|class| self.process_class(&hsv, class))
                .collect::<Result<Vec<_>>>()?
        } else {
            classes
                .iter()
                .map(|class| self.process_class(&hsv, class))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(AirspaceCollection {
            classes,
            image_width: image.width(),
            image_height: image.height(),
        })
    }

    /// Run the chain for a single class against an already converted image
    pub fn process_class(&self, image: &HsvImage, class: &ColorClass) -> Result<AirspaceClass> {
        let mut mask = self.classifier.classify(image, class)?;
        for filter in &self.filters {
            mask = filter.filter(&mask)?;
        }

        let contours = self.contour_extractor.extract_contours(&mask)?;
        debug!(class = %class.name, contours = contours.len(), "traced contours");

        // Ids follow contour order, so a dropped contour leaves a gap
        let polygons: Vec<_> = contours
            .iter()
            .zip(1u32..)
            .filter_map(|(contour, id)| {
                let vertices = self.simplifier.simplify(contour)?;
                Some(self.analyzer.analyze(id, vertices, contour))
            })
            .collect();

        info!(class = %class.name, polygons = polygons.len(), "extracted airspace polygons");

        Ok(AirspaceClass {
            name: class.name.clone(),
            polygons,
        })
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: 1 classifier, {} mask filters, 1 contour extractor, 1 simplifier, parallel={}",
            self.filters.len(),
            self.parallel
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithms::{extraction::BoundaryTracer, simplification::DouglasPeuckerSimplifier},
        types::HsvRange,
    };
    use image::Rgb;

    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn paint(image: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                image.put_pixel(x, y, color);
            }
        }
    }

    fn blue_class() -> ColorClass {
        ColorClass::new("controlled", vec![HsvRange::new([100, 50, 50], [130, 255, 255])])
    }

    fn red_class() -> ColorClass {
        ColorClass::new("restricted", vec![HsvRange::new([0, 50, 50], [10, 255, 255])])
    }

    #[test]
    fn test_rectangle_becomes_quadrilateral() {
        let mut image = RgbImage::from_pixel(100, 80, Rgb([255, 255, 255]));
        paint(&mut image, 10, 20, 40, 30, BLUE);

        let collection = Pipeline::builder()
            .without_cleaning()
            .build()
            .process(&image, &[blue_class()])
            .unwrap();

        let polygons = collection.get("controlled").unwrap();
        assert_eq!(polygons.len(), 1);
        let polygon = &polygons[0];
        assert_eq!(polygon.id, 1);
        assert_eq!(polygon.num_vertices, 4);
        assert!((polygon.area - 1200.0).abs() <= 60.0, "area {}", polygon.area);
    }

    #[test]
    fn test_cleaning_keeps_rectangle_shape() {
        let mut image = RgbImage::from_pixel(100, 80, Rgb([255, 255, 255]));
        paint(&mut image, 10, 20, 40, 30, BLUE);

        let collection = Pipeline::builder().build().process(&image, &[blue_class()]).unwrap();
        let polygons = collection.get("controlled").unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].num_vertices, 4);
        // Opening rounds off the corner pixels
        assert!((polygons[0].area - 1200.0).abs() <= 120.0, "area {}", polygons[0].area);
        assert_eq!(polygons[0].contour_area, 1192.0);
    }

    #[test]
    fn test_small_blob_yields_empty_class() {
        let mut image = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
        paint(&mut image, 5, 5, 10, 10, BLUE);

        let collection = Pipeline::builder().build().process(&image, &[blue_class()]).unwrap();
        assert_eq!(collection.classes.len(), 1);
        assert!(collection.get("controlled").unwrap().is_empty());
        assert_eq!(collection.total_polygons(), 0);
    }

    #[test]
    fn test_classes_keep_configuration_order() {
        let mut image = RgbImage::from_pixel(120, 120, Rgb([255, 255, 255]));
        paint(&mut image, 5, 5, 50, 50, RED);
        paint(&mut image, 60, 60, 50, 40, BLUE);

        let classes = [blue_class(), red_class()];
        let collection = Pipeline::builder().build().process(&image, &classes).unwrap();
        let names: Vec<&str> = collection.class_names().collect();
        assert_eq!(names, vec!["controlled", "restricted"]);
        assert_eq!(collection.get("controlled").unwrap().len(), 1);
        assert_eq!(collection.get("restricted").unwrap().len(), 1);
        assert_eq!((collection.image_width, collection.image_height), (120, 120));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut image = RgbImage::from_pixel(160, 120, Rgb([255, 255, 255]));
        paint(&mut image, 5, 5, 50, 50, RED);
        paint(&mut image, 70, 10, 60, 35, BLUE);
        paint(&mut image, 20, 70, 120, 40, BLUE);

        let classes = [red_class(), blue_class()];
        let parallel = Pipeline::builder().parallel(true).build().process(&image, &classes).unwrap();
        let sequential = Pipeline::builder().parallel(false).build().process(&image, &classes).unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.get("controlled").unwrap().len(), 2);
    }

    #[test]
    fn test_dropped_polygon_leaves_id_gap() {
        let mut image = RgbImage::from_pixel(120, 60, Rgb([255, 255, 255]));
        paint(&mut image, 5, 5, 40, 40, BLUE);
        for y in 0..60u32 {
            for x in 0..120u32 {
                let (dx, dy) = (x as i32 - 80, y as i32 - 30);
                if dx * dx + dy * dy <= 25 * 25 {
                    image.put_pixel(x, y, BLUE);
                }
            }
        }

        // The square simplifies to 4 vertices and falls below the threshold
        let pipeline = Pipeline::builder()
            .set_contour_extractor(BoundaryTracer::default())
            .set_simplifier(DouglasPeuckerSimplifier::new(0.02, 5))
            .build();
        let collection = pipeline.process(&image, &[blue_class()]).unwrap();
        let polygons = collection.get("controlled").unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].id, 2);
        assert!(polygons[0].num_vertices >= 5);
    }

    #[test]
    fn test_polygon_invariants_hold() {
        let mut image = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
        for y in 0..200u32 {
            for x in 0..200u32 {
                let (dx, dy) = (x as i32 - 100, y as i32 - 100);
                if dx * dx + dy * dy <= 70 * 70 {
                    image.put_pixel(x, y, RED);
                }
            }
        }
        paint(&mut image, 150, 5, 45, 30, BLUE);

        let collection = Pipeline::builder()
            .build()
            .process(&image, &[red_class(), blue_class()])
            .unwrap();

        for (_, polygon) in collection.iter_polygons() {
            assert_eq!(polygon.num_vertices, polygon.vertices.len());
            assert!(polygon.num_vertices >= 3);
            assert!(polygon.area >= 0.0 && polygon.perimeter >= 0.0);
            let n = polygon.vertices.len() as f64;
            let mean_x = polygon.vertices.iter().map(|v| f64::from(v[0])).sum::<f64>() / n;
            let mean_y = polygon.vertices.iter().map(|v| f64::from(v[1])).sum::<f64>() / n;
            assert!((polygon.centroid[0] - mean_x).abs() < 1e-9);
            assert!((polygon.centroid[1] - mean_y).abs() < 1e-9);
        }
        assert_eq!(collection.total_polygons(), 2);
    }
}
