//! # Airspace Polygon Extraction Library
//!
//! Extracts airspace boundaries from rasterized aeronautical charts as
//! simplified polygons with their vertex coordinates and measurements, and
//! maps pixel coordinates to latitude/longitude.
//!
//! ## Core Features
//!
//! - **Color classes**: airspace types are recognised by HSV color ranges,
//!   including hue ranges that wrap around red
//! - **Trait-based pipeline**: classification, mask cleaning, contour tracing
//!   and simplification are swappable stages
//! - **Geographic mapping**: linear pixel to lat/lon transform for
//!   axis-aligned charts
//! - **Exports**: JSON report, CSV, plain text, GeoJSON and overlay images
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use airspace::{extract_airspaces, load_image, ExtractionConfig};
//!
//! let chart = load_image("chart.png")?;
//! let collection = extract_airspaces(&chart, &ExtractionConfig::default())?;
//!
//! for (class, polygon) in collection.iter_polygons() {
//!     println!("{class} #{}: {} vertices", polygon.id, polygon.num_vertices);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use airspace::{algorithms::*, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .with_morphology(StructuringElement { shape: StructuringShape::Rect, radius: 1 })
//!     .set_contour_extractor(BoundaryTracer { min_area: 500 })
//!     .with_simplification(0.01, 4)
//!     .parallel(false)
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod config;
pub mod geo_mapping;
pub mod statistics;
pub mod io;
pub mod typed_geojson;

use std::path::Path;

use image::RgbImage;
use tracing::info;

pub use error::{AirspaceError, Result};
pub use types::*;
pub use traits::*;
pub use pipeline::{builder::PipelineBuilder, Pipeline};
pub use config::{ContourTracing, ExtractionConfig};
pub use geo_mapping::{map_pixels_to_latlon, GeoBounds, GeoTransform};
pub use statistics::ClassStatistics;
pub use io::{ExtractionReport, OverlayRenderer, VertexExporter};

/// Decode a chart image from disk as 8-bit RGB
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Validate `config` and run the full extraction over `image`
pub fn extract_airspaces(image: &RgbImage, config: &ExtractionConfig) -> Result<AirspaceCollection> {
    config.validate()?;

    let pipeline = PipelineBuilder::from_config(config).build();
    let collection = pipeline.process(image, &config.classes)?;

    info!(
        classes = collection.classes.len(),
        polygons = collection.total_polygons(),
        width = collection.image_width,
        height = collection.image_height,
        "airspace extraction finished"
    );
    Ok(collection)
}

/// Geographic transform for `collection` when `config` carries chart bounds
pub fn geo_transform_for(config: &ExtractionConfig, collection: &AirspaceCollection) -> Result<Option<GeoTransform>> {
    config
        .chart_bounds
        .map(|bounds| GeoTransform::new(bounds, collection.image_width, collection.image_height))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn paint(image: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                image.put_pixel(x, y, color);
            }
        }
    }

    /// White chart with one blob per default class
    fn create_test_chart() -> RgbImage {
        let mut chart = RgbImage::from_pixel(300, 200, Rgb([255, 255, 255]));
        paint(&mut chart, 10, 10, 60, 50, Rgb([220, 20, 20]));
        paint(&mut chart, 100, 10, 80, 40, Rgb([30, 60, 230]));
        paint(&mut chart, 200, 10, 70, 70, Rgb([40, 200, 40]));
        paint(&mut chart, 10, 100, 90, 60, Rgb([230, 200, 30]));
        paint(&mut chart, 150, 110, 50, 50, Rgb([230, 30, 130]));
        chart
    }

    #[test]
    fn test_default_config_finds_every_class() {
        let collection = extract_airspaces(&create_test_chart(), &ExtractionConfig::default()).unwrap();

        let names: Vec<&str> = collection.class_names().collect();
        assert_eq!(names, vec!["restricted", "controlled", "uncontrolled", "danger", "prohibited"]);
        for class in &collection.classes {
            assert_eq!(class.polygons.len(), 1, "class {}", class.name);
            assert_eq!(class.polygons[0].num_vertices, 4, "class {}", class.name);
        }
        assert_eq!((collection.image_width, collection.image_height), (300, 200));
    }

    #[test]
    fn test_class_without_large_regions_is_empty() {
        let mut chart = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        paint(&mut chart, 20, 20, 10, 10, Rgb([30, 60, 230]));

        let collection = extract_airspaces(&chart, &ExtractionConfig::default()).unwrap();
        assert_eq!(collection.classes.len(), 5);
        assert_eq!(collection.total_polygons(), 0);
        assert!(collection.get("controlled").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_aborts_run() {
        let config = ExtractionConfig {
            min_vertices: 1,
            ..ExtractionConfig::default()
        };
        assert!(matches!(
            extract_airspaces(&create_test_chart(), &config),
            Err(AirspaceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_pixel_center_tracing() {
        let config = ExtractionConfig {
            contour_tracing: ContourTracing::PixelCenters,
            ..ExtractionConfig::default()
        };
        let collection = extract_airspaces(&create_test_chart(), &config).unwrap();
        let controlled = collection.get("controlled").unwrap();
        assert_eq!(controlled.len(), 1);
        assert_eq!(controlled[0].bounding_box, BoundingBox { x: 100, y: 10, width: 80, height: 40 });
    }

    #[test]
    fn test_geo_transform_from_config() {
        let mut config = ExtractionConfig::default();
        let collection = extract_airspaces(&create_test_chart(), &config).unwrap();
        assert!(geo_transform_for(&config, &collection).unwrap().is_none());

        config.chart_bounds = Some(GeoBounds::new(45.2, 44.5, -0.3, -1.0));
        let transform = geo_transform_for(&config, &collection).unwrap().unwrap();
        let (lat, lon) = transform.pixel_to_latlon(150.0, 100.0);
        assert!((lat - 44.85).abs() < 1e-9);
        assert!((lon - -0.65).abs() < 1e-9);
    }

    #[test]
    fn test_load_image_errors() {
        assert!(matches!(
            load_image("/definitely/not/here.png"),
            Err(AirspaceError::ImageLoad(_))
        ));
    }

    #[test]
    fn test_load_image_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        create_test_chart().save(&path).unwrap();

        let chart = load_image(&path).unwrap();
        assert_eq!(chart.dimensions(), (300, 200));
        assert_eq!(*chart.get_pixel(120, 20), Rgb([30, 60, 230]));
    }
}
