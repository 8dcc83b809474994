use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{
    error::Result,
    geo_mapping::{GeoBounds, GeoTransform},
    types::{AirspaceCollection, Polygon},
};

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: DateTime<Utc>,
    pub image_path: String,
    pub image_width: u32,
    pub image_height: u32,
    pub total_airspace_types: usize,
    pub total_polygons: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_bounds: Option<GeoBounds>,
}

/// A polygon as written to the report, optionally with `[lat, lon]` vertices
#[derive(Debug, Clone, Serialize)]
pub struct ReportPolygon<'a> {
    #[serde(flatten)]
    pub polygon: &'a Polygon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geographic_vertices: Option<Vec<(f64, f64)>>,
}

/// Polygons keyed by class name, in extraction order
#[derive(Debug, Clone)]
pub struct ReportClasses<'a>(Vec<(&'a str, Vec<ReportPolygon<'a>>)>);

impl Serialize for ReportClasses<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (class, polygons) in &self.0 {
            map.serialize_entry(class, polygons)?;
        }
        map.end()
    }
}

/// JSON document describing one extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport<'a> {
    pub metadata: ReportMetadata,
    pub airspace_polygons: ReportClasses<'a>,
}

impl<'a> ExtractionReport<'a> {
    /// Geographic vertices are added when a transform is supplied
    pub fn new(
        collection: &'a AirspaceCollection,
        image_path: impl Into<String>,
        transform: Option<&GeoTransform>,
    ) -> Self {
        let classes = collection
            .classes
            .iter()
            .map(|class| {
                let polygons = class
                    .polygons
                    .iter()
                    .map(|polygon| ReportPolygon {
                        polygon,
                        geographic_vertices: transform.map(|t| t.map_polygon(polygon)),
                    })
                    .collect();
                (class.name.as_str(), polygons)
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now(),
                image_path: image_path.into(),
                image_width: collection.image_width,
                image_height: collection.image_height,
                total_airspace_types: collection.classes.len(),
                total_polygons: collection.total_polygons(),
                chart_bounds: transform.map(GeoTransform::bounds),
            },
            airspace_polygons: ReportClasses(classes),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AirspaceClass, BoundingBox};
    use serde_json::Value;

    fn collection() -> AirspaceCollection {
        AirspaceCollection {
            classes: vec![
                AirspaceClass {
                    name: "restricted".into(),
                    polygons: vec![Polygon {
                        id: 2,
                        vertices: vec![[0, 0], [1000, 0], [500, 400]],
                        num_vertices: 3,
                        area: 200_000.0,
                        perimeter: 2280.0,
                        bounding_box: BoundingBox { x: 0, y: 0, width: 1000, height: 400 },
                        centroid: [500.0, 133.33],
                        contour_area: 201_000.0,
                    }],
                },
                AirspaceClass { name: "controlled".into(), polygons: vec![] },
            ],
            image_width: 1000,
            image_height: 800,
        }
    }

    #[test]
    fn test_report_layout() {
        let collection = collection();
        let report = ExtractionReport::new(&collection, "chart.png", None);
        let json: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["metadata"]["image_path"], "chart.png");
        assert_eq!(json["metadata"]["total_airspace_types"], 2);
        assert_eq!(json["metadata"]["total_polygons"], 1);
        assert!(json["metadata"].get("chart_bounds").is_none());

        let polygon = &json["airspace_polygons"]["restricted"][0];
        assert_eq!(polygon["id"], 2);
        assert_eq!(polygon["vertices"][2], serde_json::json!([500, 400]));
        assert_eq!(polygon["bounding_box"]["width"], 1000);
        assert!(polygon.get("geographic_vertices").is_none());
        assert_eq!(json["airspace_polygons"]["controlled"], serde_json::json!([]));
    }

    #[test]
    fn test_report_keeps_class_order() {
        let collection = collection();
        let text = ExtractionReport::new(&collection, "chart.png", None).to_json().unwrap();
        let restricted = text.find("\"restricted\"").unwrap();
        let controlled = text.find("\"controlled\"").unwrap();
        assert!(restricted < controlled);
    }

    #[test]
    fn test_report_with_geographic_vertices() {
        let collection = collection();
        let transform = GeoTransform::new(GeoBounds::new(45.2, 44.5, -0.3, -1.0), 1000, 800).unwrap();
        let report = ExtractionReport::new(&collection, "chart.png", Some(&transform));
        let json: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["metadata"]["chart_bounds"]["north"], 45.2);
        let geo = &json["airspace_polygons"]["restricted"][0]["geographic_vertices"];
        assert_eq!(geo.as_array().unwrap().len(), 3);
        let lat = geo[2][0].as_f64().unwrap();
        let lon = geo[2][1].as_f64().unwrap();
        assert!((lat - 44.85).abs() < 1e-9);
        assert!((lon - -0.65).abs() < 1e-9);
    }

    #[test]
    fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airspace_vertices.json");
        let collection = collection();
        ExtractionReport::new(&collection, "chart.png", None).save(&path).unwrap();
        let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(json["metadata"]["timestamp"].is_string());
    }
}
