use std::{fs, path::Path};

use crate::{error::Result, statistics::ClassStatistics, types::AirspaceCollection};

pub const CSV_HEADER: &str = "Airspace_Type,Polygon_ID,Vertex_Index,X,Y,Area,Perimeter";

const RULE_WIDTH: usize = 50;

/// Export extracted polygons to line-oriented text formats
pub struct VertexExporter;

impl VertexExporter {
    /// One CSV row per vertex, polygon area and perimeter repeated on each row
    pub fn to_csv(collection: &AirspaceCollection) -> String {
        let mut output = String::from(CSV_HEADER);
        output.push('\n');

        for (class, polygon) in collection.iter_polygons() {
            for (i, [x, y]) in polygon.vertices.iter().enumerate() {
                output.push_str(&format!(
                    "{},{},{},{},{},{:.1},{:.1}\n",
                    csv_field(class),
                    polygon.id,
                    i + 1,
                    x,
                    y,
                    polygon.area,
                    polygon.perimeter
                ));
            }
        }

        output
    }

    /// Human-readable listing of every polygon and its vertices
    pub fn to_text_report(collection: &AirspaceCollection) -> String {
        let mut output = String::new();
        output.push_str("AIRSPACE VERTEX COORDINATES\n");
        output.push_str(&format!("{}\n\n", "=".repeat(RULE_WIDTH)));

        for class in &collection.classes {
            if class.polygons.is_empty() {
                continue;
            }

            output.push_str(&format!("AIRSPACE TYPE: {}\n", class.name.to_uppercase()));
            output.push_str(&format!("{}\n", "-".repeat(40)));

            for polygon in &class.polygons {
                output.push_str(&format!("\nPolygon ID: {}\n", polygon.id));
                output.push_str(&format!("Vertices: {}\n", polygon.num_vertices));
                output.push_str(&format!("Area: {:.0} px²\n", polygon.area));
                output.push_str(&format!("Perimeter: {:.0} px\n", polygon.perimeter));
                output.push_str(&format!(
                    "Centroid: ({:.1}, {:.1})\n",
                    polygon.centroid[0], polygon.centroid[1]
                ));
                output.push_str("Vertex coordinates:\n");
                for (i, [x, y]) in polygon.vertices.iter().enumerate() {
                    output.push_str(&format!("  Vertex {}: ({}, {})\n", i + 1, x, y));
                }
            }

            output.push_str(&format!("\n{}\n\n", "=".repeat(RULE_WIDTH)));
        }

        output
    }

    /// Summary table of per-class statistics
    pub fn to_statistics_report(statistics: &[ClassStatistics]) -> String {
        let mut output = String::new();
        output.push_str("POLYGON STATISTICS\n");
        output.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));

        for stat in statistics {
            output.push_str(&format!("\n{}:\n", stat.class.to_uppercase()));
            output.push_str(&format!("  Polygons: {}\n", stat.num_polygons));
            output.push_str(&format!("  Average area: {:.0} px²\n", stat.avg_area));
            output.push_str(&format!("  Area (min/max): {:.0} / {:.0} px²\n", stat.min_area, stat.max_area));
            output.push_str(&format!("  Average perimeter: {:.0} px\n", stat.avg_perimeter));
            output.push_str(&format!("  Average vertices: {:.1}\n", stat.avg_vertices));
            output.push_str(&format!("  Vertices (min/max): {} / {}\n", stat.min_vertices, stat.max_vertices));
        }

        output
    }

    pub fn save_csv<P: AsRef<Path>>(collection: &AirspaceCollection, path: P) -> Result<()> {
        fs::write(path, Self::to_csv(collection))?;
        Ok(())
    }

    pub fn save_text_report<P: AsRef<Path>>(collection: &AirspaceCollection, path: P) -> Result<()> {
        fs::write(path, Self::to_text_report(collection))?;
        Ok(())
    }
}

/// Quote a field when it would break the row
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
