use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{AirspaceCollection, Polygon};

/// Summary figures for the polygons of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassStatistics {
    pub class: String,
    pub num_polygons: usize,
    pub avg_area: f64,
    pub min_area: f64,
    pub max_area: f64,
    pub avg_perimeter: f64,
    pub avg_vertices: f64,
    pub min_vertices: usize,
    pub max_vertices: usize,
}

impl ClassStatistics {
    /// `None` when the class has no polygons
    pub fn from_polygons(class: &str, polygons: &[Polygon]) -> Option<Self> {
        if polygons.is_empty() {
            return None;
        }
        let n = polygons.len() as f64;

        let areas = polygons.iter().map(|p| p.area);
        let min_area = areas.clone().fold(f64::INFINITY, f64::min);
        let max_area = areas.clone().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            class: class.to_string(),
            num_polygons: polygons.len(),
            avg_area: areas.sum::<f64>() / n,
            min_area,
            max_area,
            avg_perimeter: polygons.iter().map(|p| p.perimeter).sum::<f64>() / n,
            avg_vertices: polygons.iter().map(|p| p.num_vertices as f64).sum::<f64>() / n,
            min_vertices: polygons.iter().map(|p| p.num_vertices).min().unwrap_or(0),
            max_vertices: polygons.iter().map(|p| p.num_vertices).max().unwrap_or(0),
        })
    }
}

impl AirspaceCollection {
    /// Statistics for every class that produced at least one polygon
    pub fn statistics(&self) -> Vec<ClassStatistics> {
        self.classes
            .iter()
            .filter_map(|class| ClassStatistics::from_polygons(&class.name, &class.polygons))
            .collect()
    }
}
