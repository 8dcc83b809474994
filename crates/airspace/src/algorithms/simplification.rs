use geo::Simplify;
use tracing::debug;

use crate::{
    traits::PolygonSimplifier,
    types::{Contour, Vertex},
};

pub const DEFAULT_EPSILON_FACTOR: f64 = 0.02;
pub const DEFAULT_MIN_VERTICES: usize = 3;

/// Douglas-Peucker simplifier using geo crate's implementation.
///
/// The tolerance scales with each contour's own perimeter, so small and large
/// regions lose detail in the same proportion.
#[derive(Debug, Clone)]
pub struct DouglasPeuckerSimplifier {
    pub epsilon_factor: f64,
    pub min_vertices: usize,
}

impl Default for DouglasPeuckerSimplifier {
    fn default() -> Self {
        Self {
            epsilon_factor: DEFAULT_EPSILON_FACTOR,
            min_vertices: DEFAULT_MIN_VERTICES,
        }
    }
}

impl DouglasPeuckerSimplifier {
    pub fn new(epsilon_factor: f64, min_vertices: usize) -> Self {
        Self {
            epsilon_factor,
            min_vertices,
        }
    }

    pub fn tolerance(&self, contour: &Contour) -> f64 {
        self.epsilon_factor * contour.arc_length()
    }
}

impl PolygonSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, contour: &Contour) -> Option<Vec<Vertex>> {
        let tolerance = self.tolerance(contour);
        let simplified = contour.to_line_string().simplify(&tolerance);

        // Ring coordinates are original integer points, so rounding is exact
        let mut vertices: Vec<Vertex> = simplified
            .coords()
            .map(|coord| [coord.x.round() as i32, coord.y.round() as i32])
            .collect();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < self.min_vertices {
            debug!(
                vertices = vertices.len(),
                min_vertices = self.min_vertices,
                tolerance,
                "dropping polygon with too few vertices"
            );
            return None;
        }

        Some(vertices)
    }
}
