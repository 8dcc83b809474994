use crate::types::{shoelace_area, Contour, Polygon, Vertex};

/// Measures a simplified polygon against the contour it came from
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryAnalyzer;

impl GeometryAnalyzer {
    pub fn analyze(&self, id: u32, vertices: Vec<Vertex>, contour: &Contour) -> Polygon {
        Polygon {
            id,
            num_vertices: vertices.len(),
            area: shoelace_area(&vertices),
            perimeter: contour.arc_length(),
            bounding_box: contour.bounding_box(),
            centroid: centroid(&vertices),
            contour_area: contour.area(),
            vertices,
        }
    }
}

/// Arithmetic mean of the vertices, `(0, 0)` for an empty list
pub fn centroid(vertices: &[Vertex]) -> [f64; 2] {
    if vertices.is_empty() {
        return [0.0, 0.0];
    }
    let n = vertices.len() as f64;
    let (sum_x, sum_y) = vertices.iter().fold((0.0, 0.0), |(sx, sy), &[x, y]| {
        (sx + f64::from(x), sy + f64::from(y))
    });
    [sum_x / n, sum_y / n]
}
