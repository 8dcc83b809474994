use std::collections::HashSet;

use image::{ImageBuffer, Luma};
use imageproc::{
    contours::{find_contours, BorderType},
    region_labelling::{connected_components, Connectivity},
};
use tracing::debug;

use crate::{
    error::Result,
    traits::ContourExtractor,
    types::{BoundaryKind, Contour, RegionMask, Vertex},
};

pub const DEFAULT_MIN_AREA: u32 = 1000;

type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Direction of travel along pixel edges, in image coordinates (y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    East,
    South,
    West,
    North,
}

impl Heading {
    fn delta(self) -> (i64, i64) {
        match self {
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
            Heading::North => (0, -1),
        }
    }

    fn right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
            Heading::North => Heading::East,
        }
    }

    fn left(self) -> Self {
        match self {
            Heading::East => Heading::North,
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
        }
    }
}

/// Outer boundary tracer that walks the edges between pixels.
///
/// Components are 8-connected; the traced ring runs along pixel corners, so
/// its shoelace area is the component's pixel count (holes included).
#[derive(Debug, Clone)]
pub struct BoundaryTracer {
    pub min_area: u32,
}

impl Default for BoundaryTracer {
    fn default() -> Self {
        Self { min_area: DEFAULT_MIN_AREA }
    }
}

impl ContourExtractor for BoundaryTracer {
    fn extract_contours(&self, mask: &RegionMask) -> Result<Vec<Contour>> {
        let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

        let mut traced = HashSet::new();
        let mut contours = Vec::new();

        // Raster order: the first pixel seen of a label is its top-left-most one
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0];
            if label == 0 || !traced.insert(label) {
                continue;
            }

            let contour = Contour::new(trace_outer_boundary(&labels, label, x, y), BoundaryKind::PixelEdges);
            let area = contour.area();
            if area < f64::from(self.min_area) {
                debug!(label, area, min_area = self.min_area, "discarding small component");
                continue;
            }
            contours.push(contour);
        }

        Ok(contours)
    }
}

/// Walk the outer boundary of `label` clockwise (on screen), keeping the
/// component on the right-hand side and recording only the corners.
fn trace_outer_boundary(labels: &LabelImage, label: u32, start_x: u32, start_y: u32) -> Vec<Vertex> {
    let (width, height) = labels.dimensions();
    let inside = |px: i64, py: i64| {
        px >= 0
            && py >= 0
            && px < i64::from(width)
            && py < i64::from(height)
            && labels.get_pixel(px as u32, py as u32)[0] == label
    };

    // Pixel whose square touches `vertex` and lies towards `ahead` and `side`
    let pixel_towards = |vertex: (i64, i64), ahead: Heading, side: Heading| {
        let (ax, ay) = ahead.delta();
        let (sx, sy) = side.delta();
        (vertex.0 + ax.min(0) + sx.min(0), vertex.1 + ay.min(0) + sy.min(0))
    };

    let start = (i64::from(start_x), i64::from(start_y));
    let mut vertex = start;
    let mut heading = Heading::East;
    let mut corners = vec![[start_x as i32, start_y as i32]];

    loop {
        let (dx, dy) = heading.delta();
        vertex = (vertex.0 + dx, vertex.1 + dy);

        let (lx, ly) = pixel_towards(vertex, heading, heading.left());
        let (rx, ry) = pixel_towards(vertex, heading, heading.right());
        // Turning left when the ahead-left pixel is set joins diagonal neighbours
        let next = if inside(lx, ly) {
            heading.left()
        } else if inside(rx, ry) {
            heading
        } else {
            heading.right()
        };

        if vertex == start && next == Heading::East {
            break;
        }
        if next != heading {
            corners.push([vertex.0 as i32, vertex.1 as i32]);
        }
        heading = next;
    }

    corners
}

/// Imageproc-based contour extractor producing boundary pixel chains
#[derive(Debug, Clone)]
pub struct ImageprocContourExtractor {
    pub min_area: u32,
}

impl Default for ImageprocContourExtractor {
    fn default() -> Self {
        Self { min_area: DEFAULT_MIN_AREA }
    }
}

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, mask: &RegionMask) -> Result<Vec<Contour>> {
        let contours = find_contours::<i32>(mask)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer)
            .map(|contour| {
                let points = contour.points.iter().map(|p| [p.x, p.y]).collect();
                Contour::new(points, BoundaryKind::PixelCenters)
            })
            .filter(|contour| {
                let keep = contour.area() >= f64::from(self.min_area);
                if !keep {
                    debug!(area = contour.area(), min_area = self.min_area, "discarding small contour");
                }
                keep
            })
            .collect();

        Ok(contours)
    }
}
