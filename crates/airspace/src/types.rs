use geo::{Area, EuclideanLength};
use geo_types::{Coord, LineString, Polygon as GeoPolygon};
use schemars::JsonSchema;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

/// Integer pixel coordinate `[x, y]`
pub type Vertex = [i32; 2];

/// Binary mask, 0 = background, 255 = foreground
pub type RegionMask = image::GrayImage;

/// Hue wraps at this value (8-bit HSV convention, hue = degrees / 2)
pub const HUE_PERIOD: u16 = 180;

/// A pixel in 8-bit HSV space: hue in `[0, 180)`, saturation and value in `[0, 255]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

/// Inclusive bounds on each HSV channel.
///
/// When `lower[0] > upper[0]` the hue interval wraps through the end of the
/// hue scale, so `[170, ..] .. [10, ..]` covers 170..=179 and 0..=10.
/// Saturation and value never wrap: a reversed bound there matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HsvRange {
    #[schemars(description = "Lower [hue, saturation, value] bound (inclusive)")]
    pub lower: [u8; 3],
    #[schemars(description = "Upper [hue, saturation, value] bound (inclusive)")]
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn hue_wraps(&self) -> bool {
        self.lower[0] > self.upper[0]
    }

    /// True when no pixel can ever fall inside the range
    pub fn is_empty(&self) -> bool {
        self.lower[1] > self.upper[1] || self.lower[2] > self.upper[2]
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        let hue_ok = if self.hue_wraps() {
            hsv.h >= self.lower[0] || hsv.h <= self.upper[0]
        } else {
            (self.lower[0]..=self.upper[0]).contains(&hsv.h)
        };

        hue_ok
            && (self.lower[1]..=self.upper[1]).contains(&hsv.s)
            && (self.lower[2]..=self.upper[2]).contains(&hsv.v)
    }
}

/// A named airspace class and the colors that paint it on the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColorClass {
    #[schemars(description = "Airspace class name, unique within a configuration")]
    pub name: String,
    #[schemars(description = "RGB color used when drawing the class on an overlay")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
    #[schemars(description = "HSV intervals; a pixel matching any of them belongs to the class")]
    pub ranges: Vec<HsvRange>,
}

impl ColorClass {
    pub fn new(name: impl Into<String>, ranges: Vec<HsvRange>) -> Self {
        Self {
            name: name.into(),
            ranges,
            color: None,
        }
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        self.ranges.iter().any(|range| range.contains(hsv))
    }
}

/// How contour points relate to the pixel grid
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BoundaryKind {
    /// Points are pixel corners; the ring encloses whole pixels
    #[default]
    PixelEdges,
    /// Points are the centers of the component's boundary pixels
    PixelCenters,
}

/// Closed outer boundary of one connected component
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Vertex>,
    pub kind: BoundaryKind,
}

impl Contour {
    pub fn new(points: Vec<Vertex>, kind: BoundaryKind) -> Self {
        Self { points, kind }
    }

    /// Closed ring as a geo-types line string (first point repeated at the end)
    pub fn to_line_string(&self) -> LineString<f64> {
        ring_from_vertices(&self.points)
    }

    /// Enclosed area from the shoelace formula
    pub fn area(&self) -> f64 {
        shoelace_area(&self.points)
    }

    /// Length of the closed boundary
    pub fn arc_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.to_line_string().euclidean_length()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let Some(&[first_x, first_y]) = self.points.first() else {
            return BoundingBox::default();
        };

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first_x, first_y, first_x, first_y);
        for &[x, y] in &self.points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        // A boundary pixel chain covers one pixel past its last center
        let pad = match self.kind {
            BoundaryKind::PixelEdges => 0,
            BoundaryKind::PixelCenters => 1,
        };

        BoundingBox {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + pad) as u32,
            height: (max_y - min_y + pad) as u32,
        }
    }
}

/// Absolute shoelace area of the closed ring through `vertices`
pub fn shoelace_area(vertices: &[Vertex]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    GeoPolygon::new(ring_from_vertices(vertices), vec![]).unsigned_area()
}

pub(crate) fn ring_from_vertices(vertices: &[Vertex]) -> LineString<f64> {
    let mut ring: LineString<f64> = vertices
        .iter()
        .map(|&[x, y]| Coord {
            x: f64::from(x),
            y: f64::from(y),
        })
        .collect();
    ring.close();
    ring
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn contains(&self, [x, y]: [f64; 2]) -> bool {
        x >= f64::from(self.x)
            && y >= f64::from(self.y)
            && x <= f64::from(self.x) + f64::from(self.width)
            && y <= f64::from(self.y) + f64::from(self.height)
    }
}

/// A simplified airspace outline with its measured properties.
///
/// `area` is measured on the simplified vertices, while `perimeter`,
/// `bounding_box` and `contour_area` come from the traced contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Polygon {
    /// 1-based index of the originating contour within its class
    pub id: u32,
    pub vertices: Vec<Vertex>,
    pub num_vertices: usize,
    /// Shoelace area of the simplified polygon, in pixels²
    pub area: f64,
    /// Arc length of the traced contour, in pixels
    pub perimeter: f64,
    pub bounding_box: BoundingBox,
    /// Mean of the vertex coordinates
    pub centroid: [f64; 2],
    /// Shoelace area of the traced contour, in pixels²
    pub contour_area: f64,
}

impl Polygon {
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        GeoPolygon::new(ring_from_vertices(&self.vertices), vec![])
    }
}

/// All polygons detected for one color class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AirspaceClass {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

/// Output of one pipeline run: polygons grouped by class, in configuration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AirspaceCollection {
    pub classes: Vec<AirspaceClass>,
    /// Original image dimensions
    pub image_width: u32,
    pub image_height: u32,
}

/// One vertex of one polygon, flattened for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VertexRecord {
    pub class: String,
    pub polygon_id: u32,
    /// 1-based position within the polygon
    pub vertex_index: usize,
    pub x: i32,
    pub y: i32,
}

impl AirspaceCollection {
    pub fn get(&self, class: &str) -> Option<&[Polygon]> {
        self.classes
            .iter()
            .find(|c| c.name == class)
            .map(|c| c.polygons.as_slice())
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    /// Iterate `(class name, polygon)` pairs in output order
    pub fn iter_polygons(&self) -> impl Iterator<Item = (&str, &Polygon)> {
        self.classes
            .iter()
            .flat_map(|c| c.polygons.iter().map(move |p| (c.name.as_str(), p)))
    }

    pub fn total_polygons(&self) -> usize {
        self.classes.iter().map(|c| c.polygons.len()).sum()
    }

    pub fn vertex_records(&self) -> Vec<VertexRecord> {
        self.iter_polygons()
            .flat_map(|(class, polygon)| {
                polygon
                    .vertices
                    .iter()
                    .enumerate()
                    .map(move |(i, &[x, y])| VertexRecord {
                        class: class.to_string(),
                        polygon_id: polygon.id,
                        vertex_index: i + 1,
                        x,
                        y,
                    })
            })
            .collect()
    }

    /// Serializable view mapping class name to polygons, keeping class order
    pub fn polygons_by_class(&self) -> PolygonsByClass<'_> {
        PolygonsByClass(&self.classes)
    }
}

pub struct PolygonsByClass<'a>(&'a [AirspaceClass]);

impl Serialize for PolygonsByClass<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for class in self.0 {
            map.serialize_entry(&class.name, &class.polygons)?;
        }
        map.end()
    }
}
