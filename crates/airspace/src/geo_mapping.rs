use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AirspaceError, Result},
    types::{Polygon, Vertex},
};

/// Geographic extent of the chart image, in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoBounds {
    #[schemars(description = "Latitude of the top edge")]
    pub north: f64,
    #[schemars(description = "Latitude of the bottom edge")]
    pub south: f64,
    #[schemars(description = "Longitude of the right edge")]
    pub east: f64,
    #[schemars(description = "Longitude of the left edge")]
    pub west: f64,
}

impl GeoBounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self { north, south, east, west }
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [self.north, self.south, self.east, self.west]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.north <= self.south || self.east == self.west {
            return Err(AirspaceError::InvalidBounds {
                north: self.north,
                south: self.south,
                east: self.east,
                west: self.west,
            });
        }
        Ok(())
    }
}

/// Linear pixel to latitude/longitude mapping for an axis-aligned chart.
///
/// Pixel `(0, 0)` is the north-west corner and `(width, height)` the
/// south-east corner of the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    bounds: GeoBounds,
    width: u32,
    height: u32,
}

impl GeoTransform {
    pub fn new(bounds: GeoBounds, width: u32, height: u32) -> Result<Self> {
        bounds.validate()?;
        if width == 0 || height == 0 {
            return Err(AirspaceError::InvalidImageDimensions { width, height });
        }
        Ok(Self { bounds, width, height })
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    fn lat_per_pixel(&self) -> f64 {
        (self.bounds.north - self.bounds.south) / f64::from(self.height)
    }

    fn lon_per_pixel(&self) -> f64 {
        (self.bounds.east - self.bounds.west) / f64::from(self.width)
    }

    /// Returns `(lat, lon)`
    pub fn pixel_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let lat = self.bounds.north - y * self.lat_per_pixel();
        let lon = self.bounds.west + x * self.lon_per_pixel();
        (lat, lon)
    }

    /// Fractional pixel `(x, y)` for a geographic position
    pub fn latlon_to_pixel(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = (lon - self.bounds.west) / self.lon_per_pixel();
        let y = (self.bounds.north - lat) / self.lat_per_pixel();
        (x, y)
    }

    pub fn map_pixels(&self, pixels: &[Vertex]) -> Vec<(f64, f64)> {
        pixels
            .iter()
            .map(|&[x, y]| self.pixel_to_latlon(f64::from(x), f64::from(y)))
            .collect()
    }

    pub fn map_polygon(&self, polygon: &Polygon) -> Vec<(f64, f64)> {
        self.map_pixels(&polygon.vertices)
    }
}

/// Map pixel coordinates to `(lat, lon)` for a chart of the given size
pub fn map_pixels_to_latlon(
    pixels: &[Vertex],
    bounds: GeoBounds,
    width: u32,
    height: u32,
) -> Result<Vec<(f64, f64)>> {
    Ok(GeoTransform::new(bounds, width, height)?.map_pixels(pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn chart() -> GeoBounds {
        GeoBounds::new(45.2, 44.5, -0.3, -1.0)
    }

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS
    }

    #[test]
    fn test_corners_map_to_bounds() {
        let transform = GeoTransform::new(chart(), 1000, 800).unwrap();
        assert!(close(transform.pixel_to_latlon(0.0, 0.0), (45.2, -1.0)));
        assert!(close(transform.pixel_to_latlon(1000.0, 800.0), (44.5, -0.3)));
    }

    #[test]
    fn test_chart_center() {
        let mapped = map_pixels_to_latlon(&[[500, 400]], chart(), 1000, 800).unwrap();
        assert_eq!(mapped.len(), 1);
        assert!(close(mapped[0], (44.85, -0.65)), "got {:?}", mapped[0]);
    }

    #[test]
    fn test_order_is_preserved() {
        let transform = GeoTransform::new(chart(), 1000, 800).unwrap();
        let mapped = transform.map_pixels(&[[0, 800], [1000, 0], [0, 0]]);
        assert!(close(mapped[0], (44.5, -1.0)));
        assert!(close(mapped[1], (45.2, -0.3)));
        assert!(close(mapped[2], (45.2, -1.0)));
    }

    #[test]
    fn test_inverse_mapping() {
        let transform = GeoTransform::new(chart(), 1000, 800).unwrap();
        let (lat, lon) = transform.pixel_to_latlon(123.0, 456.0);
        let (x, y) = transform.latlon_to_pixel(lat, lon);
        assert!((x - 123.0).abs() < 1e-6);
        assert!((y - 456.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_bounds() {
        let inverted = GeoBounds::new(44.5, 45.2, -0.3, -1.0);
        assert!(matches!(
            GeoTransform::new(inverted, 100, 100),
            Err(AirspaceError::InvalidBounds { .. })
        ));

        let flat = GeoBounds::new(45.2, 44.5, -1.0, -1.0);
        assert!(matches!(
            GeoTransform::new(flat, 100, 100),
            Err(AirspaceError::InvalidBounds { .. })
        ));

        let nan = GeoBounds::new(f64::NAN, 44.5, -0.3, -1.0);
        assert!(matches!(
            GeoTransform::new(nan, 100, 100),
            Err(AirspaceError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_zero_dimensions() {
        assert!(matches!(
            GeoTransform::new(chart(), 0, 800),
            Err(AirspaceError::InvalidImageDimensions { width: 0, height: 800 })
        ));
    }
}
