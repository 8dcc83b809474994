use std::{fs, path::Path};

use geojson::{feature::Id, FeatureCollection, Geometry, Value};

use crate::{
    error::Result,
    geo_mapping::GeoTransform,
    typed_geojson::{AirspaceGeoJson, AirspaceProperties, TypedFeature, TypedFeatureCollection, TypedGeoJson},
    types::{AirspaceCollection, Polygon},
};

/// Closed exterior ring, in pixels or as `[lon, lat]` when a transform is given
fn polygon_ring(polygon: &Polygon, transform: Option<&GeoTransform>) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = match transform {
        Some(transform) => transform
            .map_polygon(polygon)
            .into_iter()
            .map(|(lat, lon)| vec![lon, lat])
            .collect(),
        None => polygon
            .vertices
            .iter()
            .map(|&[x, y]| vec![f64::from(x), f64::from(y)])
            .collect(),
    };
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

impl AirspaceCollection {
    /// Export to typed GeoJSON format
    pub fn to_typed_geojson(&self, transform: Option<&GeoTransform>) -> Result<AirspaceGeoJson> {
        Ok(TypedGeoJson::FeatureCollection(self.typed_features(transform)))
    }

    fn typed_features(&self, transform: Option<&GeoTransform>) -> TypedFeatureCollection<AirspaceProperties> {
        let features = self
            .iter_polygons()
            .map(|(class, polygon)| {
                let geometry = Geometry::new(Value::Polygon(vec![polygon_ring(polygon, transform)]));
                let properties = AirspaceProperties {
                    id: polygon.id,
                    class: class.to_string(),
                    num_vertices: polygon.num_vertices,
                    area: polygon.area,
                    contour_area: polygon.contour_area,
                    perimeter: polygon.perimeter,
                    centroid: polygon.centroid,
                };
                let mut feature = TypedFeature::new(Some(geometry), properties);
                feature.feature.id = Some(Id::String(format!("{class}_{}", polygon.id)));
                feature
            })
            .collect();

        TypedFeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(self.foreign_members(transform)),
        }
    }

    fn foreign_members(&self, transform: Option<&GeoTransform>) -> serde_json::Map<String, serde_json::Value> {
        let mut foreign_members = serde_json::Map::new();
        foreign_members.insert("image_width".to_string(), self.image_width.into());
        foreign_members.insert("image_height".to_string(), self.image_height.into());
        foreign_members.insert("polygon_count".to_string(), self.total_polygons().into());
        foreign_members.insert(
            "coordinates".to_string(),
            if transform.is_some() { "geographic" } else { "pixel" }.into(),
        );
        foreign_members
    }

    pub fn to_geojson(&self, transform: Option<&GeoTransform>) -> Result<FeatureCollection> {
        Ok(self.typed_features(transform).into_untyped())
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self, transform: Option<&GeoTransform>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson(transform)?)?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson<P: AsRef<Path>>(&self, path: P, transform: Option<&GeoTransform>) -> Result<()> {
        fs::write(path, self.to_geojson_string(transform)?)?;
        Ok(())
    }
}

/// Load a previously exported airspace GeoJSON file
pub fn load_airspace_geojson<P: AsRef<Path>>(path: P) -> Result<AirspaceGeoJson> {
    let collection: FeatureCollection = fs::read_to_string(path)?.parse()?;
    Ok(TypedGeoJson::FeatureCollection(collection.into()))
}
