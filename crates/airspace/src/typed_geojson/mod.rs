use std::marker::PhantomData;
use serde::{Deserialize, Serialize};
use geojson::{Geometry, JsonObject};
use schemars::JsonSchema;

/// Properties for airspace polygon features
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[schemars(description = "Properties for airspace polygon features")]
pub struct AirspaceProperties {
    #[schemars(description = "Polygon id, unique within its class")]
    pub id: u32,
    #[schemars(description = "Airspace class the polygon was extracted for")]
    pub class: String,
    #[schemars(description = "Number of polygon vertices")]
    pub num_vertices: usize,
    #[schemars(description = "Area of the simplified polygon in square pixels")]
    pub area: f64,
    #[schemars(description = "Area enclosed by the traced contour in square pixels")]
    pub contour_area: f64,
    #[schemars(description = "Perimeter of the traced contour in pixels")]
    pub perimeter: f64,
    #[schemars(description = "Mean of the pixel vertex coordinates")]
    pub centroid: [f64; 2],
}

/// Type alias for airspace GeoJSON
pub type AirspaceGeoJson = TypedGeoJson<AirspaceProperties>;

/// A typed GeoJSON Feature that is generic over its properties.
#[derive(Serialize, Deserialize, Debug)]
pub struct TypedFeature<P> {
    #[serde(flatten)]
    pub feature: geojson::Feature,
    #[serde(skip)]
    _properties: PhantomData<P>,
}

impl<P> TypedFeature<P>
where
    for<'de> P: Serialize + Deserialize<'de>,
{
    /// Creates a new TypedFeature.
    pub fn new(geometry: Option<Geometry>, properties: P) -> Self {
        Self::from_feature(geojson::Feature {
            bbox: None,
            geometry,
            id: None,
            properties: serde_json::to_value(properties).ok().and_then(|v| v.as_object().cloned()),
            foreign_members: None,
        })
    }

    /// Wrap an untyped feature; properties are checked lazily on access
    pub fn from_feature(feature: geojson::Feature) -> Self {
        Self {
            feature,
            _properties: PhantomData,
        }
    }

    /// Tries to access the typed properties of the feature.
    pub fn properties(&self) -> Option<P> {
        self.feature.properties.as_ref().and_then(|p| {
            serde_json::from_value(serde_json::Value::Object(p.clone())).ok()
        })
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TypedFeatureCollection<P> {
    pub bbox: Option<Vec<f64>>,
    pub features: Vec<TypedFeature<P>>,
    pub foreign_members: Option<JsonObject>,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum TypedGeoJson<P> {
    Geometry(Geometry),
    Feature(TypedFeature<P>),
    FeatureCollection(TypedFeatureCollection<P>),
}

impl<P> TypedGeoJson<P> {
    /// Get the underlying FeatureCollection if this is a FeatureCollection variant
    pub fn as_feature_collection(&self) -> Option<&TypedFeatureCollection<P>> {
        match self {
            TypedGeoJson::FeatureCollection(fc) => Some(fc),
            _ => None,
        }
    }

    /// Convert to FeatureCollection, consuming self
    pub fn into_feature_collection(self) -> Option<TypedFeatureCollection<P>> {
        match self {
            TypedGeoJson::FeatureCollection(fc) => Some(fc),
            _ => None,
        }
    }
}

impl<P> TypedFeatureCollection<P> {
    /// Get the number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Get features as a slice
    pub fn features(&self) -> &[TypedFeature<P>] {
        &self.features
    }

    /// Plain GeoJSON collection for writing
    pub fn into_untyped(self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: self.bbox,
            features: self.features.into_iter().map(|f| f.feature).collect(),
            foreign_members: self.foreign_members,
        }
    }
}

impl<P> From<geojson::FeatureCollection> for TypedFeatureCollection<P> {
    fn from(collection: geojson::FeatureCollection) -> Self {
        Self {
            bbox: collection.bbox,
            features: collection
                .features
                .into_iter()
                .map(|feature| TypedFeature {
                    feature,
                    _properties: PhantomData,
                })
                .collect(),
            foreign_members: collection.foreign_members,
        }
    }
}

impl AirspaceGeoJson {
    fn features_where(&self, predicate: impl Fn(&AirspaceProperties) -> bool) -> Vec<&TypedFeature<AirspaceProperties>> {
        match self.as_feature_collection() {
            Some(fc) => fc
                .features
                .iter()
                .filter(|feature| feature.properties().is_some_and(|props| predicate(&props)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Get features extracted for one airspace class
    pub fn features_by_class(&self, class: &str) -> Vec<&TypedFeature<AirspaceProperties>> {
        self.features_where(|props| props.class == class)
    }

    /// Get features by area range
    pub fn features_by_area_range(&self, min_area: f64, max_area: f64) -> Vec<&TypedFeature<AirspaceProperties>> {
        self.features_where(|props| props.area >= min_area && props.area <= max_area)
    }

    /// Get the largest feature by area
    pub fn largest_feature(&self) -> Option<&TypedFeature<AirspaceProperties>> {
        self.as_feature_collection()?
            .features
            .iter()
            .max_by(|a, b| {
                let area_a = a.properties().map(|p| p.area).unwrap_or(0.0);
                let area_b = b.properties().map(|p| p.area).unwrap_or(0.0);
                area_a.total_cmp(&area_b)
            })
    }

    /// Get metadata from foreign members
    pub fn image_dimensions(&self) -> Option<(u32, u32)> {
        let foreign = self.as_feature_collection()?.foreign_members.as_ref()?;
        let width = foreign.get("image_width")?.as_u64()? as u32;
        let height = foreign.get("image_height")?.as_u64()? as u32;
        Some((width, height))
    }

    /// Get polygon count from foreign members
    pub fn polygon_count(&self) -> Option<usize> {
        self.as_feature_collection()?
            .foreign_members
            .as_ref()?
            .get("polygon_count")?
            .as_u64()
            .map(|v| v as usize)
    }
}
