use std::{collections::HashSet, fs, path::Path};

use schemars::{schema::RootSchema, schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

use crate::{
    algorithms::{
        morphology::StructuringElement,
        simplification::{DEFAULT_EPSILON_FACTOR, DEFAULT_MIN_VERTICES},
        extraction::DEFAULT_MIN_AREA,
    },
    error::{AirspaceError, Result},
    geo_mapping::GeoBounds,
    types::{ColorClass, HsvRange},
};

/// Which boundary tracer the pipeline uses
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContourTracing {
    /// Follow the edges between pixels; contour area equals pixel count
    #[default]
    PixelEdges,
    /// Chain the centers of boundary pixels
    PixelCenters,
}

/// Everything one extraction run needs besides the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Airspace extraction settings")]
pub struct ExtractionConfig {
    #[schemars(description = "Simplification tolerance as a fraction of each contour's perimeter")]
    #[serde(default = "default_epsilon_factor")]
    pub epsilon_factor: f64,

    #[schemars(description = "Polygons with fewer vertices after simplification are dropped")]
    #[serde(default = "default_min_vertices")]
    pub min_vertices: usize,

    #[schemars(description = "Components with a smaller contour area (pixels²) are ignored")]
    #[serde(default = "default_min_area")]
    pub min_area: u32,

    #[serde(default)]
    pub morphology: StructuringElement,

    #[serde(default)]
    pub contour_tracing: ContourTracing,

    #[schemars(description = "Process color classes concurrently")]
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[schemars(description = "Geographic extent of the chart, enables lat/lon output")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_bounds: Option<GeoBounds>,

    #[schemars(description = "Color classes to extract, in output order")]
    #[serde(default = "default_classes")]
    pub classes: Vec<ColorClass>,
}

fn default_epsilon_factor() -> f64 {
    DEFAULT_EPSILON_FACTOR
}

fn default_min_vertices() -> usize {
    DEFAULT_MIN_VERTICES
}

fn default_min_area() -> u32 {
    DEFAULT_MIN_AREA
}

fn default_parallel() -> bool {
    true
}

/// The five chart colors recognised out of the box
pub fn default_classes() -> Vec<ColorClass> {
    vec![
        ColorClass::new("restricted", vec![HsvRange::new([0, 50, 50], [10, 255, 255])])
            .with_color([255, 0, 0]),
        ColorClass::new("controlled", vec![HsvRange::new([100, 50, 50], [130, 255, 255])])
            .with_color([0, 0, 255]),
        ColorClass::new("uncontrolled", vec![HsvRange::new([40, 50, 50], [80, 255, 255])])
            .with_color([0, 255, 0]),
        ColorClass::new("danger", vec![HsvRange::new([20, 50, 50], [40, 255, 255])])
            .with_color([255, 255, 0]),
        ColorClass::new("prohibited", vec![HsvRange::new([160, 50, 50], [180, 255, 255])])
            .with_color([255, 0, 255]),
    ]
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            classes: default_classes(),
            epsilon_factor: DEFAULT_EPSILON_FACTOR,
            min_vertices: DEFAULT_MIN_VERTICES,
            min_area: DEFAULT_MIN_AREA,
            morphology: StructuringElement::default(),
            contour_tracing: ContourTracing::default(),
            parallel: true,
            chart_bounds: None,
        }
    }
}

impl ExtractionConfig {
    /// Reject settings that would produce invalid polygons.
    ///
    /// Every class needs at least one range; ranges that can never match are only logged.
    pub fn validate(&self) -> Result<()> {
        if self.min_vertices < 3 {
            return Err(AirspaceError::InvalidConfig(format!(
                "min_vertices must be at least 3, got {}",
                self.min_vertices
            )));
        }
        if !self.epsilon_factor.is_finite() || self.epsilon_factor < 0.0 {
            return Err(AirspaceError::InvalidConfig(format!(
                "epsilon_factor must be a finite non-negative number, got {}",
                self.epsilon_factor
            )));
        }

        let mut seen = HashSet::new();
        for class in &self.classes {
            if class.name.trim().is_empty() {
                return Err(AirspaceError::InvalidConfig("class name must not be empty".to_string()));
            }
            if !seen.insert(class.name.as_str()) {
                return Err(AirspaceError::InvalidConfig(format!(
                    "duplicate class name '{}'",
                    class.name
                )));
            }
            if class.ranges.is_empty() {
                return Err(AirspaceError::InvalidConfig(format!(
                    "class '{}' has no color ranges",
                    class.name
                )));
            }
            if class.ranges.iter().all(HsvRange::is_empty) {
                warn!(class = %class.name, "class has no usable color range and will never match");
            }
        }

        if let Some(bounds) = &self.chart_bounds {
            bounds.validate()?;
        }

        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ColorClass> {
        self.classes.iter().find(|class| class.name == name)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(AirspaceError::UnsupportedFileFormat(path_ref.display().to_string())),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn schema() -> RootSchema {
        schema_for!(ExtractionConfig)
    }
}
