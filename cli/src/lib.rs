use std::path::{Path, PathBuf};

use airspace::{
    io::{ExtractionReport, OverlayRenderer, VertexExporter},
    AirspaceCollection, AirspaceError, ExtractionConfig, GeoTransform,
};
use image::RgbImage;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Airspace(#[from] AirspaceError),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Chart bounds need all of --north, --south, --east and --west")]
    IncompleteBounds,
    #[error("Invalid pixel coordinate '{0}', expected X,Y")]
    InvalidPixel(String),
}

/// Files the `extract` command can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Txt,
    Geojson,
    Overlay,
    /// One overlay per airspace class
    Classes,
    /// One transparent image per polygon, grouped by class
    Polygons,
}

impl OutputFormat {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputFormat::Json => "airspace_vertices.json",
            OutputFormat::Csv => "airspace_vertices.csv",
            OutputFormat::Txt => "vertex_coordinates.txt",
            OutputFormat::Geojson => "airspace_polygons.geojson",
            OutputFormat::Overlay => "airspace_polygons_visualization.png",
            OutputFormat::Classes => "by_airspace_type",
            OutputFormat::Polygons => "individual_polygons",
        }
    }
}

/// Everything produced by one `extract` invocation
pub struct ExtractionRun<'a> {
    pub image_path: &'a Path,
    pub chart: &'a RgbImage,
    pub config: &'a ExtractionConfig,
    pub collection: &'a AirspaceCollection,
    pub transform: Option<GeoTransform>,
}

impl ExtractionRun<'_> {
    /// Write each requested format into `output_dir`, returning the written paths.
    ///
    /// Image-set formats write into a subdirectory and return each image.
    pub fn write_outputs(&self, formats: &[OutputFormat], output_dir: &Path) -> Result<Vec<PathBuf>, CliError> {
        std::fs::create_dir_all(output_dir)?;

        let renderer = OverlayRenderer::default();
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            let path = output_dir.join(format.default_file_name());
            match format {
                OutputFormat::Json => {
                    let image_path = self.image_path.display().to_string();
                    ExtractionReport::new(self.collection, image_path, self.transform.as_ref()).save(&path)?;
                }
                OutputFormat::Csv => VertexExporter::save_csv(self.collection, &path)?,
                OutputFormat::Txt => VertexExporter::save_text_report(self.collection, &path)?,
                OutputFormat::Geojson => self.collection.save_geojson(&path, self.transform.as_ref())?,
                OutputFormat::Overlay => renderer.save(self.chart, self.collection, &self.config.classes, &path)?,
                OutputFormat::Classes => {
                    let images = renderer.save_class_overlays(self.chart, self.collection, &self.config.classes, &path)?;
                    info!("Wrote {} class overlays to {}", images.len(), path.display());
                    written.extend(images);
                    continue;
                }
                OutputFormat::Polygons => {
                    let images = renderer.save_polygon_images(self.collection, &self.config.classes, &path)?;
                    info!("Wrote {} polygon images to {}", images.len(), path.display());
                    written.extend(images);
                    continue;
                }
            }
            info!("Wrote {} output to {}", format, path.display());
            written.push(path);
        }

        Ok(written)
    }
}

/// Parse an `X,Y` pixel argument
pub fn parse_pixel(value: &str) -> Result<[i32; 2], CliError> {
    let invalid = || CliError::InvalidPixel(value.to_string());
    let (x, y) = value.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok([x, y])
}
