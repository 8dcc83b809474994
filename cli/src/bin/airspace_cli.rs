use clap::{Args, Parser, Subcommand};
use cli::{parse_pixel, CliError, ExtractionRun, OutputFormat};
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

use airspace::{
    extract_airspaces, geo_transform_for, load_image, ExtractionConfig, GeoBounds, GeoTransform,
    VertexExporter,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct BoundsArgs {
    /// Latitude of the chart's top edge
    #[arg(long, allow_hyphen_values = true)]
    north: Option<f64>,
    /// Latitude of the chart's bottom edge
    #[arg(long, allow_hyphen_values = true)]
    south: Option<f64>,
    /// Longitude of the chart's right edge
    #[arg(long, allow_hyphen_values = true)]
    east: Option<f64>,
    /// Longitude of the chart's left edge
    #[arg(long, allow_hyphen_values = true)]
    west: Option<f64>,
}

impl BoundsArgs {
    fn to_bounds(self) -> Result<Option<GeoBounds>, CliError> {
        match (self.north, self.south, self.east, self.west) {
            (Some(north), Some(south), Some(east), Some(west)) => {
                Ok(Some(GeoBounds::new(north, south, east, west)))
            }
            (None, None, None, None) => Ok(None),
            _ => Err(CliError::IncompleteBounds),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract airspace polygons from a chart image
    Extract {
        /// Path to the chart image
        #[arg(short, long)]
        input: PathBuf,
        /// Extraction settings (.toml or .json); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory for the generated files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Comma separated outputs: json, csv, txt, geojson, overlay, classes, polygons
        #[arg(short, long, value_delimiter = ',', default_value = "json,csv,txt")]
        formats: Vec<OutputFormat>,
        /// Print every polygon's vertices
        #[arg(long)]
        print: bool,
        /// Print per-class statistics
        #[arg(long)]
        stats: bool,
        #[command(flatten)]
        bounds: BoundsArgs,
    },
    /// Convert pixel coordinates to latitude/longitude
    Map {
        /// Pixel coordinates as X,Y
        #[arg(required = true, allow_hyphen_values = true)]
        pixels: Vec<String>,
        /// Image width in pixels
        #[arg(long)]
        width: u32,
        /// Image height in pixels
        #[arg(long)]
        height: u32,
        #[command(flatten)]
        bounds: BoundsArgs,
    },
    /// Write the default extraction settings to a file
    InitConfig {
        /// Destination (.toml or .json)
        #[arg(short, long, default_value = "airspace.toml")]
        output: PathBuf,
    },
    /// Print the JSON schema of the settings file
    Schema {
        /// Write the schema to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            config,
            output_dir,
            formats,
            print,
            stats,
            bounds,
        } => {
            extract(&input, config.as_deref(), &output_dir, &formats, print, stats, bounds)?;
        }
        Commands::Map {
            pixels,
            width,
            height,
            bounds,
        } => {
            map(&pixels, width, height, bounds)?;
        }
        Commands::InitConfig { output } => {
            init_config(&output)?;
        }
        Commands::Schema { output } => {
            let schema = serde_json::to_string_pretty(&ExtractionConfig::schema())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, schema)?;
                    info!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
        }
    }

    Ok(())
}

fn extract(
    input: &Path,
    config_path: Option<&Path>,
    output_dir: &Path,
    formats: &[OutputFormat],
    print: bool,
    stats: bool,
    bounds: BoundsArgs,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ExtractionConfig::from_file(path)?,
        None => ExtractionConfig::default(),
    };
    if let Some(bounds) = bounds.to_bounds()? {
        config.chart_bounds = Some(bounds);
    }

    info!("Loading chart: {}", input.display());
    let chart = load_image(input)?;
    let collection = extract_airspaces(&chart, &config)?;

    for class in &collection.classes {
        if class.polygons.is_empty() {
            warn!("No polygons found for {}", class.name);
        }
    }

    let run = ExtractionRun {
        image_path: input,
        chart: &chart,
        config: &config,
        transform: geo_transform_for(&config, &collection)?,
        collection: &collection,
    };
    run.write_outputs(formats, output_dir)?;

    if print {
        println!("{}", VertexExporter::to_text_report(&collection));
    }
    if stats {
        println!("{}", VertexExporter::to_statistics_report(&collection.statistics()));
    }

    info!(
        "✅ Extracted {} polygons across {} classes",
        collection.total_polygons(),
        collection.classes.len()
    );
    Ok(())
}

fn map(pixels: &[String], width: u32, height: u32, bounds: BoundsArgs) -> Result<()> {
    let bounds = bounds.to_bounds()?.ok_or(CliError::IncompleteBounds)?;
    let transform = GeoTransform::new(bounds, width, height)?;

    for raw in pixels {
        let [x, y] = parse_pixel(raw)?;
        let (lat, lon) = transform.pixel_to_latlon(f64::from(x), f64::from(y));
        println!("({x}, {y}) -> lat {lat:.6}, lon {lon:.6}");
    }
    Ok(())
}

fn init_config(output: &Path) -> Result<()> {
    let config = ExtractionConfig::default();
    match output.extension().and_then(|ext| ext.to_str()) {
        Some("json") => std::fs::write(output, config.to_json()?)?,
        _ => config.to_toml_file(output)?,
    }
    info!("Default configuration written to {}", output.display());
    Ok(())
}
