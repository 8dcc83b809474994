pub mod geojson;
pub mod overlay;
pub mod report;
pub mod text;

pub use self::geojson::load_airspace_geojson;
pub use overlay::{class_color, OverlayRenderer, OverlayStyle};
pub use report::ExtractionReport;
pub use text::VertexExporter;
