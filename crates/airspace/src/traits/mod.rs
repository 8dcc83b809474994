use crate::{
    algorithms::classification::HsvImage,
    error::Result,
    types::{ColorClass, Contour, RegionMask, Vertex},
};

/// Trait for turning a color class into a binary region mask
pub trait MaskClassifier: Send + Sync {
    /// Mark every pixel of `image` that belongs to `class`
    fn classify(&self, image: &HsvImage, class: &ColorClass) -> Result<RegionMask>;
}

/// Trait for mask-to-mask filters (noise removal, gap closing)
pub trait MaskFilter: Send + Sync {
    fn filter(&self, mask: &RegionMask) -> Result<RegionMask>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract the outer boundary of every sufficiently large component
    fn extract_contours(&self, mask: &RegionMask) -> Result<Vec<Contour>>;
}

/// Trait for polygon simplification algorithms
pub trait PolygonSimplifier: Send + Sync {
    /// Reduce a contour to polygon vertices, or `None` if too few survive
    fn simplify(&self, contour: &Contour) -> Option<Vec<Vertex>>;
}
