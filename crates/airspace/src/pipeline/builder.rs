use crate::{
    algorithms::{
        classification::HsvRangeClassifier,
        extraction::{BoundaryTracer, ImageprocContourExtractor},
        morphology::{MorphologicalCleaner, StructuringElement},
        simplification::DouglasPeuckerSimplifier,
    },
    config::{ContourTracing, ExtractionConfig},
    pipeline::Pipeline,
    traits::{ContourExtractor, MaskClassifier, MaskFilter, PolygonSimplifier},
};

/// Builder for creating extraction pipelines with a fluent API
pub struct PipelineBuilder {
    classifier: Option<Box<dyn MaskClassifier>>,
    filters: Option<Vec<Box<dyn MaskFilter>>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    simplifier: Option<Box<dyn PolygonSimplifier>>,
    parallel: bool,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            classifier: None,
            filters: None,
            contour_extractor: None,
            simplifier: None,
            parallel: true,
        }
    }

    /// Builder preloaded with every stage described by `config`
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let builder = Self::new()
            .with_morphology(config.morphology)
            .with_simplification(config.epsilon_factor, config.min_vertices)
            .parallel(config.parallel);

        match config.contour_tracing {
            ContourTracing::PixelEdges => builder.set_contour_extractor(BoundaryTracer {
                min_area: config.min_area,
            }),
            ContourTracing::PixelCenters => builder.set_contour_extractor(ImageprocContourExtractor {
                min_area: config.min_area,
            }),
        }
    }

    /// Set the classifier (replaces any existing one)
    pub fn set_classifier<C>(mut self, classifier: C) -> Self
    where
        C: MaskClassifier + 'static,
    {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Add a mask filter; filters run in insertion order
    pub fn add_filter<F>(mut self, filter: F) -> Self
    where
        F: MaskFilter + 'static,
    {
        self.filters.get_or_insert_with(Vec::new).push(Box::new(filter));
        self
    }

    /// Clean masks by closing then opening with `element`
    pub fn with_morphology(self, element: StructuringElement) -> Self {
        self.add_filter(MorphologicalCleaner::new(element))
    }

    /// Skip mask cleaning entirely
    pub fn without_cleaning(mut self) -> Self {
        self.filters = Some(Vec::new());
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the polygon simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: PolygonSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Douglas-Peucker simplification with a perimeter-relative tolerance
    pub fn with_simplification(self, epsilon_factor: f64, min_vertices: usize) -> Self {
        self.set_simplifier(DouglasPeuckerSimplifier::new(epsilon_factor, min_vertices))
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let classifier = self.classifier
            .unwrap_or_else(|| Box::new(HsvRangeClassifier));

        let filters = self.filters.unwrap_or_else(|| {
            let cleaner: Box<dyn MaskFilter> = Box::new(MorphologicalCleaner::default());
            vec![cleaner]
        });

        let contour_extractor = self.contour_extractor
            .unwrap_or_else(|| Box::new(BoundaryTracer::default()));

        let simplifier = self.simplifier
            .unwrap_or_else(|| Box::new(DouglasPeuckerSimplifier::default()));

        Pipeline::new(classifier, filters, contour_extractor, simplifier, self.parallel)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
