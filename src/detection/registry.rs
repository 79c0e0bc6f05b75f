use crate::{
    analysis::{
        ColorDeviationDetector, CompressionArtifactDetector, ContourDetector, EdgeDetector,
        PatternDetector,
    },
    detection::{AnomalyKind, Detector, DetectorSet},
};

/// Maps each anomaly kind to the detector that produces it.
///
/// Entries are kept in declaration order of [`AnomalyKind::ALL`], which is
/// the order the pipeline concatenates their outputs in.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorRegistry {
    /// Registry holding the five built-in heuristics.
    pub fn new() -> Self {
        Self::from_detectors(vec![
            Box::new(EdgeDetector::new()),
            Box::new(ColorDeviationDetector::new()),
            Box::new(PatternDetector::new()),
            Box::new(CompressionArtifactDetector::new()),
            Box::new(ContourDetector::new()),
        ])
    }

    /// Builds a registry from arbitrary detectors. A later detector of the
    /// same kind replaces an earlier one.
    pub fn from_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        let mut registry = Self { detectors: Vec::with_capacity(detectors.len()) };
        for detector in detectors {
            registry.register(detector);
        }
        registry
    }

    pub fn register(&mut self, detector: Box<dyn Detector>) {
        let kind = detector.kind();
        self.detectors.retain(|d| d.kind() != kind);
        self.detectors.push(detector);
        self.detectors.sort_by_key(|d| d.kind());
    }

    pub fn get(&self, kind: AnomalyKind) -> Option<&dyn Detector> {
        self.detectors
            .iter()
            .find(|d| d.kind() == kind)
            .map(|d| d.as_ref())
    }

    /// Detectors enabled by `set`, in declaration order.
    pub fn enabled<'a>(&'a self, set: &'a DetectorSet) -> impl Iterator<Item = &'a dyn Detector> + 'a {
        self.detectors
            .iter()
            .filter(move |d| set.contains(d.kind()))
            .map(|d| d.as_ref())
    }

    pub fn kinds(&self) -> DetectorSet {
        self.detectors.iter().map(|d| d.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
