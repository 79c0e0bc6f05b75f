use log::{debug, info, warn};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    buffer::PixelBuffer,
    detection::{Anomaly, Detector, DetectorSet, registry::DetectorRegistry, scoring::composite_score},
    error::Result,
};

/// Runs the enabled detectors over a buffer and ranks the merged output.
///
/// Every call recomputes the full list; nothing is cached between runs.
pub struct Pipeline {
    registry: DetectorRegistry,
    parallel: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            registry: DetectorRegistry::new(),
            parallel: true,
        }
    }

    pub fn with_registry(mut self, registry: DetectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Detectors run on the rayon pool when enabled. Output is identical
    /// either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    /// Ranked anomalies, highest score first. Ties keep detector order and
    /// then scan order.
    pub fn run(&self, buffer: &PixelBuffer, enabled: &DetectorSet) -> Result<Vec<Anomaly>> {
        if let Err(e) = buffer.validate() {
            warn!("rejecting buffer before analysis: {}", e);
            return Err(e);
        }

        let detectors = self.registry.enabled(enabled).collect::<Vec<_>>();

        let outputs = if self.parallel && detectors.len() > 1 {
            detectors
                .par_iter()
                .map(|detector| Self::run_detector(*detector, buffer))
                .collect::<Vec<_>>()
        } else {
            detectors
                .iter()
                .map(|detector| Self::run_detector(*detector, buffer))
                .collect::<Vec<_>>()
        };

        let mut anomalies = outputs.into_iter().flatten().collect::<Vec<_>>();
        anomalies.sort_by(|a, b| b.score.cmp(&a.score));

        info!(
            "analyzed {}x{} buffer with {} detector(s): {} anomalies, composite {}",
            buffer.width(),
            buffer.height(),
            detectors.len(),
            anomalies.len(),
            composite_score(&anomalies)
        );

        Ok(anomalies)
    }

    fn run_detector(detector: &dyn Detector, buffer: &PixelBuffer) -> Vec<Anomaly> {
        let found = detector.detect(buffer);
        debug!("{}: {} anomalies", detector.name(), found.len());
        found
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
