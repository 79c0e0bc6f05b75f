use std::path::Path;

use image::DynamicImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    detection::{pipeline::Pipeline, scoring::{composite_score, scale_fill_percent}},
    error::Result,
    image_utils::fit_to_canvas,
};

pub mod analysis;
pub mod buffer;
pub mod detection;
pub mod error;
pub mod image_utils;
pub mod report;
pub mod session;

pub use buffer::PixelBuffer;
pub use detection::{Anomaly, AnomalyKind, Detector, DetectorSet, RenderHint, SuspicionLevel};
pub use error::GlitchError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detectors: DetectorSet,
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detectors: DetectorSet::all(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new().with_parallel(self.parallel)
    }
}

pub struct GlitchAnalyzer {
    buffer: PixelBuffer,
    config: AnalysisConfig,
    path: Option<String>,
}

impl GlitchAnalyzer {
    /// Decodes an image file at its native resolution.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let image = image::open(&path)?;
        debug!("loaded {} ({}x{})", path_str, image.width(), image.height());

        Ok(Self {
            buffer: PixelBuffer::from_dynamic_image(&image)?,
            config: AnalysisConfig::default(),
            path: Some(path_str),
        })
    }

    /// Decodes an image file and letterboxes it into a fixed analysis canvas.
    pub fn open_fitted<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let image = image::open(&path)?;
        let canvas = fit_to_canvas(&image, width, height);

        Ok(Self {
            buffer: PixelBuffer::from_rgba_image(&canvas)?,
            config: AnalysisConfig::default(),
            path: Some(path_str),
        })
    }

    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        Ok(Self::from_buffer(PixelBuffer::from_dynamic_image(image)?))
    }

    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            buffer,
            config: AnalysisConfig::default(),
            path: None,
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Runs a single heuristic regardless of the configured set.
    pub fn detect(&self, kind: AnomalyKind) -> Result<Vec<Anomaly>> {
        self.config
            .pipeline()
            .run(&self.buffer, &DetectorSet::empty().with(kind))
    }

    pub fn analyze(&self) -> Result<AnalysisReport> {
        let anomalies = self.config.pipeline().run(&self.buffer, &self.config.detectors)?;
        Ok(AnalysisReport::new(anomalies))
    }
}

/// Ranked anomalies of one run together with their composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub anomalies: Vec<Anomaly>,
    pub composite_score: u8,
}

impl AnalysisReport {
    pub fn new(anomalies: Vec<Anomaly>) -> Self {
        let composite_score = composite_score(&anomalies);
        Self {
            anomalies,
            composite_score,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn scale_fill_percent(&self) -> u8 {
        scale_fill_percent(self.composite_score)
    }

    pub fn count_of(&self, kind: AnomalyKind) -> usize {
        self.anomalies.iter().filter(|a| a.kind == kind).count()
    }
}
