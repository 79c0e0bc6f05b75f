use image::RgbaImage;

use crate::{
    AnalysisReport,
    buffer::PixelBuffer,
    detection::{Anomaly, DetectorSet, pipeline::Pipeline},
    error::Result,
    report::visualization::Visualizer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Ready,
    Complete,
}

/// Caller-owned state of one interactive analysis.
///
/// Holds the current buffer, the result of the latest run and whether the
/// overlay is shown. Each run replaces the previous result as a whole.
pub struct AnalysisSession {
    buffer: PixelBuffer,
    report: AnalysisReport,
    overlay_visible: bool,
    status: SessionStatus,
}

impl AnalysisSession {
    pub fn new(buffer: PixelBuffer) -> Self {
        Self {
            buffer,
            report: AnalysisReport::new(Vec::new()),
            overlay_visible: true,
            status: SessionStatus::Ready,
        }
    }

    pub fn analyze(&mut self, pipeline: &Pipeline, enabled: &DetectorSet) -> Result<&AnalysisReport> {
        let anomalies = pipeline.run(&self.buffer, enabled)?;
        self.report = AnalysisReport::new(anomalies);
        self.status = SessionStatus::Complete;
        Ok(&self.report)
    }

    /// Swaps in a new image and drops the previous results.
    pub fn reset(&mut self, buffer: PixelBuffer) {
        self.buffer = buffer;
        self.report = AnalysisReport::new(Vec::new());
        self.status = SessionStatus::Ready;
    }

    pub fn toggle_overlay(&mut self) -> bool {
        self.overlay_visible = !self.overlay_visible;
        self.overlay_visible
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn report(&self) -> &AnalysisReport {
        &self.report
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.report.anomalies
    }

    pub fn composite_score(&self) -> u8 {
        self.report.composite_score
    }

    /// Overlay layer for the current results, or `None` while hidden.
    pub fn overlay(&self, visualizer: &Visualizer) -> Option<RgbaImage> {
        if !self.overlay_visible {
            return None;
        }
        let (width, height) = self.buffer.dimensions();
        Some(visualizer.render_overlay(width, height, self.anomalies()))
    }

    /// Annotated image for export. Ignores overlay visibility.
    pub fn export(&self, visualizer: &Visualizer) -> Result<RgbaImage> {
        visualizer.annotate(&self.buffer, self.anomalies())
    }
}
