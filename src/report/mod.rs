pub mod visualization;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{AnalysisReport, AnomalyKind, SuspicionLevel, error::{GlitchError, Result}};

#[derive(Serialize)]
pub struct JsonReport {
    pub composite_score: u8,
    pub scale_fill_percent: u8,
    pub anomaly_count: usize,
    pub counts_by_kind: BTreeMap<String, usize>,
    pub anomalies: Vec<AnomalyEntry>,
}

#[derive(Serialize)]
pub struct AnomalyEntry {
    /// 1-based display position in the ranked list.
    pub index: usize,
    pub kind: String,
    pub score: u8,
    pub suspicion: SuspicionLevel,
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub region_width: f64,
    pub region_height: f64,
    pub color: String,
}

impl From<&AnalysisReport> for JsonReport {
    fn from(report: &AnalysisReport) -> Self {
        let counts_by_kind = AnomalyKind::ALL
            .iter()
            .map(|kind| (kind.label().to_string(), report.count_of(*kind)))
            .filter(|(_, count)| *count > 0)
            .collect();

        Self {
            composite_score: report.composite_score,
            scale_fill_percent: report.scale_fill_percent(),
            anomaly_count: report.anomalies.len(),
            counts_by_kind,
            anomalies: report
                .anomalies
                .iter()
                .enumerate()
                .map(|(i, a)| AnomalyEntry {
                    index: i + 1,
                    kind: a.kind.label().to_string(),
                    score: a.score,
                    suspicion: a.suspicion_level(),
                    description: a.description.clone(),
                    x: a.x,
                    y: a.y,
                    region_width: a.region_width,
                    region_height: a.region_height,
                    color: a.render_hint.to_hex(),
                })
                .collect(),
        }
    }
}

impl JsonReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| GlitchError::Report(e.to_string()))
    }
}

const ANALYSIS_NOTE: &str = "This anomaly was detected using advanced image processing algorithms. \
The score indicates the level of suspicion based on multiple factors including pattern analysis, \
color deviation, and geometric consistency.";

/// Plain-text detail view of one anomaly, as shown when it is selected.
pub fn describe_anomaly(report: &AnalysisReport, index: usize) -> Option<String> {
    let anomaly = report.anomalies.get(index)?;
    let level = anomaly.suspicion_level();

    Some(format!(
        "#{} {} {}\nScore: {}/10\nDescription: {}\nLocation: ({}, {})\nAnalysis: {}",
        index + 1,
        anomaly.kind.label(),
        level.emoji(),
        anomaly.score,
        anomaly.description,
        anomaly.x,
        anomaly.y,
        ANALYSIS_NOTE
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GlitchAnalyzer, PixelBuffer};

    fn black_report() -> AnalysisReport {
        let buffer = PixelBuffer::filled(16, 16, [0, 0, 0, 255]).unwrap();
        GlitchAnalyzer::from_buffer(buffer).analyze().unwrap()
    }

    #[test]
    fn test_json_report_summarizes_run() {
        let report = black_report();
        let json = JsonReport::from(&report);

        assert_eq!(json.composite_score, 8);
        assert_eq!(json.scale_fill_percent, 80);
        assert_eq!(json.anomaly_count, 5);
        assert_eq!(json.counts_by_kind.get("Color Deviation"), Some(&4));
        assert_eq!(json.counts_by_kind.get("Pattern Detection"), Some(&1));
        assert!(!json.counts_by_kind.contains_key("Edge Detection"));
        assert_eq!(json.anomalies[0].index, 1);
        assert_eq!(json.anomalies[0].color, "#ffaa00");
    }

    #[test]
    fn test_json_report_serializes() {
        let text = JsonReport::from(&black_report()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["composite_score"], 8);
        assert_eq!(value["anomalies"][4]["kind"], "Pattern Detection");
        assert_eq!(value["anomalies"][4]["suspicion"], "Alarmed");
    }

    #[test]
    fn test_empty_report() {
        let json = JsonReport::from(&AnalysisReport::new(Vec::new()));
        assert_eq!(json.composite_score, 0);
        assert!(json.anomalies.is_empty());
        assert!(json.counts_by_kind.is_empty());
    }

    #[test]
    fn test_describe_anomaly() {
        let report = black_report();
        let text = describe_anomaly(&report, 0).unwrap();
        assert!(text.starts_with("#1 Color Deviation"));
        assert!(text.contains("Score: 8/10"));
        assert!(text.contains("Location: (4, 4)"));
        assert!(text.contains("\nAnalysis: This anomaly was detected"));
        assert!(text.ends_with("geometric consistency."));
        assert!(describe_anomaly(&report, 99).is_none());
    }
}
