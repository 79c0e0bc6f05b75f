pub mod pipeline;
pub mod registry;
pub mod scoring;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Default edge length used to draw point anomalies.
pub const DEFAULT_MARKER_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnomalyKind {
    EdgeDetection,
    ColorDeviation,
    PatternDetection,
    CompressionArtifact,
    ContourMapping,
}

impl AnomalyKind {
    /// Declaration order, which is also the merge order of the pipeline.
    pub const ALL: [AnomalyKind; 5] = [
        AnomalyKind::EdgeDetection,
        AnomalyKind::ColorDeviation,
        AnomalyKind::PatternDetection,
        AnomalyKind::CompressionArtifact,
        AnomalyKind::ContourMapping,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnomalyKind::EdgeDetection => "Edge Detection",
            AnomalyKind::ColorDeviation => "Color Deviation",
            AnomalyKind::PatternDetection => "Pattern Detection",
            AnomalyKind::CompressionArtifact => "Compression Artifacts",
            AnomalyKind::ContourMapping => "Contour Mapping",
        }
    }

    pub fn render_hint(&self) -> RenderHint {
        match self {
            AnomalyKind::EdgeDetection => RenderHint([0xff, 0x6b, 0x6b]),
            AnomalyKind::ColorDeviation => RenderHint([0xff, 0xaa, 0x00]),
            AnomalyKind::PatternDetection => RenderHint([0x93, 0x70, 0xdb]),
            AnomalyKind::CompressionArtifact => RenderHint([0xff, 0xd7, 0x00]),
            AnomalyKind::ContourMapping => RenderHint([0x4e, 0xcd, 0xc4]),
        }
    }

    pub(crate) fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display color attached to an anomaly. Has no effect on detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderHint(pub [u8; 3]);

impl RenderHint {
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }

    pub fn to_rgba(&self) -> image::Rgba<u8> {
        image::Rgba([self.0[0], self.0[1], self.0[2], 255])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub x: f64,
    pub y: f64,
    pub score: u8,
    pub description: String,
    /// Zero means a point anomaly.
    pub region_width: f64,
    pub region_height: f64,
    pub render_hint: RenderHint,
}

impl Anomaly {
    pub fn point(kind: AnomalyKind, x: u32, y: u32, score: u8, description: impl Into<String>) -> Self {
        Self {
            kind,
            x: x as f64,
            y: y as f64,
            score: score.min(10),
            description: description.into(),
            region_width: 0.0,
            region_height: 0.0,
            render_hint: kind.render_hint(),
        }
    }

    /// Anomaly covering the `size x size` block whose top-left corner is `(x, y)`.
    pub fn block(kind: AnomalyKind, x: u32, y: u32, size: u32, score: u8, description: impl Into<String>) -> Self {
        let (cx, cy) = crate::image_utils::block_center(x, y, size);
        Self {
            kind,
            x: cx,
            y: cy,
            score: score.min(10),
            description: description.into(),
            region_width: size as f64,
            region_height: size as f64,
            render_hint: kind.render_hint(),
        }
    }

    pub fn is_point(&self) -> bool {
        self.region_width == 0.0 && self.region_height == 0.0
    }

    /// Drawn extent, substituting the default marker for point anomalies.
    pub fn marker_size(&self) -> (f64, f64) {
        let w = if self.region_width > 0.0 { self.region_width } else { DEFAULT_MARKER_SIZE };
        let h = if self.region_height > 0.0 { self.region_height } else { DEFAULT_MARKER_SIZE };
        (w, h)
    }

    pub fn suspicion_level(&self) -> SuspicionLevel {
        SuspicionLevel::from_score(self.score)
    }
}

/// Coarse tier of a single anomaly's score, shown in detail views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuspicionLevel {
    Calm,
    Curious,
    Startled,
    Alarmed,
    Extraterrestrial,
}

impl SuspicionLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => SuspicionLevel::Calm,
            3..=4 => SuspicionLevel::Curious,
            5..=6 => SuspicionLevel::Startled,
            7..=8 => SuspicionLevel::Alarmed,
            _ => SuspicionLevel::Extraterrestrial,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SuspicionLevel::Calm => "\u{1F610}",
            SuspicionLevel::Curious => "\u{1F914}",
            SuspicionLevel::Startled => "\u{1F633}",
            SuspicionLevel::Alarmed => "\u{1F631}",
            SuspicionLevel::Extraterrestrial => "\u{1F47D}",
        }
    }
}

/// A stateless pixel heuristic.
///
/// Detectors must be total over any valid buffer: a buffer smaller than the
/// scan window simply yields no anomalies.
pub trait Detector: Send + Sync {
    fn kind(&self) -> AnomalyKind;

    fn detect(&self, buffer: &PixelBuffer) -> Vec<Anomaly>;

    fn name(&self) -> &str {
        self.kind().label()
    }

    fn description(&self) -> &str;
}

/// Set of enabled detector kinds, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<AnomalyKind>", into = "Vec<AnomalyKind>")]
pub struct DetectorSet(u8);

impl DetectorSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        AnomalyKind::ALL.into_iter().collect()
    }

    pub fn with(mut self, kind: AnomalyKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn without(mut self, kind: AnomalyKind) -> Self {
        self.remove(kind);
        self
    }

    pub fn insert(&mut self, kind: AnomalyKind) {
        self.0 |= kind.bit();
    }

    pub fn remove(&mut self, kind: AnomalyKind) {
        self.0 &= !kind.bit();
    }

    pub fn set(&mut self, kind: AnomalyKind, enabled: bool) {
        if enabled {
            self.insert(kind);
        } else {
            self.remove(kind);
        }
    }

    pub fn contains(&self, kind: AnomalyKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled kinds in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = AnomalyKind> + '_ {
        AnomalyKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl Default for DetectorSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<AnomalyKind> for DetectorSet {
    fn from_iter<I: IntoIterator<Item = AnomalyKind>>(iter: I) -> Self {
        let mut set = DetectorSet::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl From<Vec<AnomalyKind>> for DetectorSet {
    fn from(kinds: Vec<AnomalyKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<DetectorSet> for Vec<AnomalyKind> {
    fn from(set: DetectorSet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_set_default_enables_everything() {
        let set = DetectorSet::default();
        assert_eq!(set.len(), 5);
        assert_eq!(set.iter().collect::<Vec<_>>(), AnomalyKind::ALL.to_vec());
    }

    #[test]
    fn test_detector_set_toggles_independently() {
        let set = DetectorSet::empty()
            .with(AnomalyKind::ContourMapping)
            .with(AnomalyKind::EdgeDetection);
        assert!(set.contains(AnomalyKind::EdgeDetection));
        assert!(!set.contains(AnomalyKind::PatternDetection));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![AnomalyKind::EdgeDetection, AnomalyKind::ContourMapping]
        );

        let set = set.without(AnomalyKind::EdgeDetection);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_detector_set_applies_toggle_flags() {
        let mut set = DetectorSet::all();
        set.set(AnomalyKind::PatternDetection, false);
        set.set(AnomalyKind::PatternDetection, false);
        assert!(!set.contains(AnomalyKind::PatternDetection));
        assert_eq!(set.len(), 4);

        set.set(AnomalyKind::PatternDetection, true);
        assert_eq!(set, DetectorSet::all());
    }

    #[test]
    fn test_detector_set_serializes_as_kind_list() {
        let set = DetectorSet::empty().with(AnomalyKind::ColorDeviation);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["ColorDeviation"]"#);

        let parsed: DetectorSet = serde_json::from_str(r#"["PatternDetection","EdgeDetection"]"#).unwrap();
        assert!(parsed.contains(AnomalyKind::PatternDetection));
        assert!(parsed.contains(AnomalyKind::EdgeDetection));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_suspicion_levels() {
        assert_eq!(SuspicionLevel::from_score(0), SuspicionLevel::Calm);
        assert_eq!(SuspicionLevel::from_score(4), SuspicionLevel::Curious);
        assert_eq!(SuspicionLevel::from_score(5), SuspicionLevel::Startled);
        assert_eq!(SuspicionLevel::from_score(8), SuspicionLevel::Alarmed);
        assert_eq!(SuspicionLevel::from_score(10), SuspicionLevel::Extraterrestrial);
    }

    #[test]
    fn test_render_hint_hex() {
        assert_eq!(AnomalyKind::EdgeDetection.render_hint().to_hex(), "#ff6b6b");
        assert_eq!(AnomalyKind::ContourMapping.render_hint().to_hex(), "#4ecdc4");
    }

    #[test]
    fn test_point_anomaly_uses_default_marker() {
        let anomaly = Anomaly::point(AnomalyKind::EdgeDetection, 3, 4, 7, "edge");
        assert!(anomaly.is_point());
        assert_eq!(anomaly.marker_size(), (DEFAULT_MARKER_SIZE, DEFAULT_MARKER_SIZE));

        let block = Anomaly::block(AnomalyKind::ColorDeviation, 8, 16, 8, 8, "block");
        assert_eq!((block.x, block.y), (12.0, 20.0));
        assert_eq!(block.marker_size(), (8.0, 8.0));
    }
}
