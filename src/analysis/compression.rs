use crate::{
    buffer::PixelBuffer,
    detection::{Anomaly, AnomalyKind, Detector},
    image_utils::block_origins,
};

/// Per-block red-channel variation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockVariation {
    pub total_variation: u32,
    pub has_artifacts: bool,
}

/// Blockiness heuristic over 8x8 tiles.
///
/// Within a block, each pixel except those in the last row and column is
/// differenced against its right and lower neighbour. A block is flagged as
/// soon as one difference exceeds the step threshold; the score grows with
/// the accumulated variation.
pub struct CompressionArtifactDetector {
    block_size: u32,
    step_threshold: i32,
    max_score: u8,
}

impl CompressionArtifactDetector {
    pub fn new() -> Self {
        Self {
            block_size: 8,
            step_threshold: 50,
            max_score: 6,
        }
    }

    pub fn measure_block(&self, buffer: &PixelBuffer, x: u32, y: u32) -> BlockVariation {
        let mut total_variation = 0u32;
        let mut has_artifacts = false;

        for dy in 0..self.block_size - 1 {
            for dx in 0..self.block_size - 1 {
                let (px, py) = (x + dx, y + dy);
                let center = buffer.red(px, py);
                let diff_h = (center - buffer.red(px + 1, py)).abs();
                let diff_v = (center - buffer.red(px, py + 1)).abs();

                total_variation += (diff_h + diff_v) as u32;

                if diff_h > self.step_threshold || diff_v > self.step_threshold {
                    has_artifacts = true;
                }
            }
        }

        BlockVariation {
            total_variation,
            has_artifacts,
        }
    }
}

impl Detector for CompressionArtifactDetector {
    fn kind(&self) -> AnomalyKind {
        AnomalyKind::CompressionArtifact
    }

    fn detect(&self, buffer: &PixelBuffer) -> Vec<Anomaly> {
        let (width, height) = buffer.dimensions();
        let mut anomalies = Vec::new();

        for (x, y) in block_origins(width, height, self.block_size) {
            let variation = self.measure_block(buffer, x, y);

            if variation.has_artifacts {
                let score = (variation.total_variation / 100).min(self.max_score as u32) as u8;
                anomalies.push(Anomaly::block(
                    AnomalyKind::CompressionArtifact,
                    x,
                    y,
                    self.block_size,
                    score,
                    "JPEG compression artifacts detected",
                ));
            }
        }

        anomalies
    }

    fn description(&self) -> &str {
        "Flags 8x8 blocks containing sharp red-channel steps"
    }
}

impl Default for CompressionArtifactDetector {
    fn default() -> Self {
        Self::new()
    }
}
