use crate::{
    buffer::PixelBuffer,
    detection::{Anomaly, AnomalyKind, Detector},
};

/// Counts strong red-channel steps towards the four direct neighbours.
///
/// The scan keeps a two pixel margin even though only one is needed for the
/// neighbour lookups.
pub struct ContourDetector {
    threshold: i32,
    margin: u32,
    min_points: u8,
}

impl ContourDetector {
    pub fn new() -> Self {
        Self {
            threshold: 30,
            margin: 2,
            min_points: 3,
        }
    }

    pub fn contour_points(&self, buffer: &PixelBuffer, x: u32, y: u32) -> u8 {
        let center = buffer.red(x, y);
        let neighbors = [
            buffer.red(x, y - 1),
            buffer.red(x, y + 1),
            buffer.red(x - 1, y),
            buffer.red(x + 1, y),
        ];

        neighbors
            .iter()
            .filter(|&&n| (center - n).abs() > self.threshold)
            .count() as u8
    }
}

impl Detector for ContourDetector {
    fn kind(&self) -> AnomalyKind {
        AnomalyKind::ContourMapping
    }

    fn detect(&self, buffer: &PixelBuffer) -> Vec<Anomaly> {
        let (width, height) = buffer.dimensions();
        let mut anomalies = Vec::new();

        if width <= 2 * self.margin || height <= 2 * self.margin {
            return anomalies;
        }

        for y in self.margin..height - self.margin {
            for x in self.margin..width - self.margin {
                let points = self.contour_points(buffer, x, y);

                if points >= self.min_points {
                    anomalies.push(Anomaly::point(
                        AnomalyKind::ContourMapping,
                        x,
                        y,
                        (3 + points).min(8),
                        format!("Unusual geometric contour detected with {} strong edges", points),
                    ));
                }
            }
        }

        anomalies
    }

    fn description(&self) -> &str {
        "Flags pixels that differ sharply from at least three direct neighbours"
    }
}

impl Default for ContourDetector {
    fn default() -> Self {
        Self::new()
    }
}
