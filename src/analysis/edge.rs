use crate::{
    buffer::PixelBuffer,
    detection::{Anomaly, AnomalyKind, Detector},
};

/// Central-difference gradient on the red channel.
///
/// Every interior pixel whose gradient magnitude exceeds the threshold is
/// reported on its own; neighbouring pixels along one edge are not merged,
/// so real edges show up as dense clusters.
pub struct EdgeDetector {
    threshold: f64,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self { threshold: 50.0 }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn magnitude(&self, buffer: &PixelBuffer, x: u32, y: u32) -> f64 {
        let gx = (buffer.red(x + 1, y) - buffer.red(x - 1, y)) as f64;
        let gy = (buffer.red(x, y + 1) - buffer.red(x, y - 1)) as f64;

        (gx * gx + gy * gy).sqrt()
    }
}

impl Detector for EdgeDetector {
    fn kind(&self) -> AnomalyKind {
        AnomalyKind::EdgeDetection
    }

    fn detect(&self, buffer: &PixelBuffer) -> Vec<Anomaly> {
        let (width, height) = buffer.dimensions();
        let mut anomalies = Vec::new();

        if width < 3 || height < 3 {
            return anomalies;
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let magnitude = self.magnitude(buffer, x, y);

                if magnitude > self.threshold {
                    let score = (magnitude / 10.0).floor().min(10.0) as u8;
                    anomalies.push(Anomaly::point(
                        AnomalyKind::EdgeDetection,
                        x,
                        y,
                        score,
                        format!("Sharp edge detected with magnitude {}", magnitude.floor() as u32),
                    ));
                }
            }
        }

        anomalies
    }

    fn description(&self) -> &str {
        "Flags interior pixels with a strong red-channel gradient"
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiny_buffers_have_no_interior() {
        let detector = EdgeDetector::new();
        for (w, h) in [(1, 1), (2, 2), (2, 5), (5, 2)] {
            let buffer = PixelBuffer::from_fn(w, h, |x, _| {
                let v = if x % 2 == 0 { 0 } else { 255 };
                [v, 0, 0, 255]
            })
            .unwrap();
            assert!(detector.detect(&buffer).is_empty());
        }
    }

    #[test]
    fn test_vertical_step_edge() {
        // Left half black, right half white: only columns 3 and 4 straddle the step.
        let buffer = PixelBuffer::from_fn(8, 5, |x, _| {
            if x < 4 { [0, 0, 0, 255] } else { [255, 255, 255, 255] }
        })
        .unwrap();
        let anomalies = EdgeDetector::new().detect(&buffer);

        assert_eq!(anomalies.len(), 2 * 3);
        for anomaly in &anomalies {
            assert!(anomaly.x == 3.0 || anomaly.x == 4.0);
            assert_eq!(anomaly.score, 10);
            assert_eq!(anomaly.description, "Sharp edge detected with magnitude 255");
            assert!(anomaly.is_point());
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // A 50 step gives a magnitude of exactly 50, which does not exceed the threshold.
        let buffer = PixelBuffer::from_fn(3, 3, |x, _| [(x * 25) as u8, 0, 0, 255]).unwrap();
        assert!(EdgeDetector::new().detect(&buffer).is_empty());

        let buffer = PixelBuffer::from_fn(3, 3, |x, _| [(x * 30) as u8, 0, 0, 255]).unwrap();
        let anomalies = EdgeDetector::new().detect(&buffer);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].score, 6);
    }

    #[test]
    fn test_only_red_channel_is_read() {
        let buffer = PixelBuffer::from_fn(6, 6, |x, _| {
            if x < 3 { [10, 0, 0, 255] } else { [10, 255, 255, 255] }
        })
        .unwrap();
        assert!(EdgeDetector::new().detect(&buffer).is_empty());
    }
}
