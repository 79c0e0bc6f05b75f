use crate::{
    buffer::PixelBuffer,
    detection::{Anomaly, AnomalyKind, Detector},
    image_utils::block_origins,
};

/// Looks for 16x16 blocks whose coarse diagonal lattice is near uniform.
///
/// Each sample at a 4 pixel step is compared with the sample 4 pixels down
/// and to the right. A block only counts as repeating when every comparison
/// stays within the tolerance on all three color channels. Offsets that
/// leave the buffer are not compared.
pub struct PatternDetector {
    block_size: u32,
    step: u32,
    tolerance: i32,
    score: u8,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self {
            block_size: 16,
            step: 4,
            tolerance: 10,
            score: 7,
        }
    }

    fn is_repeating(&self, buffer: &PixelBuffer, x: u32, y: u32) -> bool {
        for dy in (0..self.block_size).step_by(self.step as usize) {
            for dx in (0..self.block_size).step_by(self.step as usize) {
                let (ax, ay) = (x + dx, y + dy);
                let (bx, by) = (ax + self.step, ay + self.step);

                if !buffer.contains(bx, by) {
                    continue;
                }

                let a = buffer.rgb(ax, ay);
                let b = buffer.rgb(bx, by);
                let within = a
                    .iter()
                    .zip(b.iter())
                    .all(|(&p, &q)| (p as i32 - q as i32).abs() <= self.tolerance);

                if !within {
                    return false;
                }
            }
        }

        true
    }
}

impl Detector for PatternDetector {
    fn kind(&self) -> AnomalyKind {
        AnomalyKind::PatternDetection
    }

    fn detect(&self, buffer: &PixelBuffer) -> Vec<Anomaly> {
        let (width, height) = buffer.dimensions();

        block_origins(width, height, self.block_size)
            .filter(|&(x, y)| self.is_repeating(buffer, x, y))
            .map(|(x, y)| {
                Anomaly::block(
                    AnomalyKind::PatternDetection,
                    x,
                    y,
                    self.block_size,
                    self.score,
                    "Repeating pixel pattern detected - possible digital artifact",
                )
            })
            .collect()
    }

    fn description(&self) -> &str {
        "Flags 16x16 blocks whose 4-step diagonal samples are nearly identical"
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_repeats() {
        let buffer = PixelBuffer::filled(16, 16, [90, 140, 30, 255]).unwrap();
        let anomalies = PatternDetector::new().detect(&buffer);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].score, 7);
        assert_eq!((anomalies[0].x, anomalies[0].y), (8.0, 8.0));
        assert_eq!(anomalies[0].region_width, 16.0);
    }

    #[test]
    fn test_gradient_breaks_pattern() {
        // Each diagonal step adds 4 * 3 to the red channel, beyond the tolerance.
        let buffer = PixelBuffer::from_fn(16, 16, |x, _| [(x * 3) as u8, 0, 0, 255]).unwrap();
        assert!(PatternDetector::new().detect(&buffer).is_empty());
    }

    #[test]
    fn test_any_channel_breaks_pattern() {
        let buffer = PixelBuffer::from_fn(32, 16, |x, y| {
            if x == 20 && y == 4 { [0, 0, 200, 255] } else { [0, 0, 0, 255] }
        })
        .unwrap();
        let anomalies = PatternDetector::new().detect(&buffer);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].x, 8.0);
    }

    #[test]
    fn test_periodic_texture_with_period_four_repeats() {
        let buffer = PixelBuffer::from_fn(32, 32, |x, y| {
            let v = if (x % 4) < 2 && (y % 4) < 2 { 255 } else { 0 };
            [v, v, v, 255]
        })
        .unwrap();
        assert_eq!(PatternDetector::new().detect(&buffer).len(), 4);
    }

    #[test]
    fn test_small_buffers_yield_nothing() {
        let buffer = PixelBuffer::filled(15, 40, [0, 0, 0, 255]).unwrap();
        assert!(PatternDetector::new().detect(&buffer).is_empty());
    }
}
