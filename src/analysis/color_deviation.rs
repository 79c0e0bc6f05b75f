use crate::{
    buffer::PixelBuffer,
    detection::{Anomaly, AnomalyKind, Detector},
    image_utils::{block_mean_rgb, block_origins},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockColor {
    Black,
    White,
    Red,
    Green,
    Blue,
}

impl BlockColor {
    /// Classifies a block mean. Earlier classes win when several match.
    pub fn classify(mean: [f64; 3]) -> Option<Self> {
        let [r, g, b] = mean;

        if r < 30.0 && g < 30.0 && b < 30.0 {
            Some(BlockColor::Black)
        } else if r > 225.0 && g > 225.0 && b > 225.0 {
            Some(BlockColor::White)
        } else if r > 200.0 && g < 100.0 && b < 100.0 {
            Some(BlockColor::Red)
        } else if g > 200.0 && r < 100.0 && b < 100.0 {
            Some(BlockColor::Green)
        } else if b > 200.0 && r < 100.0 && g < 100.0 {
            Some(BlockColor::Blue)
        } else {
            None
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            BlockColor::Black => 8,
            BlockColor::White => 6,
            BlockColor::Red | BlockColor::Green | BlockColor::Blue => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockColor::Black => "Black",
            BlockColor::White => "White",
            BlockColor::Red => "Red",
            BlockColor::Green => "Green",
            BlockColor::Blue => "Blue",
        }
    }
}

/// Flags 8x8 blocks whose mean color sits at an extreme of the RGB cube.
pub struct ColorDeviationDetector {
    block_size: u32,
}

impl ColorDeviationDetector {
    pub fn new() -> Self {
        Self { block_size: 8 }
    }
}

impl Detector for ColorDeviationDetector {
    fn kind(&self) -> AnomalyKind {
        AnomalyKind::ColorDeviation
    }

    fn detect(&self, buffer: &PixelBuffer) -> Vec<Anomaly> {
        let (width, height) = buffer.dimensions();

        block_origins(width, height, self.block_size)
            .filter_map(|(x, y)| {
                let color = BlockColor::classify(block_mean_rgb(buffer, x, y, self.block_size))?;
                Some(Anomaly::block(
                    AnomalyKind::ColorDeviation,
                    x,
                    y,
                    self.block_size,
                    color.score(),
                    format!("Unusual {} color block detected", color.name()),
                ))
            })
            .collect()
    }

    fn description(&self) -> &str {
        "Flags 8x8 blocks averaging to near black, white or a saturated primary"
    }
}

impl Default for ColorDeviationDetector {
    fn default() -> Self {
        Self::new()
    }
}
