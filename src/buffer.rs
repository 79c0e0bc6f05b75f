use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{GlitchError, Result};

/// Decoded RGBA raster handed to the detectors.
///
/// Samples are interleaved `R, G, B, A`, row-major with a top-left origin.
/// The buffer is immutable once built; every constructor validates that the
/// sample count matches the dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPixelBuffer")]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

/// Unchecked wire form of [`PixelBuffer`].
#[derive(Deserialize)]
struct RawPixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl TryFrom<RawPixelBuffer> for PixelBuffer {
    type Error = GlitchError;

    fn try_from(raw: RawPixelBuffer) -> Result<Self> {
        PixelBuffer::new(raw.width, raw.height, raw.samples)
    }
}

impl PixelBuffer {
    pub const CHANNELS: usize = 4;

    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let buffer = Self {
            width,
            height,
            samples,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Buffer of a single repeated color, mostly useful for synthetic inputs.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let len = (width as usize) * (height as usize);
        let samples = rgba.iter().copied().cycle().take(len * Self::CHANNELS).collect();
        Self::new(width, height, samples)
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut samples = Vec::with_capacity((width as usize) * (height as usize) * Self::CHANNELS);
        for y in 0..height {
            for x in 0..width {
                samples.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, samples)
    }

    pub fn from_rgba_image(image: &RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.as_raw().clone())
    }

    pub fn from_dynamic_image(image: &DynamicImage) -> Result<Self> {
        Self::from_rgba_image(&image.to_rgba8())
    }

    /// Checks the shape invariant.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GlitchError::InvalidInput(format!(
                "buffer dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(Self::CHANNELS))
            .ok_or_else(|| {
                GlitchError::InvalidInput(format!(
                    "buffer dimensions {}x{} overflow",
                    self.width, self.height
                ))
            })?;

        if self.samples.len() != expected {
            return Err(GlitchError::InvalidInput(format!(
                "expected {} samples for {}x{} RGBA, got {}",
                expected,
                self.width,
                self.height,
                self.samples.len()
            )));
        }

        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * Self::CHANNELS
    }

    /// RGBA of the pixel at `(x, y)`. Callers keep coordinates in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.samples[i],
            self.samples[i + 1],
            self.samples[i + 2],
            self.samples[i + 3],
        ]
    }

    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.index(x, y);
        [self.samples[i], self.samples[i + 1], self.samples[i + 2]]
    }

    /// Red channel, used by the gradient based detectors as a luminance proxy.
    #[inline]
    pub fn red(&self, x: u32, y: u32) -> i32 {
        self.samples[self.index(x, y)] as i32
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.samples.clone())
    }

    #[cfg(test)]
    pub(crate) fn from_raw_unchecked(width: u32, height: u32, samples: Vec<u8>) -> Self {
        Self {
            width,
            height,
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(matches!(
            PixelBuffer::new(0, 4, Vec::new()),
            Err(GlitchError::InvalidInput(_))
        ));
        assert!(matches!(
            PixelBuffer::new(4, 0, Vec::new()),
            Err(GlitchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_sample_length_mismatch() {
        let result = PixelBuffer::new(2, 2, vec![0; 15]);
        assert!(matches!(result, Err(GlitchError::InvalidInput(_))));
    }

    #[test]
    fn test_deserialize_validates_shape() {
        let short =
            serde_json::from_str::<PixelBuffer>(r#"{"width":64,"height":64,"samples":[0,0,0,0]}"#);
        assert!(short.is_err());

        let empty = serde_json::from_str::<PixelBuffer>(r#"{"width":0,"height":1,"samples":[]}"#);
        assert!(empty.is_err());

        let ok: PixelBuffer =
            serde_json::from_str(r#"{"width":1,"height":1,"samples":[1,2,3,4]}"#).unwrap();
        assert_eq!(ok.pixel(0, 0), [1, 2, 3, 4]);
    }

    #[test]
    fn test_serde_round_trip_keeps_samples() {
        let buffer = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 9, 255]).unwrap();
        let json = serde_json::to_string(&buffer).unwrap();
        assert_eq!(serde_json::from_str::<PixelBuffer>(&json).unwrap(), buffer);
    }

    #[test]
    fn test_pixel_access_is_row_major() {
        let buffer = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 7, 255]).unwrap();
        assert_eq!(buffer.pixel(2, 1), [2, 1, 7, 255]);
        assert_eq!(buffer.red(1, 0), 1);
        assert_eq!(buffer.rgb(0, 1), [0, 1, 7]);
    }

    #[test]
    fn test_rgba_image_conversion() {
        let image = RgbaImage::from_pixel(5, 3, image::Rgba([10, 20, 30, 255]));
        let buffer = PixelBuffer::from_rgba_image(&image).unwrap();
        assert_eq!(buffer.dimensions(), (5, 3));
        assert_eq!(buffer.pixel(4, 2), [10, 20, 30, 255]);
        assert_eq!(buffer.to_rgba_image().unwrap(), image);
    }
}
