use std::{
    io::Cursor,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_line_segment_mut},
    rect::Rect,
};

use crate::{
    buffer::PixelBuffer,
    detection::Anomaly,
    error::{GlitchError, Result},
};

/// 3x5 bitmap digits, one row per byte, most significant of the low three bits on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;

#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub line_width: u32,
    /// Dash pattern as (drawn, skipped) lengths in pixels.
    pub dash: (f32, f32),
    pub show_labels: bool,
    /// Horizontal gap between a marker's right edge and its score label.
    pub label_offset: f32,
    /// Pixel size of one glyph cell.
    pub label_scale: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            line_width: 2,
            dash: (5.0, 5.0),
            show_labels: true,
            label_offset: 5.0,
            label_scale: 2,
        }
    }
}

impl VisualizationConfig {
    /// Heavier strokes and labels used for exported images.
    pub fn export() -> Self {
        Self {
            line_width: 3,
            label_scale: 3,
            ..Self::default()
        }
    }
}

pub struct Visualizer {
    config: VisualizationConfig,
}

impl Visualizer {
    pub fn new() -> Self {
        Self { config: VisualizationConfig::default() }
    }

    pub fn with_config(config: VisualizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VisualizationConfig {
        &self.config
    }

    /// Transparent layer with one dashed marker and score per anomaly.
    pub fn render_overlay(&self, width: u32, height: u32, anomalies: &[Anomaly]) -> RgbaImage {
        let mut canvas = RgbaImage::new(width, height);
        for anomaly in anomalies {
            self.draw_anomaly(&mut canvas, anomaly);
        }
        canvas
    }

    /// The analyzed image with every marker baked in.
    pub fn annotate(&self, buffer: &PixelBuffer, anomalies: &[Anomaly]) -> Result<RgbaImage> {
        let mut canvas = buffer.to_rgba_image().ok_or_else(|| {
            GlitchError::InvalidInput("buffer does not match its dimensions".into())
        })?;

        for anomaly in anomalies {
            self.draw_anomaly(&mut canvas, anomaly);
        }

        Ok(canvas)
    }

    pub fn draw_anomaly(&self, canvas: &mut RgbaImage, anomaly: &Anomaly) {
        let color = anomaly.render_hint.to_rgba();
        let (w, h) = anomaly.marker_size();
        let (x, y) = (anomaly.x as f32, anomaly.y as f32);
        let (w, h) = (w as f32, h as f32);

        let left = x - w / 2.0;
        let top = y - h / 2.0;
        self.draw_dashed_polyline(
            canvas,
            &[
                (left, top),
                (left + w, top),
                (left + w, top + h),
                (left, top + h),
                (left, top),
            ],
            color,
        );

        if self.config.show_labels {
            self.draw_number(canvas, x + w / 2.0 + self.config.label_offset, y, anomaly.score as u32, color);
        }
    }

    /// Strokes a polyline with the configured dash pattern. The dash phase
    /// carries over from one segment to the next.
    fn draw_dashed_polyline(&self, canvas: &mut RgbaImage, points: &[(f32, f32)], color: Rgba<u8>) {
        let (on, off) = self.config.dash;
        let period = on + off;
        let mut phase = 0.0f32;

        for segment in points.windows(2) {
            let (x0, y0) = segment[0];
            let (x1, y1) = segment[1];
            let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();

            if length <= f32::EPSILON {
                continue;
            }

            let (ux, uy) = ((x1 - x0) / length, (y1 - y0) / length);

            if period <= 0.0 || off <= 0.0 {
                self.draw_thick_segment(canvas, (x0, y0), (x1, y1), (ux, uy), color);
                continue;
            }

            let mut d = 0.0f32;
            while d < length {
                let pos = (phase + d) % period;

                if pos < on {
                    let run = (on - pos).min(length - d);
                    let start = (x0 + ux * d, y0 + uy * d);
                    let end = (x0 + ux * (d + run), y0 + uy * (d + run));
                    self.draw_thick_segment(canvas, start, end, (ux, uy), color);
                    d += run;
                } else {
                    d += (period - pos).min(length - d);
                }
            }

            phase = (phase + length) % period;
        }
    }

    fn draw_thick_segment(
        &self,
        canvas: &mut RgbaImage,
        start: (f32, f32),
        end: (f32, f32),
        direction: (f32, f32),
        color: Rgba<u8>,
    ) {
        let (nx, ny) = (-direction.1, direction.0);
        let thickness = self.config.line_width.max(1);
        let center = (thickness - 1) as f32 / 2.0;

        for t in 0..thickness {
            let offset = t as f32 - center;
            draw_line_segment_mut(
                canvas,
                (start.0 + nx * offset, start.1 + ny * offset),
                (end.0 + nx * offset, end.1 + ny * offset),
                color,
            );
        }
    }

    /// Draws `value` with its bottom-left corner at `(x, baseline)`.
    fn draw_number(&self, canvas: &mut RgbaImage, x: f32, baseline: f32, value: u32, color: Rgba<u8>) {
        let scale = self.config.label_scale.max(1);
        let top = baseline.round() as i32 - (GLYPH_HEIGHT * scale) as i32;
        let mut cursor = x.round() as i32;

        for ch in value.to_string().chars() {
            let Some(digit) = ch.to_digit(10) else {
                continue;
            };
            let glyph = DIGITS[digit as usize];

            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = cursor + (col * scale) as i32;
                    let py = top + (row as u32 * scale) as i32;
                    draw_filled_rect_mut(canvas, Rect::at(px, py).of_size(scale, scale), color);
                }
            }

            cursor += ((GLYPH_WIDTH + 1) * scale) as i32;
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

pub fn export_file_name(timestamp_millis: u128) -> String {
    format!("satellite-analysis-{}.png", timestamp_millis)
}

/// Writes `image` as PNG into `directory` under a timestamped name.
pub fn export_png<P: AsRef<Path>>(directory: P, image: &RgbaImage) -> Result<PathBuf> {
    std::fs::create_dir_all(&directory)?;

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let path = directory.as_ref().join(export_file_name(millis));

    std::fs::write(&path, encode_png(image)?)?;
    Ok(path)
}
