use image::{DynamicImage, RgbaImage, imageops::{self, FilterType}};

use crate::buffer::PixelBuffer;

/// Origins of the non-overlapping `size x size` blocks that fit entirely
/// inside a `width x height` raster, scanned row by row.
pub fn block_origins(width: u32, height: u32, size: u32) -> impl Iterator<Item = (u32, u32)> {
    let step = size.max(1) as usize;
    let rows = if height >= size { 0..=(height - size) } else { 1..=0 };
    let cols_end = if width >= size { Some(width - size) } else { None };

    rows.step_by(step).flat_map(move |y| {
        let cols = match cols_end {
            Some(end) => 0..=end,
            None => 1..=0,
        };
        cols.step_by(step).map(move |x| (x, y))
    })
}

/// Mean R, G, B over a block.
pub fn block_mean_rgb(buffer: &PixelBuffer, x: u32, y: u32, size: u32) -> [f64; 3] {
    let mut totals = [0u64; 3];
    let mut count = 0u64;

    for dy in 0..size {
        for dx in 0..size {
            let px = buffer.rgb(x + dx, y + dy);
            totals[0] += px[0] as u64;
            totals[1] += px[1] as u64;
            totals[2] += px[2] as u64;
            count += 1;
        }
    }

    if count == 0 {
        return [0.0; 3];
    }

    [
        totals[0] as f64 / count as f64,
        totals[1] as f64 / count as f64,
        totals[2] as f64 / count as f64,
    ]
}

/// Center of a block in buffer coordinates.
pub fn block_center(x: u32, y: u32, size: u32) -> (f64, f64) {
    (x as f64 + size as f64 / 2.0, y as f64 + size as f64 / 2.0)
}

/// Letterboxes `image` into a transparent `canvas_width x canvas_height`
/// raster, keeping the aspect ratio. Wider images span the full width and
/// are centered vertically; taller ones span the full height and are
/// centered horizontally.
pub fn fit_to_canvas(image: &DynamicImage, canvas_width: u32, canvas_height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(canvas_width, canvas_height);
    let (src_w, src_h) = (image.width(), image.height());

    if src_w == 0 || src_h == 0 || canvas_width == 0 || canvas_height == 0 {
        return canvas;
    }

    let canvas_aspect = canvas_width as f64 / canvas_height as f64;
    let image_aspect = src_w as f64 / src_h as f64;

    let (draw_w, draw_h, offset_x, offset_y) = if image_aspect > canvas_aspect {
        let draw_h = (canvas_width as f64 / image_aspect).round().max(1.0) as u32;
        (canvas_width, draw_h, 0, (canvas_height.saturating_sub(draw_h)) / 2)
    } else {
        let draw_w = (canvas_height as f64 * image_aspect).round().max(1.0) as u32;
        (draw_w, canvas_height, (canvas_width.saturating_sub(draw_w)) / 2, 0)
    };

    let resized = imageops::resize(&image.to_rgba8(), draw_w, draw_h, FilterType::Triangle);
    imageops::overlay(&mut canvas, &resized, offset_x as i64, offset_y as i64);

    canvas
}
