use image::{ImageBuffer, Rgba};
use rusttype::{point, Font, Scale};

use super::layout::LineLayout;

/// Rasterize a laid-out line onto a fresh transparent canvas of
/// `width x height`. The baseline sits on the vertical midpoint; glyph
/// pixels outside the canvas are skipped, and overlapping glyphs keep the
/// strongest coverage.
pub fn render_overlay(
    layout: &LineLayout,
    font: &Font<'static>,
    size_px: f32,
    color: Rgba<u8>,
    width: u32,
    height: u32,
) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let mut img = ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let scale = Scale::uniform(size_px);
    let baseline_y = height as f32 / 2.0;

    for placed in &layout.chars {
        let glyph = font
            .glyph(placed.ch)
            .scaled(scale)
            .positioned(point(placed.x, baseline_y));
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= img.width() || py >= img.height() {
                    return;
                }
                let a = (v * color.0[3] as f32) as u8;
                if a == 0 {
                    return;
                }
                let dst = img.get_pixel_mut(px, py);
                dst.0[0] = color.0[0];
                dst.0[1] = color.0[1];
                dst.0[2] = color.0[2];
                dst.0[3] = dst.0[3].max(a);
            });
        }
    }

    img
}
