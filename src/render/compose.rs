use image::{ImageBuffer, ImageEncoder, Rgba};

use super::RenderError;

/// Decode uploaded template bytes into an owned RGBA buffer. Anything the
/// codec cannot make sense of ends the render with a compositing error.
pub fn decode_base_image(bytes: &[u8]) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>, RenderError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RenderError::Compositing(format!("failed to decode base image: {e}")))?;
    Ok(img.to_rgba8())
}

/// Blend the text layer over the base at the origin and encode the result
/// as PNG. Both buffers are sized from the base, so they always match.
pub fn composite_png(
    base: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    overlay: &ImageBuffer<Rgba<u8>, Vec<u8>>,
) -> Result<Vec<u8>, RenderError> {
    let mut out = base.clone();
    overlay_alpha(&mut out, overlay, 0, 0);
    encode_png(&out)
}

pub fn encode_png(img: &ImageBuffer<Rgba<u8>, Vec<u8>>) -> Result<Vec<u8>, RenderError> {
    let mut buf = Vec::new();
    let enc = image::codecs::png::PngEncoder::new(&mut buf);
    enc.write_image(img, img.width(), img.height(), image::ExtendedColorType::Rgba8)
        .map_err(|e| RenderError::Compositing(format!("failed to encode png: {e}")))?;
    Ok(buf)
}

fn overlay_alpha(
    base: &mut ImageBuffer<Rgba<u8>, Vec<u8>>,
    over: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    x: u32,
    y: u32,
) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let p = over.get_pixel(ox, oy);
            let a = p.0[3] as f32 / 255.0;
            if a <= 0.0 {
                continue;
            }
            let bx = x + ox;
            let by = y + oy;
            if bx >= base.width() || by >= base.height() {
                continue;
            }
            let dst = base.get_pixel_mut(bx, by);
            // alpha blend: src over dst
            let inv = 1.0 - a;
            dst.0[0] = (p.0[0] as f32 * a + dst.0[0] as f32 * inv) as u8;
            dst.0[1] = (p.0[1] as f32 * a + dst.0[1] as f32 * inv) as u8;
            dst.0[2] = (p.0[2] as f32 * a + dst.0[2] as f32 * inv) as u8;
            dst.0[3] = 255;
        }
    }
}
