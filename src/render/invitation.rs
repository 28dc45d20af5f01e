use image::{ImageBuffer, Rgba};

use super::{
    compose,
    fonts::FontRegistry,
    layout::{self, FontMeasurer},
    overlay, RenderError, Style,
};

/// Render one personalized invitation: ensure the font, lay the name out
/// centered on the base image's width, paint the text layer, and composite
/// it into PNG bytes. Identical inputs produce identical bytes.
pub fn render_invitation(
    registry: &FontRegistry,
    base: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    guest_name: &str,
    style: &Style,
) -> Result<Vec<u8>, RenderError> {
    let font = registry.ensure_registered(&style.font_family)?;

    let measurer = FontMeasurer::new(&font, style.size_px);
    let line = layout::layout_line(guest_name, &measurer, style.letter_spacing_px)
        .centered_in(base.width() as f32);

    let text_layer = overlay::render_overlay(
        &line,
        &font,
        style.size_px,
        style.color,
        base.width(),
        base.height(),
    );

    compose::composite_png(base, &text_layer)
}
