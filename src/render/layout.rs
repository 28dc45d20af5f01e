use rusttype::{Font, Scale};

/// Horizontal advance of a single character at the target size. The
/// production measurer asks the font; tests substitute fixed advances.
pub trait GlyphMeasurer {
    fn advance_width(&self, ch: char) -> f32;
}

pub struct FontMeasurer<'a> {
    font: &'a Font<'static>,
    scale: Scale,
}

impl<'a> FontMeasurer<'a> {
    pub fn new(font: &'a Font<'static>, size_px: f32) -> Self {
        Self {
            font,
            scale: Scale::uniform(size_px),
        }
    }
}

impl GlyphMeasurer for FontMeasurer<'_> {
    fn advance_width(&self, ch: char) -> f32 {
        self.font.glyph(ch).scaled(self.scale).h_metrics().advance_width
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedChar {
    pub ch: char,
    pub x: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub total_width: f32,
    pub chars: Vec<PlacedChar>,
}

/// Place `text` one char at a time: each char sits at the running caret,
/// then the caret advances by its measured width plus `letter_spacing`.
/// The trailing spacing is excluded from the total, so
/// `total_width = sum(advance) + (count - 1) * letter_spacing`.
pub fn layout_line(
    text: &str,
    measurer: &impl GlyphMeasurer,
    letter_spacing: f32,
) -> LineLayout {
    let mut chars = Vec::new();
    let mut caret = 0.0f32;
    for ch in text.chars() {
        chars.push(PlacedChar { ch, x: caret });
        caret += measurer.advance_width(ch) + letter_spacing;
    }

    let total_width = if chars.is_empty() {
        0.0
    } else {
        caret - letter_spacing
    };
    LineLayout { total_width, chars }
}

/// Left edge that centers a line of `total_width` in `canvas_width`.
/// Negative when the line overflows; overflow is drawn, not clipped.
pub fn centered_origin(total_width: f32, canvas_width: f32) -> f32 {
    (canvas_width - total_width) / 2.0
}

impl LineLayout {
    pub fn centered_in(&self, canvas_width: f32) -> LineLayout {
        let origin = centered_origin(self.total_width, canvas_width);
        LineLayout {
            total_width: self.total_width,
            chars: self
                .chars
                .iter()
                .map(|p| PlacedChar {
                    ch: p.ch,
                    x: p.x + origin,
                })
                .collect(),
        }
    }
}
