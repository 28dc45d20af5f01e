pub mod batch;
pub mod compose;
pub mod fonts;
pub mod invitation;
pub mod layout;
pub mod overlay;

use image::Rgba;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("font resource: {0}")]
    Resource(String),
    #[error("compositing: {0}")]
    Compositing(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Kind tag carried by batch failure records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderErrorKind {
    Input,
    NotFound,
    Resource,
    Compositing,
    Internal,
}

impl RenderError {
    pub fn kind(&self) -> RenderErrorKind {
        match self {
            RenderError::Input(_) => RenderErrorKind::Input,
            RenderError::NotFound(_) => RenderErrorKind::NotFound,
            RenderError::Resource(_) => RenderErrorKind::Resource,
            RenderError::Compositing(_) => RenderErrorKind::Compositing,
            RenderError::Internal(_) => RenderErrorKind::Internal,
        }
    }
}

// Rasterization cost grows with glyph area regardless of canvas size, so
// requested magnitudes are capped rather than passed through.
pub const MAX_FONT_SIZE_PX: f32 = 512.0;
pub const MAX_LETTER_SPACING_PX: f32 = 512.0;

/// Validated typography for one render. Construction is the only place
/// style fields are checked and capped; everything downstream trusts the
/// values.
#[derive(Debug, Clone)]
pub struct Style {
    pub font_family: String,
    pub size_px: f32,
    pub color: Rgba<u8>,
    pub letter_spacing_px: f32,
}

impl Style {
    pub fn new(
        font_family: String,
        size_px: f32,
        color: &str,
        letter_spacing_px: f32,
    ) -> Result<Self, RenderError> {
        let family = font_family.trim();
        if family.is_empty() {
            return Err(RenderError::Input("fontFamily is required".into()));
        }
        // Family names index font files, so path syntax is rejected outright.
        if family.contains('/') || family.contains('\\') || family.contains("..") {
            return Err(RenderError::Input(format!("invalid fontFamily: {family}")));
        }
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(RenderError::Input(format!("invalid fontSizePx: {size_px}")));
        }
        if !letter_spacing_px.is_finite() || letter_spacing_px < 0.0 {
            return Err(RenderError::Input(format!(
                "invalid letterSpacingPx: {letter_spacing_px}"
            )));
        }
        let color = parse_color(color)?;

        Ok(Self {
            font_family: family.to_string(),
            size_px: size_px.min(MAX_FONT_SIZE_PX),
            color,
            letter_spacing_px: letter_spacing_px.min(MAX_LETTER_SPACING_PX),
        })
    }
}

/// Parse `#RGB` / `#RRGGBB` hex (leading `#` optional) or one of the CSS
/// basic color names into an opaque pixel.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, RenderError> {
    let raw = s.trim();
    if let Some([r, g, b]) = named_color(raw) {
        return Ok(Rgba([r, g, b, 255]));
    }

    let digits = raw.strip_prefix('#').unwrap_or(raw);
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(RenderError::Input(format!("invalid color: {raw}"))),
    };
    let b = hex::decode(&expanded).map_err(|_| RenderError::Input(format!("invalid color: {raw}")))?;
    Ok(Rgba([b[0], b[1], b[2], 255]))
}

fn named_color(s: &str) -> Option<[u8; 3]> {
    let rgb = match s.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "silver" => [192, 192, 192],
        "gray" => [128, 128, 128],
        "white" => [255, 255, 255],
        "maroon" => [128, 0, 0],
        "red" => [255, 0, 0],
        "purple" => [128, 0, 128],
        "fuchsia" => [255, 0, 255],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "olive" => [128, 128, 0],
        "yellow" => [255, 255, 0],
        "navy" => [0, 0, 128],
        "blue" => [0, 0, 255],
        "teal" => [0, 128, 128],
        "aqua" => [0, 255, 255],
        _ => return None,
    };
    Some(rgb)
}
