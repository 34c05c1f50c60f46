//! Text measurement and aligned drawing for label bands.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

/// Label font size in logical pixels.
pub const LABEL_FONT_SIZE: f32 = 16.0;

/// Horizontal anchor of a text run relative to its `x` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of a text run relative to its `y` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Alphabetic,
    Bottom,
}

/// Style of a `fill_text` call, in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Rgba<u8>,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl TextStyle {
    /// Bold, centered, middle-anchored label text.
    pub fn label() -> Self {
        Self {
            size: LABEL_FONT_SIZE,
            bold: true,
            color: crate::color::LABEL_COLOR,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        }
    }
}

/// Horizontal advance of `text` in pixels, kerning included.
pub fn measure_text_width(font: &impl Font, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    text.chars()
        .map(|c| scaled.glyph_id(c))
        .fold((0.0, None), |(advance, prev), id| {
            let kern = prev.map_or(0.0, |p| scaled.kern(p, id));
            (advance + kern + scaled.h_advance(id), Some(id))
        })
        .0
}

/// Resolve the top-left corner of a text run anchored at `(x, y)`.
///
/// `draw_text_mut` places the top of the ascent at its `y`.
pub fn anchor_origin(
    font: &impl Font,
    scale: PxScale,
    text: &str,
    x: f32,
    y: f32,
    align: TextAlign,
    baseline: TextBaseline,
) -> (i32, i32) {
    let width = measure_text_width(font, scale, text);
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();
    let glyph_height = ascent - scaled.descent();

    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    };
    let top = match baseline {
        TextBaseline::Top => y,
        TextBaseline::Middle => y - glyph_height / 2.0,
        TextBaseline::Alphabetic => y - ascent,
        TextBaseline::Bottom => y - glyph_height,
    };
    (left.round() as i32, top.round() as i32)
}

/// Draw `text` on `img` anchored at device-pixel `(x, y)`.
///
/// Bold is emulated by striking the run a second time one pixel to the right.
#[allow(clippy::too_many_arguments)]
pub fn draw_anchored_text(
    img: &mut RgbaImage,
    font: &impl Font,
    scale: PxScale,
    x: f32,
    y: f32,
    text: &str,
    color: Rgba<u8>,
    align: TextAlign,
    baseline: TextBaseline,
    bold: bool,
) {
    let (left, top) = anchor_origin(font, scale, text, x, y, align, baseline);
    draw_text_mut(img, color, left, top, scale, font, text);
    if bold {
        draw_text_mut(img, color, left + 1, top, scale, font, text);
    }
}
