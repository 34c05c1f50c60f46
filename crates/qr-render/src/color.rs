//! Color parsing and the fixed palette of the composed card.

use image::Rgba;

use crate::{QrRenderError, Result};

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Label text color (`#333333`).
pub const LABEL_COLOR: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 255]);

/// Top-left stop of the card background gradient.
pub const GRADIENT_START: Rgba<u8> = Rgba([245, 247, 250, 255]);

/// Bottom-right stop of the card background gradient.
pub const GRADIENT_END: Rgba<u8> = Rgba([195, 207, 226, 255]);

/// Parse a CSS-style hex color: `#rgb`, `#rrggbb` or `#rrggbbaa`.
///
/// The leading `#` is optional.
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>> {
    let invalid = || QrRenderError::InvalidColor(value.to_string());
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.is_ascii() {
        return Err(invalid());
    }

    let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut out = [255u8; 4];
            for (i, c) in hex.chars().enumerate() {
                let nibble = c.to_digit(16).ok_or_else(invalid)? as u8;
                out[i] = nibble * 17;
            }
            Ok(Rgba(out))
        }
        6 => Ok(Rgba([byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255])),
        8 => Ok(Rgba([
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        ])),
        _ => Err(invalid()),
    }
}

/// Linearly interpolate between two colors, `t` in `0.0..=1.0`.
pub fn lerp(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    Rgba([
        mix(a[0], b[0]),
        mix(a[1], b[1]),
        mix(a[2], b[2]),
        mix(a[3], b[3]),
    ])
}

/// Alpha-composite `fg` over `bg`.
pub fn blend(bg: Rgba<u8>, fg: Rgba<u8>) -> Rgba<u8> {
    match fg[3] {
        255 => fg,
        0 => bg,
        a => {
            let alpha = f32::from(a) / 255.0;
            let inv = 1.0 - alpha;
            let out_a = alpha + f32::from(bg[3]) / 255.0 * inv;
            let mix = |f: u8, b: u8| (f32::from(f) * alpha + f32::from(b) * inv).round() as u8;
            Rgba([
                mix(fg[0], bg[0]),
                mix(fg[1], bg[1]),
                mix(fg[2], bg[2]),
                (out_a * 255.0).round() as u8,
            ])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(parse_hex_color("#333333").unwrap(), LABEL_COLOR);
        assert_eq!(parse_hex_color("ff0080").unwrap(), Rgba([255, 0, 128, 255]));
    }

    #[test]
    fn parses_short_and_alpha_forms() {
        assert_eq!(parse_hex_color("#fff").unwrap(), WHITE);
        assert_eq!(parse_hex_color("#00000080").unwrap(), Rgba([0, 0, 0, 128]));
    }

    #[test]
    fn rejects_malformed_colors() {
        for bad in ["", "#12", "#gggggg", "#12345", "red", "#ééé"] {
            assert!(
                matches!(parse_hex_color(bad), Err(QrRenderError::InvalidColor(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(lerp(GRADIENT_START, GRADIENT_END, 0.0), GRADIENT_START);
        assert_eq!(lerp(GRADIENT_START, GRADIENT_END, 1.0), GRADIENT_END);
    }

    #[test]
    fn blend_respects_opaque_and_transparent() {
        assert_eq!(blend(WHITE, BLACK), BLACK);
        assert_eq!(blend(WHITE, Rgba([0, 0, 0, 0])), WHITE);
        let half = blend(WHITE, Rgba([0, 0, 0, 128]));
        assert!(half[0] > 100 && half[0] < 150);
        assert_eq!(half[3], 255);
    }
}
