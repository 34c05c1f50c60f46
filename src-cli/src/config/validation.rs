//! Setting value validation.

use qr_render::{EcLevel, MAX_PIXEL_WIDTH};
use qr_render::color::parse_hex_color;

/// Upper bound for pixel-valued settings.
pub const MAX_PIXELS: i64 = MAX_PIXEL_WIDTH as i64;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "QR_PIXEL_WIDTH" | "QR_LOGO_SIZE" => validate_int_range(value, 1, MAX_PIXELS)?,
        "QR_MARGIN" => validate_int_range(value, 0, 64)?,
        "QR_DARK_COLOR" | "QR_LIGHT_COLOR" => {
            parse_hex_color(value).map_err(|_| "must be a hex color like #000000".to_string())?;
        }
        "QR_EC_LEVEL" => {
            value
                .parse::<EcLevel>()
                .map_err(|_| "must be one of L, M, Q, H".to_string())?;
        }
        "QR_OUTPUT_DIR" | "QR_FONT_PATH" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.trim().parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
