//! Runtime configuration loaded from the environment (and `.env`).

use std::path::PathBuf;

use qr_render::color::parse_hex_color;
use qr_render::{EcLevel, RenderOptions};

use super::validation::validate_setting;

/// Runtime configuration; every field falls back to a default.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub font_path: Option<PathBuf>,
    pub pixel_width: u32,
    pub margin: u32,
    pub dark_color: String,
    pub light_color: String,
    pub ec_level: EcLevel,
    pub logo_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
            font_path: None,
            pixel_width: 200,
            margin: 2,
            dark_color: "#000000".into(),
            light_color: "#ffffff".into(),
            ec_level: EcLevel::H,
            logo_size: 50,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, validating every present value.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> Result<Option<String>, anyhow::Error> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => {
                    validate_setting(key, &v)
                        .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;
                    Ok(Some(v.trim().to_string()))
                }
                _ => Ok(None),
            }
        };

        let defaults = Self::default();
        Ok(Self {
            output_dir: g("QR_OUTPUT_DIR")?
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            font_path: g("QR_FONT_PATH")?.map(PathBuf::from),
            pixel_width: parse_or(g("QR_PIXEL_WIDTH")?, defaults.pixel_width),
            margin: parse_or(g("QR_MARGIN")?, defaults.margin),
            dark_color: g("QR_DARK_COLOR")?.unwrap_or(defaults.dark_color),
            light_color: g("QR_LIGHT_COLOR")?.unwrap_or(defaults.light_color),
            ec_level: match g("QR_EC_LEVEL")? {
                Some(v) => v.parse()?,
                None => defaults.ec_level,
            },
            logo_size: parse_or(g("QR_LOGO_SIZE")?, defaults.logo_size),
        })
    }

    /// Render options described by this configuration alone.
    pub fn render_options(&self) -> Result<RenderOptions, anyhow::Error> {
        Ok(RenderOptions::new()
            .with_pixel_width(self.pixel_width)
            .with_margin(self.margin)
            .with_dark(parse_hex_color(&self.dark_color)?)
            .with_light(parse_hex_color(&self.light_color)?)
            .with_ec_level(self.ec_level))
    }
}

fn parse_or(value: Option<String>, default: u32) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
