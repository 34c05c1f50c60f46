//! JSON style files: a saved set of render and decoration options.
//!
//! Unknown fields are rejected so a typo never silently falls back to a
//! default.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use qr_render::color::parse_hex_color;
use qr_render::{DecorationOptions, LogoSource, RenderOptions};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyleFile {
    pub width: Option<u32>,
    pub margin: Option<u32>,
    pub dark_color: Option<String>,
    pub light_color: Option<String>,
    pub level: Option<String>,
    pub top_label: Option<String>,
    pub bottom_label: Option<String>,
    pub logo: Option<PathBuf>,
    pub logo_size: Option<u32>,
}

impl StyleFile {
    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read style file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid style file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self, anyhow::Error> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Overlay the render fields present in this file onto `opts`.
    pub fn apply_render(&self, opts: &mut RenderOptions) -> Result<(), anyhow::Error> {
        if let Some(v) = self.width {
            opts.pixel_width = v;
        }
        if let Some(v) = self.margin {
            opts.margin_modules = v;
        }
        if let Some(v) = &self.dark_color {
            opts.dark = parse_hex_color(v)?;
        }
        if let Some(v) = &self.light_color {
            opts.light = parse_hex_color(v)?;
        }
        if let Some(v) = &self.level {
            opts.ec_level = v.parse()?;
        }
        Ok(())
    }

    /// Overlay the decoration fields present in this file onto `opts`.
    pub fn apply_decoration(&self, opts: &mut DecorationOptions) -> Result<(), anyhow::Error> {
        self.apply_render(&mut opts.render)?;
        if let Some(v) = &self.top_label {
            opts.top_label = Some(v.clone());
        }
        if let Some(v) = &self.bottom_label {
            opts.bottom_label = Some(v.clone());
        }
        if let Some(v) = &self.logo {
            opts.logo = Some(LogoSource::Path(v.clone()));
        }
        if let Some(v) = self.logo_size {
            opts.logo_size = v;
        }
        Ok(())
    }
}
