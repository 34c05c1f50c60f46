//! Render and decoration options.
//!
//! Every field has a default; builders override a subset. `validate` is the
//! boundary check run by the composer before any drawing happens.

use image::Rgba;

use crate::color::{BLACK, WHITE};
use crate::grid::EcLevel;
use crate::logo::LogoSource;
use crate::{MAX_PIXEL_WIDTH, QrRenderError, Result};

/// Options for the bare QR body.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Width (and height) of the QR body in logical pixels, margin included.
    pub pixel_width: u32,

    /// Quiet-zone width in modules.
    pub margin_modules: u32,

    pub dark: Rgba<u8>,
    pub light: Rgba<u8>,
    pub ec_level: EcLevel,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pixel_width: 200,
            margin_modules: 2,
            dark: BLACK,
            light: WHITE,
            ec_level: EcLevel::H,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the QR body width.
    pub fn with_pixel_width(mut self, val: u32) -> Self {
        self.pixel_width = val;
        self
    }

    /// Builder: set the quiet-zone width in modules.
    pub fn with_margin(mut self, val: u32) -> Self {
        self.margin_modules = val;
        self
    }

    pub fn with_dark(mut self, val: Rgba<u8>) -> Self {
        self.dark = val;
        self
    }

    pub fn with_light(mut self, val: Rgba<u8>) -> Self {
        self.light = val;
        self
    }

    pub fn with_ec_level(mut self, val: EcLevel) -> Self {
        self.ec_level = val;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.pixel_width == 0 {
            return Err(QrRenderError::InvalidOption(
                "pixel width must be greater than 0".into(),
            ));
        }
        if self.pixel_width > MAX_PIXEL_WIDTH {
            return Err(QrRenderError::InvalidOption(format!(
                "pixel width {} exceeds {MAX_PIXEL_WIDTH}",
                self.pixel_width
            )));
        }
        Ok(())
    }
}

/// Options for the composed card: QR body plus labels and logo.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationOptions {
    pub render: RenderOptions,
    pub top_label: Option<String>,
    pub bottom_label: Option<String>,
    pub logo: Option<LogoSource>,

    /// Logo edge length in logical pixels; only used when `logo` is set.
    pub logo_size: u32,
}

impl Default for DecorationOptions {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            top_label: None,
            bottom_label: None,
            logo: None,
            logo_size: 50,
        }
    }
}

impl DecorationOptions {
    pub fn new(render: RenderOptions) -> Self {
        Self {
            render,
            ..Self::default()
        }
    }

    /// Builder: set the label drawn above the QR body.
    pub fn with_top_label(mut self, val: impl Into<String>) -> Self {
        self.top_label = Some(val.into());
        self
    }

    /// Builder: set the label drawn below the QR body.
    pub fn with_bottom_label(mut self, val: impl Into<String>) -> Self {
        self.bottom_label = Some(val.into());
        self
    }

    pub fn with_logo(mut self, source: LogoSource, size: u32) -> Self {
        self.logo = Some(source);
        self.logo_size = size;
        self
    }

    /// Top label, treating an empty string as absent.
    pub fn top_label(&self) -> Option<&str> {
        self.top_label.as_deref().filter(|s| !s.is_empty())
    }

    /// Bottom label, treating an empty string as absent.
    pub fn bottom_label(&self) -> Option<&str> {
        self.bottom_label.as_deref().filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        if self.logo.is_some() && !(1..=MAX_PIXEL_WIDTH).contains(&self.logo_size) {
            return Err(QrRenderError::InvalidOption(format!(
                "logo size must be between 1 and {MAX_PIXEL_WIDTH}"
            )));
        }
        Ok(())
    }
}
