//! Layout arithmetic for the QR body and the composed card.
//!
//! Cell sizes are fractional on purpose: the QR body always spans exactly
//! `pixel_width`, and sub-pixel edges are left to the surface's fill rule.

use tracing::debug;

use crate::options::RenderOptions;
use crate::{LABEL_BAND_HEIGHT, LABEL_SPACING, PADDING, QrRenderError, Result};

/// A point in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn square(origin: Point, side: f32) -> Self {
        Self::new(origin.x, origin.y, side, side)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }
}

/// Derived placement values for one QR body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub module_count: usize,
    pub pixel_width: u32,
    pub margin_modules: u32,
    pub cell_size: f32,
    pub margin_offset: f32,
}

impl Layout {
    /// Top-left of module `(row, col)` relative to the QR body origin.
    pub fn module_origin(&self, row: usize, col: usize) -> Point {
        Point::new(
            self.margin_offset + col as f32 * self.cell_size,
            self.margin_offset + row as f32 * self.cell_size,
        )
    }

    /// Distance from the body origin to the far edge of the last module.
    pub fn grid_extent(&self) -> f32 {
        self.margin_offset + self.module_count as f32 * self.cell_size
    }
}

/// Compute the layout of an `module_count`-wide grid under `options`.
///
/// Total for `module_count >= 1` and `pixel_width > 0`.
pub fn compute_layout(module_count: usize, options: &RenderOptions) -> Layout {
    let span = module_count as f32 + 2.0 * options.margin_modules as f32;
    let cell_size = options.pixel_width as f32 / span;
    let margin_offset = options.margin_modules as f32 * cell_size;

    debug!(
        module_count,
        pixel_width = options.pixel_width,
        margin = options.margin_modules,
        cell_size,
        "Computed QR layout"
    );

    Layout {
        module_count,
        pixel_width: options.pixel_width,
        margin_modules: options.margin_modules,
        cell_size,
        margin_offset,
    }
}

/// Dimensions of the composed card in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullSize {
    pub total_width: u32,
    pub total_height: u32,
}

/// Vertical space a present label takes: the band plus its spacing.
pub const fn label_band() -> u32 {
    LABEL_BAND_HEIGHT + LABEL_SPACING
}

/// Compute the composed card size for a QR body of `qr_pixel_width`.
///
/// Fails with `InvalidOption` when the card would not fit in a `u32`.
pub fn compute_full_size(
    qr_pixel_width: u32,
    has_top_label: bool,
    has_bottom_label: bool,
) -> Result<FullSize> {
    let band = |present: bool| if present { label_band() } else { 0 };
    let total_width = qr_pixel_width.checked_add(PADDING * 2);
    let total_height = total_width
        .and_then(|w| w.checked_add(band(has_top_label)))
        .and_then(|h| h.checked_add(band(has_bottom_label)));

    match total_width.zip(total_height) {
        Some((total_width, total_height)) => Ok(FullSize {
            total_width,
            total_height,
        }),
        None => Err(QrRenderError::InvalidOption(format!(
            "QR width {qr_pixel_width} is too large for a composed card"
        ))),
    }
}
