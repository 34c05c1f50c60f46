//! Module rasterization: one filled rectangle per dark module.

use image::Rgba;
use tracing::debug;

use crate::geometry::{Layout, Point, Rect};
use crate::grid::ModuleGrid;
use crate::surface::{DrawingSurface, Paint};
use crate::Result;

/// Dark and light module colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleColors {
    pub dark: Rgba<u8>,
    pub light: Rgba<u8>,
}

/// Paint `grid` onto `surface` with its top-left corner at `origin`.
///
/// The whole `pixel_width` square (quiet zone included) is filled with the
/// light color first. Module edges are not snapped to device pixels.
pub fn paint<S: DrawingSurface>(
    surface: &mut S,
    grid: &ModuleGrid,
    layout: &Layout,
    colors: ModuleColors,
    origin: Point,
) -> Result<()> {
    let side = layout.pixel_width as f32;
    surface.fill_rect(Rect::square(origin, side), &Paint::Solid(colors.light))?;

    let dark = Paint::Solid(colors.dark);
    let mut filled = 0usize;
    for (row, col) in grid.dark_modules() {
        let offset = layout.module_origin(row, col);
        let cell = Rect::square(
            Point::new(origin.x + offset.x, origin.y + offset.y),
            layout.cell_size,
        );
        surface.fill_rect(cell, &dark)?;
        filled += 1;
    }

    debug!(
        modules = grid.size(),
        filled,
        origin_x = origin.x,
        origin_y = origin.y,
        "Painted QR modules"
    );
    Ok(())
}
