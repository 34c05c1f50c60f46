//! Card composition: gradient background, labels, QR body, centered logo,
//! then flush and export.
//!
//! Each render call allocates its own surface from the factory and issues
//! every draw call before the flush barrier; export only starts once the
//! flush completes.

use tracing::{debug, info, warn};

use crate::color::{GRADIENT_END, GRADIENT_START, WHITE};
use crate::geometry::{Point, Rect, compute_full_size, compute_layout, label_band};
use crate::grid;
use crate::logo::{self, LogoSource};
use crate::options::{DecorationOptions, RenderOptions};
use crate::policy;
use crate::raster::{self, ModuleColors};
use crate::surface::{
    DrawingSurface, ExportTarget, ImageHandle, LinearGradient, Paint, SurfaceFactory,
};
use crate::text::TextStyle;
use crate::{COMPOSED_PIXEL_RATIO, LABEL_BAND_HEIGHT, LABEL_SPACING, PADDING, Result};

/// Renders QR images onto surfaces from `F` and exports them to `target`.
pub struct Composer<F> {
    factory: F,
    target: ExportTarget,
}

impl<F: SurfaceFactory> Composer<F> {
    pub fn new(factory: F, target: ExportTarget) -> Self {
        Self { factory, target }
    }

    /// Render the decorated card and export it at [`COMPOSED_PIXEL_RATIO`].
    pub async fn compose_image(
        &self,
        content: &str,
        options: &DecorationOptions,
    ) -> Result<ImageHandle> {
        options.validate()?;
        let render = &options.render;
        let grid = grid::encode(content, render.ec_level)?;
        let layout = compute_layout(grid.size(), render);

        let top_label = options.top_label();
        let bottom_label = options.bottom_label();
        let full = compute_full_size(render.pixel_width, top_label.is_some(), bottom_label.is_some())?;

        if options.logo.is_some()
            && !policy::check_logo_size(render.pixel_width, render.ec_level, options.logo_size)
        {
            warn!(
                logo_size = options.logo_size,
                max = policy::max_logo_size(render.pixel_width, render.ec_level),
                level = %render.ec_level,
                "Logo exceeds recommended size; the code may not scan"
            );
        }

        let mut surface =
            self.factory
                .create(full.total_width, full.total_height, COMPOSED_PIXEL_RATIO)?;
        let (width, height) = (full.total_width as f32, full.total_height as f32);

        // Background
        let gradient = LinearGradient::new(0.0, 0.0, width, height)
            .with_stop(0.0, GRADIENT_START)
            .with_stop(1.0, GRADIENT_END);
        surface.fill_rect(Rect::new(0.0, 0.0, width, height), &Paint::Linear(gradient))?;

        let label_style = TextStyle::label();
        let band_center = LABEL_BAND_HEIGHT as f32 / 2.0;
        let mut cursor = PADDING as f32;

        if let Some(label) = top_label {
            surface.fill_text(label, Point::new(width / 2.0, cursor + band_center), &label_style)?;
            cursor += label_band() as f32;
        }

        let qr_origin = Point::new(PADDING as f32, cursor);
        let colors = ModuleColors {
            dark: render.dark,
            light: render.light,
        };
        raster::paint(&mut surface, &grid, &layout, colors, qr_origin)?;
        cursor += render.pixel_width as f32;

        if let Some(source) = &options.logo {
            draw_logo(&mut surface, source, qr_origin, render.pixel_width, options.logo_size).await?;
        }

        if let Some(label) = bottom_label {
            cursor += LABEL_SPACING as f32;
            surface.fill_text(label, Point::new(width / 2.0, cursor + band_center), &label_style)?;
        }

        debug!(
            width = full.total_width,
            height = full.total_height,
            top_label = top_label.is_some(),
            bottom_label = bottom_label.is_some(),
            logo = options.logo.is_some(),
            "Card drawn, flushing surface"
        );
        surface.flush().await?;
        let handle = surface.export(&self.target).await?;
        info!(path = %handle.path.display(), "Composed QR card");
        Ok(handle)
    }

    /// Render only the QR body, full bleed, at a pixel ratio of 1.
    pub async fn compose_plain_image(
        &self,
        content: &str,
        options: &RenderOptions,
    ) -> Result<ImageHandle> {
        options.validate()?;
        let grid = grid::encode(content, options.ec_level)?;
        let layout = compute_layout(grid.size(), options);

        let mut surface = self
            .factory
            .create(options.pixel_width, options.pixel_width, 1)?;
        let colors = ModuleColors {
            dark: options.dark,
            light: options.light,
        };
        raster::paint(&mut surface, &grid, &layout, colors, Point::default())?;

        surface.flush().await?;
        surface.export(&self.target).await
    }
}

/// Draw the quiet pad and logo; a logo that fails to load is skipped.
async fn draw_logo<S: DrawingSurface>(
    surface: &mut S,
    source: &LogoSource,
    qr_origin: Point,
    qr_pixel_width: u32,
    logo_size: u32,
) -> Result<()> {
    let image = match logo::load_logo(source).await {
        Ok(image) => image,
        Err(e) => {
            warn!(error = %e, "Logo unavailable, rendering without it");
            return Ok(());
        }
    };

    let regions = logo::logo_regions(qr_origin, qr_pixel_width, logo_size);
    surface.fill_rect(regions.pad, &Paint::Solid(WHITE))?;
    surface.draw_image(&image, regions.logo)
}

#[cfg(test)]
mod tests;
