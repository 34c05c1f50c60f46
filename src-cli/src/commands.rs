//! Command execution: resolve options, build a composer, render.
//!
//! Precedence for every option: command-line flag, then style file, then
//! environment, then built-in default.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use qr_render::color::parse_hex_color;
use qr_render::policy::max_logo_size;
use qr_render::surface::font_from_bytes;
use qr_render::{
    Composer, DecorationOptions, EcLevel, ExportTarget, ImageHandle, LogoSource,
    RasterSurfaceFactory, RenderOptions,
};

use crate::cli::{Command, StyleArgs};
use crate::config::AppConfig;
use crate::style::StyleFile;

/// Run one CLI command and return what should be printed on stdout.
pub async fn run(command: Command, config: &AppConfig) -> Result<String, anyhow::Error> {
    match command {
        Command::Render {
            content,
            style,
            top_label,
            bottom_label,
            logo,
            logo_size,
        } => {
            let style_file = load_style(&style)?;
            let mut opts = DecorationOptions::new(config.render_options()?);
            opts.logo_size = config.logo_size;
            if let Some(file) = &style_file {
                file.apply_decoration(&mut opts)?;
            }
            apply_style_args(&style, &mut opts.render)?;
            if let Some(v) = top_label {
                opts.top_label = Some(v);
            }
            if let Some(v) = bottom_label {
                opts.bottom_label = Some(v);
            }
            if let Some(v) = logo {
                opts.logo = Some(LogoSource::Path(v));
            }
            if let Some(v) = logo_size {
                opts.logo_size = v;
            }

            let needs_font = opts.top_label().is_some() || opts.bottom_label().is_some();
            let composer = build_composer(config, &style, needs_font).await?;
            let handle = composer
                .compose_image(&content, &opts)
                .await
                .context("failed to render QR card")?;
            Ok(describe(&handle))
        }
        Command::Preview { content, style } => {
            let style_file = load_style(&style)?;
            let mut opts = config.render_options()?;
            if let Some(file) = &style_file {
                file.apply_render(&mut opts)?;
            }
            apply_style_args(&style, &mut opts)?;

            let composer = build_composer(config, &style, false).await?;
            let handle = composer
                .compose_plain_image(&content, &opts)
                .await
                .context("failed to render QR preview")?;
            Ok(describe(&handle))
        }
        Command::LogoSize { width, level } => {
            let width = width.unwrap_or(config.pixel_width);
            let level: EcLevel = match level {
                Some(v) => v.parse()?,
                None => config.ec_level,
            };
            let max = max_logo_size(width, level);
            debug!(width, level = %level, max, "Computed logo size policy");
            Ok(format!("{max:.1}"))
        }
    }
}

fn load_style(args: &StyleArgs) -> Result<Option<StyleFile>, anyhow::Error> {
    args.style.as_deref().map(StyleFile::load).transpose()
}

/// Overlay explicit command-line style flags onto `opts`.
fn apply_style_args(args: &StyleArgs, opts: &mut RenderOptions) -> Result<(), anyhow::Error> {
    if let Some(v) = args.width {
        opts.pixel_width = v;
    }
    if let Some(v) = args.margin {
        opts.margin_modules = v;
    }
    if let Some(v) = &args.dark {
        opts.dark = parse_hex_color(v)?;
    }
    if let Some(v) = &args.light {
        opts.light = parse_hex_color(v)?;
    }
    if let Some(v) = &args.level {
        opts.ec_level = v.parse()?;
    }
    Ok(())
}

async fn build_composer(
    config: &AppConfig,
    args: &StyleArgs,
    needs_font: bool,
) -> Result<Composer<RasterSurfaceFactory>, anyhow::Error> {
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());

    let mut factory = RasterSurfaceFactory::new();
    if let Some(path) = args.font.as_ref().or(config.font_path.as_ref()) {
        factory = factory.with_font(load_font(path).await?);
    }
    if needs_font && !factory.has_font() {
        anyhow::bail!("labels need a font: pass --font or set QR_FONT_PATH");
    }

    Ok(Composer::new(factory, ExportTarget::new(out_dir)))
}

async fn load_font(path: &Path) -> Result<qr_render::FontArc, anyhow::Error> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read font {}", path.display()))?;
    let font = font_from_bytes(data).with_context(|| format!("invalid font {}", path.display()))?;
    info!(path = %path.display(), "Loaded label font");
    Ok(font)
}

fn describe(handle: &ImageHandle) -> String {
    format!("{} ({}x{})", handle.path.display(), handle.width, handle.height)
}
