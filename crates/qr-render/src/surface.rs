//! Drawing surface abstraction and the in-memory raster implementation.
//!
//! The composer never looks a canvas up by name: it receives a
//! [`SurfaceFactory`] and asks it for a fresh surface per render call.
//! Coordinates passed to a surface are logical pixels; the surface applies
//! its device pixel ratio.

use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::imageops::FilterType;
use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{debug, info};

use crate::color;
use crate::geometry::{Point, Rect};
use crate::text::{self, TextStyle};
use crate::{QrRenderError, Result};

/// Linear gradient between two points, with offset-sorted color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    start: Point,
    end: Point,
    stops: Vec<(f32, Rgba<u8>)>,
}

impl LinearGradient {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
            stops: Vec::new(),
        }
    }

    /// Add a stop at `offset` (clamped to `0.0..=1.0`).
    ///
    /// Stops with equal offsets keep insertion order.
    pub fn add_color_stop(&mut self, offset: f32, color: Rgba<u8>) {
        let offset = offset.clamp(0.0, 1.0);
        let idx = self.stops.partition_point(|(o, _)| *o <= offset);
        self.stops.insert(idx, (offset, color));
    }

    pub fn with_stop(mut self, offset: f32, color: Rgba<u8>) -> Self {
        self.add_color_stop(offset, color);
        self
    }

    /// Color of the gradient at `p`; transparent when no stops are set.
    pub fn color_at(&self, p: Point) -> Rgba<u8> {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return Rgba([0, 0, 0, 0]),
        };

        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq > 0.0 {
            ((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len_sq
        } else {
            0.0
        };

        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t >= o0 && t <= o1 {
                let span = o1 - o0;
                let local = if span > 0.0 { (t - o0) / span } else { 1.0 };
                return color::lerp(c0, c1, local);
            }
        }
        last.1
    }
}

/// Fill style for rectangles.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba<u8>),
    Linear(LinearGradient),
}

impl Paint {
    pub fn color_at(&self, p: Point) -> Rgba<u8> {
        match self {
            Paint::Solid(c) => *c,
            Paint::Linear(g) => g.color_at(p),
        }
    }
}

impl From<Rgba<u8>> for Paint {
    fn from(c: Rgba<u8>) -> Self {
        Paint::Solid(c)
    }
}

/// Where an exported image is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub dir: PathBuf,

    /// File name without extension; generated when `None`.
    pub file_stem: Option<String>,
}

impl ExportTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_stem: None,
        }
    }

    /// Export into the system temporary directory.
    pub fn temp() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = Some(stem.into());
        self
    }

    /// Resolve the output path, generating a unique name when needed.
    pub fn resolve(&self) -> PathBuf {
        let stem = match &self.file_stem {
            Some(s) => s.clone(),
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                format!(
                    "qr-{}-{}",
                    chrono::Local::now().format("%Y%m%d-%H%M%S"),
                    &id[..8]
                )
            }
        };
        self.dir.join(format!("{stem}.png"))
    }
}

/// An exported image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub path: PathBuf,

    /// Width in device pixels.
    pub width: u32,

    /// Height in device pixels.
    pub height: u32,
}

/// A 2D raster target the rasterizer and composer draw on.
pub trait DrawingSurface {
    /// Logical size (before the pixel ratio is applied).
    fn size(&self) -> (u32, u32);

    fn pixel_ratio(&self) -> u32;

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) -> Result<()>;

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) -> Result<()>;

    /// Draw `image` scaled into `dest`.
    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) -> Result<()>;

    /// Completes once every previously issued draw call is applied.
    fn flush(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn export(&mut self, target: &ExportTarget) -> impl Future<Output = Result<ImageHandle>> + Send;
}

/// Allocates one surface per render call.
pub trait SurfaceFactory {
    type Surface: DrawingSurface;

    fn create(&self, width: u32, height: u32, pixel_ratio: u32) -> Result<Self::Surface>;
}

/// In-memory RGBA surface.
///
/// A device pixel is covered by a rectangle when its center lies inside the
/// half-open rectangle, so rectangles sharing an edge never overlap or leave
/// a gap between them.
pub struct RasterSurface {
    image: RgbaImage,
    width: u32,
    height: u32,
    ratio: u32,
    font: Option<FontArc>,
}

impl RasterSurface {
    /// Create a transparent surface of `width × height` logical pixels.
    pub fn new(width: u32, height: u32, pixel_ratio: u32) -> Result<Self> {
        if width == 0 || height == 0 || pixel_ratio == 0 {
            return Err(QrRenderError::Surface(format!(
                "invalid surface size {width}x{height} @{pixel_ratio}x"
            )));
        }
        let (dw, dh) = width
            .checked_mul(pixel_ratio)
            .zip(height.checked_mul(pixel_ratio))
            .ok_or_else(|| {
                QrRenderError::Surface(format!("surface {width}x{height} @{pixel_ratio}x is too large"))
            })?;

        Ok(Self {
            image: RgbaImage::new(dw, dh),
            width,
            height,
            ratio: pixel_ratio,
            font: None,
        })
    }

    pub fn with_font(mut self, font: Option<FontArc>) -> Self {
        self.font = font;
        self
    }

    /// The device-pixel buffer.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Device pixel span `[start, end)` whose centers fall in `[lo, hi)`.
    fn span(lo: f32, hi: f32, limit: u32) -> (u32, u32) {
        let start = (lo - 0.5).ceil().max(0.0);
        let end = (hi - 0.5).ceil().min(limit as f32);
        if end <= start {
            return (0, 0);
        }
        (start as u32, end as u32)
    }

    fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

impl DrawingSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel_ratio(&self) -> u32 {
        self.ratio
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) -> Result<()> {
        let r = self.ratio as f32;
        let (x0, x1) = Self::span(rect.x * r, rect.right() * r, self.image.width());
        let (y0, y1) = Self::span(rect.y * r, rect.bottom() * r, self.image.height());

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new((x as f32 + 0.5) / r, (y as f32 + 0.5) / r);
                let fg = paint.color_at(center);
                let bg = *self.image.get_pixel(x, y);
                self.image.put_pixel(x, y, color::blend(bg, fg));
            }
        }
        Ok(())
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) -> Result<()> {
        let font = self.font.as_ref().ok_or(QrRenderError::MissingFont)?;
        let r = self.ratio as f32;
        let scale = PxScale::from(style.size * r);
        text::draw_anchored_text(
            &mut self.image,
            font,
            scale,
            at.x * r,
            at.y * r,
            text,
            style.color,
            style.align,
            style.baseline,
            style.bold,
        );
        Ok(())
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) -> Result<()> {
        let r = self.ratio as f32;
        let w = (dest.width * r).round();
        let h = (dest.height * r).round();
        if w < 1.0 || h < 1.0 || image.width() == 0 || image.height() == 0 {
            return Ok(());
        }

        let (w, h) = (w as u32, h as u32);
        let resized = if image.dimensions() == (w, h) {
            image.clone()
        } else {
            image::imageops::resize(image, w, h, FilterType::Lanczos3)
        };
        let left = (dest.x * r).round() as i64;
        let top = (dest.y * r).round() as i64;
        let (bw, bh) = (i64::from(self.image.width()), i64::from(self.image.height()));

        for (dx, dy, pixel) in resized.enumerate_pixels() {
            let tx = left + i64::from(dx);
            let ty = top + i64::from(dy);
            if tx < 0 || ty < 0 || tx >= bw || ty >= bh {
                continue;
            }
            let (tx, ty) = (tx as u32, ty as u32);
            let bg = *self.image.get_pixel(tx, ty);
            self.image.put_pixel(tx, ty, color::blend(bg, *pixel));
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        // Draw calls write straight into the buffer.
        debug!(width = self.image.width(), height = self.image.height(), "Surface flushed");
        Ok(())
    }

    async fn export(&mut self, target: &ExportTarget) -> Result<ImageHandle> {
        let path = target.resolve();
        let png = self.encode_png()?;

        tokio::fs::create_dir_all(&target.dir)
            .await
            .map_err(|e| io_error(e, &target.dir))?;
        tokio::fs::write(&path, &png)
            .await
            .map_err(|e| io_error(e, &path))?;

        info!(
            path = %path.display(),
            width = self.image.width(),
            height = self.image.height(),
            bytes = png.len(),
            "Exported image"
        );

        Ok(ImageHandle {
            path,
            width: self.image.width(),
            height: self.image.height(),
        })
    }
}

fn io_error(e: std::io::Error, path: &Path) -> QrRenderError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        QrRenderError::PermissionDenied(path.to_path_buf())
    } else {
        QrRenderError::Io(e)
    }
}

/// Parse TTF/OTF bytes into a font usable by [`RasterSurface`].
pub fn font_from_bytes(data: Vec<u8>) -> Result<FontArc> {
    FontArc::try_from_vec(data)
        .map_err(|_| QrRenderError::Surface("failed to parse font data (TTF/OTF)".into()))
}

/// Factory for [`RasterSurface`]s sharing one optional label font.
#[derive(Clone, Default)]
pub struct RasterSurfaceFactory {
    font: Option<FontArc>,
}

impl RasterSurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

impl SurfaceFactory for RasterSurfaceFactory {
    type Surface = RasterSurface;

    fn create(&self, width: u32, height: u32, pixel_ratio: u32) -> Result<RasterSurface> {
        debug!(width, height, pixel_ratio, "Allocating raster surface");
        Ok(RasterSurface::new(width, height, pixel_ratio)?.with_font(self.font.clone()))
    }
}
