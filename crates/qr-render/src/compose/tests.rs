use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgba, RgbaImage};

use super::*;
use crate::grid::EcLevel;
use crate::QrRenderError;
use crate::surface::RasterSurfaceFactory;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Rect(Rect, Paint),
    Text(String, Point),
    Image(Rect),
    Flush,
    Export,
}

#[derive(Default)]
struct Recorder {
    ops: Mutex<Vec<Op>>,
    created: Mutex<Vec<(u32, u32, u32)>>,
}

struct RecordingSurface {
    log: Arc<Recorder>,
    size: (u32, u32),
    ratio: u32,
    fail_export: bool,
}

impl RecordingSurface {
    fn push(&self, op: Op) {
        self.log.ops.lock().unwrap().push(op);
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn pixel_ratio(&self) -> u32 {
        self.ratio
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) -> Result<()> {
        self.push(Op::Rect(rect, paint.clone()));
        Ok(())
    }

    fn fill_text(&mut self, text: &str, at: Point, _style: &TextStyle) -> Result<()> {
        self.push(Op::Text(text.to_string(), at));
        Ok(())
    }

    fn draw_image(&mut self, _image: &RgbaImage, dest: Rect) -> Result<()> {
        self.push(Op::Image(dest));
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.push(Op::Flush);
        Ok(())
    }

    async fn export(&mut self, target: &ExportTarget) -> Result<ImageHandle> {
        if self.fail_export {
            return Err(QrRenderError::Surface("export rejected".into()));
        }
        self.push(Op::Export);
        Ok(ImageHandle {
            path: target.resolve(),
            width: self.size.0 * self.ratio,
            height: self.size.1 * self.ratio,
        })
    }
}

#[derive(Clone, Default)]
struct RecordingFactory {
    log: Arc<Recorder>,
    fail_export: bool,
}

impl SurfaceFactory for RecordingFactory {
    type Surface = RecordingSurface;

    fn create(&self, width: u32, height: u32, pixel_ratio: u32) -> Result<RecordingSurface> {
        self.log
            .created
            .lock()
            .unwrap()
            .push((width, height, pixel_ratio));
        Ok(RecordingSurface {
            log: self.log.clone(),
            size: (width, height),
            ratio: pixel_ratio,
            fail_export: self.fail_export,
        })
    }
}

fn recording_composer() -> (Composer<RecordingFactory>, Arc<Recorder>) {
    let factory = RecordingFactory::default();
    let log = factory.log.clone();
    (
        Composer::new(factory, ExportTarget::new("/tmp").with_file_stem("card")),
        log,
    )
}

fn png_logo(color: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(8, 8, color);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn kind(op: &Op) -> &'static str {
    match op {
        Op::Rect(_, Paint::Linear(_)) => "gradient",
        Op::Rect(_, Paint::Solid(c)) if *c == WHITE => "white",
        Op::Rect(..) => "dark",
        Op::Text(..) => "text",
        Op::Image(_) => "image",
        Op::Flush => "flush",
        Op::Export => "export",
    }
}

/// Collapse consecutive module fills so the step order is readable.
fn step_kinds(ops: &[Op]) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for op in ops {
        let k = kind(op);
        if k == "dark" && out.last() == Some(&"dark") {
            continue;
        }
        out.push(k);
    }
    out
}

#[tokio::test]
async fn composed_steps_run_in_order() {
    let (composer, log) = recording_composer();
    let options = DecorationOptions::default()
        .with_top_label("Top")
        .with_bottom_label("Bottom")
        .with_logo(LogoSource::Bytes(png_logo(Rgba([255, 0, 0, 255]))), 50);

    let handle = composer.compose_image("https://example.com", &options).await.unwrap();
    assert_eq!((handle.width, handle.height), (480, 664));
    assert_eq!(*log.created.lock().unwrap(), vec![(240, 332, 2)]);

    let ops = log.ops.lock().unwrap();
    assert_eq!(
        step_kinds(&ops),
        vec!["gradient", "text", "white", "dark", "white", "image", "text", "flush", "export"]
    );
}

#[tokio::test]
async fn labels_and_body_follow_the_card_layout() {
    let (composer, log) = recording_composer();
    let options = DecorationOptions::default()
        .with_top_label("Top")
        .with_bottom_label("Bottom");
    composer.compose_image("layout", &options).await.unwrap();

    let ops = log.ops.lock().unwrap();
    let texts: Vec<_> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Text(t, p) => Some((t.as_str(), *p)),
            _ => None,
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            ("Top", Point::new(120.0, 38.0)),
            ("Bottom", Point::new(120.0, 294.0)),
        ]
    );

    // QR body light fill sits right below the top band.
    let body = ops
        .iter()
        .find_map(|op| match op {
            Op::Rect(r, Paint::Solid(c)) if *c == WHITE => Some(*r),
            _ => None,
        })
        .unwrap();
    assert_eq!(body, Rect::new(20.0, 66.0, 200.0, 200.0));
}

#[tokio::test]
async fn logo_pad_is_four_pixels_wider_than_logo() {
    let (composer, log) = recording_composer();
    let options = DecorationOptions::default()
        .with_logo(LogoSource::Bytes(png_logo(Rgba([0, 0, 255, 255]))), 40);
    composer.compose_image("logo", &options).await.unwrap();

    let ops = log.ops.lock().unwrap();
    let image_rect = ops
        .iter()
        .find_map(|op| match op {
            Op::Image(r) => Some(*r),
            _ => None,
        })
        .unwrap();
    assert_eq!(image_rect, Rect::new(100.0, 100.0, 40.0, 40.0));

    let pad = ops
        .iter()
        .filter_map(|op| match op {
            Op::Rect(r, Paint::Solid(c)) if *c == WHITE => Some(*r),
            _ => None,
        })
        .last()
        .unwrap();
    assert_eq!(pad, Rect::new(96.0, 96.0, 48.0, 48.0));
}

#[tokio::test]
async fn broken_logo_still_draws_bottom_label_and_exports() {
    let (composer, log) = recording_composer();
    let options = DecorationOptions::default()
        .with_bottom_label("Still here")
        .with_logo(LogoSource::Bytes(b"definitely not a png".to_vec()), 50);

    let handle = composer.compose_image("degrade", &options).await;
    assert!(handle.is_ok());

    let ops = log.ops.lock().unwrap();
    let kinds = step_kinds(&ops);
    assert!(!kinds.contains(&"image"));
    assert_eq!(
        kinds,
        vec!["gradient", "white", "dark", "text", "flush", "export"]
    );
}

#[tokio::test]
async fn export_failure_propagates() {
    let factory = RecordingFactory {
        fail_export: true,
        ..RecordingFactory::default()
    };
    let composer = Composer::new(factory, ExportTarget::temp());
    let err = composer
        .compose_image("fails", &DecorationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, QrRenderError::Surface(_)));
}

#[tokio::test]
async fn invalid_options_fail_before_any_surface_exists() {
    let (composer, log) = recording_composer();
    let options = DecorationOptions::new(RenderOptions::new().with_pixel_width(0));
    let err = composer.compose_image("x", &options).await.unwrap_err();
    assert!(matches!(err, QrRenderError::InvalidOption(_)));
    assert!(log.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_width_fails_before_any_surface_exists() {
    let (composer, log) = recording_composer();
    let options = DecorationOptions::new(RenderOptions::new().with_pixel_width(u32::MAX - 10))
        .with_top_label("Top")
        .with_bottom_label("Bottom");
    let err = composer.compose_image("x", &options).await.unwrap_err();
    assert!(matches!(err, QrRenderError::InvalidOption(_)));
    assert!(log.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn encoder_errors_propagate() {
    let (composer, _log) = recording_composer();
    let content = "z".repeat(5000);
    let err = composer
        .compose_plain_image(&content, &RenderOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, QrRenderError::Encode(_)));
}

#[tokio::test]
async fn plain_image_is_full_bleed_at_ratio_one() {
    let (composer, log) = recording_composer();
    let options = RenderOptions::new().with_pixel_width(150);
    let handle = composer.compose_plain_image("plain", &options).await.unwrap();

    assert_eq!((handle.width, handle.height), (150, 150));
    assert_eq!(*log.created.lock().unwrap(), vec![(150, 150, 1)]);
    let ops = log.ops.lock().unwrap();
    assert_eq!(step_kinds(&ops), vec!["white", "dark", "flush", "export"]);
}

#[tokio::test]
async fn raster_card_has_gradient_corners_and_centered_logo() {
    let dir = tempfile::tempdir().unwrap();
    let composer = Composer::new(
        RasterSurfaceFactory::new(),
        ExportTarget::new(dir.path()).with_file_stem("card"),
    );
    let red = Rgba([255, 0, 0, 255]);
    let options = DecorationOptions::default().with_logo(LogoSource::Bytes(png_logo(red)), 40);

    let handle = composer.compose_image("raster card", &options).await.unwrap();
    assert_eq!((handle.width, handle.height), (480, 480));

    let img = image::open(&handle.path).unwrap().to_rgba8();
    let top_left = img.get_pixel(0, 0);
    let bottom_right = img.get_pixel(479, 479);
    assert!(top_left[0] > 240 && top_left[2] > 245);
    assert!(bottom_right[0] < 200 && bottom_right[2] > 220);

    // logo center, then the white pad just outside the logo
    let center = img.get_pixel(240, 240);
    assert!(center[0] > 250 && center[1] < 5);
    assert_eq!(*img.get_pixel(240, 2 * 96 + 2), WHITE);
}

#[tokio::test]
async fn plain_raster_render_is_pixel_identical() {
    let dir = tempfile::tempdir().unwrap();
    let composer = Composer::new(RasterSurfaceFactory::new(), ExportTarget::new(dir.path()));
    let options = RenderOptions::new()
        .with_pixel_width(173)
        .with_margin(3)
        .with_ec_level(EcLevel::Q);

    let a = composer.compose_plain_image("idempotent", &options).await.unwrap();
    let b = composer.compose_plain_image("idempotent", &options).await.unwrap();
    assert_ne!(a.path, b.path);

    let a = image::open(&a.path).unwrap().to_rgba8();
    let b = image::open(&b.path).unwrap().to_rgba8();
    assert_eq!(a.dimensions(), (173, 173));
    assert_eq!(a, b);
}

const FONT: &[u8] = include_bytes!("../../tests/fixtures/DejaVuSans.ttf");

/// Bounding box `(x0, y0, x1, y1)` of label-colored pixels in `rows`.
fn label_ink(img: &RgbaImage, rows: std::ops::Range<u32>) -> (u32, u32, u32, u32) {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in rows {
        for x in 0..img.width() {
            if img.get_pixel(x, y)[0] < 150 {
                let b = bounds.get_or_insert((x, y, x, y));
                *b = (b.0.min(x), b.1.min(y), b.2.max(x), b.3.max(y));
            }
        }
    }
    bounds.expect("no label ink found")
}

#[tokio::test]
async fn raster_labels_are_centered_in_their_bands() {
    let dir = tempfile::tempdir().unwrap();
    let font = crate::surface::font_from_bytes(FONT.to_vec()).unwrap();
    let composer = Composer::new(
        RasterSurfaceFactory::new().with_font(font),
        ExportTarget::new(dir.path()),
    );
    let options = DecorationOptions::default()
        .with_top_label("Scan Me")
        .with_bottom_label("Scan Me");

    let handle = composer.compose_image("labelled", &options).await.unwrap();
    assert_eq!((handle.width, handle.height), (480, 664));
    let img = image::open(&handle.path).unwrap().to_rgba8();

    // device rows: top band 40..112, body 132..532, bottom band 552..624
    let (x0, y0, x1, y1) = label_ink(&img, 0..132);
    assert!(y0 >= 40 && y1 < 112, "top label rows {y0}..{y1}");
    assert!((y0 + y1).abs_diff(2 * 76) <= 12, "top label rows {y0}..{y1}");
    assert!((x0 + x1).abs_diff(2 * 240) <= 12, "top label columns {x0}..{x1}");

    let (bx0, by0, bx1, by1) = label_ink(&img, 532..664);
    assert!(by0 >= 552 && by1 < 624, "bottom label rows {by0}..{by1}");
    assert!((by0 + by1).abs_diff(2 * 588) <= 12, "bottom label rows {by0}..{by1}");
    assert!(bx0.abs_diff(x0) <= 2 && bx1.abs_diff(x1) <= 2);
    assert!((by0 - 512).abs_diff(y0) <= 2);
}

#[tokio::test]
async fn labels_need_a_font_on_raster_surfaces() {
    let dir = tempfile::tempdir().unwrap();
    let composer = Composer::new(RasterSurfaceFactory::new(), ExportTarget::new(dir.path()));
    let options = DecorationOptions::default().with_top_label("No font");
    let err = composer.compose_image("x", &options).await.unwrap_err();
    assert!(matches!(err, QrRenderError::MissingFont));
}
