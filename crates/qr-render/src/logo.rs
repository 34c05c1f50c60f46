//! Center logo loading and placement.

use std::path::PathBuf;

use image::RgbaImage;
use tracing::debug;

use crate::geometry::{Point, Rect};
use crate::{LOGO_PAD, QrRenderError, Result};

/// Where a logo image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Read and decode a logo into RGBA.
///
/// Read and decode failures both map to [`QrRenderError::LogoDecode`].
pub async fn load_logo(source: &LogoSource) -> Result<RgbaImage> {
    let decoded = match source {
        LogoSource::Path(path) => {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| QrRenderError::LogoDecode(format!("{}: {e}", path.display())))?;
            image::load_from_memory(&data)
        }
        LogoSource::Bytes(data) => image::load_from_memory(data),
    };

    let logo = decoded
        .map_err(|e| QrRenderError::LogoDecode(e.to_string()))?
        .to_rgba8();
    debug!(width = logo.width(), height = logo.height(), "Loaded logo");
    Ok(logo)
}

/// White backing pad and inner logo square, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoRegions {
    pub pad: Rect,
    pub logo: Rect,
}

/// Center a `logo_size` square inside the QR body at `qr_origin`.
pub fn logo_regions(qr_origin: Point, qr_pixel_width: u32, logo_size: u32) -> LogoRegions {
    let offset = (qr_pixel_width as f32 - logo_size as f32) / 2.0;
    let logo = Rect::square(
        Point::new(qr_origin.x + offset, qr_origin.y + offset),
        logo_size as f32,
    );
    LogoRegions {
        pad: logo.inflate(LOGO_PAD as f32),
        logo,
    }
}
