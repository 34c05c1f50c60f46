//! QR code rendering and composition.
//!
//! Wraps the `qrcode` matrix encoder and turns its module grid into pixels:
//! layout arithmetic, module rasterization, label/logo decoration on a
//! gradient card, and PNG export through an injected drawing surface.

pub mod color;
pub mod compose;
pub mod geometry;
pub mod grid;
pub mod logo;
pub mod options;
pub mod policy;
pub mod raster;
pub mod surface;
pub mod text;

// Re-exports for convenience
pub use ab_glyph::FontArc;
pub use compose::Composer;
pub use geometry::{FullSize, Layout, compute_full_size, compute_layout};
pub use grid::{EcLevel, ModuleGrid, encode};
pub use logo::LogoSource;
pub use options::{DecorationOptions, RenderOptions};
pub use policy::max_logo_size;
pub use surface::{DrawingSurface, ExportTarget, ImageHandle, RasterSurface, RasterSurfaceFactory};

/// Padding around the QR body on the composed card, in logical pixels.
pub const PADDING: u32 = 20;

/// Height of a label band, in logical pixels.
pub const LABEL_BAND_HEIGHT: u32 = 36;

/// Gap between a label band and the QR body.
pub const LABEL_SPACING: u32 = 10;

/// Extra white border drawn around a centered logo.
pub const LOGO_PAD: u32 = 4;

/// Device pixel ratio used when exporting the composed card.
pub const COMPOSED_PIXEL_RATIO: u32 = 2;

/// Largest accepted QR body width and logo size, in logical pixels.
pub const MAX_PIXEL_WIDTH: u32 = 4096;

/// Errors that can occur while encoding, drawing or exporting.
#[derive(Debug, thiserror::Error)]
pub enum QrRenderError {
    #[error("Invalid error-correction level: {0:?} (expected L, M, Q or H)")]
    InvalidEcLevel(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    #[error("QR encode error: {0}")]
    Encode(String),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("No font configured for text rendering")]
    MissingFont,

    #[error("Logo decode error: {0}")]
    LogoDecode(String),

    #[error("Permission denied writing to {}", .0.display())]
    PermissionDenied(std::path::PathBuf),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for qr-render operations.
pub type Result<T> = std::result::Result<T, QrRenderError>;
