//! Logo-size policy: how much of the QR body a centered logo may cover
//! before scannability suffers, per error-correction level.

use crate::grid::EcLevel;

/// Maximum logo edge as a fraction of the QR body width.
pub fn max_logo_ratio(level: EcLevel) -> f32 {
    match level {
        EcLevel::L => 0.15,
        EcLevel::M => 0.20,
        EcLevel::Q => 0.25,
        EcLevel::H => 0.30,
    }
}

/// Largest recommended logo edge for a QR body of `qr_pixel_width`.
pub fn max_logo_size(qr_pixel_width: u32, level: EcLevel) -> f32 {
    qr_pixel_width as f32 * max_logo_ratio(level)
}

/// Whether `logo_size` stays within the recommended maximum.
pub fn check_logo_size(qr_pixel_width: u32, level: EcLevel, logo_size: u32) -> bool {
    logo_size as f32 <= max_logo_size(qr_pixel_width, level) + f32::EPSILON
}
