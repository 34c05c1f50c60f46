//! Module grid produced by the QR matrix encoder.

use std::fmt;
use std::str::FromStr;

use qrcode::QrCode;
use tracing::debug;

use crate::{QrRenderError, Result};

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EcLevel {
    L,
    M,
    Q,
    #[default]
    H,
}

impl EcLevel {
    pub const ALL: [EcLevel; 4] = [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H];

    pub fn as_str(self) -> &'static str {
        match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        }
    }
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for EcLevel {
    type Err = QrRenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(EcLevel::L),
            "M" => Ok(EcLevel::M),
            "Q" => Ok(EcLevel::Q),
            "H" => Ok(EcLevel::H),
            _ => Err(QrRenderError::InvalidEcLevel(s.to_string())),
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable square matrix of QR modules; `true` is dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    size: usize,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Build a grid from row-major module values.
    ///
    /// Fails unless `modules.len() == size * size` and `size >= 1`.
    pub fn from_modules(size: usize, modules: Vec<bool>) -> Result<Self> {
        if size == 0 || modules.len() != size * size {
            return Err(QrRenderError::InvalidOption(format!(
                "module grid of side {size} needs {} cells, got {}",
                size * size,
                modules.len()
            )));
        }
        Ok(Self { size, modules })
    }

    /// Number of modules per side.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.modules[row * self.size + col]
    }

    /// Iterate `(row, col)` of every dark module in row-major order.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(i, _)| (i / size, i % size))
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|d| **d).count()
    }
}

/// Encode `content` at the given error-correction level.
pub fn encode(content: &str, level: EcLevel) -> Result<ModuleGrid> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), level.into())
        .map_err(|e| QrRenderError::Encode(e.to_string()))?;
    let size = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();

    debug!(size, level = %level, bytes = content.len(), "Encoded QR matrix");
    ModuleGrid::from_modules(size, modules)
}
