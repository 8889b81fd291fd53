//! Fonts for the PDF and PNG renderers
//!
//! Both renderers need the raw TTF bytes (printpdf embeds them) and parsed
//! glyph metrics (text measurement and rasterisation), so a face keeps
//! both.

use crate::config::Config;
use crate::error::{InspectError, Result};
use ab_glyph::{Font, FontVec};
use log::debug;
use std::path::{Path, PathBuf};

/// Fonts tried when nothing is configured. All of them cover Hebrew.
const SYSTEM_REGULAR: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const SYSTEM_BOLD: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

pub struct FontFace {
    bytes: Vec<u8>,
    font: FontVec,
}

impl FontFace {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes.clone())
            .map_err(|e| InspectError::FontLoad(format!("invalid font data: {e}")))?;
        Ok(Self { bytes, font })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| InspectError::FontLoad(format!("{}: {}", path.display(), e)))?;
        debug!("font loaded: {}", path.display());
        Self::from_bytes(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn font(&self) -> &FontVec {
        &self.font
    }

    /// Advance width of `text` at `size`, in the unit of `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units = self.font.units_per_em().unwrap_or(1000.0);
        let advance: f32 = text
            .chars()
            .map(|c| self.font.h_advance_unscaled(self.font.glyph_id(c)))
            .sum();
        advance / units * size
    }
}

pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
}

impl FontSet {
    /// Bold falls back to the regular face.
    pub fn load(regular: &Path, bold: Option<&Path>) -> Result<Self> {
        Ok(Self {
            regular: FontFace::load(regular)?,
            bold: FontFace::load(bold.unwrap_or(regular))?,
        })
    }

    /// Configured fonts, else the first system font found.
    pub fn from_config(config: &Config) -> Result<Self> {
        let regular = config
            .font_regular
            .clone()
            .or_else(|| first_existing(SYSTEM_REGULAR))
            .ok_or_else(|| {
                InspectError::FontLoad("no font configured (use `config --set-font`)".to_string())
            })?;
        let bold = config.font_bold.clone().or_else(|| {
            if config.font_regular.is_some() {
                None
            } else {
                first_existing(SYSTEM_BOLD)
            }
        });
        Self::load(&regular, bold.as_deref())
    }

    /// System fonts only.
    pub fn discover() -> Option<Self> {
        let regular = first_existing(SYSTEM_REGULAR)?;
        let bold = first_existing(SYSTEM_BOLD);
        Self::load(&regular, bold.as_deref()).ok()
    }
}

fn first_existing(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(PathBuf::from).find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes() {
        assert!(matches!(
            FontFace::from_bytes(b"not a font".to_vec()),
            Err(InspectError::FontLoad(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = FontSet::load(Path::new("/nonexistent/font.ttf"), None);
        assert!(matches!(result, Err(InspectError::FontLoad(_))));
    }

    #[test]
    fn test_width_grows_with_text() {
        let Some(fonts) = FontSet::discover() else {
            return;
        };
        let short = fonts.regular.text_width("ab", 12.0);
        let long = fonts.regular.text_width("abcd", 12.0);
        assert!(short > 0.0);
        assert!(long > short);
        assert!((fonts.regular.text_width("ab", 24.0) - short * 2.0).abs() < 0.01);
    }
}
