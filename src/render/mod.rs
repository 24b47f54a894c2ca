//! Page rendering.
//!
//! The slide maker writes one intermediate SVG per slide and hands it to a
//! [`Renderer`], which turns it into a page file. [`InkscapeRenderer`] shells
//! out to Inkscape.

mod inkscape;

pub use inkscape::InkscapeRenderer;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page format produced for each slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Vector PDF pages
    #[default]
    Pdf,
    /// Raster PNG pages
    Png,
}

impl ExportMode {
    /// File extension of pages in this mode.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportMode::Pdf => "pdf",
            ExportMode::Png => "png",
        }
    }
}

/// Turns an intermediate SVG into one page file.
pub trait Renderer {
    /// Render `source` into `output`.
    ///
    /// Failures should describe what the renderer reported (e.g. its stderr).
    fn render(&self, source: &Path, output: &Path, mode: ExportMode) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_mode_extension() {
        assert_eq!(ExportMode::default(), ExportMode::Pdf);
        assert_eq!(ExportMode::Pdf.extension(), "pdf");
        assert_eq!(ExportMode::Png.extension(), "png");
    }
}
