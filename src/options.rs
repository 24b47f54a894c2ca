//! Slide-deck build options.

use crate::error::Result;
use crate::fields::{DateField, FieldRegistry};
use crate::join::{default_joiners, Joiner};
use crate::render::{ExportMode, InkscapeRenderer};
use std::path::PathBuf;

/// Options for building a slide deck.
#[derive(Debug, Clone)]
pub struct SlideOptions {
    /// Page format rendered for each slide
    pub export: ExportMode,

    /// Join pages into one document after rendering
    pub join: bool,

    /// Joined output path (default: the drawing's path with `.pdf`)
    pub output: Option<PathBuf>,

    /// PNG export and resample resolution
    pub dpi: u32,

    /// Inkscape executable
    pub inkscape: PathBuf,

    /// Use the Inkscape 0.x command line
    pub legacy_inkscape: bool,

    /// Date shown by date fields (default: now)
    pub date: Option<String>,

    /// Format used to parse `date`
    pub date_format: String,
}

impl Default for SlideOptions {
    fn default() -> Self {
        Self {
            export: ExportMode::Pdf,
            join: true,
            output: None,
            dpi: 180,
            inkscape: PathBuf::from("inkscape"),
            legacy_inkscape: false,
            date: None,
            date_format: DateField::DEFAULT_INPUT_FORMAT.to_string(),
        }
    }
}

impl SlideOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page format.
    pub fn with_export(mut self, export: ExportMode) -> Self {
        self.export = export;
        self
    }

    /// Render PNG pages instead of PDF pages.
    pub fn with_image_export(self, enabled: bool) -> Self {
        self.with_export(if enabled {
            ExportMode::Png
        } else {
            ExportMode::Pdf
        })
    }

    /// Enable or disable joining.
    pub fn with_join(mut self, join: bool) -> Self {
        self.join = join;
        self
    }

    /// Set the joined output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the PNG resolution. Zero is raised to one.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    /// Set the Inkscape executable and command-line flavour.
    pub fn with_inkscape(mut self, program: impl Into<PathBuf>, legacy: bool) -> Self {
        self.inkscape = program.into();
        self.legacy_inkscape = legacy;
        self
    }

    /// Set the date used by date fields.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Set the format used to parse the configured date.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// The date field these options describe.
    pub fn date_field(&self) -> Result<DateField> {
        match &self.date {
            Some(date) => DateField::parse(date, &self.date_format),
            None => Ok(DateField::now()),
        }
    }

    /// The built-in field registry for these options.
    pub fn field_registry(&self) -> Result<FieldRegistry> {
        Ok(FieldRegistry::builtin(self.date_field()?))
    }

    /// The Inkscape renderer for these options.
    pub fn renderer(&self) -> InkscapeRenderer {
        InkscapeRenderer::new()
            .with_program(&self.inkscape)
            .with_legacy_cli(self.legacy_inkscape)
            .with_dpi(self.dpi)
    }

    /// The built-in joiners for these options, in preference order.
    pub fn joiners(&self) -> Vec<Box<dyn Joiner>> {
        default_joiners(self.dpi)
    }
}
