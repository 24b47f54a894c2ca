//! Error types for the inkslide library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for inkslide operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a slide deck.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing the SVG document.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Error writing the SVG document back out.
    #[error("XML write error: {0}")]
    XmlWrite(String),

    /// The drawing lacks the content layer or its slide-plan text.
    #[error("{message}\n\n{guidance}")]
    Structural { message: String, guidance: String },

    /// A slide-plan line could not be parsed.
    #[error("Slide {line}: {message}")]
    Parse { line: usize, message: String },

    /// A `+` line has no preceding slide to extend.
    #[error("Slide {line}: '+' needs a preceding slide to extend")]
    Sequence { line: usize },

    /// The slide-plan text produced no slides.
    #[error("The slide plan is empty")]
    EmptyPlan,

    /// A date field or configured date could not be parsed or formatted.
    #[error("Format error: {0}")]
    Format(String),

    /// A slide number outside the compiled plan was requested.
    #[error("Slide {slide} does not exist; the plan has {total} slides")]
    SlideIndex { slide: usize, total: usize },

    /// The external renderer failed for a page.
    #[error("Rendering page {page} failed: {message}")]
    Render { page: usize, message: String },

    /// The pages could not be joined into one document.
    #[error("Joining with {joiner} failed: {message}")]
    Join { joiner: String, message: String },

    /// An input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn render(page: usize, message: impl Into<String>) -> Self {
        Error::Render {
            page,
            message: message.into(),
        }
    }

    pub(crate) fn join(joiner: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Join {
            joiner: joiner.into(),
            message: message.into(),
        }
    }

    /// Whether the error was detected before any external process ran.
    pub fn is_plan_error(&self) -> bool {
        matches!(
            self,
            Error::Structural { .. }
                | Error::Parse { .. }
                | Error::Sequence { .. }
                | Error::EmptyPlan
                | Error::Format(_)
        )
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(feature = "merge")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::join("lopdf", err.to_string())
    }
}
