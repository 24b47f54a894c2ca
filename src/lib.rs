//! # inkslide
//!
//! Build slide decks from a single layered Inkscape drawing.
//!
//! A layer labeled `content` holds a text box with one line per slide, each
//! line listing the layers shown on that slide. Every slide is rendered to a
//! page with Inkscape and the pages are joined into one document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use inkslide::{make_slides, SlideOptions};
//!
//! let run = make_slides("talk.svg", SlideOptions::default())?;
//! println!("{} pages", run.pages.len());
//! if let Some(output) = &run.output {
//!     println!("joined into {}", output.display());
//! }
//! # Ok::<(), inkslide::Error>(())
//! ```
//!
//! ## Slide Plans
//!
//! ```
//! use inkslide::SlidePlan;
//!
//! let plan = SlidePlan::from_source("background, title\n+chart*0.5")?;
//! assert_eq!(plan.len(), 2);
//! assert_eq!(plan.to_string(), "background, title\nbackground, title, chart*0.5");
//! # Ok::<(), inkslide::Error>(())
//! ```
//!
//! ## Features
//!
//! - `merge` (default): join PDF pages in-process with lopdf

pub mod error;
pub mod fields;
pub mod join;
pub mod maker;
pub mod options;
pub mod plan;
pub mod render;
pub mod svg;

// Re-exports
pub use error::{Error, Result};
pub use fields::{DateField, Field, FieldRegistry, RenderContext, SubstitutionState};
pub use join::Joiner;
pub use maker::{PageRendered, SlideMaker, SlideRun};
pub use options::SlideOptions;
pub use plan::{LayerEntry, SlidePlan, SlideSpec};
pub use render::{ExportMode, InkscapeRenderer, Renderer};

use std::path::Path;

/// Compile the slide plan of a drawing without rendering anything.
///
/// # Example
///
/// ```no_run
/// let plan = inkslide::compile_plan("talk.svg")?;
/// for (i, slide) in plan.iter().enumerate() {
///     println!("{}: {}", i + 1, slide);
/// }
/// # Ok::<(), inkslide::Error>(())
/// ```
pub fn compile_plan(path: impl AsRef<Path>) -> Result<SlidePlan> {
    let maker = SlideMaker::open(path, SlideOptions::default())?;
    Ok(maker.plan().clone())
}

/// Render and join a drawing with Inkscape and the built-in joiners.
pub fn make_slides(path: impl AsRef<Path>, options: SlideOptions) -> Result<SlideRun> {
    let mut maker = SlideMaker::open(path, options)?;
    maker.build(|_| {})
}
