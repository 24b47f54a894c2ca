//! Joining rendered pages into one document.
//!
//! Joiners are tried in preference order; the first one that handles the
//! export mode and is available on this machine is used:
//!
//! 1. ImageMagick (`convert`), PNG pages only
//! 2. in-process PDF merge (`merge` feature)
//! 3. `pdfjoin` (pdfjam)
//! 4. `pdftk`

mod external;
#[cfg(feature = "merge")]
mod merge;

pub use external::{find_on_path, ImageMagickJoiner, PdfJoinJoiner, PdftkJoiner};
#[cfg(feature = "merge")]
pub use merge::LopdfJoiner;

use crate::error::Result;
use crate::render::ExportMode;
use std::path::{Path, PathBuf};

/// Concatenates page files into one output document.
pub trait Joiner {
    /// Short name shown to the user.
    fn name(&self) -> &'static str;

    /// Whether this joiner can combine pages of the given kind.
    fn supports(&self, mode: ExportMode) -> bool;

    /// Whether the joiner can run here (e.g. its tool is on `PATH`).
    fn is_available(&self) -> bool;

    /// Join `pages`, in order, into `output`.
    fn join(&self, pages: &[PathBuf], output: &Path) -> Result<()>;
}

/// The built-in joiners in preference order.
pub fn default_joiners(dpi: u32) -> Vec<Box<dyn Joiner>> {
    let mut joiners: Vec<Box<dyn Joiner>> = vec![Box::new(ImageMagickJoiner::new().with_dpi(dpi))];
    #[cfg(feature = "merge")]
    joiners.push(Box::new(LopdfJoiner));
    joiners.push(Box::new(PdfJoinJoiner));
    joiners.push(Box::new(PdftkJoiner));
    joiners
}

/// First joiner that supports `mode` and is available.
pub fn select_joiner(joiners: &[Box<dyn Joiner>], mode: ExportMode) -> Option<&dyn Joiner> {
    joiners
        .iter()
        .map(|joiner| joiner.as_ref())
        .find(|joiner| joiner.supports(mode) && joiner.is_available())
}
