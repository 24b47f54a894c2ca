//! SVG document model.
//!
//! A small owned element tree over quick-xml, with the Inkscape-specific
//! lookups the slide maker needs: layers, text runs, and inline styles.

mod document;
mod layers;
mod style;

pub use document::{NodeId, SvgDocument};
pub use layers::{find_layers, plan_lines, text_elements, Layer, CONTENT_LABEL};
pub use style::{set_style_property, style_property};

/// SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Inkscape namespace URI.
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";
