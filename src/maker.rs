//! Slide-deck orchestration.
//!
//! [`SlideMaker`] owns the parsed drawing for one run. For every slide it
//! toggles layer visibility, substitutes fields, writes an intermediate SVG
//! and hands it to a [`Renderer`]. The resulting pages are then joined.

use crate::error::{Error, Result};
use crate::fields::{FieldRegistry, RenderContext, SubstitutionState};
use crate::join::{select_joiner, Joiner};
use crate::options::SlideOptions;
use crate::plan::SlidePlan;
use crate::render::{ExportMode, Renderer};
use crate::svg::{find_layers, plan_lines, set_style_property, text_elements, Layer, NodeId, SvgDocument};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PLAN_GUIDANCE: &str = "Create a layer labeled 'content' and put a text box (no flowed text) \
in it with one line per slide, for example:

    background, layer1
    background, layer2
    background, layer2, layer3
    background, layer2 * 0.5, layer3
    +layer4 * 0.5

Each name is the label of another layer. A line starting with '+' adds to \
the layers of the preceding line. Append '*0.5' to a name to show that layer \
at 50% opacity.";

/// Progress report for one rendered page.
#[derive(Debug, Clone)]
pub struct PageRendered {
    /// 1-based page number
    pub page: usize,
    /// Number of pages in this run
    pub total: usize,
    /// Page file
    pub path: PathBuf,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlideRun {
    /// Number of slides in the plan
    pub slides: usize,
    /// Rendered page files, in slide order
    pub pages: Vec<PathBuf>,
    /// Joiner that was used, if any
    pub joiner: Option<String>,
    /// Joined document, if joining succeeded
    pub output: Option<PathBuf>,
    /// Why joining failed, if it did
    pub join_error: Option<String>,
    /// Whether the page files were deleted after joining
    pub cleaned_up: bool,
}

impl SlideRun {
    /// Whether the pages were joined into one document.
    pub fn joined(&self) -> bool {
        self.output.is_some()
    }
}

/// Builds a slide deck from one layered drawing.
#[derive(Debug)]
pub struct SlideMaker {
    source: PathBuf,
    document: SvgDocument,
    layers: Vec<Layer>,
    texts: Vec<NodeId>,
    plan: SlidePlan,
    fields: FieldRegistry,
    options: SlideOptions,
}

impl SlideMaker {
    /// Open a drawing and compile its slide plan.
    pub fn open(path: impl AsRef<Path>, options: SlideOptions) -> Result<Self> {
        let source = path.as_ref().to_path_buf();
        let document = SvgDocument::open(&source)?;
        Self::from_document(source, document, options)
    }

    /// Compile the slide plan of an already parsed drawing.
    ///
    /// `source` decides where intermediate files and pages are written.
    pub fn from_document(
        source: impl Into<PathBuf>,
        document: SvgDocument,
        options: SlideOptions,
    ) -> Result<Self> {
        let source = source.into();
        let fields = options.field_registry()?;

        let layers = find_layers(&document);
        let content = layers
            .iter()
            .find(|layer| layer.is_content())
            .ok_or_else(|| Error::Structural {
                message: "No 'content'-labeled layer.".to_string(),
                guidance: PLAN_GUIDANCE.to_string(),
            })?;

        let lines = plan_lines(&document, content.id);
        if lines.is_empty() {
            return Err(Error::Structural {
                message: "The 'content' layer has no slide plan text.".to_string(),
                guidance: PLAN_GUIDANCE.to_string(),
            });
        }

        let plan = SlidePlan::compile(&lines)?;
        let texts = layers
            .iter()
            .flat_map(|layer| text_elements(&document, layer.id))
            .collect();

        debug!(
            source = %source.display(),
            layers = layers.len(),
            slides = plan.len(),
            "compiled slide plan"
        );

        Ok(Self {
            source,
            document,
            layers,
            texts,
            plan,
            fields,
            options,
        })
    }

    /// Replace the field registry.
    pub fn with_fields(mut self, fields: FieldRegistry) -> Self {
        self.fields = fields;
        self
    }

    /// The compiled slide plan.
    pub fn plan(&self) -> &SlidePlan {
        &self.plan
    }

    /// The drawing in its current state.
    pub fn document(&self) -> &SvgDocument {
        &self.document
    }

    /// Layers of the drawing, in document order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Options of this run.
    pub fn options(&self) -> &SlideOptions {
        &self.options
    }

    /// Path of the joined document.
    pub fn output_path(&self) -> PathBuf {
        match &self.options.output {
            Some(output) => output.clone(),
            None => default_output(&self.source),
        }
    }

    /// Path of the page rendered for slide `index` (0-based).
    pub fn page_path(&self, index: usize) -> PathBuf {
        let stem = self.stem();
        let name = match self.options.export {
            ExportMode::Pdf => format!("{}.p{:05}.pdf", stem, index),
            ExportMode::Png => format!("_inkslide_{}.p{:05}.png", stem, index),
        };
        parent_dir(&self.output_path()).join(name)
    }

    fn stem(&self) -> String {
        self.source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "slides".to_string())
    }

    /// Put the drawing into the state of slide `index` (0-based).
    ///
    /// Substitutions made for the previous slide are undone first.
    pub fn prepare_slide(&mut self, index: usize, state: &mut SubstitutionState) -> Result<()> {
        let total = self.plan.len();
        let spec = self
            .plan
            .get(index)
            .ok_or(Error::SlideIndex {
                slide: index + 1,
                total,
            })?;

        for &text in &self.texts {
            self.fields.restore_all(state, &mut self.document, text);
        }

        for layer in &self.layers {
            let original = layer.original_style.as_deref().unwrap_or_default();
            let mut style = set_style_property(original, "display", "none");
            if let Some(entry) = layer.label.as_deref().and_then(|label| spec.get(label)) {
                style = set_style_property(&style, "display", "inline");
                if let Some(opacity) = entry.opacity {
                    style = set_style_property(&style, "opacity", &opacity.to_string());
                }
            }
            self.document.set_attribute(layer.id, "style", style);
        }

        let ctx = RenderContext::new(index + 1, total);
        for &text in &self.texts {
            self.fields.apply(state, &mut self.document, text, &ctx)?;
        }
        Ok(())
    }

    /// Undo every substitution and style change.
    pub fn restore(&mut self, state: &mut SubstitutionState) {
        for &text in &self.texts {
            self.fields.restore_all(state, &mut self.document, text);
        }
        for layer in &self.layers {
            match &layer.original_style {
                Some(style) => self.document.set_attribute(layer.id, "style", style.clone()),
                None => self.document.remove_attribute(layer.id, "style"),
            }
        }
    }

    /// Render one page per slide.
    ///
    /// The drawing is restored afterwards, also when rendering fails. Pages
    /// rendered before a failure stay on disk.
    pub fn render_pages<F>(&mut self, renderer: &dyn Renderer, mut progress: F) -> Result<Vec<PathBuf>>
    where
        F: FnMut(&PageRendered),
    {
        let mut state = SubstitutionState::new();
        let result = self.render_each(renderer, &mut state, &mut progress);
        self.restore(&mut state);
        result
    }

    fn render_each(
        &mut self,
        renderer: &dyn Renderer,
        state: &mut SubstitutionState,
        progress: &mut dyn FnMut(&PageRendered),
    ) -> Result<Vec<PathBuf>> {
        let total = self.plan.len();
        let work_dir = parent_dir(&self.source);
        let stem = self.stem();
        let mut pages = Vec::with_capacity(total);

        for index in 0..total {
            self.prepare_slide(index, state)?;

            // Next to the source so relative hrefs resolve.
            let mut svg = tempfile::Builder::new()
                .prefix(&format!("{}.p{}.", stem, index))
                .suffix(".svg")
                .tempfile_in(&work_dir)?;
            svg.write_all(&self.document.to_bytes()?)?;
            svg.flush()?;

            let page = self.page_path(index);
            debug!(page = index + 1, output = %page.display(), "rendering page");
            renderer
                .render(svg.path(), &page, self.options.export)
                .map_err(|err| match err {
                    Error::Render { message, .. } => Error::render(index + 1, message),
                    other => other,
                })?;

            pages.push(page.clone());
            progress(&PageRendered {
                page: index + 1,
                total,
                path: page,
            });
        }

        Ok(pages)
    }

    /// Join rendered pages with the first suitable joiner.
    ///
    /// Failures are recorded in the outcome; the pages are kept in that case
    /// and deleted otherwise.
    pub fn join_pages(&self, pages: &[PathBuf], joiners: &[Box<dyn Joiner>]) -> SlideRun {
        let mut run = SlideRun {
            slides: self.plan.len(),
            pages: pages.to_vec(),
            ..SlideRun::default()
        };

        let mode = self.options.export;
        let Some(joiner) = select_joiner(joiners, mode) else {
            let err = match mode {
                ExportMode::Png => Error::join("convert", "ImageMagick is not installed"),
                ExportMode::Pdf => Error::join(
                    "pdfjoin or pdftk",
                    "neither is installed; install pdfjam or pdftk, or build with the 'merge' feature",
                ),
            };
            warn!(error = %err, "pages were not joined");
            run.join_error = Some(err.to_string());
            return run;
        };

        let output = self.output_path();
        info!(joiner = joiner.name(), output = %output.display(), "joining pages");
        run.joiner = Some(joiner.name().to_string());

        match joiner.join(pages, &output) {
            Ok(()) => {
                run.output = Some(output);
                run.cleaned_up = remove_pages(pages);
            }
            Err(err) => {
                warn!(error = %err, "pages were not joined");
                run.join_error = Some(err.to_string());
            }
        }
        run
    }

    /// Render every slide and, unless disabled, join the pages.
    pub fn run<F>(
        &mut self,
        renderer: &dyn Renderer,
        joiners: &[Box<dyn Joiner>],
        progress: F,
    ) -> Result<SlideRun>
    where
        F: FnMut(&PageRendered),
    {
        let pages = self.render_pages(renderer, progress)?;
        if !self.options.join {
            return Ok(SlideRun {
                slides: self.plan.len(),
                pages,
                ..SlideRun::default()
            });
        }
        Ok(self.join_pages(&pages, joiners))
    }

    /// Run with Inkscape and the built-in joiners.
    pub fn build<F>(&mut self, progress: F) -> Result<SlideRun>
    where
        F: FnMut(&PageRendered),
    {
        let renderer = self.options.renderer();
        let joiners = self.options.joiners();
        self.run(&renderer, &joiners, progress)
    }
}

/// `deck.svg` becomes `deck.pdf`; other names get `.pdf` appended.
fn default_output(source: &Path) -> PathBuf {
    match source.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("svg") => source.with_extension("pdf"),
        _ => {
            let mut name = source.as_os_str().to_owned();
            name.push(".pdf");
            PathBuf::from(name)
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn remove_pages(pages: &[PathBuf]) -> bool {
    let mut removed = true;
    for page in pages {
        if let Err(err) = fs::remove_file(page) {
            warn!(page = %page.display(), error = %err, "could not remove page");
            removed = false;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWING: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
  <g inkscape:groupmode="layer" inkscape:label="content"><text><tspan>bg</tspan><tspan>+title*0</tspan></text></g>
  <g inkscape:groupmode="layer" inkscape:label="bg" style="fill:red"><text>{{#PAGE#}}/{{#PAGES#}}</text></g>
  <g inkscape:groupmode="layer" inkscape:label="title"/>
</svg>"#;

    fn maker(options: SlideOptions) -> SlideMaker {
        let doc = SvgDocument::parse(DRAWING).unwrap();
        SlideMaker::from_document("talks/deck.svg", doc, options).unwrap()
    }

    #[test]
    fn test_default_output_and_page_names() {
        let pdf = maker(SlideOptions::default());
        assert_eq!(pdf.output_path(), PathBuf::from("talks/deck.pdf"));
        assert_eq!(pdf.page_path(1), PathBuf::from("talks/deck.p00001.pdf"));

        let png = maker(
            SlideOptions::new()
                .with_image_export(true)
                .with_output("out/final.pdf"),
        );
        assert_eq!(png.page_path(0), PathBuf::from("out/_inkslide_deck.p00000.png"));

        assert_eq!(default_output(Path::new("deck.SVG")), PathBuf::from("deck.pdf"));
        assert_eq!(default_output(Path::new("deck")), PathBuf::from("deck.pdf"));
        assert_eq!(parent_dir(Path::new("deck.svg")), PathBuf::from("."));
    }

    #[test]
    fn test_prepare_slide_sets_visibility_and_fields() {
        let mut maker = maker(SlideOptions::default());
        let mut state = SubstitutionState::new();
        let [content, bg, title] = [0, 1, 2].map(|i| maker.layers()[i].id);

        maker.prepare_slide(1, &mut state).unwrap();
        let doc = maker.document();
        assert_eq!(doc.attribute(content, "style"), Some("display:none"));
        assert_eq!(doc.attribute(bg, "style"), Some("display:inline;fill:red"));
        assert_eq!(doc.attribute(title, "style"), Some("opacity:0;display:inline"));

        let text = text_elements(doc, bg)[0];
        assert_eq!(doc.text(text), Some("2/2"));

        maker.restore(&mut state);
        let doc = maker.document();
        assert_eq!(doc.attribute(bg, "style"), Some("fill:red"));
        assert_eq!(doc.attribute(title, "style"), None);
        assert_eq!(doc.text(text), Some("{{#PAGE#}}/{{#PAGES#}}"));
    }

    #[test]
    fn test_missing_content_layer() {
        let doc = SvgDocument::parse(
            r#"<svg xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"><g inkscape:groupmode="layer" inkscape:label="bg"/></svg>"#,
        )
        .unwrap();
        let err = SlideMaker::from_document("deck.svg", doc, SlideOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Structural { .. }));
        assert!(err.to_string().contains("'content'"));
    }

    #[test]
    fn test_content_layer_without_text() {
        let doc = SvgDocument::parse(
            r#"<svg xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"><g inkscape:groupmode="layer" inkscape:label="Content"><rect/></g></svg>"#,
        )
        .unwrap();
        let err = SlideMaker::from_document("deck.svg", doc, SlideOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Structural { .. }));
    }

    #[test]
    fn test_bad_configured_date_fails_early() {
        let doc = SvgDocument::parse(DRAWING).unwrap();
        let options = SlideOptions::new().with_date("not a date");
        let err = SlideMaker::from_document("deck.svg", doc, options).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_prepare_out_of_range_slide() {
        let mut maker = maker(SlideOptions::default());
        let mut state = SubstitutionState::new();
        let err = maker.prepare_slide(2, &mut state).unwrap_err();
        assert!(matches!(err, Error::SlideIndex { slide: 3, total: 2 }));
        assert!(state.is_empty());
    }
}
