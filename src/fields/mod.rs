//! Text fields substituted at render time.
//!
//! A field is a `{{ ... }}` placeholder inside a text run, such as
//! `{{#PAGE#}}` or `{{#DATE %d.%m.%Y#}}`. Before a slide is rendered every
//! matching run is rewritten; before the next slide the original text is put
//! back, so substitutions never stack up across slides.
//!
//! ```
//! use inkslide::fields::{FieldRegistry, RenderContext, SubstitutionState};
//! use inkslide::svg::SvgDocument;
//!
//! let mut doc = SvgDocument::parse("<svg><text>Page {{#PAGE#}}</text></svg>")?;
//! let text = doc.element_children(doc.root()).next().unwrap();
//!
//! let registry = FieldRegistry::default();
//! let mut state = SubstitutionState::new();
//!
//! registry.apply(&mut state, &mut doc, text, &RenderContext::new(1, 3))?;
//! assert_eq!(doc.text(text), Some("Page 1"));
//!
//! registry.restore_all(&mut state, &mut doc, text);
//! assert_eq!(doc.text(text), Some("Page {{#PAGE#}}"));
//! # Ok::<(), inkslide::Error>(())
//! ```

mod date;
mod page;
mod placeholder;

pub use date::DateField;
pub use page::{PageCountField, PageNumberField};
pub use placeholder::{placeholders, Placeholder, Placeholders};

use crate::error::Result;
use crate::svg::{NodeId, SvgDocument};
use std::collections::HashMap;
use std::fmt;

/// What a field may know about the slide being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// 1-based number of the current slide
    pub slide_number: usize,
    /// Number of slides in the plan
    pub total_slides: usize,
}

impl RenderContext {
    /// Create a context for slide `slide_number` of `total_slides`.
    pub fn new(slide_number: usize, total_slides: usize) -> Self {
        Self {
            slide_number,
            total_slides,
        }
    }
}

/// A placeholder handler.
///
/// Implementors decide which placeholder bodies they own and what to render
/// for them; matching and in-text replacement come for free.
pub trait Field {
    /// Stable identifier, unique within a registry.
    fn key(&self) -> &'static str;

    /// Whether a trimmed placeholder body belongs to this field.
    fn recognizes(&self, body: &str) -> bool;

    /// Replacement text for one recognized placeholder.
    fn render(&self, body: &str, ctx: &RenderContext) -> Result<String>;

    /// Whether the text contains at least one placeholder of this field.
    fn matches(&self, text: &str) -> bool {
        placeholders(text).any(|p| self.recognizes(p.body))
    }

    /// Replace every placeholder of this field in `text`.
    fn substitute(&self, text: &str, ctx: &RenderContext) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for placeholder in placeholders(text) {
            if !self.recognizes(placeholder.body) {
                continue;
            }
            out.push_str(&text[last..placeholder.range.start]);
            out.push_str(&self.render(placeholder.body, ctx)?);
            last = placeholder.range.end;
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

/// Original texts saved by fields during one run, keyed by field and element.
#[derive(Debug, Default)]
pub struct SubstitutionState {
    saved: HashMap<(&'static str, NodeId), String>,
}

impl SubstitutionState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute `field` into an element's text.
    ///
    /// The text found on the first call is saved; later calls keep that saved
    /// value until [`SubstitutionState::restore`] hands it back.
    pub fn replace(
        &mut self,
        field: &dyn Field,
        doc: &mut SvgDocument,
        element: NodeId,
        ctx: &RenderContext,
    ) -> Result<()> {
        let current = doc.text(element).unwrap_or_default().to_string();
        self.saved
            .entry((field.key(), element))
            .or_insert_with(|| current.clone());
        let replaced = field.substitute(&current, ctx)?;
        doc.set_text(element, replaced);
        Ok(())
    }

    /// Put back the text saved for `field` on an element, if any.
    pub fn restore(&mut self, field: &dyn Field, doc: &mut SvgDocument, element: NodeId) {
        if let Some(original) = self.saved.remove(&(field.key(), element)) {
            doc.set_text(element, original);
        }
    }

    /// Number of saved texts.
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    /// Whether nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

/// Ordered set of fields applied to every text run.
pub struct FieldRegistry {
    fields: Vec<Box<dyn Field>>,
}

impl FieldRegistry {
    /// Create a registry with no fields.
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// The built-in fields: page number, page count, and a date field.
    pub fn builtin(date: DateField) -> Self {
        Self::empty()
            .with(PageNumberField)
            .with(PageCountField)
            .with(date)
    }

    /// Register a field. A field with the same key is replaced in place.
    pub fn register(&mut self, field: impl Field + 'static) -> &mut Self {
        let field: Box<dyn Field> = Box::new(field);
        match self.fields.iter_mut().find(|f| f.key() == field.key()) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Builder form of [`FieldRegistry::register`].
    pub fn with(mut self, field: impl Field + 'static) -> Self {
        self.register(field);
        self
    }

    /// Registered field keys, in application order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.key()).collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Substitute every matching field into an element, in registration order.
    pub fn apply(
        &self,
        state: &mut SubstitutionState,
        doc: &mut SvgDocument,
        element: NodeId,
        ctx: &RenderContext,
    ) -> Result<()> {
        for field in &self.fields {
            let matched = doc.text(element).is_some_and(|text| field.matches(text));
            if matched {
                state.replace(field.as_ref(), doc, element, ctx)?;
            }
        }
        Ok(())
    }

    /// Undo every field's substitution on an element.
    ///
    /// Fields are restored in reverse order so the text saved by the first
    /// field, which is the pristine one, is written last.
    pub fn restore_all(&self, state: &mut SubstitutionState, doc: &mut SvgDocument, element: NodeId) {
        for field in self.fields.iter().rev() {
            state.restore(field.as_ref(), doc, element);
        }
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::builtin(DateField::now())
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("fields", &self.keys())
            .finish()
    }
}
