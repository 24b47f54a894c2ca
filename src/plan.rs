//! Slide-plan compiler.
//!
//! The content layer's text box lists one slide per line:
//!
//! ```text
//! background, title
//! background, chart
//! +notes*0.5
//! ```
//!
//! Each line names the layers visible on that slide, optionally with an
//! opacity after `*`. A line starting with `+` starts from the previous
//! slide's layers and adds to (or overrides) them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One layer entry of a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    /// Layer label
    pub name: String,
    /// Explicit opacity; `None` keeps the layer's own opacity
    pub opacity: Option<f64>,
}

/// Visible layers of one slide, in the order they were first named.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    layers: Vec<LayerEntry>,
}

impl SlideSpec {
    /// Create an empty slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a layer, overwriting the opacity of an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, opacity: Option<f64>) {
        let name = name.into();
        match self.layers.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.opacity = opacity,
            None => self.layers.push(LayerEntry { name, opacity }),
        }
    }

    /// Builder form of [`SlideSpec::insert`].
    pub fn with(mut self, name: impl Into<String>, opacity: Option<f64>) -> Self {
        self.insert(name, opacity);
        self
    }

    /// Entry for a layer, if the slide shows it.
    pub fn get(&self, name: &str) -> Option<&LayerEntry> {
        self.layers.iter().find(|entry| entry.name == name)
    }

    /// Whether the slide shows a layer.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = &LayerEntry> {
        self.layers.iter()
    }

    /// Layer names in order.
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Number of visible layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer is visible.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Display for SlideSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.layers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match entry.opacity {
                Some(opacity) => write!(f, "{}*{}", entry.name, opacity)?,
                None => write!(f, "{}", entry.name)?,
            }
        }
        Ok(())
    }
}

/// The compiled sequence of slides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlidePlan {
    slides: Vec<SlideSpec>,
}

impl SlidePlan {
    /// Compile plan lines into slides.
    ///
    /// Blank lines are skipped. Errors carry the 1-based position of the
    /// offending line.
    ///
    /// # Example
    ///
    /// ```
    /// use inkslide::SlidePlan;
    ///
    /// let plan = SlidePlan::compile(["a, b*0.5", "+c"])?;
    /// assert_eq!(plan.len(), 2);
    /// assert_eq!(plan.get(1).unwrap().names(), vec!["a", "b", "c"]);
    /// # Ok::<(), inkslide::Error>(())
    /// ```
    pub fn compile<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut slides: Vec<SlideSpec> = Vec::new();

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            // Only a '+' in the very first column marks a continuation.
            let (mut spec, rest) = match line.strip_prefix('+') {
                Some(rest) => {
                    let previous = slides.last().ok_or(Error::Sequence { line: line_no })?;
                    (previous.clone(), rest)
                }
                None => (SlideSpec::new(), line),
            };

            for token in rest.split(',') {
                let (name, opacity) = parse_token(token, line_no)?;
                if !name.is_empty() {
                    spec.insert(name, opacity);
                }
            }

            slides.push(spec);
        }

        if slides.is_empty() {
            return Err(Error::EmptyPlan);
        }

        Ok(Self { slides })
    }

    /// Compile a whole text block, one slide per line.
    pub fn from_source(source: &str) -> Result<Self> {
        Self::compile(source.lines())
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the plan has no slides (never true for a compiled plan).
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slide by 0-based index.
    pub fn get(&self, index: usize) -> Option<&SlideSpec> {
        self.slides.get(index)
    }

    /// Iterate over slides in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SlideSpec> {
        self.slides.iter()
    }

    /// All slides.
    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }
}

impl<'a> IntoIterator for &'a SlidePlan {
    type Item = &'a SlideSpec;
    type IntoIter = std::slice::Iter<'a, SlideSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.iter()
    }
}

/// Plan source text, one fully expanded slide per line.
impl fmt::Display for SlidePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slide) in self.slides.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", slide)?;
        }
        Ok(())
    }
}

/// Split `name*opacity`. Only a single `*` sets an opacity; a token with
/// several `*` keeps its first part as the name and no opacity.
fn parse_token(token: &str, line_no: usize) -> Result<(&str, Option<f64>)> {
    let parts: Vec<&str> = token.split('*').collect();
    let name = parts[0].trim();
    let opacity = match parts.as_slice() {
        [_, raw] => {
            let raw = raw.trim();
            let value = raw.parse::<f64>().map_err(|_| {
                Error::parse(
                    line_no,
                    format!("opacity '{}' of layer '{}' is not a number", raw, name),
                )
            })?;
            Some(value)
        }
        _ => None,
    };
    Ok((name, opacity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_lines() {
        let plan = SlidePlan::compile(["background, layer1", "background, layer2"]).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.get(0).unwrap().names(), vec!["background", "layer1"]);
        assert_eq!(plan.get(1).unwrap().names(), vec!["background", "layer2"]);
        assert!(plan.get(0).unwrap().get("layer1").unwrap().opacity.is_none());
    }

    #[test]
    fn test_incremental_line_extends_previous() {
        let plan = SlidePlan::compile(["a, b*0.5", "+c"]).unwrap();
        let expected = SlideSpec::new()
            .with("a", None)
            .with("b", Some(0.5))
            .with("c", None);
        assert_eq!(plan.get(1), Some(&expected));
        // The predecessor is copied, not shared.
        assert_eq!(plan.get(0).unwrap().len(), 2);
    }

    #[test]
    fn test_incremental_line_overrides_entries() {
        let plan = SlidePlan::compile(["a, b*0.5", "+b, c*0.2"]).unwrap();
        let slide = plan.get(1).unwrap();
        assert_eq!(slide.names(), vec!["a", "b", "c"]);
        assert_eq!(slide.get("b").unwrap().opacity, None);
        assert_eq!(slide.get("c").unwrap().opacity, Some(0.2));
    }

    #[test]
    fn test_repeated_name_last_wins() {
        let plan = SlidePlan::compile(["a*0.1, b, a*0.9"]).unwrap();
        let slide = plan.get(0).unwrap();
        assert_eq!(slide.names(), vec!["a", "b"]);
        assert_eq!(slide.get("a").unwrap().opacity, Some(0.9));
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        let plan = SlidePlan::compile(["  a ,b *  0.25 ,  c"]).unwrap();
        let slide = plan.get(0).unwrap();
        assert_eq!(slide.names(), vec!["a", "b", "c"]);
        assert_eq!(slide.get("b").unwrap().opacity, Some(0.25));
    }

    #[test]
    fn test_zero_opacity_is_distinct_from_none() {
        let plan = SlidePlan::compile(["a*0, b"]).unwrap();
        let slide = plan.get(0).unwrap();
        assert_eq!(slide.get("a").unwrap().opacity, Some(0.0));
        assert_eq!(slide.get("b").unwrap().opacity, None);

        let reparsed = SlidePlan::from_source(&plan.to_string()).unwrap();
        assert_eq!(reparsed, plan);
        assert_eq!(plan.to_string(), "a*0, b");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let plan = SlidePlan::compile(["a", "", "   ", "+b"]).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.get(1).unwrap().names(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_plan() {
        assert!(matches!(
            SlidePlan::compile(Vec::<String>::new()),
            Err(Error::EmptyPlan)
        ));
        assert!(matches!(
            SlidePlan::compile(["", "  "]),
            Err(Error::EmptyPlan)
        ));
    }

    #[test]
    fn test_leading_plus_without_predecessor() {
        assert!(matches!(
            SlidePlan::compile(["+a", "b"]),
            Err(Error::Sequence { line: 1 })
        ));
        assert!(matches!(
            SlidePlan::compile(["", "+a"]),
            Err(Error::Sequence { line: 2 })
        ));
    }

    #[test]
    fn test_plus_after_whitespace_is_a_name() {
        let plan = SlidePlan::compile(["a", " +b"]).unwrap();
        assert_eq!(plan.get(1).unwrap().names(), vec!["+b"]);
    }

    #[test]
    fn test_bad_opacity() {
        let err = SlidePlan::compile(["a", "b*half"]).unwrap_err();
        match err {
            Error::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("half"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            SlidePlan::compile(["a*"]),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_several_stars_leave_opacity_unset() {
        let plan = SlidePlan::compile(["a*0.5*2, b*x*y"]).unwrap();
        let slide = plan.get(0).unwrap();
        assert_eq!(slide.names(), vec!["a", "b"]);
        assert_eq!(slide.get("a").unwrap().opacity, None);
        assert_eq!(slide.get("b").unwrap().opacity, None);
    }

    #[test]
    fn test_opacity_is_not_range_checked() {
        let plan = SlidePlan::compile(["a*1.5, b*-1"]).unwrap();
        let slide = plan.get(0).unwrap();
        assert_eq!(slide.get("a").unwrap().opacity, Some(1.5));
        assert_eq!(slide.get("b").unwrap().opacity, Some(-1.0));
    }

    #[test]
    fn test_empty_tokens_are_ignored() {
        let plan = SlidePlan::compile(["a,,b,"]).unwrap();
        assert_eq!(plan.get(0).unwrap().names(), vec!["a", "b"]);
    }

    #[test]
    fn test_plan_json() {
        let plan = SlidePlan::compile(["a*0.5"]).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(
            json,
            r#"{"slides":[{"layers":[{"name":"a","opacity":0.5}]}]}"#
        );
        let parsed: SlidePlan = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, plan);
    }
}
