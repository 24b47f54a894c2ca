//! Inkscape layer and text discovery.

use super::document::{NodeId, SvgDocument};
use super::{INKSCAPE_NS, SVG_NS};

/// Label of the layer that carries the slide plan (compared case-insensitively).
pub const CONTENT_LABEL: &str = "content";

/// An Inkscape layer: a `g` element with `inkscape:groupmode="layer"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Element handle
    pub id: NodeId,
    /// `inkscape:label`, if any
    pub label: Option<String>,
    /// `style` attribute as found in the source document
    pub original_style: Option<String>,
}

impl Layer {
    /// Whether this layer is the slide-plan content layer.
    pub fn is_content(&self) -> bool {
        self.label
            .as_deref()
            .is_some_and(|label| label.eq_ignore_ascii_case(CONTENT_LABEL))
    }
}

/// Whether an element is the SVG element `local`.
///
/// Unprefixed elements outside any default namespace count as SVG.
fn is_svg(doc: &SvgDocument, id: NodeId, local: &str) -> bool {
    if doc.local_name(id) != Some(local) {
        return false;
    }
    match doc.element_namespace(id) {
        Some(uri) => uri == SVG_NS,
        None => doc.name(id) == Some(local),
    }
}

/// An Inkscape attribute, also accepting an undeclared `inkscape:` prefix.
fn inkscape_attribute<'a>(doc: &'a SvgDocument, id: NodeId, local: &str) -> Option<&'a str> {
    doc.attribute_ns(id, INKSCAPE_NS, local).or_else(|| {
        if doc.namespace_uri(id, "inkscape").is_some() {
            return None;
        }
        doc.attribute(id, &format!("inkscape:{}", local))
    })
}

fn is_layer(doc: &SvgDocument, id: NodeId) -> bool {
    is_svg(doc, id, "g") && inkscape_attribute(doc, id, "groupmode") == Some("layer")
}

/// All layers of the document in document order, nested layers included.
pub fn find_layers(doc: &SvgDocument) -> Vec<Layer> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|id| is_layer(doc, *id))
        .map(|id| Layer {
            id,
            label: inkscape_attribute(doc, id, "label").map(str::to_string),
            original_style: doc.attribute(id, "style").map(str::to_string),
        })
        .collect()
}

/// Text-bearing elements (`text`, `tspan`) owned by a layer.
///
/// Elements inside a nested layer belong to that nested layer and are not
/// returned here.
pub fn text_elements(doc: &SvgDocument, layer: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect_text_elements(doc, layer, &mut out);
    out
}

fn collect_text_elements(doc: &SvgDocument, parent: NodeId, out: &mut Vec<NodeId>) {
    for child in doc.element_children(parent) {
        if is_layer(doc, child) {
            continue;
        }
        if (is_svg(doc, child, "text") || is_svg(doc, child, "tspan")) && doc.text(child).is_some() {
            out.push(child);
        }
        collect_text_elements(doc, child, out);
    }
}

/// Slide-plan source lines of the content layer.
///
/// Each `tspan` of each text box directly inside the layer is one line; a text
/// box without `tspan` children contributes its own text. Runs without text
/// are skipped.
pub fn plan_lines(doc: &SvgDocument, content: NodeId) -> Vec<String> {
    let mut lines = Vec::new();

    for text in doc
        .element_children(content)
        .filter(|id| is_svg(doc, *id, "text"))
    {
        let spans: Vec<NodeId> = doc
            .element_children(text)
            .filter(|id| is_svg(doc, *id, "tspan"))
            .collect();

        if spans.is_empty() {
            lines.extend(doc.text(text).filter(|t| !t.is_empty()).map(str::to_string));
        } else {
            lines.extend(
                spans
                    .into_iter()
                    .filter_map(|span| doc.text(span))
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            );
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWING: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
  <g inkscape:groupmode="layer" inkscape:label="Content" style="display:none">
    <text><tspan>background, title</tspan><tspan></tspan><tspan>+detail*0.5</tspan></text>
  </g>
  <g inkscape:groupmode="layer" inkscape:label="title">
    <text><tspan>Page {{#PAGE#}}</tspan></text>
    <g inkscape:groupmode="layer" inkscape:label="sub">
      <text>Inner</text>
    </g>
  </g>
  <g inkscape:label="not a layer"/>
</svg>"#;

    #[test]
    fn test_find_layers() {
        let doc = SvgDocument::parse(DRAWING).unwrap();
        let layers = find_layers(&doc);
        let labels: Vec<_> = layers.iter().map(|l| l.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("Content"), Some("title"), Some("sub")]);

        assert!(layers[0].is_content());
        assert!(!layers[1].is_content());
        assert_eq!(layers[0].original_style.as_deref(), Some("display:none"));
        assert_eq!(layers[1].original_style, None);
    }

    #[test]
    fn test_plan_lines_skip_empty_runs() {
        let doc = SvgDocument::parse(DRAWING).unwrap();
        let content = find_layers(&doc)[0].id;
        assert_eq!(
            plan_lines(&doc, content),
            vec!["background, title".to_string(), "+detail*0.5".to_string()]
        );
    }

    #[test]
    fn test_text_elements_stop_at_nested_layers() {
        let doc = SvgDocument::parse(DRAWING).unwrap();
        let layers = find_layers(&doc);

        let title_texts = text_elements(&doc, layers[1].id);
        assert_eq!(title_texts.len(), 1);
        assert_eq!(doc.text(title_texts[0]), Some("Page {{#PAGE#}}"));

        let sub_texts = text_elements(&doc, layers[2].id);
        assert_eq!(sub_texts.len(), 1);
        assert_eq!(doc.text(sub_texts[0]), Some("Inner"));
    }

    #[test]
    fn test_prefixed_svg_namespace() {
        let doc = SvgDocument::parse(
            r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg" xmlns:ink="http://www.inkscape.org/namespaces/inkscape">
                 <svg:g ink:groupmode="layer" ink:label="content">
                   <svg:text><svg:tspan>a</svg:tspan></svg:text>
                 </svg:g>
               </svg:svg>"#,
        )
        .unwrap();
        let layers = find_layers(&doc);
        assert_eq!(layers.len(), 1);
        assert!(layers[0].is_content());
        assert_eq!(plan_lines(&doc, layers[0].id), vec!["a".to_string()]);
    }

    #[test]
    fn test_svg_prefix_declared_before_default_namespace() {
        let doc = SvgDocument::parse(
            r#"<svg xmlns:svg="http://www.w3.org/2000/svg" xmlns="http://www.w3.org/2000/svg"
                    xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
                 <g inkscape:groupmode="layer" inkscape:label="content">
                   <text><tspan>bg</tspan></text>
                 </g>
                 <g inkscape:groupmode="layer" inkscape:label="bg"><text>Hi</text></g>
               </svg>"#,
        )
        .unwrap();
        let layers = find_layers(&doc);
        assert_eq!(layers.len(), 2);
        assert!(layers[0].is_content());
        assert_eq!(plan_lines(&doc, layers[0].id), vec!["bg".to_string()]);
        assert_eq!(text_elements(&doc, layers[1].id).len(), 1);
    }

    #[test]
    fn test_foreign_elements_are_not_layers() {
        let doc = SvgDocument::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:x="urn:other"
                    xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
                 <x:g inkscape:groupmode="layer" inkscape:label="content"/>
                 <g x:groupmode="layer" inkscape:label="bg"/>
               </svg>"#,
        )
        .unwrap();
        assert!(find_layers(&doc).is_empty());
    }

    #[test]
    fn test_undeclared_namespaces_are_tolerated() {
        let doc = SvgDocument::parse(
            r#"<svg><g inkscape:groupmode="layer" inkscape:label="content"><text>a</text></g></svg>"#,
        )
        .unwrap();
        let layers = find_layers(&doc);
        assert_eq!(layers.len(), 1);
        assert_eq!(plan_lines(&doc, layers[0].id), vec!["a".to_string()]);
    }
}
