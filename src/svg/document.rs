//! Owned, arena-backed SVG element tree.
//!
//! The tree keeps every event quick-xml reports (prolog, comments, CDATA,
//! processing instructions) so a parsed document serializes back to the same
//! markup apart from attribute quoting and escaping.

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::path::Path;

/// Handle to a node of an [`SvgDocument`].
///
/// Handles are stable for the lifetime of the document and double as the
/// identity of text elements during field substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
    self_closing: bool,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(Element),
    Text(String),
    /// Events passed through untouched (declaration, comments, doctype...).
    Raw(Event<'static>),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// A parsed SVG document.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    nodes: Vec<Node>,
    top: Vec<NodeId>,
    root: NodeId,
}

impl SvgDocument {
    /// Read and parse an SVG file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use inkslide::svg::SvgDocument;
    ///
    /// let doc = SvgDocument::open("talk.svg")?;
    /// println!("root element: {:?}", doc.name(doc.root()));
    /// # Ok::<(), inkslide::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse an SVG document from raw bytes (UTF-8, optional BOM).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| Error::XmlParse(format!("document is not valid UTF-8: {}", e)))?;
        Self::parse(xml)
    }

    /// Parse an SVG document from a string.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut nodes: Vec<Node> = Vec::new();
        let mut top = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root = None;

        loop {
            let event = reader.read_event()?;
            let kind = match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let self_closing = matches!(event, Event::Empty(_));
                    NodeKind::Element(Self::read_element(e, self_closing)?)
                }
                Event::End(_) => {
                    stack.pop();
                    continue;
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlParse(err.to_string()))?;
                    NodeKind::Text(text.into_owned())
                }
                Event::Eof => break,
                other => NodeKind::Raw(other.into_owned()),
            };

            let is_open_element = matches!(
                kind,
                NodeKind::Element(Element {
                    self_closing: false,
                    ..
                })
            );
            let is_element = matches!(kind, NodeKind::Element(_));

            let id = NodeId(nodes.len());
            let parent = stack.last().copied();
            nodes.push(Node { kind, parent });

            match parent {
                Some(parent) => {
                    if let NodeKind::Element(el) = &mut nodes[parent.0].kind {
                        el.children.push(id);
                    }
                }
                None => {
                    top.push(id);
                    if is_element && root.is_none() {
                        root = Some(id);
                    }
                }
            }

            if is_open_element {
                stack.push(id);
            }
        }

        if !stack.is_empty() {
            return Err(Error::XmlParse("unexpected end of document".to_string()));
        }

        let root = root.ok_or_else(|| Error::XmlParse("document has no root element".to_string()))?;

        Ok(Self { nodes, top, root })
    }

    fn read_element(start: &BytesStart<'_>, self_closing: bool) -> Result<Element> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::XmlParse(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
        })
    }

    /// The document's root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Qualified tag name of an element (e.g. `g`, `svg:g`).
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    /// Parent of a node, `None` for top-level nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Element children of an element, in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.element(id)
            .map(|el| el.children.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |child| self.element(*child).is_some())
    }

    /// All element descendants of an element in pre-order, excluding itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.element_children(id).collect();
        pending.reverse();
        while let Some(next) = pending.pop() {
            out.push(next);
            let mut children: Vec<NodeId> = self.element_children(next).collect();
            children.reverse();
            pending.extend(children);
        }
        out
    }

    /// Value of an attribute by qualified name.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, appending it if the element does not carry it yet.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(el) = self.element_mut(id) {
            match el.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value,
                None => el.attributes.push((name.to_string(), value)),
            }
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attributes.retain(|(key, _)| key != name);
        }
    }

    /// Text content preceding the first child element.
    ///
    /// Returns `None` when the element starts with a child element or has no
    /// children at all.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let first = *self.element(id)?.children.first()?;
        match &self.nodes[first.0].kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Replace the text preceding the first child element, inserting a text
    /// node when there is none.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        let Some(first) = self.element(id).map(|el| el.children.first().copied()) else {
            return;
        };

        if let Some(first) = first {
            if let NodeKind::Text(existing) = &mut self.nodes[first.0].kind {
                *existing = text;
                return;
            }
        }

        let new_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Text(text),
            parent: Some(id),
        });
        if let Some(el) = self.element_mut(id) {
            el.children.insert(0, new_id);
            el.self_closing = false;
        }
    }

    /// Local part of an element's tag name (`g` for both `g` and `svg:g`).
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id).map(|name| split_qname(name).1)
    }

    /// Namespace URI bound to `prefix` in scope at an element.
    ///
    /// The empty prefix looks up the default namespace. Declarations are
    /// searched from the element up to the root.
    pub fn namespace_uri(&self, id: NodeId, prefix: &str) -> Option<&str> {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(uri) = self.attribute(node, &key) {
                return Some(uri);
            }
            current = self.parent(node);
        }
        None
    }

    /// Namespace URI of an element, if its prefix (or the default
    /// namespace) is declared.
    pub fn element_namespace(&self, id: NodeId) -> Option<&str> {
        let (prefix, _) = split_qname(self.name(id)?);
        self.namespace_uri(id, prefix)
    }

    /// Value of the attribute `local` in the namespace `uri`, whatever
    /// prefix the document binds to it.
    pub fn attribute_ns(&self, id: NodeId, uri: &str, local: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(key, _)| match key.split_once(':') {
                Some((prefix, name)) if prefix != "xmlns" => {
                    name == local && self.namespace_uri(id, prefix) == Some(uri)
                }
                _ => false,
            })
            .map(|(_, value)| value.as_str())
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for id in &self.top {
            self.write_node(&mut writer, *id)?;
        }
        Ok(writer.into_inner())
    }

    /// Serialize the document to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<()> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => {
                let mut start = BytesStart::new(el.name.as_str());
                for (key, value) in &el.attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }

                if el.children.is_empty() && el.self_closing {
                    write_event(writer, Event::Empty(start))?;
                } else {
                    write_event(writer, Event::Start(start))?;
                    for child in &el.children {
                        self.write_node(writer, *child)?;
                    }
                    write_event(writer, Event::End(BytesEnd::new(el.name.as_str())))?;
                }
            }
            NodeKind::Text(text) => write_event(writer, Event::Text(BytesText::new(text)))?,
            NodeKind::Raw(event) => write_event(writer, event.clone())?,
        }
        Ok(())
    }
}

fn split_qname(name: &str) -> (&str, &str) {
    name.split_once(':').unwrap_or(("", name))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlWrite(e.to_string()))
}
