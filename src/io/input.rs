use std::path::Path;
use std::time::Instant;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{DocumentError, XmlError};

/// Number of reader events between deadline checks
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// A node in the element tree: either a child element or a text fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element, matched by local name. Attribute keys keep their
/// qualified form, so the identifier is looked up as `xml:id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Local name (namespace prefix removed)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `xml:id` of this element
    pub fn id(&self) -> Option<&str> {
        self.attr("xml:id")
    }

    /// Direct child elements in document order
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child with the given local name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|e| e.name == name)
    }

    /// All descendant elements, pre-order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children().rev().collect(),
        }
    }

    /// All descendant elements with the given local name, in document order
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |e| e.name == name)
    }

    /// First descendant element with the given local name
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.name == name)
    }

    /// Descendant elements with the given local name, without descending
    /// into a match. A nested match is part of its enclosing one.
    pub fn find_outermost<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_outermost(self, name, &mut found);
        found
    }

    /// Every text fragment under this element, in document order
    pub fn text_fragments(&self) -> Vec<&str> {
        let mut fragments = Vec::new();
        collect_text(self, &mut fragments);
        fragments
    }

    /// Concatenation of all descendant text, unmodified
    pub fn string_value(&self) -> String {
        self.text_fragments().concat()
    }

    /// Descendant text fragments, each trimmed, empty ones dropped, joined
    /// with single spaces
    pub fn joined_text(&self) -> String {
        join_fragments(self.text_fragments())
    }
}

fn collect_outermost<'a>(element: &'a Element, name: &str, out: &mut Vec<&'a Element>) {
    for child in element.children() {
        if child.name == name {
            out.push(child);
        } else {
            collect_outermost(child, name, out);
        }
    }
}

fn collect_text<'a>(element: &'a Element, out: &mut Vec<&'a str>) {
    for node in &element.children {
        match node {
            Node::Text(text) => out.push(text),
            Node::Element(child) => collect_text(child, out),
        }
    }
}

/// Trim each fragment, drop empty ones and join the rest with single spaces
pub fn join_fragments<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    fragments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pre-order walk over descendant elements
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children().rev());
        Some(next)
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements with the given local name, root included
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        std::iter::once(&self.root)
            .chain(self.root.descendants())
            .filter(move |e| e.name == name)
    }
}

/// Read and parse an XML file
pub fn parse_document_file(
    path: &Path,
    deadline: Option<Instant>,
) -> Result<Document, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, deadline).map_err(|source| DocumentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse XML text into an element tree. When a deadline is given, the
/// parse fails with [`XmlError::DeadlineExceeded`] once it has passed.
pub fn parse_document(xml: &str, deadline: Option<Instant>) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut events = 0usize;

    loop {
        events += 1;
        if events % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(XmlError::DeadlineExceeded);
                }
            }
        }

        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let element = element_from(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::Unbalanced("closing tag without opening tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text.unescape().map_err(quick_xml::Error::from)?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unbalanced(format!(
            "element <{}> is never closed",
            open.name
        )));
    }
    root.map(|root| Document { root })
        .ok_or(XmlError::NoRootElement)
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(XmlError::Unbalanced(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0" xml:id="doc">
  <text>
    <div type="debateSection">
      <head>Budget &amp; Finance</head>
      <u who="#S1"><seg>Hello</seg><seg> house <note>aside</note></seg></u>
    </div>
    <tei:empty xmlns:tei="http://www.tei-c.org/ns/1.0" flag="yes"/>
  </text>
</TEI>"##;

    #[test]
    fn test_parse_tree() {
        let doc = parse_document(SAMPLE, None).unwrap();

        assert_eq!(doc.root().name(), "TEI");
        assert_eq!(doc.root().id(), Some("doc"));

        let div = doc.find_all("div").next().unwrap();
        assert_eq!(div.attr("type"), Some("debateSection"));
        assert_eq!(div.child("head").unwrap().string_value(), "Budget & Finance");

        let u = div.find("u").unwrap();
        assert_eq!(u.attr("who"), Some("#S1"));
        assert_eq!(u.joined_text(), "Hello house aside");

        // Prefixed elements match by local name
        let empty = doc.find_all("empty").next().unwrap();
        assert_eq!(empty.attr("flag"), Some("yes"));
    }

    #[test]
    fn test_descendants_document_order() {
        let doc = parse_document("<a><b><c/></b><d/></a>", None).unwrap();
        let names: Vec<&str> = doc.root().descendants().map(|e| e.name()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_find_outermost_skips_nested_matches() {
        let doc = parse_document(
            "<u><seg>Outer <seg>inner</seg> tail</seg><note><seg>second</seg></note></u>",
            None,
        )
        .unwrap();
        let segs = doc.root().find_outermost("seg");

        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].joined_text(), "Outer inner tail");
        assert_eq!(segs[1].joined_text(), "second");
    }

    #[test]
    fn test_join_fragments() {
        assert_eq!(join_fragments(["  a ", "\n  ", "b"]), "a b");
        assert_eq!(join_fragments(["   "]), "");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_document("<a><b></a>", None).is_err());
        assert!(matches!(
            parse_document("<a><b>", None),
            Err(XmlError::Unbalanced(_))
        ));
        assert!(matches!(
            parse_document("  ", None),
            Err(XmlError::NoRootElement)
        ));
    }

    #[test]
    fn test_deadline_exceeded() {
        let mut xml = String::from("<root>");
        for _ in 0..5000 {
            xml.push_str("<x/>");
        }
        xml.push_str("</root>");

        let past = Instant::now();
        assert!(matches!(
            parse_document(&xml, Some(past)),
            Err(XmlError::DeadlineExceeded)
        ));
        assert!(parse_document(&xml, None).is_ok());
    }
}
