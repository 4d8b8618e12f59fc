//! Owned, mutable markup tree
//!
//! Both backends build their output as [`Element`] trees and load existing
//! documents into the same structure. Parsing is driven by quick-xml's event
//! reader; serialization escapes attribute values and text on the way out.
//! Namespace prefixes are kept as part of the element name (`w:p`).

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, XmlError};

/// Declaration written at the top of every standalone XML part
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// HTML elements that never have content
const HTML_VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// HTML elements whose text is written unescaped
const HTML_RAW_TEXT: &[&str] = &["script", "style"];

/// A node in the markup tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Node::Element(value)
    }
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified name, including any namespace prefix
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Whether the element has the given qualified name
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value in place
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Child elements, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|el| el.is(name))
    }

    /// Return the named child, appending an empty one when missing
    pub fn child_or_insert(&mut self, name: &str) -> &mut Element {
        let found = self
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|el| el.is(name)));
        let index = match found {
            Some(index) => index,
            None => {
                self.push(Element::new(name));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            Node::Element(el) => el,
            _ => unreachable!("index points at an element"),
        }
    }

    /// All descendant elements with the given name, in document order
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.is(name) {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    /// First descendant element with the given name
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.is(name) {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        let index = self.children.iter().position(|n| {
            n.as_element()
                .is_some_and(|el| el.is(name) || el.contains(name))
        })?;
        let child = self.children[index].as_element_mut()?;
        if child.is(name) {
            Some(child)
        } else {
            child.find_mut(name)
        }
    }

    /// Whether any descendant has the given name
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Concatenated text of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
                Node::Comment(_) => {}
            }
        }
    }

    /// Parse a document, returning its root element
    ///
    /// Whitespace is kept as-is; the declaration, processing instructions and
    /// doctype are skipped.
    pub fn parse(xml: &[u8]) -> Result<Element> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => stack.push(Self::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Malformed("unexpected end tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(e.unescape()?.into_owned());
                    }
                }
                Event::CData(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(Node::CData(text));
                    }
                }
                Event::Comment(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e).into_owned();
                        parent.children.push(Node::Comment(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        root.ok_or(XmlError::Empty)
    }

    pub fn parse_str(xml: &str) -> Result<Element> {
        Self::parse(xml.as_bytes())
    }

    fn from_start(start: &BytesStart) -> Result<Element> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.push(element),
            None if root.is_none() => *root = Some(element),
            None => {
                return Err(XmlError::Malformed(format!(
                    "second root element <{}>",
                    element.name
                )))
            }
        }
        Ok(())
    }

    /// Serialize as an XML fragment
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out, false);
        out
    }

    /// Serialize as a standalone XML part with declaration
    pub fn to_document(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        out.push('\n');
        self.write_into(&mut out, false);
        out
    }

    /// Serialize with HTML conventions
    ///
    /// Only void elements self-close; style and script text is written raw.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out, true);
        out
    }

    fn write_into(&self, out: &mut String, html: bool) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if self.children.is_empty() && (!html || HTML_VOID.contains(&self.name.as_str())) {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let raw = html && HTML_RAW_TEXT.contains(&self.name.as_str());
        for child in &self.children {
            match child {
                Node::Element(el) => el.write_into(out, html),
                Node::Text(text) if raw => out.push_str(text),
                Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
                Node::CData(text) => {
                    out.push_str("<![CDATA[");
                    out.push_str(text);
                    out.push_str("]]>");
                }
                Node::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
            }
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}
