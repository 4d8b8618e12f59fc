//! Style definitions (word/styles.xml)
//!
//! Paragraph styles are referenced by id (`Heading1`) while callers use
//! logical names (`heading 1`). Loading a styles part yields the name to id
//! pairs that get merged into a document's style table. Fresh documents get
//! a small styles part defining the ids of the default table.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use docweave_core::Element;

use crate::error::{OoxmlError, Result};
use crate::W_NS;

/// A Word style definition
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    /// Style type (`paragraph`, `character`, `table`, `numbering`)
    pub style_type: String,
}

/// Collection of styles from a document
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: Vec<Style>,
}

impl StyleSheet {
    /// Parse styles from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut sheet = StyleSheet::default();
        let mut buf = Vec::new();
        let mut current: Option<(String, String, Option<String>)> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"style" => {
                        let id = get_attr(e, b"w:styleId").unwrap_or_default();
                        let style_type =
                            get_attr(e, b"w:type").unwrap_or_else(|| "paragraph".to_string());
                        current = Some((id, style_type, None));
                    }
                    b"name" => {
                        if let Some((_, _, name)) = current.as_mut() {
                            *name = get_attr(e, b"w:val");
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"style" {
                        if let Some((id, style_type, Some(name))) = current.take() {
                            if !id.is_empty() {
                                sheet.styles.push(Style {
                                    id,
                                    name,
                                    style_type,
                                });
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// All styles in document order
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Logical name to style id pairs
    pub fn name_to_id(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles
            .iter()
            .map(|s| (s.name.as_str(), s.id.as_str()))
    }

    /// Look up a style by ID
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.id == id)
    }
}

/// Get attribute value from element
fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Styles part written into fresh documents
///
/// Defines `Normal`, `Heading1`..`Heading9` and `Caption` so the default
/// style table resolves to real styles.
pub fn default_styles_xml() -> String {
    let mut root = Element::new("w:styles").with_attr("xmlns:w", W_NS);
    root.push(paragraph_style("Normal", "Normal", None, None).with_attr("w:default", "1"));
    for level in 1..=9u8 {
        let size = match level {
            1 => 32,
            2 => 28,
            3 => 26,
            _ => 24,
        };
        let mut style = paragraph_style(
            &format!("Heading{level}"),
            &format!("heading {level}"),
            Some("Normal"),
            Some(size),
        );
        if let Some(ppr) = style.child_mut("w:pPr") {
            ppr.push(Element::new("w:outlineLvl").with_attr("w:val", (level - 1).to_string()));
        }
        root.push(style);
    }
    let mut caption = paragraph_style("Caption", "caption", Some("Normal"), Some(18));
    if let Some(rpr) = caption.child_mut("w:rPr") {
        rpr.children
            .retain(|n| !n.as_element().is_some_and(|el| el.is("w:b")));
        rpr.push(Element::new("w:i"));
    }
    root.push(caption);
    root.to_document()
}

fn paragraph_style(id: &str, name: &str, based_on: Option<&str>, size: Option<u32>) -> Element {
    let mut style = Element::new("w:style")
        .with_attr("w:type", "paragraph")
        .with_attr("w:styleId", id)
        .with_child(Element::new("w:name").with_attr("w:val", name));
    if let Some(base) = based_on {
        style.push(Element::new("w:basedOn").with_attr("w:val", base));
        style.push(Element::new("w:next").with_attr("w:val", "Normal"));
        style.push(Element::new("w:qFormat"));
        style.push(Element::new("w:pPr").with_child(Element::new("w:keepNext")));
    }
    if let Some(size) = size {
        style.push(
            Element::new("w:rPr")
                .with_child(Element::new("w:b"))
                .with_child(Element::new("w:sz").with_attr("w:val", size.to_string())),
        );
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_style_names() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="berschrift1">
    <w:name w:val="heading 1"/>
    <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
  </w:style>
  <w:style w:type="table" w:styleId="Tabellengitter">
    <w:name w:val="Table Grid"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="NoName"/>
</w:styles>"#;

        let sheet = StyleSheet::parse(xml).unwrap();
        assert_eq!(sheet.styles().len(), 2);
        let pairs: Vec<_> = sheet.name_to_id().collect();
        assert_eq!(
            pairs,
            vec![("heading 1", "berschrift1"), ("Table Grid", "Tabellengitter")]
        );
        assert_eq!(sheet.get("Tabellengitter").unwrap().style_type, "table");
    }

    #[test]
    fn test_default_styles_cover_default_table() {
        let xml = default_styles_xml();
        let sheet = StyleSheet::parse(xml.as_bytes()).unwrap();
        for id in ["Normal", "Heading1", "Heading9", "Caption"] {
            assert!(sheet.get(id).is_some(), "missing {id}");
        }
        assert_eq!(sheet.get("Caption").unwrap().name, "caption");
    }
}
