//! Relationship parts (`_rels/*.rels`)
//!
//! A package links its parts and media through relationship files that map
//! ids (`rId7`) to a target path and a relationship type. The document's
//! relationship list doubles as its media registry: every embedded image
//! gets an image relationship whose id is referenced from the drawing.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Common relationship type URIs
impl Relationships {
    /// Main document part, referenced from the package relationships
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Custom properties part, referenced from the package relationships
    pub const TYPE_CUSTOM_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/custom-properties";
    /// Image relationship type
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    /// Styles relationship type
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    /// Numbering relationship type
    pub const TYPE_NUMBERING: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
}

/// Parsed relationships from a .rels file
///
/// Maintains insertion order for deterministic XML serialization.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Ordered list of relationship IDs (maintains insertion order)
    order: Vec<String>,
    /// Map of relationship ID to target (for fast lookups)
    map: HashMap<String, RelationshipTarget>,
    /// Counter for generating unique IDs (starts at 1)
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            next_id_counter: 1,
        }
    }
}

/// A relationship target with its type and mode
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipTarget {
    /// The target URL or path
    pub target: String,
    /// The relationship type URI
    pub rel_type: String,
    /// Target mode: "External" for URLs, None for internal paths
    pub target_mode: Option<String>,
}

impl Relationships {
    /// Create an empty relationships map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Relationships::new();
        let mut max_id: u32 = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut target_mode = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                b"TargetMode" => target_mode = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            if let Some(num) = extract_id_number(&id) {
                                max_id = max_id.max(num);
                            }
                            rels.insert(
                                id,
                                RelationshipTarget {
                                    target,
                                    rel_type: rel_type.unwrap_or_default(),
                                    target_mode,
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        rels.next_id_counter = max_id + 1;
        Ok(rels)
    }

    fn insert(&mut self, id: String, target: RelationshipTarget) {
        if self.map.insert(id.clone(), target).is_none() {
            self.order.push(id);
        }
    }

    /// Add a new relationship and return the generated ID (e.g. "rId3")
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let mut id = format!("rId{}", self.next_id_counter);
        // Ids like "rIdA" in loaded parts do not advance the counter
        while self.map.contains_key(&id) {
            self.next_id_counter += 1;
            id = format!("rId{}", self.next_id_counter);
        }
        self.next_id_counter += 1;

        self.insert(
            id.clone(),
            RelationshipTarget {
                target: target.into(),
                rel_type: rel_type.into(),
                target_mode: None,
            },
        );
        id
    }

    /// Return the id of the relationship of this type and target, adding it
    /// when missing
    pub fn ensure(&mut self, target: &str, rel_type: &str) -> String {
        let existing = self
            .iter()
            .find(|(_, rel)| rel.rel_type == rel_type && rel.target == target)
            .map(|(id, _)| id.to_string());
        match existing {
            Some(id) => id,
            None => self.add(target, rel_type),
        }
    }

    /// Serialize relationships to OOXML format
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));

        for (id, rel) in self.iter() {
            xml.push_str("<Relationship");
            xml.push_str(&format!(r#" Id="{}""#, escape_xml(id)));
            xml.push_str(&format!(r#" Type="{}""#, escape_xml(&rel.rel_type)));
            xml.push_str(&format!(r#" Target="{}""#, escape_xml(&rel.target)));
            if let Some(mode) = &rel.target_mode {
                xml.push_str(&format!(r#" TargetMode="{}""#, escape_xml(mode)));
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }

    /// Get the target for a relationship ID
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target.as_str())
    }

    /// Target of the first relationship of the given type
    pub fn target_of_type(&self, rel_type: &str) -> Option<&str> {
        self.iter()
            .find(|(_, rel)| rel.rel_type == rel_type)
            .map(|(_, rel)| rel.target.as_str())
    }

    /// Check if a relationship ID exists
    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    /// Check if a relationship is an image
    pub fn is_image(&self, id: &str) -> bool {
        self.map
            .get(id)
            .map(|r| r.rel_type == Self::TYPE_IMAGE)
            .unwrap_or(false)
    }

    /// Get the number of relationships
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over relationships in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipTarget)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }
}

/// Extract the numeric portion from a relationship ID (e.g., "rId5" -> 5)
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|num_str| num_str.parse().ok())
}

/// Escape special XML characters in attribute values
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relationships() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
        <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/a.png"/>
            <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
        </Relationships>"#;

        let rels = Relationships::parse(xml).unwrap();

        assert_eq!(rels.get("rId1"), Some("media/a.png"));
        assert_eq!(rels.get("rId2"), Some("styles.xml"));
        assert!(rels.is_image("rId1"));
        assert!(!rels.is_image("rId2"));
        assert_eq!(rels.target_of_type(Relationships::TYPE_STYLES), Some("styles.xml"));
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_add_continues_from_existing() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
        <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
            <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
        </Relationships>"#;

        let mut rels = Relationships::parse(xml).unwrap();
        let new_id = rels.add("media/image1.png", Relationships::TYPE_IMAGE);
        assert_eq!(new_id, "rId6");
    }

    #[test]
    fn test_ensure_reuses_matching_relationship() {
        let mut rels = Relationships::new();
        let first = rels.ensure("numbering.xml", Relationships::TYPE_NUMBERING);
        let second = rels.ensure("numbering.xml", Relationships::TYPE_NUMBERING);
        assert_eq!(first, second);
        assert_eq!(rels.len(), 1);
    }

    #[test]
    fn test_add_skips_taken_ids() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="myrId1" Type="t" Target="word/document.xml"/>
            <Relationship Id="rId1x" Type="t" Target="other.xml"/>
        </Relationships>"#;
        let mut rels = Relationships::parse(xml).unwrap();
        assert_eq!(rels.add("a.xml", "t"), "rId1");
        assert_eq!(rels.len(), 3);
    }

    #[test]
    fn test_to_xml_roundtrip_with_escaping() {
        let mut rels = Relationships::new();
        rels.add("file with <special> & \"chars\".xml", Relationships::TYPE_STYLES);
        rels.add("media/diagram1.png", Relationships::TYPE_IMAGE);

        let xml = rels.to_xml();
        assert!(xml.contains(&format!(r#"xmlns="{}""#, RELATIONSHIPS_NS)));
        assert!(xml.contains("&lt;special&gt;"));

        let reparsed = Relationships::parse(xml.as_bytes()).unwrap();
        assert_eq!(
            reparsed.get("rId1"),
            Some("file with <special> & \"chars\".xml")
        );
        assert_eq!(reparsed.get("rId2"), Some("media/diagram1.png"));
    }

    #[test]
    fn test_iteration_order() {
        let mut rels = Relationships::new();
        rels.add("first.xml", "type1");
        rels.add("second.xml", "type2");
        rels.add("third.xml", "type3");

        let targets: Vec<&str> = rels.iter().map(|(_, rel)| rel.target.as_str()).collect();
        assert_eq!(targets, vec!["first.xml", "second.xml", "third.xml"]);
    }

    #[test]
    fn test_extract_id_number() {
        assert_eq!(extract_id_number("rId1"), Some(1));
        assert_eq!(extract_id_number("RId5"), Some(5));
        assert_eq!(extract_id_number("invalid"), None);
        assert_eq!(extract_id_number("rIdabc"), None);
    }
}
