//! Custom document properties (docProps/custom.xml)
//!
//! User-settable key/value pairs such as a document id or a revision, shown
//! in the document through `DOCPROPERTY` fields. Each property carries a
//! `pid` that is unique within the part; ids start at 2 and only grow.

use docweave_core::Element;

use crate::error::{OoxmlError, Result};
use crate::VT_NS;

/// Namespace of the custom-properties part
pub const CUSTOM_PROPERTIES_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/custom-properties";

/// Format id required on every custom property
pub const PROPERTY_FMTID: &str = "{D5CDD505-2E9C-101B-9397-08002B2CF9AE}";

/// Location of the part inside the package
pub const CUSTOM_PROPERTIES_PATH: &str = "docProps/custom.xml";

/// Custom properties part
#[derive(Debug, Clone)]
pub struct CustomProperties {
    root: Element,
}

impl Default for CustomProperties {
    fn default() -> Self {
        Self {
            root: Element::new("Properties")
                .with_attr("xmlns", CUSTOM_PROPERTIES_NS)
                .with_attr("xmlns:vt", VT_NS),
        }
    }
}

impl CustomProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(xml: &[u8]) -> Result<Self> {
        let root = Element::parse(xml)?;
        if !root.is("Properties") {
            return Err(OoxmlError::InvalidStructure(format!(
                "expected Properties, found {}",
                root.name
            )));
        }
        Ok(Self { root })
    }

    fn properties(&self) -> impl Iterator<Item = &Element> {
        self.root.elements().filter(|el| el.is("property"))
    }

    fn find(&self, name: &str) -> Option<&Element> {
        self.properties().find(|el| el.attr("name") == Some(name))
    }

    /// Stored text of a property; empty values read as absent
    pub fn get(&self, name: &str) -> Option<String> {
        let property = self.find(name)?;
        let value = property
            .child("vt:lpwstr")
            .or_else(|| property.elements().next())?
            .text();
        (!value.is_empty()).then_some(value)
    }

    /// Id of a property
    pub fn pid(&self, name: &str) -> Option<u32> {
        self.find(name)?.attr("pid")?.parse().ok()
    }

    /// Create or update a property and return its id
    pub fn set(&mut self, name: &str, value: &str) -> u32 {
        let max_pid = self
            .properties()
            .filter_map(|el| el.attr("pid").and_then(|p| p.parse::<u32>().ok()))
            .fold(1, u32::max);

        let value_node = Element::new("vt:lpwstr").with_text(value);
        let existing = self
            .root
            .elements_mut()
            .find(|el| el.is("property") && el.attr("name") == Some(name));
        match existing {
            Some(property) => {
                property.children = vec![value_node.into()];
                property
                    .attr("pid")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(max_pid)
            }
            None => {
                let pid = max_pid + 1;
                self.root.push(
                    Element::new("property")
                        .with_attr("fmtid", PROPERTY_FMTID)
                        .with_attr("pid", pid.to_string())
                        .with_attr("name", name)
                        .with_child(value_node),
                );
                log::debug!("Created custom property {:?} (pid {})", name, pid);
                pid
            }
        }
    }

    /// Property names in storage order
    pub fn names(&self) -> Vec<String> {
        self.properties()
            .filter_map(|el| el.attr("name"))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.properties().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_xml(&self) -> String {
        self.root.to_document()
    }
}
