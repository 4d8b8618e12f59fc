//! Content-type declarations (`[Content_Types].xml`)

use docweave_core::Element;

use crate::error::Result;

/// Namespace of the content-types part
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_XML: &str = "application/xml";
pub const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const CT_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const CT_NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
pub const CT_CUSTOM_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.custom-properties+xml";

/// The package's `Default` (by extension) and `Override` (by part) entries
#[derive(Debug, Clone)]
pub struct ContentTypes {
    root: Element,
}

impl Default for ContentTypes {
    fn default() -> Self {
        let mut types = Self {
            root: Element::new("Types").with_attr("xmlns", CONTENT_TYPES_NS),
        };
        types.ensure_default("rels", CT_RELATIONSHIPS);
        types.ensure_default("xml", CT_XML);
        types.ensure_default("png", "image/png");
        types.ensure_default("jpg", "image/jpeg");
        types.ensure_override("/word/document.xml", CT_DOCUMENT);
        types
    }
}

impl ContentTypes {
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Ok(Self {
            root: Element::parse(xml)?,
        })
    }

    /// Content type registered for a file extension
    pub fn default_for(&self, extension: &str) -> Option<&str> {
        let extension = extension.to_ascii_lowercase();
        self.root
            .elements()
            .filter(|el| el.is("Default"))
            .find(|el| {
                el.attr("Extension")
                    .is_some_and(|e| e.eq_ignore_ascii_case(&extension))
            })
            .and_then(|el| el.attr("ContentType"))
    }

    /// Content type registered for a part name (`/word/styles.xml`)
    pub fn override_for(&self, part: &str) -> Option<&str> {
        self.root
            .elements()
            .filter(|el| el.is("Override"))
            .find(|el| el.attr("PartName") == Some(part))
            .and_then(|el| el.attr("ContentType"))
    }

    /// Register an extension unless already present
    ///
    /// `Default` entries are kept ahead of `Override` entries.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if self.default_for(extension).is_some() {
            return;
        }
        let entry = Element::new("Default")
            .with_attr("Extension", extension.to_ascii_lowercase())
            .with_attr("ContentType", content_type);
        let index = self
            .root
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|el| el.is("Override")))
            .unwrap_or(self.root.children.len());
        self.root.children.insert(index, entry.into());
    }

    /// Register a part, replacing any existing content type for it
    pub fn ensure_override(&mut self, part: &str, content_type: &str) {
        if let Some(el) = self
            .root
            .elements_mut()
            .find(|el| el.is("Override") && el.attr("PartName") == Some(part))
        {
            el.set_attr("ContentType", content_type);
            return;
        }
        self.root.push(
            Element::new("Override")
                .with_attr("PartName", part)
                .with_attr("ContentType", content_type),
        );
    }

    pub fn to_xml(&self) -> String {
        self.root.to_document()
    }
}

/// Content type of an image file extension
pub fn image_content_type(extension: &str) -> String {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "gif" => "image/gif".to_string(),
        "bmp" => "image/bmp".to_string(),
        "tif" | "tiff" => "image/tiff".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "emf" => "image/x-emf".to_string(),
        "wmf" => "image/x-wmf".to_string(),
        other => format!("image/{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_declares_document() {
        let types = ContentTypes::default();
        assert_eq!(types.default_for("PNG"), Some("image/png"));
        assert_eq!(types.override_for("/word/document.xml"), Some(CT_DOCUMENT));
    }

    #[test]
    fn test_ensure_default_goes_before_overrides() {
        let mut types = ContentTypes::default();
        types.ensure_default("gif", "image/gif");
        types.ensure_default("gif", "image/other");
        let xml = types.to_xml();
        let gif = xml.find(r#"Extension="gif""#).unwrap();
        let over = xml.find("<Override").unwrap();
        assert!(gif < over);
        assert_eq!(xml.matches(r#"Extension="gif""#).count(), 1);
    }

    #[test]
    fn test_ensure_override_replaces() {
        let mut types = ContentTypes::parse(
            br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Override PartName="/word/numbering.xml" ContentType="application/xml"/></Types>"#,
        )
        .unwrap();
        types.ensure_override("/word/numbering.xml", CT_NUMBERING);
        assert_eq!(types.override_for("/word/numbering.xml"), Some(CT_NUMBERING));
        assert_eq!(types.to_xml().matches("<Override").count(), 1);
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("JPG"), "image/jpeg");
        assert_eq!(image_content_type("webp"), "image/webp");
    }
}
