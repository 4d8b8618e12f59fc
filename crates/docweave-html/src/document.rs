//! HTML document lifecycle
//!
//! The document is one `html` tree with an inline style sheet in its head.
//! Custom properties live as `<meta name content>` tags; they are lifted out
//! of the head on load and written back on every write, so repeated writes
//! never duplicate them. Staged images are copied next to the output file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use docweave_ast::Content;
use docweave_core::{Element, HtmlConfig, Workspace};
pub use docweave_core::OpenMode;

use crate::error::{HtmlError, Result};
use crate::render::{RenderState, Renderer};

const DOCTYPE: &str = "<!DOCTYPE html>";

/// An HTML document being built or edited
#[derive(Debug)]
pub struct Document {
    path: Option<PathBuf>,
    mode: OpenMode,
    config: HtmlConfig,
    root: Element,
    /// Custom properties in storage order
    properties: Vec<(String, String)>,
    state: RenderState,
}

impl Document {
    /// Fresh document with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HtmlConfig::default())
    }

    /// Fresh document with no backing file
    pub fn with_config(config: HtmlConfig) -> Result<Self> {
        Self::fresh(None, OpenMode::Create, config)
    }

    /// Open `path` with the default configuration
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        Self::open_with_config(path, mode, HtmlConfig::default())
    }

    /// Open `path` according to `mode`
    pub fn open_with_config(
        path: impl AsRef<Path>,
        mode: OpenMode,
        config: HtmlConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        if mode == OpenMode::Create {
            return Self::fresh(Some(path.to_path_buf()), mode, config);
        }
        if path.exists() {
            return Self::load(path, mode, config);
        }
        if mode == OpenMode::Append {
            debug!("{} does not exist, starting a fresh document", path.display());
            return Self::fresh(Some(path.to_path_buf()), mode, config);
        }
        Err(HtmlError::NotFound(path.to_path_buf()))
    }

    fn fresh(path: Option<PathBuf>, mode: OpenMode, config: HtmlConfig) -> Result<Self> {
        let head = Element::new("head")
            .with_child(Element::new("meta").with_attr("charset", "UTF-8"))
            .with_child(
                Element::new("style")
                    .with_attr("type", "text/css")
                    .with_text(style_sheet(&config.styles)),
            );
        let root = Element::new("html")
            .with_child(head)
            .with_child(Element::new("body"));

        info!("Created fresh HTML document");
        Ok(Self {
            path,
            mode,
            root,
            properties: Vec::new(),
            state: RenderState {
                workspace: Workspace::new("html", &config.image_dir)?,
                sequences: HashMap::new(),
            },
            config,
        })
    }

    fn load(path: &Path, mode: OpenMode, config: HtmlConfig) -> Result<Self> {
        let mut root = Element::parse(&fs::read(path)?)?;
        if !root.is("html") {
            return Err(HtmlError::InvalidStructure(format!(
                "expected html, found {}",
                root.name
            )));
        }
        if root.child("body").is_none() {
            return Err(HtmlError::InvalidStructure("document has no body".to_string()));
        }
        if root.child("head").is_none() {
            root.children.insert(0, Element::new("head").into());
        }

        let mut properties = Vec::new();
        if let Some(head) = root.child_mut("head") {
            for meta in head.elements().filter(|el| is_property_meta(el)) {
                if let (Some(name), Some(content)) = (meta.attr("name"), meta.attr("content")) {
                    properties.push((name.to_string(), content.to_string()));
                }
            }
            head.children
                .retain(|n| !n.as_element().is_some_and(is_property_meta));
        }

        let workspace = Workspace::new("html", &config.image_dir)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let prefix = format!("{}/", config.image_dir);
        for img in root.descendants("img") {
            let Some(name) = img.attr("src").and_then(|src| src.strip_prefix(&prefix)) else {
                continue;
            };
            let source = base.join(&config.image_dir).join(name);
            if !source.is_file() {
                debug!("Image {} is missing, not carried over", source.display());
                continue;
            }
            match workspace.stage_as(&source, name) {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
                    warn!("Image {} is outside {}, not carried over", name, config.image_dir);
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("Loaded {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            mode,
            config,
            root,
            properties,
            state: RenderState {
                workspace,
                sequences: HashMap::new(),
            },
        })
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// The `html` tree, without the property meta tags
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn head(&self) -> Option<&Element> {
        self.root.child("head")
    }

    pub fn body(&self) -> Option<&Element> {
        self.root.child("body")
    }

    /// Append content at the end of the body
    ///
    /// On error the body and the sequence counters are left as they were.
    pub fn append(&mut self, content: impl Into<Content>) -> Result<()> {
        let block = content.into().into_block();
        let saved = self.state.sequences.clone();
        let mut fragment = Element::new("body");
        let body = self
            .root
            .child("body")
            .ok_or_else(|| HtmlError::InvalidStructure("document has no body".to_string()))?;
        let rendered =
            Renderer::new(body, &mut self.state, &self.config).block(&block, &mut fragment);
        if let Err(e) = rendered {
            self.state.sequences = saved;
            return Err(e);
        }

        if let Some(body) = self.root.child_mut("body") {
            body.children.extend(fragment.children);
        }
        Ok(())
    }

    /// Custom properties as (name, value) pairs in storage order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn property_names(&self) -> Vec<String> {
        self.properties.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Stored value of a property; empty values read as absent
    pub fn get_property(&self, name: &str) -> Option<String> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
            .filter(|value| !value.is_empty())
    }

    pub fn set_property(&mut self, name: &str, value: &str) {
        match self.properties.iter_mut().find(|(n, _)| n == name) {
            Some((_, stored)) => *stored = value.to_string(),
            None => self.properties.push((name.to_string(), value.to_string())),
        }
        debug!("Set property {:?}", name);
    }

    /// Text of each top-level body paragraph or heading, in order
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.body()
            .map(|body| {
                body.elements()
                    .filter(|el| el.is("p") || is_heading(&el.name))
                    .map(Element::text)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Render the full page as a string
    pub fn to_html(&self) -> String {
        let mut root = self.root.clone();
        if let Some(head) = root.child_mut("head") {
            for (name, content) in &self.properties {
                head.push(
                    Element::new("meta")
                        .with_attr("name", name.as_str())
                        .with_attr("content", content.as_str()),
                );
            }
        }
        format!("{DOCTYPE}\n{}\n", root.to_html())
    }

    /// Write the page to `path` and its images next to it, overwriting both
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_html())?;

        let media = self.state.workspace.media_files()?;
        if !media.is_empty() {
            let dir = path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(&self.config.image_dir);
            fs::create_dir_all(&dir)?;
            let staged = self.state.workspace.media_dir();
            for file in &media {
                let Ok(relative) = file.strip_prefix(staged) else {
                    continue;
                };
                let dest = dir.join(relative);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(file, dest)?;
            }
            debug!("Copied {} image(s) to {}", media.len(), dir.display());
        }
        info!("Wrote {}", path.display());
        Ok(())
    }

    /// Save to the backing file when opened in `Update` or `Append` mode
    pub fn flush(&self) -> Result<()> {
        match &self.path {
            Some(path) if self.mode.writes_back() => self.write_to(path),
            _ => Ok(()),
        }
    }

    /// Flush, then release the workspace
    pub fn close(self) -> Result<()> {
        self.flush()?;
        self.state.workspace.close()?;
        info!("Closed HTML document");
        Ok(())
    }
}

fn is_property_meta(el: &Element) -> bool {
    el.is("meta") && el.attr("name").is_some() && el.attr("content").is_some()
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Inline style sheet for a selector to declarations table
pub fn style_sheet(styles: &BTreeMap<String, BTreeMap<String, String>>) -> String {
    let mut css = String::from("\n");
    for (selector, declarations) in styles {
        css.push_str(selector);
        css.push_str(" {\n");
        for (property, value) in declarations {
            css.push_str(&format!("  {property}: {value};\n"));
        }
        css.push_str("}\n");
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_ast::{Header, PageBreak, Table};

    #[test]
    fn test_fresh_document_has_style_sheet() {
        let doc = Document::new().unwrap();
        let style = doc.head().unwrap().child("style").unwrap().text();
        assert!(style.contains("td {\n  border: 1px solid;\n  padding: 2px;\n}"));
        assert!(style.contains("div.figure {\n  width: 85%;\n}"));
        assert!(doc.body().unwrap().children.is_empty());
    }

    #[test]
    fn test_append_blocks() {
        let mut doc = Document::new().unwrap();
        doc.append("Intro").unwrap();
        doc.append(Header::new(2, "Details")).unwrap();
        doc.append(PageBreak).unwrap();

        let body = doc.body().unwrap();
        let names: Vec<&str> = body.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["p", "h2", "div"]);
        assert_eq!(doc.paragraph_texts(), vec!["Intro", "Details"]);
    }

    #[test]
    fn test_table_captions_count_up() {
        let mut doc = Document::new().unwrap();
        doc.append(Table::new([["A", "B"], ["C", "D"]]).with_caption("demo"))
            .unwrap();
        doc.append(Table::new([["E"]]).with_caption("more")).unwrap();

        let captions: Vec<String> = doc
            .root()
            .descendants("p")
            .into_iter()
            .filter(|p| p.attr("class") == Some("caption"))
            .map(Element::text)
            .collect();
        assert_eq!(captions, vec!["Table 1: demo", "Table 2: more"]);
    }

    #[test]
    fn test_properties_become_meta_tags_once() {
        let mut doc = Document::new().unwrap();
        doc.set_property("Owner", "Ops");
        doc.set_property("Owner", "QA");

        let html = doc.to_html();
        assert!(html.starts_with("<!DOCTYPE html>\n<html>"));
        assert_eq!(html.matches(r#"<meta name="Owner" content="QA"/>"#).count(), 1);
        assert!(!html.contains("Ops"));
        assert_eq!(doc.property_names(), vec!["Owner"]);
    }

    #[test]
    fn test_empty_property_reads_as_none() {
        let mut doc = Document::new().unwrap();
        doc.set_property("Blank", "");
        assert_eq!(doc.get_property("Blank"), None);
    }
}
