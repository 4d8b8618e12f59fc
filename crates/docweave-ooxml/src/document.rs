//! Office document lifecycle
//!
//! A [`Document`] is the root of one `.docx` package: the `w:document` tree,
//! the side parts it manages (numbering, custom properties, settings,
//! headers), the media staged in its workspace and every other part of a
//! loaded package, which is written back untouched.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use docweave_ast::Content;
use docweave_core::{Element, OfficeConfig, Workspace};
pub use docweave_core::OpenMode;

use crate::archive::{OoxmlArchive, CONTENT_TYPES_PATH};
use crate::content_types::{ContentTypes, CT_CUSTOM_PROPERTIES, CT_STYLES};
use crate::error::{OoxmlError, Result};
use crate::fields::update_property_fields;
use crate::numbering::Numbering;
use crate::properties::{CustomProperties, CUSTOM_PROPERTIES_PATH};
use crate::relationships::Relationships;
use crate::render::{RenderState, Renderer};
use crate::styles::{default_styles_xml, StyleSheet};
use crate::{A_NS, R_NS, WP_NS, WX_NS, W_NS};

const DOCUMENT_PATH: &str = "word/document.xml";
const DOCUMENT_RELS_PATH: &str = "word/_rels/document.xml.rels";
const PACKAGE_RELS_PATH: &str = "_rels/.rels";
const STYLES_PATH: &str = "word/styles.xml";
const NUMBERING_PATH: &str = "word/numbering.xml";
const SETTINGS_PATH: &str = "word/settings.xml";
const MEDIA_PREFIX: &str = "word/media/";

/// An office document being built or edited
#[derive(Debug)]
pub struct Document {
    path: Option<PathBuf>,
    mode: OpenMode,
    config: OfficeConfig,
    /// Parts written back as loaded
    archive: OoxmlArchive,
    root: Element,
    package_rels: Relationships,
    properties: Option<CustomProperties>,
    settings: Option<Element>,
    /// Header and footer trees keyed by part path
    headers: Vec<(String, Element)>,
    state: RenderState,
}

impl Document {
    /// Fresh document with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(OfficeConfig::default())
    }

    /// Fresh document with no backing file
    pub fn with_config(config: OfficeConfig) -> Result<Self> {
        Self::fresh(None, OpenMode::Create, config)
    }

    /// Open `path` with the default configuration
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        Self::open_with_config(path, mode, OfficeConfig::default())
    }

    /// Open `path` according to `mode`
    pub fn open_with_config(
        path: impl AsRef<Path>,
        mode: OpenMode,
        config: OfficeConfig,
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
        Err(OoxmlError::NotFound(path.to_path_buf()))
    }

    fn fresh(path: Option<PathBuf>, mode: OpenMode, config: OfficeConfig) -> Result<Self> {
        let root = Element::new("w:document")
            .with_attr("xmlns:w", W_NS)
            .with_attr("xmlns:wx", WX_NS)
            .with_attr("xmlns:wp", WP_NS)
            .with_attr("xmlns:a", A_NS)
            .with_attr("xmlns:r", R_NS)
            .with_child(Element::new("w:body"));

        let mut package_rels = Relationships::new();
        package_rels.add(DOCUMENT_PATH, Relationships::TYPE_OFFICE_DOCUMENT);

        let mut rels = Relationships::new();
        rels.add("styles.xml", Relationships::TYPE_STYLES);

        let mut content_types = ContentTypes::default();
        content_types.ensure_override("/word/styles.xml", CT_STYLES);

        let mut archive = OoxmlArchive::new();
        archive.set_string(STYLES_PATH, default_styles_xml());

        info!("Created fresh office document");
        Ok(Self {
            path,
            mode,
            archive,
            root,
            package_rels,
            properties: None,
            settings: None,
            headers: Vec::new(),
            state: RenderState {
                styles: config.styles.clone().into_iter().collect(),
                rels,
                content_types,
                numbering: None,
                workspace: Workspace::new("word", "media")?,
                sequences: HashMap::new(),
                next_drawing_id: 1,
            },
            config,
        })
    }

    fn load(path: &Path, mode: OpenMode, config: OfficeConfig) -> Result<Self> {
        let mut archive = OoxmlArchive::open(path)?;

        let mut root = Element::parse(archive.document_xml()?)?;
        if root.child("w:body").is_none() {
            return Err(OoxmlError::InvalidStructure(format!(
                "{DOCUMENT_PATH} has no w:body"
            )));
        }
        for (attr, ns) in [
            ("xmlns:wx", WX_NS),
            ("xmlns:wp", WP_NS),
            ("xmlns:a", A_NS),
            ("xmlns:r", R_NS),
        ] {
            if root.attr(attr).is_none() {
                root.set_attr(attr, ns);
            }
        }
        archive.remove(DOCUMENT_PATH);

        let content_types =
            take_part(&mut archive, CONTENT_TYPES_PATH, ContentTypes::parse).unwrap_or_default();
        let rels =
            take_part(&mut archive, DOCUMENT_RELS_PATH, Relationships::parse).unwrap_or_default();
        let package_rels = take_part(&mut archive, PACKAGE_RELS_PATH, Relationships::parse)
            .unwrap_or_else(|| {
                let mut rels = Relationships::new();
                rels.add(DOCUMENT_PATH, Relationships::TYPE_OFFICE_DOCUMENT);
                rels
            });
        let numbering = take_part(&mut archive, NUMBERING_PATH, Numbering::parse);
        let properties = take_part(&mut archive, CUSTOM_PROPERTIES_PATH, CustomProperties::parse);
        let settings = take_part(&mut archive, SETTINGS_PATH, |xml| Ok(Element::parse(xml)?));

        let header_paths: Vec<String> = archive
            .file_list()
            .into_iter()
            .filter(|p| is_header_part(p))
            .map(str::to_string)
            .collect();
        let headers = header_paths
            .into_iter()
            .filter_map(|p| {
                let tree = take_part(&mut archive, &p, |xml| Ok(Element::parse(xml)?))?;
                Some((p, tree))
            })
            .collect();

        let mut styles: HashMap<String, String> = config.styles.clone().into_iter().collect();
        if let Some(xml) = archive.get(STYLES_PATH) {
            match StyleSheet::parse(xml) {
                Ok(sheet) => {
                    for (name, id) in sheet.name_to_id() {
                        styles.insert(name.to_string(), id.to_string());
                    }
                }
                Err(e) => warn!("Ignoring unreadable {}: {}", STYLES_PATH, e),
            }
        }

        let workspace = Workspace::new("word", "media")?;
        let media: Vec<String> = archive
            .file_list()
            .into_iter()
            .filter(|p| {
                p.strip_prefix(MEDIA_PREFIX)
                    .is_some_and(|name| !name.is_empty() && !name.contains('/'))
            })
            .map(str::to_string)
            .collect();
        for part in media {
            if let Some(bytes) = archive.remove(&part) {
                let name = &part[MEDIA_PREFIX.len()..];
                fs::write(workspace.media_dir().join(name), bytes)?;
            }
        }

        let next_drawing_id = root
            .descendants("wp:docPr")
            .into_iter()
            .filter_map(|el| el.attr("id").and_then(|id| id.parse::<u32>().ok()))
            .max()
            .unwrap_or(0)
            + 1;

        info!("Loaded {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            mode,
            config,
            archive,
            root,
            package_rels,
            properties,
            settings,
            headers,
            state: RenderState {
                styles,
                rels,
                content_types,
                numbering,
                workspace,
                sequences: HashMap::new(),
                next_drawing_id,
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

    /// The `w:document` tree
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The `w:body` element
    pub fn body(&self) -> Option<&Element> {
        self.root.child("w:body")
    }

    /// Style id for a logical style name
    pub fn style_id(&self, name: &str) -> Option<&str> {
        self.state.styles.get(name).map(String::as_str)
    }

    /// Document relationships, including every embedded image
    pub fn media(&self) -> &Relationships {
        &self.state.rels
    }

    pub fn numbering(&self) -> Option<&Numbering> {
        self.state.numbering.as_ref()
    }

    pub fn settings(&self) -> Option<&Element> {
        self.settings.as_ref()
    }

    /// Header and footer parts
    pub fn headers(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.headers.iter().map(|(path, tree)| (path.as_str(), tree))
    }

    /// Append content at the end of the body
    ///
    /// Content goes before a trailing `w:sectPr`. On error the body, the
    /// numbering part, relationships, content types, counters and staged
    /// media are left as they were.
    pub fn append(&mut self, content: impl Into<Content>) -> Result<()> {
        let block = content.into().into_block();
        let checkpoint = self.state.checkpoint()?;
        let mut fragment = Element::new("w:body");
        let rendered =
            Renderer::new(&self.root, &mut self.state, &self.config).block(&block, &mut fragment);
        if let Err(e) = rendered {
            self.state.rollback(checkpoint);
            return Err(e);
        }

        let body = self
            .root
            .child_mut("w:body")
            .ok_or_else(|| OoxmlError::InvalidStructure("document has no w:body".to_string()))?;
        let at = match body.children.iter().rposition(|n| n.as_element().is_some()) {
            Some(i) if body.children[i].as_element().is_some_and(|el| el.is("w:sectPr")) => i,
            _ => body.children.len(),
        };
        let tail = body.children.split_off(at);
        body.children.extend(fragment.children);
        body.children.extend(tail);
        Ok(())
    }

    /// Custom properties part, if the document has one
    pub fn properties(&self) -> Option<&CustomProperties> {
        self.properties.as_ref()
    }

    pub fn property_names(&self) -> Vec<String> {
        self.properties
            .as_ref()
            .map(CustomProperties::names)
            .unwrap_or_default()
    }

    pub fn get_property(&self, name: &str) -> Option<String> {
        self.properties.as_ref()?.get(name)
    }

    /// Set a custom property and refresh every field showing it
    ///
    /// Creates the custom-properties part when the document has none.
    pub fn set_property(&mut self, name: &str, value: &str) {
        if self.properties.is_none() {
            debug!("Creating custom properties part");
            self.package_rels
                .ensure(CUSTOM_PROPERTIES_PATH, Relationships::TYPE_CUSTOM_PROPERTIES);
            self.state
                .content_types
                .ensure_override(&format!("/{CUSTOM_PROPERTIES_PATH}"), CT_CUSTOM_PROPERTIES);
        }
        let pid = self
            .properties
            .get_or_insert_with(CustomProperties::new)
            .set(name, value);

        let mut fields = update_property_fields(&mut self.root, name, value);
        for (_, header) in &mut self.headers {
            fields += update_property_fields(header, name, value);
        }
        debug!(
            "Set property {:?} (pid {}), {} field(s) updated",
            name, pid, fields
        );
    }

    /// Text of each top-level body paragraph, in order
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.body()
            .map(|body| {
                body.elements()
                    .filter(|el| el.is("w:p"))
                    .map(|p| {
                        p.descendants("w:t")
                            .into_iter()
                            .map(|t| t.text())
                            .collect::<String>()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Serialize the package to `path`, overwriting it
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut package = self.archive.clone();

        package.set_string(DOCUMENT_PATH, self.root.to_document());
        if let Some(numbering) = &self.state.numbering {
            package.set_string(NUMBERING_PATH, numbering.to_xml());
        }
        if let Some(properties) = &self.properties {
            package.set_string(CUSTOM_PROPERTIES_PATH, properties.to_xml());
        }
        if let Some(settings) = &self.settings {
            package.set_string(SETTINGS_PATH, settings.to_document());
        }
        for (part, tree) in &self.headers {
            package.set_string(part.clone(), tree.to_document());
        }
        for file in self.state.workspace.media_files()? {
            if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
                package.set(format!("{MEDIA_PREFIX}{name}"), fs::read(&file)?);
            }
        }
        package.set_string(DOCUMENT_RELS_PATH, self.state.rels.to_xml());
        package.set_string(PACKAGE_RELS_PATH, self.package_rels.to_xml());
        package.set_string(CONTENT_TYPES_PATH, self.state.content_types.to_xml());

        package.write_to_file(path)?;
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
        info!("Closed office document");
        Ok(())
    }
}

/// Remove and parse an optional part, logging and skipping it when unreadable
///
/// An unreadable part stays in the archive and is written back as loaded.
fn take_part<T>(
    archive: &mut OoxmlArchive,
    path: &str,
    parse: impl FnOnce(&[u8]) -> Result<T>,
) -> Option<T> {
    let parsed = parse(archive.get(path)?);
    match parsed {
        Ok(part) => {
            archive.remove(path);
            Some(part)
        }
        Err(e) => {
            warn!("Ignoring unreadable {}: {}", path, e);
            None
        }
    }
}

/// `word/header1.xml`, `word/footer2.xml`, ...
fn is_header_part(path: &str) -> bool {
    path.strip_prefix("word/")
        .is_some_and(|name| {
            (name.starts_with("header") || name.starts_with("footer"))
                && name.ends_with(".xml")
                && !name.contains('/')
        })
}
