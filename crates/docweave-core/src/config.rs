//! Configuration settings
//!
//! Settings are loaded from a TOML file such as `docweave.toml`:
//!
//! ```toml
//! [office]
//! list_indent = 360
//! list_hanging = 360
//! figure_dpi = 300
//!
//! [office.styles]
//! "quote" = "Quote"
//!
//! [html]
//! image_dir = "images"
//!
//! [html.styles."p.note"]
//! color = "gray"
//! ```
//!
//! Style entries are merged over the built-in tables, so a file only needs
//! to name the styles it adds or overrides.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Office (docx) backend settings
    pub office: OfficeConfig,
    /// HTML backend settings
    pub html: HtmlConfig,
}

impl Config {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml_str)?;
        for (name, id) in default_office_styles() {
            config.office.styles.entry(name).or_insert(id);
        }
        for (selector, props) in default_html_styles() {
            config.html.styles.entry(selector).or_insert(props);
        }
        Ok(config)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }
}

/// Office backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Logical style name to style id
    pub styles: BTreeMap<String, String>,
    /// Left indent added per list level, in twips
    pub list_indent: u32,
    /// Hanging indent of list labels, in twips
    pub list_hanging: u32,
    /// Resolution used when rendering figure sources
    pub figure_dpi: u32,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            styles: default_office_styles(),
            list_indent: 360,
            list_hanging: 360,
            figure_dpi: 300,
        }
    }
}

/// HTML backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Selector to declarations, written as the document's style block
    pub styles: BTreeMap<String, BTreeMap<String, String>>,
    /// Directory, next to the output file, receiving images
    pub image_dir: String,
    /// Resolution used when rendering figure sources
    pub figure_dpi: u32,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            styles: default_html_styles(),
            image_dir: "images".to_string(),
            figure_dpi: 300,
        }
    }
}

fn default_office_styles() -> BTreeMap<String, String> {
    let mut styles = BTreeMap::new();
    styles.insert("Normal".to_string(), "Normal".to_string());
    for level in 1..=9 {
        styles.insert(format!("heading {level}"), format!("Heading{level}"));
    }
    styles.insert("caption".to_string(), "Caption".to_string());
    styles
}

fn default_html_styles() -> BTreeMap<String, BTreeMap<String, String>> {
    let declarations = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    };
    let mut styles = BTreeMap::new();
    styles.insert(
        "td".to_string(),
        declarations(&[("border", "1px solid"), ("padding", "2px")]),
    );
    styles.insert(
        "table".to_string(),
        declarations(&[("border-spacing", "0")]),
    );
    styles.insert(
        "div.figure".to_string(),
        declarations(&[("width", "85%")]),
    );
    styles.insert("div.table".to_string(), declarations(&[("width", "85%")]));
    styles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.office.list_indent, 360);
        assert_eq!(config.office.list_hanging, 360);
        assert_eq!(config.office.figure_dpi, 300);
        assert_eq!(
            config.office.styles.get("heading 3").map(String::as_str),
            Some("Heading3")
        );
        assert_eq!(config.html.image_dir, "images");
        assert_eq!(config.html.styles["td"]["padding"], "2px");
    }

    #[test]
    fn test_from_toml_merges_styles() {
        let config = Config::from_toml_str(
            r#"
[office]
figure_dpi = 150

[office.styles]
"quote" = "Quote"
"caption" = "MyCaption"

[html.styles."p.note"]
color = "gray"
"#,
        )
        .unwrap();
        assert_eq!(config.office.figure_dpi, 150);
        assert_eq!(config.office.list_indent, 360);
        assert_eq!(config.office.styles["quote"], "Quote");
        assert_eq!(config.office.styles["caption"], "MyCaption");
        assert_eq!(config.office.styles["heading 1"], "Heading1");
        assert_eq!(config.html.styles["p.note"]["color"], "gray");
        assert!(config.html.styles.contains_key("div.table"));
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        assert!(matches!(
            Config::from_toml_str("[office]\nlist_indent = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/docweave.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
