//! Error types for markup and configuration handling

use thiserror::Error;

/// Errors that can occur while parsing markup
#[derive(Error, Debug)]
pub enum XmlError {
    /// Error reported by the XML tokenizer
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The input has no root element
    #[error("Document has no root element")]
    Empty,

    /// An element was still open at end of input
    #[error("Unclosed element: {0}")]
    Unclosed(String),

    /// Structure the tree cannot represent
    #[error("Malformed markup: {0}")]
    Malformed(String),
}

/// Result type for markup operations
pub type Result<T> = std::result::Result<T, XmlError>;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the TOML
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
