//! Error types for OOXML operations

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during OOXML operations
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Error building the markup tree
    #[error("Markup error: {0}")]
    Markup(#[from] docweave_core::XmlError),

    /// The document file does not exist
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// List label format that maps to no numbering format
    #[error("Unrecognized list format: {0:?}")]
    UnrecognizedFormat(String),

    /// A figure source failed to render
    #[error("Figure error: {0}")]
    Figure(#[from] docweave_ast::FigureError),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
