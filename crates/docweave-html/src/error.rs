//! Error types for the HTML backend

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or loading an HTML document
#[derive(Error, Debug)]
pub enum HtmlError {
    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not well-formed markup
    #[error("Markup error: {0}")]
    Markup(#[from] docweave_core::XmlError),

    /// The document file does not exist
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Markup without the expected `html` / `body` structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// A figure source failed to render
    #[error("Figure error: {0}")]
    Figure(#[from] docweave_ast::FigureError),
}

/// Result type for HTML operations
pub type Result<T> = std::result::Result<T, HtmlError>;
