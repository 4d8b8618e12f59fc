//! # docweave-ooxml
//!
//! OOXML (Office Open XML) backend for docweave.
//!
//! This crate provides functionality to:
//! - Create `.docx` documents or load existing ones
//! - Append content nodes (paragraphs, tables, figures, lists, ...)
//! - Read and update custom document properties, rewriting the fields that
//!   display them
//!
//! ## Example
//!
//! ```no_run
//! use docweave_ast::{List, Table};
//! use docweave_ooxml::{Document, OpenMode};
//!
//! let mut doc = Document::open("report.docx", OpenMode::Append)?;
//! doc.append("Weekly status")?;
//! doc.append(Table::new([["Service", "State"], ["api", "up"]]).with_caption("Services"))?;
//! doc.append(List::from_rows(["first", "second"]).with_format("1."))?;
//! doc.set_property("Revision", "7");
//! doc.close()?;
//! # Ok::<(), docweave_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod content_types;
pub mod document;
pub mod error;
pub mod fields;
pub mod numbering;
pub mod properties;
pub mod relationships;
mod render;
pub mod styles;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::OoxmlArchive;
pub use content_types::ContentTypes;
pub use document::{Document, OpenMode};
pub use error::{OoxmlError, Result};
pub use numbering::{LevelFormat, Numbering};
pub use properties::CustomProperties;
pub use relationships::Relationships;
pub use styles::{Style, StyleSheet};

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Word 2003 auxiliary hints (table border widths)
pub const WX_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/auxHint";
/// DrawingML placement inside documents
pub const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// DrawingML main namespace
pub const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// DrawingML pictures
pub const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// Relationship references (`r:embed`)
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Variant types used by property parts
pub const VT_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
