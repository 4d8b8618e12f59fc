//! # docweave-html
//!
//! HTML backend for docweave: renders content nodes into a single HTML page
//! with an inline style sheet and a sibling image directory.
//!
//! ## Example
//!
//! ```no_run
//! use docweave_ast::{Header, List};
//! use docweave_html::{Document, OpenMode};
//!
//! let mut doc = Document::open("report.html", OpenMode::Append)?;
//! doc.append(Header::new(1, "Weekly status"))?;
//! doc.append(vec![vec!["Service", "State"], vec!["api", "up"]])?;
//! doc.append(List::from_rows(["first", "second"]).with_format("1."))?;
//! doc.set_property("Revision", "7");
//! doc.close()?;
//! # Ok::<(), docweave_html::HtmlError>(())
//! ```

pub mod document;
pub mod error;
mod render;

pub use document::{style_sheet, Document, OpenMode};
pub use error::{HtmlError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
