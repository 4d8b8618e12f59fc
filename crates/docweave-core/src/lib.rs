//! docweave-core - shared building blocks for the docweave backends
//!
//! - [`xml`]: owned markup tree with a quick-xml parser and serializer
//! - [`workspace`]: scoped temporary directory for staged media
//! - [`config`]: TOML configuration for both backends
//! - [`mode`]: open modes shared by the document types
//! - `figure` (feature `svg`): SVG drawings as figure sources

pub mod config;
pub mod error;
#[cfg(feature = "svg")]
pub mod figure;
pub mod mode;
pub mod workspace;
pub mod xml;

pub use config::{Config, HtmlConfig, OfficeConfig};
pub use error::{ConfigError, Result, XmlError};
#[cfg(feature = "svg")]
pub use figure::SvgFigure;
pub use mode::OpenMode;
pub use workspace::Workspace;
pub use xml::{Element, Node, XML_DECLARATION};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
