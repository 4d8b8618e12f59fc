//! docweave-ast - content node definitions
//!
//! This crate provides the backend-independent content nodes that callers
//! assemble into documents: text runs, paragraphs, headers, captions, tables,
//! figures, lists and page breaks. The office and HTML backends turn these
//! values into markup.
//!
//! ```
//! use docweave_ast::{Content, List, Paragraph, Table, Text};
//!
//! let mut para = Paragraph::from("Status: ");
//! para.push(Text::new("green").bold());
//!
//! let table = Table::new([["A", "B"], ["C", "D"]]).with_caption("demo");
//! let list = List::from_rows(["first", "second"]).with_format("1.");
//!
//! let items: Vec<Content> = vec![para.into(), table.into(), list.into()];
//! assert_eq!(items.len(), 3);
//! ```

pub mod block;
pub mod content;
pub mod figure;
pub mod inline;

pub use block::{
    Align, Block, Caption, Figure, Header, List, ListEntry, ListInput, ListRow, Paragraph, Table,
    BULLETS,
};
pub use content::{Content, ContentError, PageBreak};
pub use figure::{FigureError, FigureSource, RenderedFigure};
pub use inline::{Counter, Inline, Text, Toggle, Underline};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
