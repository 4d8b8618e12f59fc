//! Block-level content nodes
//!
//! This module defines the nodes that make up a document body: paragraphs,
//! headers, captions, tables, figures, lists and page breaks. Nodes are plain
//! values; each backend decides how to turn them into markup.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::content::ContentError;
use crate::figure::RenderedFigure;
use crate::inline::{Counter, Inline, Text};

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// A section header
    Header(Header),
    /// A standalone caption
    Caption(Caption),
    /// A table
    Table(Table),
    /// An image copied from a file
    Figure(Figure),
    /// An image rendered from a figure source
    #[serde(skip)]
    RenderedFigure(RenderedFigure),
    /// A bulleted or numbered list
    List(List),
    /// A page break
    PageBreak,
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
    Center,
    Both,
}

impl Align {
    /// Resolve an alignment alias
    ///
    /// `left`/`l`/`<`, `right`/`r`/`>`, `center`/`c`, `both`/`block`/`b`/`=`.
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias {
            "l" | "left" | "<" => Some(Align::Left),
            "r" | "right" | ">" => Some(Align::Right),
            "c" | "center" => Some(Align::Center),
            "b" | "block" | "both" | "=" => Some(Align::Both),
            _ => None,
        }
    }

    /// Canonical name, as used by the office format
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Right => "right",
            Align::Center => "center",
            Align::Both => "both",
        }
    }
}

impl FromStr for Align {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Align::from_alias(s).ok_or_else(|| ContentError::UnknownAlignment(s.to_string()))
    }
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content, in order
    #[serde(default)]
    pub content: Vec<Inline>,
    /// Logical style name, resolved through the document's style table
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub align: Option<Align>,
}

impl Paragraph {
    /// Create an empty paragraph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Set the alignment from an alias; unknown aliases leave it unset
    pub fn aligned(mut self, alias: &str) -> Self {
        self.align = Align::from_alias(alias);
        self
    }

    /// Append inline content
    pub fn push(&mut self, inline: impl Into<Inline>) {
        self.content.push(inline.into());
    }

    /// Builder form of [`Paragraph::push`]
    pub fn with(mut self, inline: impl Into<Inline>) -> Self {
        self.push(inline);
        self
    }

    /// Concatenated text of all text runs
    pub fn plain_text(&self) -> String {
        self.content.iter().map(Inline::plain_text).collect()
    }
}

impl From<&str> for Paragraph {
    fn from(value: &str) -> Self {
        Paragraph::new().with(value)
    }
}

impl From<String> for Paragraph {
    fn from(value: String) -> Self {
        Paragraph::new().with(value)
    }
}

impl From<Text> for Paragraph {
    fn from(value: Text) -> Self {
        Paragraph::new().with(value)
    }
}

/// A section header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Header level (1 is the highest)
    pub level: u8,
    #[serde(default)]
    pub content: Vec<Inline>,
    #[serde(default)]
    pub align: Option<Align>,
}

impl Header {
    pub fn new(level: u8, content: impl Into<Inline>) -> Self {
        Self {
            level,
            content: vec![content.into()],
            align: None,
        }
    }

    /// Logical style name of this header level
    pub fn style_name(&self) -> String {
        format!("heading {}", self.level)
    }

    /// The paragraph this header renders as
    pub fn to_paragraph(&self) -> Paragraph {
        Paragraph {
            content: self.content.clone(),
            style: Some(self.style_name()),
            align: self.align,
        }
    }
}

/// Table or figure caption: "<name> <counter>: <content>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Sequence name, e.g. "Table" or "Figure"
    pub name: String,
    #[serde(default)]
    pub content: Vec<Inline>,
    /// Logical style name
    #[serde(default = "Caption::default_style")]
    pub style: Option<String>,
}

impl Caption {
    pub fn new(name: impl Into<String>, content: impl Into<Inline>) -> Self {
        Self {
            name: name.into(),
            content: vec![content.into()],
            style: Self::default_style(),
        }
    }

    fn default_style() -> Option<String> {
        Some("caption".to_string())
    }

    /// The counter field numbering this caption
    pub fn counter(&self) -> Counter {
        Counter::new(self.name.clone())
    }
}

/// A simple table of paragraphs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Rows of cells
    pub cells: Vec<Vec<Paragraph>>,
    #[serde(default)]
    pub caption: Option<Caption>,
    /// Backend table style identifier
    #[serde(default)]
    pub style: Option<String>,
}

impl Table {
    /// Create a table from a two-dimensional array of cells
    ///
    /// Each cell is wrapped as a paragraph unless it already is one.
    pub fn new<R, C>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = C>,
        C: Into<Paragraph>,
    {
        Self {
            cells: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
            caption: None,
            style: None,
        }
    }

    /// Attach a "Table N: ..." caption
    pub fn with_caption(mut self, content: impl Into<Inline>) -> Self {
        self.caption = Some(Caption::new("Table", content));
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Number of grid columns, taken from the first row
    pub fn columns(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }
}

/// An external image embedded at a given size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Path of the image file to copy into the document
    pub path: PathBuf,
    /// Display size in inches (width, height)
    pub size: (f64, f64),
    #[serde(default)]
    pub caption: Option<Caption>,
}

impl Figure {
    pub fn new(path: impl Into<PathBuf>, size: (f64, f64)) -> Self {
        Self {
            path: path.into(),
            size,
            caption: None,
        }
    }

    /// Attach a "Figure N: ..." caption
    pub fn with_caption(mut self, content: impl Into<Inline>) -> Self {
        self.caption = Some(Caption::new("Figure", content));
        self
    }
}

/// Bullets used per nesting level when a list has no explicit format
pub const BULLETS: [&str; 9] = ["●", "○", "-", "•", "◦", "-", "▪", "▫", "-"];

/// One entry of a grouped list row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListEntry {
    Paragraph(Paragraph),
    List(List),
}

/// One row of a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListRow {
    /// A single numbered item
    Item(Paragraph),
    /// A nested list one level deeper
    Nested(List),
    /// A numbered first entry followed by continuation entries
    Group { entries: Vec<ListEntry> },
}

/// Input accepted by [`List::push`]
#[derive(Debug, Clone)]
pub enum ListInput {
    Text(String),
    Paragraph(Paragraph),
    List(List),
    Group(Vec<ListInput>),
}

impl From<&str> for ListInput {
    fn from(value: &str) -> Self {
        ListInput::Text(value.to_string())
    }
}

impl From<String> for ListInput {
    fn from(value: String) -> Self {
        ListInput::Text(value)
    }
}

impl From<Paragraph> for ListInput {
    fn from(value: Paragraph) -> Self {
        ListInput::Paragraph(value)
    }
}

impl From<List> for ListInput {
    fn from(value: List) -> Self {
        ListInput::List(value)
    }
}

impl<T: Into<ListInput>> From<Vec<T>> for ListInput {
    fn from(value: Vec<T>) -> Self {
        ListInput::Group(value.into_iter().map(Into::into).collect())
    }
}

/// A bulleted or numbered list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub rows: Vec<ListRow>,
    /// Paragraph style applied to rows added as plain text
    #[serde(default)]
    pub style: Option<String>,
    /// Alignment applied to rows added as plain text
    #[serde(default)]
    pub align: Option<Align>,
    /// Label format, e.g. "1.", "(a)", "i)" or a literal bullet
    #[serde(default)]
    pub format: Option<String>,
    /// Extra left indent per level in twips (backend default when unset)
    #[serde(default)]
    pub indent: Option<u32>,
    /// Hanging indent of the label in twips (backend default when unset)
    #[serde(default)]
    pub hanging: Option<u32>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from rows
    pub fn from_rows<T: Into<ListInput>>(rows: impl IntoIterator<Item = T>) -> Self {
        let mut list = List::new();
        for row in rows {
            list.push(row);
        }
        list
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Append a row
    ///
    /// Plain text becomes a paragraph carrying the list's style and
    /// alignment. A vector becomes a group row whose first entry is numbered.
    pub fn push(&mut self, row: impl Into<ListInput>) {
        let row = match row.into() {
            ListInput::Text(text) => ListRow::Item(self.wrap(text)),
            ListInput::Paragraph(p) => ListRow::Item(p),
            ListInput::List(list) => ListRow::Nested(list),
            ListInput::Group(items) => {
                let mut entries = Vec::with_capacity(items.len());
                self.collect_entries(items, &mut entries);
                ListRow::Group { entries }
            }
        };
        self.rows.push(row);
    }

    fn collect_entries(&self, items: Vec<ListInput>, entries: &mut Vec<ListEntry>) {
        for item in items {
            match item {
                ListInput::Text(text) => entries.push(ListEntry::Paragraph(self.wrap(text))),
                ListInput::Paragraph(p) => entries.push(ListEntry::Paragraph(p)),
                ListInput::List(list) => entries.push(ListEntry::List(list)),
                ListInput::Group(nested) => self.collect_entries(nested, entries),
            }
        }
    }

    fn wrap(&self, text: String) -> Paragraph {
        Paragraph {
            content: vec![Inline::from(text)],
            style: self.style.clone(),
            align: self.align,
        }
    }

    /// Whether the format string asks for numbering rather than bullets
    pub fn is_ordered(&self) -> bool {
        self.format
            .as_deref()
            .and_then(|f| f.chars().next())
            .is_some_and(|c| matches!(c, '1' | 'a' | 'A' | 'i' | 'I'))
    }

    /// Label format for the given nesting level
    pub fn format_for_level(&self, level: u32) -> String {
        match &self.format {
            Some(format) => format.clone(),
            None => BULLETS[level as usize % BULLETS.len()].to_string(),
        }
    }
}
