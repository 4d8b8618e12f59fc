//! Values accepted by a document's `append` entry point
//!
//! [`Content`] is resolved at the call boundary: strings become paragraphs,
//! two-dimensional arrays become tables and figure sources become rendered
//! figures. Dynamic input (JSON) goes through [`Content::from_json`], which
//! rejects anything it cannot map.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::block::{Block, Caption, Figure, Header, List, Paragraph, Table};
use crate::figure::{FigureSource, RenderedFigure};

/// Errors raised while resolving content
#[derive(Error, Debug)]
pub enum ContentError {
    /// The value has no content-node interpretation
    #[error("Unsupported content: {0}")]
    Unsupported(String),

    /// The value looked like a node but did not deserialize
    #[error("Invalid content node: {0}")]
    Invalid(#[from] serde_json::Error),

    /// An alignment alias outside the known table
    #[error("Unknown alignment: {0}")]
    UnknownAlignment(String),
}

/// Anything that can be appended to a document
#[derive(Debug, Clone)]
pub enum Content {
    /// Plain text, appended as a one-run paragraph
    Text(String),
    /// Rows of cell text, appended as a table
    TableData(Vec<Vec<String>>),
    /// A content node
    Block(Block),
    /// A figure source, appended as a rendered figure
    Figure(Arc<dyn FigureSource>),
}

impl Content {
    /// Resolve a JSON value into content
    ///
    /// Strings are text, arrays of string arrays are table data and objects
    /// are tagged content nodes (`{"type": "paragraph", ...}`).
    pub fn from_json(value: &Value) -> Result<Self, ContentError> {
        match value {
            Value::String(text) => Ok(Content::Text(text.clone())),
            Value::Array(rows) => rows
                .iter()
                .map(|row| match row {
                    Value::Array(cells) => cells
                        .iter()
                        .map(|cell| match cell {
                            Value::String(s) => Ok(s.clone()),
                            Value::Number(n) => Ok(n.to_string()),
                            other => Err(ContentError::Unsupported(format!(
                                "table cell must be text, got {}",
                                json_kind(other)
                            ))),
                        })
                        .collect(),
                    other => Err(ContentError::Unsupported(format!(
                        "table row must be an array, got {}",
                        json_kind(other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Content::TableData),
            Value::Object(_) => Ok(Content::Block(serde_json::from_value(value.clone())?)),
            other => Err(ContentError::Unsupported(json_kind(other).to_string())),
        }
    }

    /// Resolve into the content node that gets rendered
    pub fn into_block(self) -> Block {
        match self {
            Content::Text(text) => Block::Paragraph(Paragraph::from(text)),
            Content::TableData(rows) => Block::Table(Table::new(rows)),
            Content::Block(block) => block,
            Content::Figure(source) => Block::RenderedFigure(RenderedFigure::new(source)),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Text(value.to_string())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

impl<S: Into<String>> From<Vec<Vec<S>>> for Content {
    fn from(rows: Vec<Vec<S>>) -> Self {
        Content::TableData(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

impl From<Arc<dyn FigureSource>> for Content {
    fn from(value: Arc<dyn FigureSource>) -> Self {
        Content::Figure(value)
    }
}

impl From<Block> for Content {
    fn from(value: Block) -> Self {
        Content::Block(value)
    }
}

macro_rules! block_content {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Content {
                fn from(value: $ty) -> Self {
                    Content::Block(Block::$ty(value))
                }
            }
        )*
    };
}

block_content!(Paragraph, Header, Caption, Table, Figure, RenderedFigure, List);

/// Marker value for a page break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageBreak;

impl From<PageBreak> for Content {
    fn from(_: PageBreak) -> Self {
        Content::Block(Block::PageBreak)
    }
}
