//! Renderable figure sources
//!
//! A [`FigureSource`] is anything that can produce PNG bytes on demand, such
//! as a chart or a vector drawing. Backends render it into the document's
//! media area when the owning [`RenderedFigure`] is appended.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::block::Caption;
use crate::inline::Inline;

/// Errors raised while rendering a figure source
#[derive(Error, Debug)]
pub enum FigureError {
    /// The source could not be rendered
    #[error("Figure rendering failed: {0}")]
    Render(String),

    /// IO error while rendering
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An object that renders itself to a PNG image
pub trait FigureSource: fmt::Debug + Send + Sync {
    /// Natural size of the figure in inches (width, height)
    fn size_inches(&self) -> (f64, f64);

    /// Render the figure to PNG bytes at the given resolution
    fn render_png(&self, dpi: u32) -> Result<Vec<u8>, FigureError>;
}

/// A figure whose image is produced by rendering a [`FigureSource`]
#[derive(Debug, Clone)]
pub struct RenderedFigure {
    pub source: Arc<dyn FigureSource>,
    pub caption: Option<Caption>,
}

impl RenderedFigure {
    pub fn new(source: Arc<dyn FigureSource>) -> Self {
        Self {
            source,
            caption: None,
        }
    }

    /// Attach a "Figure N: ..." caption
    pub fn with_caption(mut self, content: impl Into<Inline>) -> Self {
        self.caption = Some(Caption::new("Figure", content));
        self
    }

    /// Size taken from the source
    pub fn size(&self) -> (f64, f64) {
        self.source.size_inches()
    }
}

impl PartialEq for RenderedFigure {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source) && self.caption == other.caption
    }
}
