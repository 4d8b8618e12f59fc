//! SVG drawings as figure sources
//!
//! [`SvgFigure`] parses an SVG once and rasterizes it on demand through
//! resvg. Its natural size assumes the CSS convention of 96 pixels per inch.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use docweave_ast::{Content, FigureError, FigureSource};

/// CSS pixels per inch
const SVG_DPI: f32 = 96.0;

/// A figure backed by an SVG drawing
pub struct SvgFigure {
    tree: usvg::Tree,
}

impl SvgFigure {
    /// Parse SVG source text
    pub fn parse(svg: &str) -> Result<Self, FigureError> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_str(svg, &opts)
            .map_err(|e| FigureError::Render(format!("SVG parsing failed: {}", e)))?;
        Ok(Self { tree })
    }

    /// Read and parse an SVG file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FigureError> {
        let svg = std::fs::read_to_string(path)?;
        Self::parse(&svg)
    }
}

impl fmt::Debug for SvgFigure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.tree.size();
        f.debug_struct("SvgFigure")
            .field("width", &size.width())
            .field("height", &size.height())
            .finish()
    }
}

impl FigureSource for SvgFigure {
    fn size_inches(&self) -> (f64, f64) {
        let size = self.tree.size();
        (
            f64::from(size.width() / SVG_DPI),
            f64::from(size.height() / SVG_DPI),
        )
    }

    fn render_png(&self, dpi: u32) -> Result<Vec<u8>, FigureError> {
        let scale = dpi as f32 / SVG_DPI;
        let size = self.tree.size();
        let width = (size.width() * scale).ceil().max(1.0) as u32;
        let height = (size.height() * scale).ceil().max(1.0) as u32;

        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            FigureError::Render(format!("Failed to create pixmap ({}x{})", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let transform = tiny_skia::Transform::from_scale(scale, scale);
        resvg::render(&self.tree, transform, &mut pixmap.as_mut());

        log::debug!("Rendered SVG figure at {} dpi ({}x{})", dpi, width, height);
        pixmap
            .encode_png()
            .map_err(|e| FigureError::Render(format!("PNG encoding failed: {}", e)))
    }
}

impl From<SvgFigure> for Content {
    fn from(value: SvgFigure) -> Self {
        Content::Figure(Arc::new(value))
    }
}
