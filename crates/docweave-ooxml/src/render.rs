//! Content nodes to WordprocessingML
//!
//! Each block is rendered into a detached container element; the document
//! moves the finished children into its body. Rendering draws on the
//! document's side state (style table, numbering, media registry, sequence
//! counters) through [`Renderer`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use docweave_ast::{
    Block, Caption, Counter, Figure, Inline, List, ListEntry, ListRow, Paragraph,
    RenderedFigure, Table, Text, Toggle, Underline,
};
use docweave_core::{Element, OfficeConfig, Workspace};

use crate::content_types::{image_content_type, ContentTypes, CT_NUMBERING};
use crate::error::Result;
use crate::fields::{count_sequence, sequence_instruction};
use crate::numbering::Numbering;
use crate::relationships::Relationships;
use crate::PIC_NS;

/// EMU per inch
const EMU_PER_INCH: f64 = 914_400.0;

/// Document state that rendering reads and updates
#[derive(Debug)]
pub(crate) struct RenderState {
    /// Logical style name to style id
    pub styles: HashMap<String, String>,
    pub rels: Relationships,
    pub content_types: ContentTypes,
    pub numbering: Option<Numbering>,
    pub workspace: Workspace,
    /// Next value per sequence name, filled lazily from the document
    pub sequences: HashMap<String, usize>,
    pub next_drawing_id: u32,
}

/// Side state captured before rendering, restored when a render fails
#[derive(Debug)]
pub(crate) struct Checkpoint {
    rels: Relationships,
    content_types: ContentTypes,
    numbering: Option<Numbering>,
    sequences: HashMap<String, usize>,
    next_drawing_id: u32,
    media: Vec<PathBuf>,
}

impl RenderState {
    pub fn checkpoint(&self) -> Result<Checkpoint> {
        Ok(Checkpoint {
            rels: self.rels.clone(),
            content_types: self.content_types.clone(),
            numbering: self.numbering.clone(),
            sequences: self.sequences.clone(),
            next_drawing_id: self.next_drawing_id,
            media: self.workspace.media_files()?,
        })
    }

    /// Undo everything rendered since `checkpoint`, including staged media
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.rels = checkpoint.rels;
        self.content_types = checkpoint.content_types;
        self.numbering = checkpoint.numbering;
        self.sequences = checkpoint.sequences;
        self.next_drawing_id = checkpoint.next_drawing_id;

        let staged = match self.workspace.media_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot list staged media for rollback: {}", e);
                return;
            }
        };
        for file in staged.iter().filter(|f| !checkpoint.media.contains(*f)) {
            debug!("Discarding staged {}", file.display());
            if let Err(e) = fs::remove_file(file) {
                warn!("Cannot remove staged {}: {}", file.display(), e);
            }
        }
    }
}

/// Renders content nodes against one document
pub(crate) struct Renderer<'a> {
    document: &'a Element,
    state: &'a mut RenderState,
    config: &'a OfficeConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(document: &'a Element, state: &'a mut RenderState, config: &'a OfficeConfig) -> Self {
        Self {
            document,
            state,
            config,
        }
    }

    /// Render a block into `target`
    pub fn block(&mut self, block: &Block, target: &mut Element) -> Result<()> {
        match block {
            Block::Paragraph(p) => self.paragraph(p, target, None, None),
            Block::Header(h) => self.paragraph(&h.to_paragraph(), target, None, None),
            Block::Caption(c) => self.caption(c, target),
            Block::Table(t) => self.table(t, target),
            Block::Figure(f) => self.figure(f, target),
            Block::RenderedFigure(f) => self.rendered_figure(f, target),
            Block::List(l) => self.list(l, target, None, 0),
            Block::PageBreak => {
                target.push(page_break());
                Ok(())
            }
        }
    }

    fn style_id(&self, name: &str) -> String {
        match self.state.styles.get(name) {
            Some(id) => id.clone(),
            None => {
                warn!("Unknown style {:?}, using it as style id", name);
                name.to_string()
            }
        }
    }

    fn paragraph(
        &mut self,
        para: &Paragraph,
        target: &mut Element,
        numbering: Option<(u32, u32)>,
        indent: Option<u32>,
    ) -> Result<()> {
        let mut p = Element::new("w:p");
        let mut ppr = Element::new("w:pPr");
        if let Some(style) = &para.style {
            ppr.push(Element::new("w:pStyle").with_attr("w:val", self.style_id(style)));
        }
        if let Some((level, num_id)) = numbering {
            ppr.push(
                Element::new("w:numPr")
                    .with_child(Element::new("w:ilvl").with_attr("w:val", level.to_string()))
                    .with_child(Element::new("w:numId").with_attr("w:val", num_id.to_string())),
            );
        }
        if let Some(indent) = indent.filter(|&i| i > 0) {
            ppr.push(Element::new("w:ind").with_attr("w:left", indent.to_string()));
        }
        if let Some(align) = para.align {
            ppr.push(Element::new("w:jc").with_attr("w:val", align.as_str()));
        }
        if !ppr.children.is_empty() {
            p.push(ppr);
        }
        for inline in &para.content {
            self.inline(inline, &mut p);
        }
        target.push(p);
        Ok(())
    }

    fn inline(&mut self, inline: &Inline, target: &mut Element) {
        match inline {
            Inline::Text(text) => target.push(text_run(text)),
            Inline::Counter(counter) => self.counter(counter, target),
        }
    }

    /// Next value of a sequence, counting existing fields on first use
    fn next_sequence(&mut self, name: &str) -> usize {
        let document = self.document;
        let next = self
            .state
            .sequences
            .entry(name.to_string())
            .or_insert_with(|| count_sequence(document, name) + 1);
        let value = *next;
        *next += 1;
        value
    }

    fn counter(&mut self, counter: &Counter, target: &mut Element) {
        let value = self.next_sequence(&counter.name);
        debug!("Counter {} = {}", counter.name, value);
        target.push(
            Element::new("w:fldSimple")
                .with_attr("w:instr", sequence_instruction(&counter.name))
                .with_child(text_run(&counter.display(value))),
        );
    }

    fn caption(&mut self, caption: &Caption, target: &mut Element) -> Result<()> {
        let mut p = Element::new("w:p");
        if let Some(style) = &caption.style {
            p.push(
                Element::new("w:pPr")
                    .with_child(Element::new("w:pStyle").with_attr("w:val", self.style_id(style))),
            );
        }
        p.push(text_run(&Text::new(format!("{} ", caption.name))));
        self.counter(&caption.counter(), &mut p);
        p.push(text_run(&Text::new(": ")));
        for inline in &caption.content {
            self.inline(inline, &mut p);
        }
        target.push(p);
        Ok(())
    }

    fn table(&mut self, table: &Table, target: &mut Element) -> Result<()> {
        if let Some(caption) = &table.caption {
            self.caption(caption, target)?;
        }

        let mut tbl_pr = Element::new("w:tblPr");
        if let Some(style) = &table.style {
            let id = self
                .state
                .styles
                .get(style)
                .cloned()
                .unwrap_or_else(|| style.clone());
            tbl_pr.push(Element::new("w:tblStyle").with_attr("w:val", id));
        }
        tbl_pr.push(
            Element::new("w:tblW")
                .with_attr("w:w", "5000")
                .with_attr("w:type", "pct"),
        );
        if table.style.is_none() {
            tbl_pr.push(
                Element::new("w:tblBorders").with_child(
                    Element::new("w:bottom")
                        .with_attr("w:val", "single")
                        .with_attr("w:sz", "4")
                        .with_attr("wx:bdrwidth", "10")
                        .with_attr("w:space", "0")
                        .with_attr("w:color", "auto"),
                ),
            );
        }
        tbl_pr.push(Element::new("w:tblLook").with_attr("w:val", "01E0"));

        let mut grid = Element::new("w:tblGrid");
        for _ in 0..table.columns() {
            grid.push(Element::new("w:gridCol"));
        }

        let mut tbl = Element::new("w:tbl").with_child(tbl_pr).with_child(grid);
        for row in &table.cells {
            let mut tr = Element::new("w:tr");
            for cell in row {
                let mut tc = Element::new("w:tc");
                self.paragraph(cell, &mut tc, None, None)?;
                tr.push(tc);
            }
            tbl.push(tr);
        }
        target.push(tbl);
        Ok(())
    }

    fn figure(&mut self, figure: &Figure, target: &mut Element) -> Result<()> {
        let name = self.state.workspace.stage_file(&figure.path)?;
        self.drawing(&name, figure.size, target);
        if let Some(caption) = &figure.caption {
            self.caption(caption, target)?;
        }
        Ok(())
    }

    fn rendered_figure(&mut self, figure: &RenderedFigure, target: &mut Element) -> Result<()> {
        let png = figure.source.render_png(self.config.figure_dpi)?;
        let name = self.state.workspace.stage_png(&png)?;
        self.drawing(&name, figure.size(), target);
        if let Some(caption) = &figure.caption {
            self.caption(caption, target)?;
        }
        Ok(())
    }

    /// Register a staged media file and emit the inline drawing showing it
    fn drawing(&mut self, name: &str, size: (f64, f64), target: &mut Element) {
        let rel_id = self
            .state
            .rels
            .add(format!("media/{name}"), Relationships::TYPE_IMAGE);
        if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
            self.state
                .content_types
                .ensure_default(ext, &image_content_type(ext));
        }
        let drawing_id = self.state.next_drawing_id;
        self.state.next_drawing_id += 1;
        debug!("Embedding {} as {} (drawing {})", name, rel_id, drawing_id);

        let cx = format!("{:.0}", size.0 * EMU_PER_INCH);
        let cy = format!("{:.0}", size.1 * EMU_PER_INCH);

        let pic = Element::new("pic:pic")
            .with_attr("xmlns:pic", PIC_NS)
            .with_child(
                Element::new("pic:nvPicPr")
                    .with_child(
                        Element::new("pic:cNvPr")
                            .with_attr("id", "0")
                            .with_attr("name", name),
                    )
                    .with_child(Element::new("pic:cNvPicPr")),
            )
            .with_child(
                Element::new("pic:blipFill")
                    .with_child(
                        Element::new("a:blip")
                            .with_attr("r:embed", rel_id)
                            .with_attr("cstate", "print"),
                    )
                    .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect"))),
            )
            .with_child(
                Element::new("pic:spPr")
                    .with_child(
                        Element::new("a:xfrm")
                            .with_child(Element::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                            .with_child(
                                Element::new("a:ext")
                                    .with_attr("cx", cx.as_str())
                                    .with_attr("cy", cy.as_str()),
                            ),
                    )
                    .with_child(
                        Element::new("a:prstGeom")
                            .with_attr("prst", "rect")
                            .with_child(Element::new("a:avLst")),
                    ),
            );

        let inline = Element::new("wp:inline")
            .with_child(
                Element::new("wp:extent")
                    .with_attr("cx", cx.as_str())
                    .with_attr("cy", cy.as_str()),
            )
            .with_child(
                Element::new("wp:docPr")
                    .with_attr("id", drawing_id.to_string())
                    .with_attr("name", name)
                    .with_attr("descr", format!("Picture {drawing_id}")),
            )
            .with_child(
                Element::new("wp:cNvGraphicFramePr").with_child(
                    Element::new("a:graphicFrameLocks").with_attr("noChangeAspect", "1"),
                ),
            )
            .with_child(
                Element::new("a:graphic").with_child(
                    Element::new("a:graphicData")
                        .with_attr("uri", PIC_NS)
                        .with_child(pic),
                ),
            );

        target.push(
            Element::new("w:p").with_child(
                Element::new("w:r").with_child(Element::new("w:drawing").with_child(inline)),
            ),
        );
    }

    /// Render a list, allocating one numbering level per nesting depth
    fn list(
        &mut self,
        list: &List,
        target: &mut Element,
        parent: Option<(u32, u32)>,
        indent: u32,
    ) -> Result<()> {
        let indent = indent + list.indent.unwrap_or(self.config.list_indent);
        let hanging = list.hanging.unwrap_or(self.config.list_hanging);
        let level = parent.map(|(level, _)| level + 1).unwrap_or(0);
        let format = list.format_for_level(level);
        let numbering = self.numbering_part();
        let num = numbering.add(parent, indent, hanging, &format)?;

        for row in &list.rows {
            match row {
                ListRow::Item(p) => self.paragraph(p, target, Some(num), Some(indent))?,
                ListRow::Nested(nested) => self.list(nested, target, Some(num), indent)?,
                ListRow::Group { entries } => {
                    for (i, entry) in entries.iter().enumerate() {
                        match entry {
                            ListEntry::Paragraph(p) if i == 0 => {
                                self.paragraph(p, target, Some(num), Some(indent))?
                            }
                            ListEntry::Paragraph(p) => {
                                self.paragraph(p, target, None, Some(indent))?
                            }
                            ListEntry::List(nested) => {
                                self.list(nested, target, Some(num), indent)?
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// The numbering part, created and registered on first use
    fn numbering_part(&mut self) -> &mut Numbering {
        let state = &mut *self.state;
        if state.numbering.is_none() {
            debug!("Creating numbering part");
            state
                .rels
                .ensure("numbering.xml", Relationships::TYPE_NUMBERING);
            state
                .content_types
                .ensure_override("/word/numbering.xml", CT_NUMBERING);
        }
        state.numbering.get_or_insert_with(Numbering::new)
    }
}

/// Build the run for a text node
///
/// Leading and trailing spaces become separate space-preserved `w:t`
/// elements around the trimmed text.
pub(crate) fn text_run(text: &Text) -> Element {
    let mut run = Element::new("w:r");
    let mut rpr = Element::new("w:rPr");
    if let Some(b) = toggle_element("w:b", text.bold) {
        rpr.push(b);
    }
    if let Some(i) = toggle_element("w:i", text.italic) {
        rpr.push(i);
    }
    if let Some(val) = underline_value(text.underline) {
        rpr.push(Element::new("w:u").with_attr("w:val", val));
    }
    if !rpr.children.is_empty() {
        run.push(rpr);
    }

    let space = || {
        Element::new("w:t")
            .with_attr("xml:space", "preserve")
            .with_text(" ")
    };
    if text.leading_space() {
        run.push(space());
    }
    run.push(Element::new("w:t").with_text(text.content.trim()));
    if text.trailing_space() {
        run.push(space());
    }
    run
}

fn toggle_element(name: &str, toggle: Toggle) -> Option<Element> {
    match toggle {
        Toggle::Inherit => None,
        Toggle::On => Some(Element::new(name)),
        Toggle::Off => Some(Element::new(name).with_attr("w:val", "off")),
    }
}

fn underline_value(underline: Underline) -> Option<&'static str> {
    match underline {
        Underline::Inherit => None,
        Underline::None => Some("none"),
        Underline::Single => Some("single"),
        Underline::Double => Some("double"),
        Underline::Thick => Some("thick"),
        Underline::Words => Some("words"),
        Underline::Dash => Some("dash"),
        Underline::Dotted => Some("dotted"),
        Underline::DotDash => Some("dotDash"),
    }
}

fn page_break() -> Element {
    Element::new("w:p").with_child(
        Element::new("w:r").with_child(Element::new("w:br").with_attr("w:type", "page")),
    )
}
