//! Content nodes to HTML elements

use std::collections::HashMap;

use log::debug;

use docweave_ast::{
    Align, Block, Caption, Counter, Figure, Inline, List, ListEntry, ListRow, Paragraph,
    RenderedFigure, Table, Text, Toggle, Underline,
};
use docweave_core::{Element, HtmlConfig, Workspace};

use crate::error::Result;

/// Document state that rendering reads and updates
#[derive(Debug)]
pub(crate) struct RenderState {
    pub workspace: Workspace,
    /// Next value per sequence name, filled lazily from the body
    pub sequences: HashMap<String, usize>,
}

/// Renders content nodes against one document body
pub(crate) struct Renderer<'a> {
    body: &'a Element,
    state: &'a mut RenderState,
    config: &'a HtmlConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(body: &'a Element, state: &'a mut RenderState, config: &'a HtmlConfig) -> Self {
        Self {
            body,
            state,
            config,
        }
    }

    /// Render a block into `target`
    pub fn block(&mut self, block: &Block, target: &mut Element) -> Result<()> {
        match block {
            Block::Paragraph(p) => self.paragraph(p, target),
            Block::Header(h) => self.paragraph(&h.to_paragraph(), target),
            Block::Caption(c) => self.caption(c, target),
            Block::Table(t) => self.table(t, target),
            Block::Figure(f) => self.figure(f, target)?,
            Block::RenderedFigure(f) => self.rendered_figure(f, target)?,
            Block::List(l) => self.list(l, target),
            Block::PageBreak => target.push(page_break()),
        }
        Ok(())
    }

    fn paragraph(&mut self, para: &Paragraph, target: &mut Element) {
        let style = para.style.as_deref();
        let mut p = match style.and_then(heading_level) {
            Some(level) => Element::new(format!("h{level}")),
            None => {
                let mut p = Element::new("p");
                if let Some(class) = style {
                    p.set_attr("class", class);
                }
                p
            }
        };
        if let Some(align) = para.align {
            p.set_attr("style", format!("text-align: {}", css_align(align)));
        }
        for inline in &para.content {
            self.inline(inline, &mut p);
        }
        target.push(p);
    }

    fn inline(&mut self, inline: &Inline, target: &mut Element) {
        match inline {
            Inline::Text(text) => target.push(text_span(text)),
            Inline::Counter(counter) => self.counter(counter, target),
        }
    }

    fn next_sequence(&mut self, name: &str) -> usize {
        let body = self.body;
        let next = self
            .state
            .sequences
            .entry(name.to_string())
            .or_insert_with(|| count_counters(body, name) + 1);
        let value = *next;
        *next += 1;
        value
    }

    fn counter(&mut self, counter: &Counter, target: &mut Element) {
        let value = self.next_sequence(&counter.name);
        debug!("Counter {} = {}", counter.name, value);
        target.push(
            Element::new("span")
                .with_attr("class", "counter")
                .with_attr("data-seq", counter.name.as_str())
                .with_text(counter.display(value).content.trim()),
        );
    }

    /// Caption text keeps its separators as plain text so they survive
    /// the trimming applied to spans
    fn caption(&mut self, caption: &Caption, target: &mut Element) {
        let mut p = Element::new("p");
        if let Some(style) = &caption.style {
            p.set_attr("class", style.as_str());
        }
        p.push_text(format!("{} ", caption.name));
        self.counter(&caption.counter(), &mut p);
        p.push_text(": ");
        for inline in &caption.content {
            self.inline(inline, &mut p);
        }
        target.push(p);
    }

    fn table(&mut self, table: &Table, target: &mut Element) {
        let mut div = Element::new("div").with_attr("class", "table");
        if let Some(caption) = &table.caption {
            self.caption(caption, &mut div);
        }
        let mut tbl = Element::new("table");
        if let Some(style) = &table.style {
            tbl.set_attr("class", style.as_str());
        }
        for row in &table.cells {
            let mut tr = Element::new("tr");
            for cell in row {
                let mut td = Element::new("td");
                self.paragraph(cell, &mut td);
                tr.push(td);
            }
            tbl.push(tr);
        }
        div.push(tbl);
        target.push(div);
    }

    fn figure(&mut self, figure: &Figure, target: &mut Element) -> Result<()> {
        let name = self.state.workspace.stage_file(&figure.path)?;
        self.image(&name, figure.caption.as_ref(), target);
        Ok(())
    }

    fn rendered_figure(&mut self, figure: &RenderedFigure, target: &mut Element) -> Result<()> {
        let png = figure.source.render_png(self.config.figure_dpi)?;
        let name = self.state.workspace.stage_png(&png)?;
        self.image(&name, figure.caption.as_ref(), target);
        Ok(())
    }

    fn image(&mut self, name: &str, caption: Option<&Caption>, target: &mut Element) {
        let src = format!("{}/{}", self.config.image_dir, name);
        debug!("Embedding {}", src);
        let mut div = Element::new("div")
            .with_attr("class", "figure")
            .with_child(
                Element::new("img")
                    .with_attr("src", src)
                    .with_attr("width", "100%"),
            );
        if let Some(caption) = caption {
            self.caption(caption, &mut div);
        }
        target.push(div);
    }

    fn list(&mut self, list: &List, target: &mut Element) {
        let mut el = if list.is_ordered() {
            let mut ol = Element::new("ol");
            if let Some(kind) = list
                .format
                .as_deref()
                .and_then(|f| f.chars().next())
                .filter(|c| *c != '1')
            {
                ol.set_attr("type", kind.to_string());
            }
            ol
        } else {
            Element::new("ul")
        };

        for row in &list.rows {
            let mut li = Element::new("li");
            match row {
                ListRow::Item(p) => self.paragraph(p, &mut li),
                ListRow::Nested(nested) => self.list(nested, &mut li),
                ListRow::Group { entries } => {
                    for entry in entries {
                        match entry {
                            ListEntry::Paragraph(p) => self.paragraph(p, &mut li),
                            ListEntry::List(nested) => self.list(nested, &mut li),
                        }
                    }
                }
            }
            el.push(li);
        }
        target.push(el);
    }
}

/// `heading N` maps to `hN`; levels past 6 use `h6`
fn heading_level(style: &str) -> Option<u8> {
    let level: u8 = style.strip_prefix("heading ")?.trim().parse().ok()?;
    (level > 0).then(|| level.min(6))
}

fn css_align(align: Align) -> &'static str {
    match align {
        Align::Both => "justify",
        other => other.as_str(),
    }
}

/// Number of counter spans for `name` already in a tree
pub(crate) fn count_counters(root: &Element, name: &str) -> usize {
    root.descendants("span")
        .into_iter()
        .filter(|span| span.attr("class") == Some("counter") && span.attr("data-seq") == Some(name))
        .count()
}

/// Build the span for a text node
pub(crate) fn text_span(text: &Text) -> Element {
    let mut declarations = Vec::new();
    match text.bold {
        Toggle::Inherit => {}
        Toggle::On => declarations.push("font-weight: bold"),
        Toggle::Off => declarations.push("font-weight: normal"),
    }
    match text.italic {
        Toggle::Inherit => {}
        Toggle::On => declarations.push("font-style: italic"),
        Toggle::Off => declarations.push("font-style: normal"),
    }
    if let Some(decoration) = text_decoration(text.underline) {
        declarations.push(decoration);
    }

    let mut span = Element::new("span");
    if !declarations.is_empty() {
        span.set_attr("style", declarations.join("; "));
    }
    span.push_text(text.content.trim());
    span
}

fn text_decoration(underline: Underline) -> Option<&'static str> {
    match underline {
        Underline::Inherit => None,
        Underline::None => Some("text-decoration: none"),
        Underline::Single | Underline::Thick | Underline::Words => {
            Some("text-decoration: underline")
        }
        Underline::Double => Some("text-decoration: underline double"),
        Underline::Dotted => Some("text-decoration: underline dotted"),
        Underline::Dash | Underline::DotDash => Some("text-decoration: underline dashed"),
    }
}

fn page_break() -> Element {
    Element::new("div")
        .with_attr("class", "pagebreak")
        .with_attr("style", "break-after: page")
}
