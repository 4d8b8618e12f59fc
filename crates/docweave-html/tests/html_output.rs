//! HTML output and reload tests

use std::sync::Arc;

use docweave_ast::{
    Figure, FigureError, FigureSource, List, Paragraph, RenderedFigure, Text,
};
use docweave_core::HtmlConfig;
use docweave_html::{Document, HtmlError, OpenMode};

#[derive(Debug)]
struct Swatch;

impl FigureSource for Swatch {
    fn size_inches(&self) -> (f64, f64) {
        (1.0, 1.0)
    }

    fn render_png(&self, dpi: u32) -> Result<Vec<u8>, FigureError> {
        Ok(format!("png@{dpi}").into_bytes())
    }
}

#[derive(Debug)]
struct Broken;

impl FigureSource for Broken {
    fn size_inches(&self) -> (f64, f64) {
        (1.0, 1.0)
    }

    fn render_png(&self, _dpi: u32) -> Result<Vec<u8>, FigureError> {
        Err(FigureError::Render("no backend".to_string()))
    }
}

#[test]
fn test_roundtrip_keeps_paragraphs_and_properties() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.html");

    let mut doc = Document::open(&path, OpenMode::Append).unwrap();
    for i in 1..=4 {
        doc.append(format!("Line {i}")).unwrap();
    }
    doc.set_property("Owner", "Ops");
    doc.close().unwrap();

    let mut doc = Document::open(&path, OpenMode::Update).unwrap();
    assert_eq!(
        doc.paragraph_texts(),
        vec!["Line 1", "Line 2", "Line 3", "Line 4"]
    );
    assert_eq!(doc.get_property("Owner").as_deref(), Some("Ops"));
    doc.set_property("Owner", "QA");
    doc.close().unwrap();

    let html = std::fs::read_to_string(&path).unwrap();
    assert_eq!(html.matches(r#"name="Owner""#).count(), 1);
    assert!(html.contains(r#"<meta name="Owner" content="QA"/>"#));
}

#[test]
fn test_missing_file_outside_append_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.html");
    assert!(matches!(
        Document::open(&path, OpenMode::CopyOnWrite),
        Err(HtmlError::NotFound(_))
    ));
}

#[test]
fn test_text_is_trimmed_and_styled() {
    let mut doc = Document::new().unwrap();
    doc.append(Paragraph::new().with(Text::new(" hello ").bold()).aligned("="))
        .unwrap();

    let html = doc.to_html();
    assert!(html.contains(
        r#"<p style="text-align: justify"><span style="font-weight: bold">hello</span></p>"#
    ));
}

#[test]
fn test_styled_paragraph_uses_class() {
    let mut doc = Document::new().unwrap();
    doc.append(Paragraph::from("note").with_style("note")).unwrap();
    assert!(doc.to_html().contains(r#"<p class="note"><span>note</span></p>"#));
}

#[test]
fn test_list_element_follows_format() {
    let mut doc = Document::new().unwrap();
    let mut ordered = List::from_rows(["one", "two"]).with_format("a)");
    ordered.push(List::from_rows(["inner"]));
    doc.append(ordered).unwrap();
    doc.append(List::from_rows(["dot"])).unwrap();
    doc.append(List::from_rows(["num"]).with_format("1.")).unwrap();

    let html = doc.to_html();
    assert!(html.contains(
        r#"<ol type="a"><li><p><span>one</span></p></li><li><p><span>two</span></p></li><li><ul><li><p><span>inner</span></p></li></ul></li></ol>"#
    ));
    assert!(html.contains(r#"<ul><li><p><span>dot</span></p></li></ul>"#));
    assert!(html.contains(r#"<ol><li><p><span>num</span></p></li></ol>"#));
}

#[test]
fn test_figures_copy_images_next_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("chart.png");
    std::fs::write(&src, b"chart").unwrap();
    let out_dir = dir.path().join("site");
    std::fs::create_dir(&out_dir).unwrap();
    let out = out_dir.join("index.html");

    let mut doc = Document::new().unwrap();
    doc.append(Figure::new(&src, (4.0, 3.0)).with_caption("Chart"))
        .unwrap();
    doc.append(RenderedFigure::new(Arc::new(Swatch)).with_caption("Swatch"))
        .unwrap();
    doc.write_to(&out).unwrap();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains(
        r#"<div class="figure"><img src="images/chart.png" width="100%"/><p class="caption">Figure <span class="counter" data-seq="Figure">1</span>: <span>Chart</span></p></div>"#
    ));
    assert!(html.contains(r#"data-seq="Figure">2</span>"#));

    let images: Vec<String> = std::fs::read_dir(out_dir.join("images"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(images.len(), 2);
    assert_eq!(
        std::fs::read(out_dir.join("images/chart.png")).unwrap(),
        b"chart"
    );
}

#[test]
fn test_reload_carries_images_over() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("logo.png");
    std::fs::write(&src, b"logo").unwrap();
    let first = dir.path().join("a").join("first.html");
    let second = dir.path().join("b").join("second.html");
    std::fs::create_dir_all(first.parent().unwrap()).unwrap();
    std::fs::create_dir_all(second.parent().unwrap()).unwrap();

    let mut doc = Document::open(&first, OpenMode::Create).unwrap();
    doc.append(Figure::new(&src, (1.0, 1.0))).unwrap();
    doc.write_to(&first).unwrap();
    doc.close().unwrap();

    let doc = Document::open(&first, OpenMode::CopyOnWrite).unwrap();
    doc.write_to(&second).unwrap();
    assert_eq!(
        std::fs::read(second.parent().unwrap().join("images/logo.png")).unwrap(),
        b"logo"
    );
}

fn write_page(path: &std::path::Path, src: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        path,
        format!(r#"<html><head></head><body><img src="{src}"/></body></html>"#),
    )
    .unwrap();
}

#[test]
fn test_reload_keeps_nested_image_paths() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("a").join("page.html");
    write_page(&page, "images/sub/a.png");
    std::fs::create_dir_all(dir.path().join("a/images/sub")).unwrap();
    std::fs::write(dir.path().join("a/images/sub/a.png"), b"nested").unwrap();

    let doc = Document::open(&page, OpenMode::Update).unwrap();
    let copy = dir.path().join("b").join("page.html");
    std::fs::create_dir_all(copy.parent().unwrap()).unwrap();
    doc.write_to(&copy).unwrap();

    assert_eq!(
        std::fs::read(dir.path().join("b/images/sub/a.png")).unwrap(),
        b"nested"
    );
}

#[test]
fn test_reload_skips_images_outside_image_dir() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("a").join("page.html");
    write_page(&page, "images/../secret.png");
    std::fs::create_dir_all(dir.path().join("a/images")).unwrap();
    std::fs::write(dir.path().join("a/secret.png"), b"secret").unwrap();

    let doc = Document::open(&page, OpenMode::Update).unwrap();
    let copy = dir.path().join("b").join("page.html");
    std::fs::create_dir_all(copy.parent().unwrap()).unwrap();
    doc.write_to(&copy).unwrap();

    assert!(!dir.path().join("b/secret.png").exists());
    assert!(!dir.path().join("b/images").exists());
}

#[test]
fn test_counters_continue_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tables.html");

    let mut doc = Document::open(&path, OpenMode::Append).unwrap();
    doc.append(docweave_ast::Table::new([["a"]]).with_caption("first"))
        .unwrap();
    doc.close().unwrap();

    let mut doc = Document::open(&path, OpenMode::Append).unwrap();
    doc.append(docweave_ast::Table::new([["b"]]).with_caption("second"))
        .unwrap();
    assert!(doc.to_html().contains(r#"data-seq="Table">2</span>: <span>second</span>"#));
}

#[test]
fn test_failed_render_leaves_body_untouched() {
    let mut doc = Document::new().unwrap();
    doc.append("kept").unwrap();

    let result = doc.append(RenderedFigure::new(Arc::new(Broken)).with_caption("lost"));
    assert!(matches!(result, Err(HtmlError::Figure(_))));
    assert_eq!(doc.paragraph_texts(), vec!["kept"]);
}

#[test]
fn test_custom_image_dir_and_styles() {
    let mut config = HtmlConfig::default();
    config.image_dir = "media".to_string();
    config
        .styles
        .entry("p.note".to_string())
        .or_default()
        .insert("color".to_string(), "gray".to_string());

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("pic.png");
    std::fs::write(&src, b"pic").unwrap();
    let out = dir.path().join("out.html");

    let mut doc = Document::with_config(config).unwrap();
    doc.append(Figure::new(&src, (1.0, 1.0))).unwrap();
    doc.write_to(&out).unwrap();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains(r#"<img src="media/pic.png" width="100%"/>"#));
    assert!(html.contains("p.note {\n  color: gray;\n}"));
    assert!(dir.path().join("media/pic.png").is_file());
}

#[test]
fn test_rejects_non_html_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.html");
    std::fs::write(&path, "<svg><body/></svg>").unwrap();
    assert!(matches!(
        Document::open(&path, OpenMode::Update),
        Err(HtmlError::InvalidStructure(_))
    ));
}
