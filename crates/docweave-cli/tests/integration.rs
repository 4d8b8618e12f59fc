//! Integration tests for the docweave CLI

use std::fs;
use std::path::Path;

use clap::Parser;
use docweave_cli::{run, AnyDocument, Cli};
use docweave_core::{Config, OpenMode};
use tempfile::TempDir;

fn docweave(args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["docweave"];
    argv.extend_from_slice(args);
    run(Cli::try_parse_from(argv)?)
}

fn reopen(path: &Path) -> AnyDocument {
    AnyDocument::open(path, OpenMode::CopyOnWrite, &Config::default()).unwrap()
}

#[test]
fn test_new_docx_with_title() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.docx");
    let out_str = out.to_str().unwrap();

    docweave(&["new", out_str, "--title", "Weekly status"]).unwrap();

    let doc = reopen(&out);
    assert_eq!(doc.paragraph_texts(), vec!["Weekly status"]);
    assert_eq!(doc.get_property("Title").as_deref(), Some("Weekly status"));
}

#[test]
fn test_append_text_and_json_to_html() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("page.html");
    let json = dir.path().join("content.json");
    fs::write(
        &json,
        r#"[
            {"type": "header", "level": 2, "content": [{"type": "text", "content": "Numbers"}]},
            [["a", "b"], ["c", "d"]]
        ]"#,
    )
    .unwrap();

    docweave(&[
        "append",
        out.to_str().unwrap(),
        "--text",
        "first",
        "--text",
        "second",
        "--json",
        json.to_str().unwrap(),
    ])
    .unwrap();

    let doc = reopen(&out);
    assert_eq!(doc.paragraph_texts(), vec!["first", "second", "Numbers"]);
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<h2><span>Numbers</span></h2>"));
    assert!(html.contains("<td><p><span>d</span></p></td>"));
}

#[test]
fn test_append_keeps_existing_content() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("log.docx");
    let out_str = out.to_str().unwrap();

    docweave(&["append", out_str, "-t", "one"]).unwrap();
    docweave(&["append", out_str, "-t", "two"]).unwrap();

    assert_eq!(reopen(&out).paragraph_texts(), vec!["one", "two"]);
}

#[test]
fn test_set_then_get_property() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("props.docx");
    let out_str = out.to_str().unwrap();

    docweave(&["new", out_str]).unwrap();
    docweave(&["set", out_str, "Owner", "Ops"]).unwrap();
    docweave(&["get", out_str, "Owner"]).unwrap();
    docweave(&["props", out_str]).unwrap();
    docweave(&["info", out_str]).unwrap();

    assert_eq!(reopen(&out).get_property("Owner").as_deref(), Some("Ops"));
}

#[test]
fn test_get_missing_property_fails() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("empty.html");
    let out_str = out.to_str().unwrap();

    docweave(&["new", out_str]).unwrap();
    let err = docweave(&["get", out_str, "Owner"]).unwrap_err();
    assert!(err.to_string().contains("Owner"));
}

#[test]
fn test_set_requires_existing_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("absent.docx");
    assert!(docweave(&["set", out.to_str().unwrap(), "Owner", "Ops"]).is_err());
    assert!(!out.exists());
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("notes.txt");
    assert!(docweave(&["append", out.to_str().unwrap(), "-t", "x"]).is_err());
    assert!(!out.exists());
}

#[test]
fn test_append_without_content_fails() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("page.html");
    assert!(docweave(&["append", out.to_str().unwrap()]).is_err());
}

#[test]
fn test_config_file_applies_to_html() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("docweave.toml");
    fs::write(&config, "[html.styles.\"p.note\"]\ncolor = \"gray\"\n").unwrap();
    let out = dir.path().join("styled.html");

    docweave(&[
        "--config",
        config.to_str().unwrap(),
        "new",
        out.to_str().unwrap(),
    ])
    .unwrap();

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("p.note {\n  color: gray;\n}"));
}

#[test]
fn test_bad_json_reports_error() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("bad.json");
    fs::write(&json, r#"{"type": "spreadsheet"}"#).unwrap();
    let out = dir.path().join("page.html");

    let result = docweave(&[
        "append",
        out.to_str().unwrap(),
        "--json",
        json.to_str().unwrap(),
    ]);
    assert!(result.is_err());
    assert!(!out.exists());
}
