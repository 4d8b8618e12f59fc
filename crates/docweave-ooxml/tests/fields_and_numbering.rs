//! Custom property, field and list numbering tests against whole documents

use docweave_ast::{List, Paragraph, Table};
use docweave_ooxml::test_utils::{read_part, write_fixture};
use docweave_ooxml::{Document, Numbering, OoxmlError, OpenMode, Relationships};

fn field_texts(root: &docweave_core::Element, name: &str) -> Vec<String> {
    root.descendants("w:fldSimple")
        .into_iter()
        .filter(|f| {
            f.attr("w:instr")
                .is_some_and(|i| docweave_ooxml::fields::is_property_field(i, name))
        })
        .map(|f| f.text())
        .collect()
}

#[test]
fn test_fixture_properties_load() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());

    let doc = Document::open(&fixture, OpenMode::CopyOnWrite).unwrap();
    assert_eq!(doc.property_names(), vec!["Owner", "Revision"]);
    assert_eq!(doc.get_property("Owner").as_deref(), Some("Ops"));
    assert_eq!(doc.get_property("Missing"), None);
}

#[test]
fn test_set_property_rewrites_body_header_and_footer() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());

    let mut doc = Document::open(&fixture, OpenMode::Update).unwrap();
    doc.set_property("Owner", "Platform");
    doc.set_property("Revision", "2");

    assert_eq!(field_texts(doc.root(), "Owner"), vec!["Platform"]);
    assert_eq!(doc.paragraph_texts()[1], "Owner: Platform");
    // complex field runs are gone, formatting stays
    assert!(doc.root().descendants("w:instrText").is_empty());
    let field = doc.root().find("w:fldSimple").unwrap();
    assert!(field.find("w:b").is_some());

    let headers: Vec<(&str, &docweave_core::Element)> = doc.headers().collect();
    assert_eq!(headers.len(), 2);
    let (_, footer) = headers
        .iter()
        .find(|(path, _)| *path == "word/footer1.xml")
        .unwrap();
    assert_eq!(field_texts(footer, "Revision"), vec!["2"]);
    let (_, header) = headers
        .iter()
        .find(|(path, _)| *path == "word/header1.xml")
        .unwrap();
    assert_eq!(field_texts(header, "Owner"), vec!["Platform"]);
    assert!(header.find("w:i").is_some());

    doc.close().unwrap();

    let custom = read_part(&fixture, "docProps/custom.xml").unwrap();
    assert!(custom.contains(r#"pid="2" name="Owner"><vt:lpwstr>Platform</vt:lpwstr>"#));
    let header_xml = read_part(&fixture, "word/header1.xml").unwrap();
    assert!(header_xml.contains("Platform"));
}

#[test]
fn test_set_property_twice_keeps_one_id() {
    let mut doc = Document::new().unwrap();
    doc.set_property("DocId", "A");
    doc.set_property("Other", "B");
    doc.set_property("DocId", "C");

    let props = doc.properties().unwrap();
    assert_eq!(props.len(), 2);
    assert_eq!(props.pid("DocId"), Some(2));
    assert_eq!(props.pid("Other"), Some(3));
    assert_eq!(doc.get_property("DocId").as_deref(), Some("C"));
}

#[test]
fn test_new_property_continues_after_loaded_ids() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());

    let mut doc = Document::open(&fixture, OpenMode::CopyOnWrite).unwrap();
    doc.set_property("Reviewer", "QA");
    assert_eq!(doc.properties().unwrap().pid("Reviewer"), Some(4));
}

#[test]
fn test_fresh_document_writes_custom_part_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain.docx");
    let with_props = dir.path().join("props.docx");

    let mut doc = Document::new().unwrap();
    doc.write_to(&plain).unwrap();
    doc.set_property("Title", "Runbook");
    doc.write_to(&with_props).unwrap();

    assert!(read_part(&plain, "docProps/custom.xml").is_none());
    assert!(read_part(&with_props, "docProps/custom.xml").is_some());
    let package_rels = read_part(&with_props, "_rels/.rels").unwrap();
    assert!(package_rels.contains(r#"Target="docProps/custom.xml""#));
    let content_types = read_part(&with_props, "[Content_Types].xml").unwrap();
    assert!(content_types.contains(r#"PartName="/docProps/custom.xml""#));
}

#[test]
fn test_table_caption_counts_existing_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());

    let mut doc = Document::open(&fixture, OpenMode::CopyOnWrite).unwrap();
    doc.append(Table::new([["A", "B"], ["C", "D"]]).with_caption("demo"))
        .unwrap();

    let texts = doc.paragraph_texts();
    assert_eq!(texts[5], "Table 2: demo");

    let caption_style = doc
        .root()
        .descendants("w:pStyle")
        .into_iter()
        .filter_map(|el| el.attr("w:val"))
        .last()
        .map(str::to_string);
    assert_eq!(caption_style.as_deref(), Some("Beschriftung"));

    let tbl = doc.root().find("w:tbl").unwrap();
    assert_eq!(tbl.find("w:tblGrid").unwrap().elements().count(), 2);
    assert_eq!(tbl.elements().filter(|el| el.is("w:tr")).count(), 2);
}

#[test]
fn test_nested_list_numbering() {
    let mut doc = Document::new().unwrap();
    let mut list = List::from_rows(["one", "two"]).with_format("1.");
    list.push(List::from_rows(["two a", "two b"]).with_format("a)"));
    list.push("three");
    list.push(List::from_rows(["three a"]).with_format("a)"));
    doc.append(list).unwrap();
    doc.append(List::from_rows(["bullet"])).unwrap();

    let numbering: &Numbering = doc.numbering().unwrap();
    assert_eq!(numbering.list_count(), 2);
    // two levels in the first list, the sibling nested list reuses level 1
    assert_eq!(numbering.level_count(), 3);

    let num_ids: Vec<&str> = doc
        .root()
        .descendants("w:numId")
        .into_iter()
        .filter_map(|el| el.attr("w:val"))
        .collect();
    assert_eq!(num_ids, vec!["1", "1", "1", "1", "1", "1", "2"]);

    let levels: Vec<&str> = doc
        .root()
        .descendants("w:ilvl")
        .into_iter()
        .filter_map(|el| el.attr("w:val"))
        .collect();
    assert_eq!(levels, vec!["0", "0", "1", "1", "0", "1", "0"]);

    let indents: Vec<&str> = doc
        .root()
        .descendants("w:ind")
        .into_iter()
        .filter_map(|el| el.attr("w:left"))
        .collect();
    assert_eq!(indents, vec!["360", "360", "720", "720", "360", "720", "360"]);
}

#[test]
fn test_list_group_continuation_is_unnumbered() {
    let mut doc = Document::new().unwrap();
    let mut list = List::new().with_format("1.");
    list.push(vec!["first", "continued"]);
    doc.append(list).unwrap();

    let paragraphs: Vec<&docweave_core::Element> = doc
        .body()
        .unwrap()
        .elements()
        .filter(|el| el.is("w:p"))
        .collect();
    assert_eq!(paragraphs.len(), 2);
    assert!(paragraphs[0].contains("w:numPr"));
    assert!(!paragraphs[1].contains("w:numPr"));
    assert!(paragraphs[1].contains("w:ind"));
}

#[test]
fn test_loaded_numbering_continues_ids() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());

    let mut doc = Document::open(&fixture, OpenMode::Update).unwrap();
    doc.append(List::from_rows(["new"]).with_format("(i)"))
        .unwrap();
    doc.close().unwrap();

    let xml = read_part(&fixture, "word/numbering.xml").unwrap();
    let numbering = Numbering::parse(xml.as_bytes()).unwrap();
    assert_eq!(numbering.list_count(), 2);
    assert!(xml.contains(r#"<w:num w:numId="7"><w:abstractNumId w:val="6"/></w:num>"#));
    assert!(xml.contains(r#"<w:numFmt w:val="lowerRoman"/>"#));
    // abstract definitions stay ahead of the first w:num
    let last_abstract = xml.rfind("<w:abstractNum ").unwrap();
    let first_num = xml.find("<w:num ").unwrap();
    assert!(last_abstract < first_num);
}

#[test]
fn test_unrecognized_format_leaves_body_untouched() {
    let mut doc = Document::new().unwrap();
    doc.append(Paragraph::from("before")).unwrap();

    let result = doc.append(List::from_rows(["x"]).with_format("%."));
    assert!(result.is_ok(), "punctuation-only formats are bullets");

    let result = doc.append(List::from_rows(["x"]).with_format("Q."));
    assert!(matches!(result, Err(OoxmlError::UnrecognizedFormat(_))));
    assert_eq!(doc.paragraph_texts(), vec!["before", "x"]);
}

#[test]
fn test_failed_nested_list_allocates_nothing() {
    let mut doc = Document::new().unwrap();
    let mut list = List::from_rows(["one"]).with_format("1.");
    list.push(List::from_rows(["bad"]).with_format("Q."));

    let result = doc.append(list);
    assert!(matches!(result, Err(OoxmlError::UnrecognizedFormat(_))));
    assert!(doc.numbering().is_none());
    assert!(doc
        .media()
        .target_of_type(Relationships::TYPE_NUMBERING)
        .is_none());
    assert!(doc.paragraph_texts().is_empty());

    doc.append(List::from_rows(["good"]).with_format("1."))
        .unwrap();
    assert_eq!(doc.numbering().unwrap().list_count(), 1);
    let num_ids: Vec<&str> = doc
        .root()
        .descendants("w:numId")
        .into_iter()
        .filter_map(|el| el.attr("w:val"))
        .collect();
    assert_eq!(num_ids, vec!["1"]);
}

#[test]
fn test_failed_nested_list_keeps_loaded_numbering() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());

    let mut doc = Document::open(&fixture, OpenMode::CopyOnWrite).unwrap();
    let mut list = List::from_rows(["one"]).with_format("1.");
    list.push(List::from_rows(["bad"]).with_format("Q."));
    assert!(doc.append(list).is_err());
    assert_eq!(doc.numbering().unwrap().list_count(), 1);

    doc.append(List::from_rows(["next"]).with_format("1."))
        .unwrap();
    let last = doc
        .root()
        .descendants("w:numId")
        .into_iter()
        .filter_map(|el| el.attr("w:val"))
        .last()
        .map(str::to_string);
    assert_eq!(last.as_deref(), Some("7"));
}
