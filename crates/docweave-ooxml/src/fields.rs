//! Field markup: DOCPROPERTY rewriting and SEQ counting
//!
//! Word stores fields in two shapes. A simple field is one `w:fldSimple`
//! element carrying the instruction and the displayed runs. A complex field
//! is a sequence of sibling runs:
//!
//! ```text
//! <w:r><w:fldChar w:fldCharType="begin"/></w:r>
//! <w:r><w:instrText> DOCPROPERTY "Owner" </w:instrText></w:r>
//! <w:r><w:fldChar w:fldCharType="separate"/></w:r>
//! <w:r><w:t>old value</w:t></w:r>
//! <w:r><w:fldChar w:fldCharType="end"/></w:r>
//! ```
//!
//! Rewriting a property replaces either shape with a fresh simple field
//! showing the new value.

use docweave_core::{Element, Node};

/// Instruction of a custom-property field
pub fn property_instruction(name: &str) -> String {
    format!(" DOCPROPERTY  \"{name}\"  \\* MERGEFORMAT ")
}

/// Instruction of a sequence counter field
pub fn sequence_instruction(name: &str) -> String {
    format!(" SEQ {name} \\* ARABIC ")
}

/// Split an instruction into its field keyword and first argument
///
/// The argument may be quoted; switches (`\* MERGEFORMAT`) are ignored.
fn parse_instruction(instr: &str) -> Option<(&str, &str)> {
    let instr = instr.trim_start();
    let keyword_end = instr.find(char::is_whitespace)?;
    let (keyword, rest) = instr.split_at(keyword_end);
    let rest = rest.trim_start();
    let argument = match rest.strip_prefix('"') {
        Some(quoted) => &quoted[..quoted.find('"')?],
        None => rest.split_whitespace().next()?,
    };
    Some((keyword, argument))
}

fn is_field(instr: &str, keyword: &str, name: &str) -> bool {
    parse_instruction(instr)
        .is_some_and(|(kw, arg)| kw.eq_ignore_ascii_case(keyword) && arg == name)
}

/// Whether an instruction shows the named custom property
pub fn is_property_field(instr: &str, name: &str) -> bool {
    is_field(instr, "DOCPROPERTY", name)
}

/// Whether an instruction counts the named sequence
pub fn is_sequence_field(instr: &str, name: &str) -> bool {
    is_field(instr, "SEQ", name)
}

/// Number of sequence fields for `name` in a tree, simple or complex
pub fn count_sequence(root: &Element, name: &str) -> usize {
    let simple = root
        .descendants("w:fldSimple")
        .into_iter()
        .filter(|el| el.attr("w:instr").is_some_and(|i| is_sequence_field(i, name)))
        .count();
    let complex = root
        .descendants("w:instrText")
        .into_iter()
        .filter(|el| is_sequence_field(&el.text(), name))
        .count();
    simple + complex
}

/// Build a simple field displaying `value`
///
/// The run properties, when given, go on the displayed run.
pub fn simple_field(instr: &str, run_properties: Option<Element>, value: &str) -> Element {
    let mut run = Element::new("w:r");
    if let Some(rpr) = run_properties {
        run.push(rpr);
    }
    run.push(Element::new("w:t").with_text(value));
    Element::new("w:fldSimple")
        .with_attr("w:instr", instr)
        .with_child(run)
}

/// Rewrite every field showing the custom property `name` to display `value`
///
/// Returns the number of fields rewritten.
pub fn update_property_fields(root: &mut Element, name: &str, value: &str) -> usize {
    let instr = property_instruction(name);
    let mut count = 0;
    rewrite(root, name, &instr, value, &mut count);
    count
}

fn rewrite(element: &mut Element, name: &str, instr: &str, value: &str, count: &mut usize) {
    for child in element.elements_mut() {
        if child.is("w:fldSimple")
            && child
                .attr("w:instr")
                .is_some_and(|i| is_property_field(i, name))
        {
            let rpr = child
                .child("w:r")
                .and_then(|r| r.child("w:rPr"))
                .cloned();
            *child = simple_field(instr, rpr, value);
            *count += 1;
        }
    }

    while let Some(index) = element
        .children
        .iter()
        .position(|n| n.as_element().is_some_and(|r| is_property_run(r, name)))
    {
        let rpr = element.children[index]
            .as_element()
            .and_then(|r| r.child("w:rPr"))
            .cloned();
        let begin = (0..index)
            .rev()
            .find(|&i| has_field_char(&element.children[i]))
            .unwrap_or(index);
        let end = (index + 1..element.children.len())
            .find(|&i| field_char_type(&element.children[i]) == Some("end"))
            .unwrap_or(index);
        element.children.drain(begin..=end);
        element
            .children
            .insert(begin, simple_field(instr, rpr, value).into());
        *count += 1;
    }

    for child in element.elements_mut() {
        if !child.is("w:fldSimple") {
            rewrite(child, name, instr, value, count);
        }
    }
}

fn is_property_run(run: &Element, name: &str) -> bool {
    run.is("w:r")
        && run
            .elements()
            .any(|el| el.is("w:instrText") && is_property_field(&el.text(), name))
}

fn has_field_char(node: &Node) -> bool {
    node.as_element().is_some_and(|el| el.contains("w:fldChar"))
}

fn field_char_type(node: &Node) -> Option<&str> {
    node.as_element()?.find("w:fldChar")?.attr("w:fldCharType")
}
