//! Numbering definitions (word/numbering.xml)
//!
//! Every list rendered into a document is backed by a `w:num` entry pointing
//! at a `w:abstractNum`, which holds one `w:lvl` per nesting level. The
//! engine hands out `(level, num_id)` pairs:
//!
//! - a root list always gets a fresh num id with level 0
//! - a nested list under a known parent reuses the parent's num id one level
//!   deeper, adding that level's definition the first time it is requested
//! - a parent the engine did not allocate starts a fresh list

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use docweave_core::Element;

use crate::error::{OoxmlError, Result};
use crate::W_NS;

/// Numbering format of one list level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFormat {
    /// First value of the counter; bullets have none
    pub start: Option<u32>,
    /// `w:numFmt` value
    pub num_fmt: &'static str,
    /// `w:lvlText` template, e.g. `%1.` or a literal bullet
    pub text: String,
}

impl LevelFormat {
    /// Recognize a label format such as `1.`, `(a)`, `i)` or `●`
    ///
    /// The first run of alphanumeric characters selects the format; text
    /// around it is kept as prefix and suffix. A format without any
    /// alphanumeric run is a literal bullet.
    pub fn parse(content: &str, level: u32) -> Result<Self> {
        let Some(start) = content.find(char::is_alphanumeric) else {
            return Ok(Self {
                start: None,
                num_fmt: "bullet",
                text: content.to_string(),
            });
        };
        let end = content[start..]
            .find(|c: char| !c.is_alphanumeric())
            .map(|n| start + n)
            .unwrap_or(content.len());
        let (prefix, run, suffix) = (&content[..start], &content[start..end], &content[end..]);
        let text = format!("{prefix}%{}{suffix}", level + 1);

        if run.chars().all(|c| c.is_ascii_digit()) {
            let value = run
                .parse()
                .map_err(|_| OoxmlError::UnrecognizedFormat(content.to_string()))?;
            return Ok(Self {
                start: Some(value),
                num_fmt: "decimal",
                text,
            });
        }

        let num_fmt = match run {
            "a" => "lowerLetter",
            "A" => "upperLetter",
            "i" => "lowerRoman",
            "I" => "upperRoman",
            _ => return Err(OoxmlError::UnrecognizedFormat(content.to_string())),
        };
        Ok(Self {
            start: Some(1),
            num_fmt,
            text,
        })
    }
}

/// A list allocated by this engine
#[derive(Debug, Clone)]
struct ListDefinition {
    abstract_id: u32,
    levels: BTreeSet<u32>,
}

/// Numbering part with its allocation state
#[derive(Debug, Clone)]
pub struct Numbering {
    root: Element,
    nums: BTreeMap<u32, ListDefinition>,
    max_number: u32,
}

impl Default for Numbering {
    fn default() -> Self {
        Self {
            root: Element::new("w:numbering").with_attr("xmlns:w", W_NS),
            nums: BTreeMap::new(),
            max_number: 0,
        }
    }
}

impl Numbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing numbering part
    ///
    /// New ids continue after the highest `w:numId` and `w:abstractNumId`
    /// found in the part.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let root = Element::parse(xml)?;
        if !root.is("w:numbering") {
            return Err(OoxmlError::InvalidStructure(format!(
                "expected w:numbering, found {}",
                root.name
            )));
        }
        let id_of = |el: &Element, attr: &str| el.attr(attr).and_then(|v| v.parse::<u32>().ok());
        let max_num = root
            .elements()
            .filter(|el| el.is("w:num"))
            .filter_map(|el| id_of(el, "w:numId"))
            .max()
            .unwrap_or(0);
        let max_abstract = root
            .elements()
            .filter(|el| el.is("w:abstractNum"))
            .filter_map(|el| id_of(el, "w:abstractNumId"))
            .map(|id| id + 1)
            .max()
            .unwrap_or(0);
        Ok(Self {
            root,
            nums: BTreeMap::new(),
            max_number: max_num.max(max_abstract),
        })
    }

    /// Request a list level
    ///
    /// `parent` is the `(level, num_id)` pair of the enclosing list, if any.
    /// The format is validated before anything is allocated.
    pub fn add(
        &mut self,
        parent: Option<(u32, u32)>,
        indent: u32,
        hanging: u32,
        format: &str,
    ) -> Result<(u32, u32)> {
        let known_parent = parent.filter(|(_, id)| self.nums.contains_key(id));
        let level = known_parent.map(|(lvl, _)| lvl + 1).unwrap_or(0);
        let level_format = LevelFormat::parse(format, level)?;

        let (num_id, abstract_id) = match known_parent {
            Some((_, num_id)) => {
                let Some(def) = self.nums.get_mut(&num_id) else {
                    return Err(OoxmlError::InvalidStructure(format!("unknown list {num_id}")));
                };
                if !def.levels.insert(level) {
                    debug!("Reusing level {} of list {}", level, num_id);
                    return Ok((level, num_id));
                }
                (num_id, def.abstract_id)
            }
            None => self.new_list(),
        };

        let lvl = level_element(level, indent, hanging, &level_format);
        let abstract_attr = abstract_id.to_string();
        match self.root.elements_mut().find(|el| {
            el.is("w:abstractNum") && el.attr("w:abstractNumId") == Some(abstract_attr.as_str())
        }) {
            Some(abstract_num) => abstract_num.push(lvl),
            None => {
                return Err(OoxmlError::InvalidStructure(format!(
                    "missing w:abstractNum {abstract_id}"
                )))
            }
        }
        debug!(
            "List {} level {}: {} {:?}",
            num_id, level, level_format.num_fmt, level_format.text
        );
        Ok((level, num_id))
    }

    /// Allocate a new `w:num` / `w:abstractNum` pair, returning both ids
    fn new_list(&mut self) -> (u32, u32) {
        let abstract_id = self.max_number;
        let num_id = self.max_number + 1;

        let abstract_num = Element::new("w:abstractNum")
            .with_attr("w:abstractNumId", abstract_id.to_string())
            .with_child(Element::new("w:multiLevelType").with_attr("w:val", "hybridMultilevel"));
        let first_num = self
            .root
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|el| el.is("w:num")))
            .unwrap_or(self.root.children.len());
        self.root.children.insert(first_num, abstract_num.into());

        self.root.push(
            Element::new("w:num")
                .with_attr("w:numId", num_id.to_string())
                .with_child(
                    Element::new("w:abstractNumId").with_attr("w:val", abstract_id.to_string()),
                ),
        );

        self.max_number += 1;
        self.nums.insert(
            num_id,
            ListDefinition {
                abstract_id,
                levels: BTreeSet::from([0]),
            },
        );
        (num_id, abstract_id)
    }

    /// Number of level definitions across all abstract numberings
    pub fn level_count(&self) -> usize {
        self.root.descendants("w:lvl").len()
    }

    /// Number of `w:num` entries
    pub fn list_count(&self) -> usize {
        self.root.elements().filter(|el| el.is("w:num")).count()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn to_xml(&self) -> String {
        self.root.to_document()
    }
}

fn level_element(level: u32, indent: u32, hanging: u32, format: &LevelFormat) -> Element {
    let mut lvl = Element::new("w:lvl").with_attr("w:ilvl", level.to_string());
    if let Some(start) = format.start {
        lvl.push(Element::new("w:start").with_attr("w:val", start.to_string()));
    }
    lvl.push(Element::new("w:numFmt").with_attr("w:val", format.num_fmt));
    if !format.text.is_empty() {
        lvl.push(Element::new("w:lvlText").with_attr("w:val", format.text.as_str()));
    }
    if indent > 0 || hanging > 0 {
        let mut ind = Element::new("w:ind");
        if indent > 0 {
            ind.set_attr("w:left", indent.to_string());
        }
        if hanging > 0 {
            ind.set_attr("w:hanging", hanging.to_string());
        }
        lvl.push(Element::new("w:pPr").with_child(ind));
    }
    lvl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_variants() {
        let decimal = LevelFormat::parse("1.", 0).unwrap();
        assert_eq!(decimal.start, Some(1));
        assert_eq!(decimal.num_fmt, "decimal");
        assert_eq!(decimal.text, "%1.");

        let letters = LevelFormat::parse("(a)", 2).unwrap();
        assert_eq!(letters.num_fmt, "lowerLetter");
        assert_eq!(letters.text, "(%3)");

        let roman = LevelFormat::parse("I-", 0).unwrap();
        assert_eq!(roman.num_fmt, "upperRoman");
        assert_eq!(roman.start, Some(1));

        let start = LevelFormat::parse("7)", 1).unwrap();
        assert_eq!(start.start, Some(7));
        assert_eq!(start.text, "%2)");

        let bullet = LevelFormat::parse("●", 0).unwrap();
        assert_eq!(bullet.start, None);
        assert_eq!(bullet.num_fmt, "bullet");
        assert_eq!(bullet.text, "●");
    }

    #[test]
    fn test_parse_format_rejects_unknown_run() {
        assert!(matches!(
            LevelFormat::parse("x.", 0),
            Err(OoxmlError::UnrecognizedFormat(_))
        ));
        assert!(matches!(
            LevelFormat::parse("ab.", 0),
            Err(OoxmlError::UnrecognizedFormat(_))
        ));
    }

    #[test]
    fn test_root_lists_get_new_ids() {
        let mut numbering = Numbering::new();
        assert_eq!(numbering.add(None, 360, 360, "1.").unwrap(), (0, 1));
        assert_eq!(numbering.add(None, 360, 360, "●").unwrap(), (0, 2));
        assert_eq!(numbering.list_count(), 2);
        assert_eq!(numbering.level_count(), 2);
    }

    #[test]
    fn test_nested_levels_reuse_parent_id() {
        let mut numbering = Numbering::new();
        let root = numbering.add(None, 360, 360, "1.").unwrap();
        let child = numbering.add(Some(root), 720, 360, "a)").unwrap();
        let grandchild = numbering.add(Some(child), 1080, 360, "i.").unwrap();

        assert_eq!(child, (1, root.1));
        assert_eq!(grandchild, (2, root.1));
        assert_eq!(numbering.list_count(), 1);
        // one definition per depth
        assert_eq!(numbering.level_count(), 3);
    }

    #[test]
    fn test_sibling_nested_lists_share_level() {
        let mut numbering = Numbering::new();
        let root = numbering.add(None, 360, 360, "1.").unwrap();
        let first = numbering.add(Some(root), 720, 360, "●").unwrap();
        let second = numbering.add(Some(root), 720, 360, "●").unwrap();
        assert_eq!(first, second);
        assert_eq!(numbering.level_count(), 2);
    }

    #[test]
    fn test_unknown_parent_starts_new_list() {
        let mut numbering = Numbering::new();
        assert_eq!(numbering.add(Some((0, 42)), 360, 360, "1.").unwrap(), (0, 1));
    }

    #[test]
    fn test_unrecognized_format_allocates_nothing() {
        let mut numbering = Numbering::new();
        assert!(numbering.add(None, 360, 360, "zz").is_err());
        assert_eq!(numbering.list_count(), 0);
        assert_eq!(numbering.add(None, 360, 360, "1.").unwrap(), (0, 1));
    }

    #[test]
    fn test_abstract_nums_precede_nums() {
        let mut numbering = Numbering::new();
        numbering.add(None, 360, 360, "1.").unwrap();
        numbering.add(None, 360, 360, "a.").unwrap();
        let names: Vec<&str> = numbering.root().elements().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["w:abstractNum", "w:abstractNum", "w:num", "w:num"]
        );
    }

    #[test]
    fn test_level_definition_markup() {
        let mut numbering = Numbering::new();
        numbering.add(None, 360, 360, "1.").unwrap();
        let xml = numbering.to_xml();
        assert!(xml.contains(r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl>"#));
        assert!(xml.contains(r#"<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#));
    }

    #[test]
    fn test_loaded_part_continues_ids() {
        let xml = br#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:abstractNum w:abstractNumId="3"><w:lvl w:ilvl="0"/></w:abstractNum>
<w:num w:numId="2"><w:abstractNumId w:val="3"/></w:num>
</w:numbering>"#;
        let mut numbering = Numbering::parse(xml).unwrap();
        assert_eq!(numbering.add(None, 360, 360, "1.").unwrap(), (0, 5));
        let xml = numbering.to_xml();
        let new_abstract = xml.find(r#"w:abstractNumId="4""#).unwrap();
        let first_num = xml.find("<w:num ").unwrap();
        assert!(new_abstract < first_num);
    }
}
