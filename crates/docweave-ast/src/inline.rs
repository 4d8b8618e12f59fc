//! Inline elements for paragraph content
//!
//! This module defines the inline-level nodes that live inside a paragraph:
//! formatted text runs and sequence counters.

use serde::{Deserialize, Serialize};

/// Three-state formatting flag
///
/// `Inherit` leaves the property to the surrounding style, `On` and `Off`
/// set it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    #[default]
    Inherit,
    On,
    Off,
}

impl Toggle {
    /// Whether the flag carries an explicit value
    pub fn is_explicit(self) -> bool {
        self != Toggle::Inherit
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value {
            Toggle::On
        } else {
            Toggle::Off
        }
    }
}

impl From<Option<bool>> for Toggle {
    fn from(value: Option<bool>) -> Self {
        value.map(Toggle::from).unwrap_or_default()
    }
}

/// Underline style of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Underline {
    #[default]
    Inherit,
    None,
    Single,
    Double,
    Thick,
    Words,
    Dash,
    Dotted,
    DotDash,
}

impl Underline {
    /// Parse a one-character underline marker
    ///
    /// `_` single, `=` double, `#` thick, `-` words, `,` dash,
    /// `.` dotted, `;` dot-dash.
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '_' => Some(Underline::Single),
            '=' => Some(Underline::Double),
            '#' => Some(Underline::Thick),
            '-' => Some(Underline::Words),
            ',' => Some(Underline::Dash),
            '.' => Some(Underline::Dotted),
            ';' => Some(Underline::DotDash),
            _ => None,
        }
    }

    /// Whether the style carries an explicit value
    pub fn is_explicit(self) -> bool {
        self != Underline::Inherit
    }

    /// Whether any line is drawn
    pub fn is_visible(self) -> bool {
        !matches!(self, Underline::Inherit | Underline::None)
    }
}

impl From<bool> for Underline {
    fn from(value: bool) -> Self {
        if value {
            Underline::Single
        } else {
            Underline::None
        }
    }
}

/// A run of text sharing one set of formatting options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Text {
    /// The text content, including any leading or trailing spaces
    pub content: String,
    #[serde(default)]
    pub bold: Toggle,
    #[serde(default)]
    pub italic: Toggle,
    #[serde(default)]
    pub underline: Underline,
}

impl Text {
    /// Create an unformatted text run
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Mark the run bold
    pub fn bold(self) -> Self {
        self.with_bold(Toggle::On)
    }

    /// Mark the run italic
    pub fn italic(self) -> Self {
        self.with_italic(Toggle::On)
    }

    /// Underline the run with the given style
    pub fn underlined(mut self, style: Underline) -> Self {
        self.underline = style;
        self
    }

    pub fn with_bold(mut self, bold: impl Into<Toggle>) -> Self {
        self.bold = bold.into();
        self
    }

    pub fn with_italic(mut self, italic: impl Into<Toggle>) -> Self {
        self.italic = italic.into();
        self
    }

    /// Whether any formatting property is explicitly set
    pub fn has_formatting(&self) -> bool {
        self.bold.is_explicit() || self.italic.is_explicit() || self.underline.is_explicit()
    }

    /// Whether the content starts with a space that must be preserved
    pub fn leading_space(&self) -> bool {
        self.content.starts_with(' ')
    }

    /// Whether the content ends with a space that must be preserved
    pub fn trailing_space(&self) -> bool {
        self.content.ends_with(' ')
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Text::new(value)
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Text::new(value)
    }
}

/// Auto-incrementing sequence field ("Table 3", "Figure 7")
///
/// The displayed value is computed at render time by counting the earlier
/// occurrences of the same sequence name in the target document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    /// Sequence name
    pub name: String,
    #[serde(default)]
    pub bold: Toggle,
    #[serde(default)]
    pub italic: Toggle,
    #[serde(default)]
    pub underline: Underline,
}

impl Counter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bold: Toggle::Inherit,
            italic: Toggle::Inherit,
            underline: Underline::Inherit,
        }
    }

    /// Build the text run showing the given counter value
    pub fn display(&self, value: usize) -> Text {
        Text {
            content: value.to_string(),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
        }
    }
}

/// Inline-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// A formatted text run
    Text(Text),
    /// A sequence counter field
    Counter(Counter),
}

impl Inline {
    /// Plain text of the element (counters have none until rendered)
    pub fn plain_text(&self) -> &str {
        match self {
            Inline::Text(text) => &text.content,
            Inline::Counter(_) => "",
        }
    }
}

impl From<Text> for Inline {
    fn from(value: Text) -> Self {
        Inline::Text(value)
    }
}

impl From<Counter> for Inline {
    fn from(value: Counter) -> Self {
        Inline::Counter(value)
    }
}

impl From<&str> for Inline {
    fn from(value: &str) -> Self {
        Inline::Text(Text::new(value))
    }
}

impl From<String> for Inline {
    fn from(value: String) -> Self {
        Inline::Text(Text::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_from_option() {
        assert_eq!(Toggle::from(None), Toggle::Inherit);
        assert_eq!(Toggle::from(Some(true)), Toggle::On);
        assert_eq!(Toggle::from(Some(false)), Toggle::Off);
    }

    #[test]
    fn test_underline_markers() {
        assert_eq!(Underline::from_marker('_'), Some(Underline::Single));
        assert_eq!(Underline::from_marker('='), Some(Underline::Double));
        assert_eq!(Underline::from_marker(';'), Some(Underline::DotDash));
        assert_eq!(Underline::from_marker('x'), None);
        assert!(!Underline::None.is_visible());
        assert!(Underline::None.is_explicit());
    }

    #[test]
    fn test_text_spaces() {
        let text = Text::new(" hello ");
        assert!(text.leading_space());
        assert!(text.trailing_space());
        assert!(!text.has_formatting());

        let bold = Text::new("x").bold();
        assert_eq!(bold.bold, Toggle::On);
        assert!(bold.has_formatting());
    }

    #[test]
    fn test_counter_display_keeps_formatting() {
        let mut counter = Counter::new("Table");
        counter.bold = Toggle::On;
        let text = counter.display(4);
        assert_eq!(text.content, "4");
        assert_eq!(text.bold, Toggle::On);
    }

    #[test]
    fn test_inline_json_shape() {
        let inline: Inline =
            serde_json::from_str(r#"{"type":"text","content":"hi","bold":"on"}"#).unwrap();
        assert_eq!(inline, Inline::Text(Text::new("hi").bold()));
    }
}
