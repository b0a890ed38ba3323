//! Rich-text component model
//!
//! Messages are delivered to players as [`Component`] trees, the JSON chat
//! format understood by the proxy. A component carries its own text, an
//! optional color, optional decorations and a list of child components that
//! inherit its style.
//!
//! Two front-ends build components:
//!
//! - [`Component::from_json`] for structured templates (`{"text":"hi"}`)
//! - [`legacy::parse`] for `&`-coded plain text (`&aHello &lworld`)

pub mod legacy;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// Colors
// ============================================================================

/// The sixteen legacy chat colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl NamedColor {
    /// Get all named colors in legacy code order
    pub fn all() -> [Self; 16] {
        [
            Self::Black,
            Self::DarkBlue,
            Self::DarkGreen,
            Self::DarkAqua,
            Self::DarkRed,
            Self::DarkPurple,
            Self::Gold,
            Self::Gray,
            Self::DarkGray,
            Self::Blue,
            Self::Green,
            Self::Aqua,
            Self::Red,
            Self::LightPurple,
            Self::Yellow,
            Self::White,
        ]
    }

    /// JSON name of the color
    pub fn name(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::DarkBlue => "dark_blue",
            Self::DarkGreen => "dark_green",
            Self::DarkAqua => "dark_aqua",
            Self::DarkRed => "dark_red",
            Self::DarkPurple => "dark_purple",
            Self::Gold => "gold",
            Self::Gray => "gray",
            Self::DarkGray => "dark_gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Red => "red",
            Self::LightPurple => "light_purple",
            Self::Yellow => "yellow",
            Self::White => "white",
        }
    }

    /// Legacy format code (`0`-`9`, `a`-`f`)
    pub fn code(&self) -> char {
        let index = Self::all()
            .iter()
            .position(|c| c == self)
            .unwrap_or_default();
        char::from_digit(index as u32, 16).unwrap_or('f')
    }

    /// Parse from a legacy format code, case-insensitive
    pub fn from_code(code: char) -> Option<Self> {
        let index = code.to_digit(16)?;
        Self::all().get(index as usize).copied()
    }

    /// Parse from the JSON name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.name() == name)
    }
}

/// Text color, either one of the named colors or a 24-bit RGB value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextColor {
    Named(NamedColor),
    Hex(u32),
}

impl TryFrom<String> for TextColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if let Some(hex) = value.strip_prefix('#') {
            if hex.len() == 6 {
                if let Ok(rgb) = u32::from_str_radix(hex, 16) {
                    return Ok(Self::Hex(rgb));
                }
            }
            return Err(format!("invalid hex color: {value}"));
        }
        NamedColor::from_name(&value)
            .map(Self::Named)
            .ok_or_else(|| format!("unknown color: {value}"))
    }
}

impl From<TextColor> for String {
    fn from(color: TextColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => write!(f, "{}", named.name()),
            Self::Hex(rgb) => write!(f, "#{rgb:06x}"),
        }
    }
}

// ============================================================================
// Decorations
// ============================================================================

/// Text decorations that can be toggled on a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decoration {
    Obfuscated,
    Bold,
    Strikethrough,
    Underlined,
    Italic,
}

impl Decoration {
    pub fn all() -> [Self; 5] {
        [
            Self::Obfuscated,
            Self::Bold,
            Self::Strikethrough,
            Self::Underlined,
            Self::Italic,
        ]
    }

    /// Legacy format code (`k`-`o`)
    pub fn code(&self) -> char {
        match self {
            Self::Obfuscated => 'k',
            Self::Bold => 'l',
            Self::Strikethrough => 'm',
            Self::Underlined => 'n',
            Self::Italic => 'o',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'k' => Some(Self::Obfuscated),
            'l' => Some(Self::Bold),
            'm' => Some(Self::Strikethrough),
            'n' => Some(Self::Underlined),
            'o' => Some(Self::Italic),
            _ => None,
        }
    }
}

// ============================================================================
// Component
// ============================================================================

/// A node of a rich-text document
///
/// Keys the model does not interpret (`translate`, `clickEvent`,
/// `hoverEvent`, `font`, ...) are kept in [`Component::other`] and written
/// back unchanged on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TextColor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlined: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfuscated: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_children"
    )]
    pub extra: Vec<Component>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Component {
    /// Create a plain text component
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: TextColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Set a decoration flag
    pub fn with_decoration(mut self, decoration: Decoration, state: bool) -> Self {
        *self.decoration_mut(decoration) = Some(state);
        self
    }

    /// Append a child component
    pub fn append(mut self, child: Component) -> Self {
        self.extra.push(child);
        self
    }

    /// Get the explicit state of a decoration, `None` if inherited
    pub fn decoration(&self, decoration: Decoration) -> Option<bool> {
        match decoration {
            Decoration::Obfuscated => self.obfuscated,
            Decoration::Bold => self.bold,
            Decoration::Strikethrough => self.strikethrough,
            Decoration::Underlined => self.underlined,
            Decoration::Italic => self.italic,
        }
    }

    fn decoration_mut(&mut self, decoration: Decoration) -> &mut Option<bool> {
        match decoration {
            Decoration::Obfuscated => &mut self.obfuscated,
            Decoration::Bold => &mut self.bold,
            Decoration::Strikethrough => &mut self.strikethrough,
            Decoration::Underlined => &mut self.underlined,
            Decoration::Italic => &mut self.italic,
        }
    }

    /// True when neither this node nor any child has text
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.extra.iter().all(Component::is_empty)
    }

    /// Parse a JSON document into a component
    ///
    /// Objects map directly onto the model. Arrays use their first element
    /// as the parent and append the rest as children. Scalars become plain
    /// text.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    /// Convert an already parsed JSON value into a component
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(_) => serde_json::from_value(value),
            Value::Array(items) => {
                let mut items = items.into_iter();
                let mut parent = match items.next() {
                    Some(first) => Self::from_value(first)?,
                    None => return Ok(Self::default()),
                };
                for item in items {
                    parent.extra.push(Self::from_value(item)?);
                }
                Ok(parent)
            }
            Value::String(text) => Ok(Self::text(text)),
            Value::Number(number) => Ok(Self::text(number.to_string())),
            Value::Bool(flag) => Ok(Self::text(flag.to_string())),
            Value::Null => Ok(Self::default()),
        }
    }

    /// Serialize to the JSON chat format
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Concatenate the text of this node and all children, dropping styles
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        self.collect_plain(&mut out);
        out
    }

    fn collect_plain(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.extra {
            child.collect_plain(out);
        }
    }

    /// Re-encode as legacy text using `marker` as the format prefix
    pub fn to_legacy(&self, marker: char) -> String {
        legacy::serialize(self, marker)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain())
    }
}

fn deserialize_children<'de, D>(deserializer: D) -> Result<Vec<Component>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(Component::from_value)
        .collect::<Result<_, _>>()
        .map_err(serde::de::Error::custom)
}

// ============================================================================
// Tests
// ============================================================================
