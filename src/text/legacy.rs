//! Legacy `&`-code text
//!
//! Parses text such as `&aHello &lworld` into a [`Component`] and encodes
//! components back into that form for delivery logs.

use super::{Component, Decoration, NamedColor, TextColor};

/// Marker used by configuration files
pub const AMPERSAND: char = '&';

/// Reset code
const RESET: char = 'r';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Style {
    color: Option<TextColor>,
    decorations: [bool; 5],
}

impl Style {
    fn with_color(color: TextColor) -> Self {
        Self {
            color: Some(color),
            decorations: [false; 5],
        }
    }

    fn set(&mut self, decoration: Decoration) {
        self.decorations[decoration_slot(decoration)] = true;
    }

    fn has(&self, decoration: Decoration) -> bool {
        self.decorations[decoration_slot(decoration)]
    }

    fn apply(&self, text: String) -> Component {
        let mut component = Component::text(text);
        component.color = self.color;
        for decoration in Decoration::all() {
            if self.has(decoration) {
                component = component.with_decoration(decoration, true);
            }
        }
        component
    }

    fn is_plain(&self) -> bool {
        self.color.is_none() && !self.decorations.iter().any(|d| *d)
    }
}

fn decoration_slot(decoration: Decoration) -> usize {
    match decoration {
        Decoration::Obfuscated => 0,
        Decoration::Bold => 1,
        Decoration::Strikethrough => 2,
        Decoration::Underlined => 3,
        Decoration::Italic => 4,
    }
}

/// Parse legacy text with the given format marker
///
/// Color codes start a new segment and clear decorations, decoration codes
/// add to the current style, `r` resets. A marker followed by anything else,
/// or at the end of the input, is kept as literal text. `&#rrggbb` selects a
/// hex color.
pub fn parse(input: &str, marker: char) -> Component {
    let mut segments = Vec::new();
    let mut style = Style::default();
    let mut buffer = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != marker {
            buffer.push(c);
            continue;
        }

        let Some(&code) = chars.peek() else {
            buffer.push(c);
            break;
        };

        if code == '#' {
            let hex: String = chars.clone().skip(1).take(6).collect();
            match parse_hex(&hex) {
                Some(rgb) => {
                    // consume '#' and the six digits
                    for _ in 0..7 {
                        chars.next();
                    }
                    flush(&mut segments, &mut buffer, style);
                    style = Style::with_color(TextColor::Hex(rgb));
                }
                None => buffer.push(c),
            }
            continue;
        }

        if let Some(color) = NamedColor::from_code(code) {
            chars.next();
            flush(&mut segments, &mut buffer, style);
            style = Style::with_color(TextColor::Named(color));
        } else if let Some(decoration) = Decoration::from_code(code) {
            chars.next();
            flush(&mut segments, &mut buffer, style);
            style.set(decoration);
        } else if code.eq_ignore_ascii_case(&RESET) {
            chars.next();
            flush(&mut segments, &mut buffer, style);
            style = Style::default();
        } else {
            buffer.push(c);
        }
    }
    flush(&mut segments, &mut buffer, style);

    match segments.len() {
        0 => Component::default(),
        1 => segments.remove(0),
        _ => Component {
            extra: segments,
            ..Default::default()
        },
    }
}

fn parse_hex(hex: &str) -> Option<u32> {
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn flush(segments: &mut Vec<Component>, buffer: &mut String, style: Style) {
    if !buffer.is_empty() {
        segments.push(style.apply(std::mem::take(buffer)));
    }
}

/// Encode a component tree as legacy text
///
/// Children inherit the parent's color and decorations unless they override
/// them. Hover and click data have no legacy form and are dropped.
pub fn serialize(component: &Component, marker: char) -> String {
    let mut out = String::new();
    let mut emitted = Style::default();
    write_node(component, Style::default(), marker, &mut emitted, &mut out);
    out
}

fn write_node(
    component: &Component,
    inherited: Style,
    marker: char,
    emitted: &mut Style,
    out: &mut String,
) {
    let mut style = inherited;
    if let Some(color) = component.color {
        style.color = Some(color);
    }
    for decoration in Decoration::all() {
        match component.decoration(decoration) {
            Some(true) => style.set(decoration),
            Some(false) => style.decorations[decoration_slot(decoration)] = false,
            None => {}
        }
    }

    if !component.text.is_empty() {
        if style != *emitted {
            write_style(style, marker, out);
            *emitted = style;
        }
        out.push_str(&component.text);
    }

    for child in &component.extra {
        write_node(child, style, marker, emitted, out);
    }
}

fn write_style(style: Style, marker: char, out: &mut String) {
    match style.color {
        Some(TextColor::Named(color)) => {
            out.push(marker);
            out.push(color.code());
        }
        Some(TextColor::Hex(rgb)) => {
            out.push(marker);
            out.push_str(&format!("#{rgb:06x}"));
        }
        None => {
            out.push(marker);
            out.push(RESET);
        }
    }
    if style.is_plain() {
        return;
    }
    for decoration in Decoration::all() {
        if style.has(decoration) {
            out.push(marker);
            out.push(decoration.code());
        }
    }
}
