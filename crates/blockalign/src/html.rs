#![forbid(unsafe_code)]

//! Saved root element of a block and its class list.
//!
//! Blocks handled here save a single element with text content:
//!
//! ```text
//! <div class="wp-block-test-test-align-true alignright">Test Align True</div>
//! ```
//!
//! Class strings are parsed into a [`ClassList`] so alignment detection is a
//! token comparison, never a substring search (`alignnull` must not be read
//! as anything).

use std::collections::BTreeMap;
use std::fmt;

use crate::token::AlignToken;

/// Parsed `class` attribute: ordered, without duplicates or empty tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: Vec<String>,
}

impl ClassList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a `class` attribute value on ASCII whitespace.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut list = Self::new();
        for class in value.split_ascii_whitespace() {
            list.push(class);
        }
        list
    }

    /// Append a class unless already present.
    pub fn push(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !class.is_empty() && !self.contains(&class) {
            self.classes.push(class);
        }
    }

    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Alignment tokens named by `align{token}` classes, in class order.
    pub fn alignments(&self) -> impl Iterator<Item = AlignToken> + '_ {
        self.iter().filter_map(AlignToken::from_class)
    }

    /// Set equality, ignoring order.
    #[must_use]
    pub fn same_set(&self, other: &Self) -> bool {
        self.classes.len() == other.classes.len() && self.iter().all(|c| other.contains(c))
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.classes.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for ClassList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for class in iter {
            list.push(class);
        }
        list
    }
}

/// Element names the root parser reads back: an ASCII letter followed by
/// ASCII letters, digits or `-`. Case is not significant.
#[must_use]
pub fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// A single element with text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootElement {
    pub tag: String,
    pub classes: ClassList,
    /// Attributes other than `class`, by name.
    pub attributes: BTreeMap<String, String>,
    pub text: String,
}

impl RootElement {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Parse `<tag attr="v">text</tag>` (surrounding whitespace ignored).
    ///
    /// Returns `None` for anything else: several elements, nested elements,
    /// a missing close tag.
    #[must_use]
    pub fn parse(html: &str) -> Option<Self> {
        let html = html.trim();
        let rest = html.strip_prefix('<')?;
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '-')
            .unwrap_or(rest.len());
        if tag_len == 0 {
            return None;
        }
        let tag = rest[..tag_len].to_ascii_lowercase();
        let mut rest = &rest[tag_len..];

        let mut element = Self::new(tag);
        loop {
            rest = rest.trim_start();
            if let Some(after) = rest.strip_prefix('>') {
                rest = after;
                break;
            }
            let name_len = rest
                .find(|c: char| c.is_ascii_whitespace() || matches!(c, '=' | '>' | '/' | '"' | '\''))
                .unwrap_or(rest.len());
            if name_len == 0 {
                return None;
            }
            let name = rest[..name_len].to_ascii_lowercase();
            rest = rest[name_len..].trim_start();
            let value = if let Some(after) = rest.strip_prefix('=') {
                let (value, after) = take_attribute_value(after.trim_start())?;
                rest = after;
                value
            } else {
                String::new()
            };
            if name == "class" {
                element.classes = ClassList::parse(&value);
            } else {
                element.attributes.insert(name, value);
            }
        }

        let close = format!("</{}>", element.tag);
        let text = rest.strip_suffix(close.as_str())?;
        if text.contains('<') {
            return None;
        }
        element.text = text.to_string();
        Some(element)
    }

    /// Structural equality used by block validation: tag, class set, other
    /// attributes and trimmed text.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.classes.same_set(&other.classes)
            && self.attributes == other.attributes
            && self.text.trim() == other.text.trim()
    }
}

impl fmt::Display for RootElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        if !self.classes.is_empty() {
            write!(f, " class=\"{}\"", self.classes)?;
        }
        for (name, value) in &self.attributes {
            let value = value.replace('&', "&amp;").replace('"', "&quot;");
            write!(f, " {name}=\"{value}\"")?;
        }
        write!(f, ">{}</{}>", self.text, self.tag)
    }
}

fn take_attribute_value(input: &str) -> Option<(String, &str)> {
    match input.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &input[1..];
            let end = body.find(quote)?;
            Some((unescape_attribute(&body[..end]), &body[end + 1..]))
        }
        _ => {
            let end = input
                .find(|c: char| c.is_ascii_whitespace() || c == '>')
                .unwrap_or(input.len());
            Some((unescape_attribute(&input[..end]), &input[end..]))
        }
    }
}

/// Undo the `&amp;` and `&quot;` escapes written by `Display`, in one pass
/// so an escaped `&quot;` stays literal. Other entities are kept as written.
fn unescape_attribute(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        if let Some(after) = rest.strip_prefix("&amp;") {
            out.push('&');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("&quot;") {
            out.push('"');
            rest = after;
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}
