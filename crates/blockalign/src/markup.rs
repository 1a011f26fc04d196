#![forbid(unsafe_code)]

//! Block comment delimiter grammar.
//!
//! A serialized document is a sequence of blocks, each wrapped in comment
//! delimiters that carry the block name and its non-default attributes as
//! JSON:
//!
//! ```text
//! <!-- wp:test/test-align-true {"align":"right"} -->
//! <div class="wp-block-test-test-align-true alignright">Test Align True</div>
//! <!-- /wp:test/test-align-true -->
//!
//! <!-- wp:test/empty /-->
//! ```
//!
//! Names in the `core/` namespace are written without it (`wp:paragraph`).
//! Text outside any delimiter becomes a freeform block (no name). Ordinary
//! HTML comments are left inside whatever content surrounds them.
//!
//! Attribute JSON is escaped so that the comment can never be terminated
//! early: inside strings `--`, `<`, `>`, `&` and `\"` are written as unicode
//! escapes.

use serde_json::{Map, Value};

/// Attributes carried by a block delimiter.
pub type Attrs = Map<String, Value>;

const CORE_NAMESPACE: &str = "core/";

/// One block as found in markup, before any block-type interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    /// Fully qualified name; `None` for freeform content.
    pub name: Option<String>,
    pub attrs: Attrs,
    /// Content between the delimiters, untrimmed.
    pub inner_html: String,
    /// The block exactly as it appeared, delimiters included.
    pub source: String,
}

impl RawBlock {
    #[must_use]
    pub fn is_freeform(&self) -> bool {
        self.name.is_none()
    }
}

/// Markup that cannot be split into blocks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("block `{name}` opened at byte {offset} is never closed")]
    Unclosed { name: String, offset: usize },

    #[error("closing delimiter for `{name}` at byte {offset} has no opener")]
    UnexpectedCloser { name: String, offset: usize },

    #[error("block `{expected}` closed by `{found}` at byte {offset}")]
    MismatchedCloser {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("block `{child}` nested inside `{parent}` at byte {offset} is not supported")]
    NestedBlock {
        parent: String,
        child: String,
        offset: usize,
    },

    #[error("malformed block delimiter at byte {offset}: {reason}")]
    MalformedDelimiter { offset: usize, reason: String },

    #[error("unterminated comment at byte {offset}")]
    UnterminatedComment { offset: usize },
}

/// Delimiter spelling of a block name (`core/` dropped).
#[must_use]
pub fn delimiter_name(name: &str) -> &str {
    name.strip_prefix(CORE_NAMESPACE).unwrap_or(name)
}

/// Fully qualified name from a delimiter spelling.
#[must_use]
pub fn qualified_name(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{CORE_NAMESPACE}{name}")
    }
}

/// Class every saved block root carries: `wp-block-{namespace}-{name}`,
/// with the `core/` namespace omitted.
#[must_use]
pub fn block_class_name(name: &str) -> String {
    format!("wp-block-{}", delimiter_name(name).replace('/', "-"))
}

/// Whether `name` is a valid `namespace/name` block name.
#[must_use]
pub fn is_valid_block_name(name: &str) -> bool {
    let mut parts = name.split('/');
    let (Some(namespace), Some(local), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    is_name_segment(namespace) && is_name_segment(local)
}

fn is_name_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Serialize delimiter attributes as escaped JSON.
#[must_use]
pub fn serialize_attributes(attrs: &Attrs) -> String {
    escape_attribute_json(&Value::Object(attrs.clone()).to_string())
}

/// Serialize one block.
///
/// Empty content produces a void delimiter.
#[must_use]
pub fn serialize_block(name: &str, attrs: &Attrs, inner_html: &str) -> String {
    let name = delimiter_name(name);
    let attrs = if attrs.is_empty() {
        String::new()
    } else {
        format!("{} ", serialize_attributes(attrs))
    };
    if inner_html.is_empty() {
        format!("<!-- wp:{name} {attrs}/-->")
    } else {
        format!("<!-- wp:{name} {attrs}-->\n{inner_html}\n<!-- /wp:{name} -->")
    }
}

/// Escape characters in JSON string literals that could end or confuse an
/// HTML comment. Only string contents are touched; the structure is left
/// as serde_json wrote it.
fn escape_attribute_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        match c {
            '\\' => match chars.next() {
                Some('"') => out.push_str("\\u0022"),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '"' => {
                in_string = false;
                out.push('"');
            }
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                out.push_str("\\u002d\\u002d");
            }
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug)]
enum DelimiterKind {
    Opener,
    Closer,
    Void,
}

#[derive(Debug)]
struct Delimiter {
    kind: DelimiterKind,
    name: String,
    attrs: Attrs,
}

/// Interpret a comment body. `Ok(None)` means an ordinary comment.
fn parse_delimiter(body: &str, offset: usize) -> Result<Option<Delimiter>, MarkupError> {
    let malformed = |reason: &str| MarkupError::MalformedDelimiter {
        offset,
        reason: reason.to_string(),
    };

    let body = body.trim();
    let (closer, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let Some(body) = body.strip_prefix("wp:") else {
        return Ok(None);
    };

    let name_len = body
        .find(|c: char| {
            !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '/'))
        })
        .unwrap_or(body.len());
    let (raw_name, rest) = body.split_at(name_len);
    let (raw_name, mut rest) = match raw_name.strip_suffix('/') {
        Some(stripped) if rest.is_empty() => (stripped, "/"),
        _ => (raw_name, rest),
    };
    let qualified = qualified_name(raw_name);
    if !is_valid_block_name(&qualified) {
        return Err(malformed(&format!("invalid block name {raw_name:?}")));
    }

    rest = rest.trim();
    let void = match rest.strip_suffix('/') {
        Some(stripped) => {
            rest = stripped.trim_end();
            true
        }
        None => false,
    };

    if closer {
        if void || !rest.is_empty() {
            return Err(malformed("closing delimiter carries attributes"));
        }
        return Ok(Some(Delimiter {
            kind: DelimiterKind::Closer,
            name: qualified,
            attrs: Attrs::new(),
        }));
    }

    let attrs = if rest.is_empty() {
        Attrs::new()
    } else {
        match serde_json::from_str::<Value>(rest) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(malformed("attributes are not a JSON object")),
            Err(err) => return Err(malformed(&format!("attributes: {err}"))),
        }
    };

    Ok(Some(Delimiter {
        kind: if void {
            DelimiterKind::Void
        } else {
            DelimiterKind::Opener
        },
        name: qualified,
        attrs,
    }))
}

struct OpenBlock {
    name: String,
    attrs: Attrs,
    start: usize,
    inner_start: usize,
}

/// Split a document into blocks.
///
/// # Errors
///
/// Returns a [`MarkupError`] for unbalanced or malformed delimiters and for
/// nested blocks.
pub fn parse_document(markup: &str) -> Result<Vec<RawBlock>, MarkupError> {
    let mut blocks = Vec::new();
    let mut open: Option<OpenBlock> = None;
    let mut cursor = 0;
    let mut search = 0;

    while let Some(found) = markup[search..].find("<!--") {
        let comment_start = search + found;
        let body_start = comment_start + 4;
        let Some(body_len) = markup[body_start..].find("-->") else {
            return Err(MarkupError::UnterminatedComment {
                offset: comment_start,
            });
        };
        let comment_end = body_start + body_len + 3;
        search = comment_end;

        let Some(delimiter) = parse_delimiter(&markup[body_start..body_start + body_len], comment_start)?
        else {
            continue;
        };

        match (delimiter.kind, open.take()) {
            (DelimiterKind::Opener | DelimiterKind::Void, Some(parent)) => {
                return Err(MarkupError::NestedBlock {
                    parent: parent.name,
                    child: delimiter.name,
                    offset: comment_start,
                });
            }
            (DelimiterKind::Closer, None) => {
                return Err(MarkupError::UnexpectedCloser {
                    name: delimiter.name,
                    offset: comment_start,
                });
            }
            (DelimiterKind::Opener, None) => {
                push_freeform(&mut blocks, &markup[cursor..comment_start]);
                open = Some(OpenBlock {
                    name: delimiter.name,
                    attrs: delimiter.attrs,
                    start: comment_start,
                    inner_start: comment_end,
                });
            }
            (DelimiterKind::Void, None) => {
                push_freeform(&mut blocks, &markup[cursor..comment_start]);
                blocks.push(RawBlock {
                    name: Some(delimiter.name),
                    attrs: delimiter.attrs,
                    inner_html: String::new(),
                    source: markup[comment_start..comment_end].to_string(),
                });
                cursor = comment_end;
            }
            (DelimiterKind::Closer, Some(current)) => {
                if current.name != delimiter.name {
                    return Err(MarkupError::MismatchedCloser {
                        expected: current.name,
                        found: delimiter.name,
                        offset: comment_start,
                    });
                }
                blocks.push(RawBlock {
                    name: Some(current.name),
                    attrs: current.attrs,
                    inner_html: markup[current.inner_start..comment_start].to_string(),
                    source: markup[current.start..comment_end].to_string(),
                });
                cursor = comment_end;
            }
        }
    }

    if let Some(current) = open {
        return Err(MarkupError::Unclosed {
            name: current.name,
            offset: current.start,
        });
    }
    push_freeform(&mut blocks, &markup[cursor..]);
    Ok(blocks)
}

fn push_freeform(blocks: &mut Vec<RawBlock>, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    blocks.push(RawBlock {
        name: None,
        attrs: Attrs::new(),
        inner_html: text.to_string(),
        source: text.trim().to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attrs {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn names() {
        assert_eq!(delimiter_name("core/paragraph"), "paragraph");
        assert_eq!(delimiter_name("test/test-align-true"), "test/test-align-true");
        assert_eq!(qualified_name("paragraph"), "core/paragraph");
        assert_eq!(qualified_name("test/x"), "test/x");
        assert_eq!(
            block_class_name("test/test-align-true"),
            "wp-block-test-test-align-true"
        );
        assert_eq!(block_class_name("core/paragraph"), "wp-block-paragraph");
    }

    #[test]
    fn block_name_validation() {
        assert!(is_valid_block_name("test/test-align-true"));
        assert!(is_valid_block_name("core/p2"));
        assert!(!is_valid_block_name("test"));
        assert!(!is_valid_block_name("a/b/c"));
        assert!(!is_valid_block_name("Test/x"));
        assert!(!is_valid_block_name("test/"));
        assert!(!is_valid_block_name("9a/x"));
    }

    #[test]
    fn serializes_block_with_attributes() {
        let out = serialize_block(
            "test/test-align-true",
            &attrs(json!({"align": "right"})),
            "<div class=\"wp-block-test-test-align-true alignright\">T</div>",
        );
        assert_eq!(
            out,
            "<!-- wp:test/test-align-true {\"align\":\"right\"} -->\n\
             <div class=\"wp-block-test-test-align-true alignright\">T</div>\n\
             <!-- /wp:test/test-align-true -->"
        );
    }

    #[test]
    fn serializes_null_attribute() {
        let out = serialize_block("test/x", &attrs(json!({"align": null})), "<p>T</p>");
        assert!(out.starts_with("<!-- wp:test/x {\"align\":null} -->"));
    }

    #[test]
    fn serializes_void_and_core_blocks() {
        assert_eq!(
            serialize_block("core/separator", &Attrs::new(), ""),
            "<!-- wp:separator /-->"
        );
    }

    #[test]
    fn escapes_comment_breaking_characters() {
        let out = serialize_attributes(&attrs(json!({"t": "a-->b <i> & \"q\" --"})));
        assert!(!out.contains("--"));
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert!(!out.contains('&'));
        assert!(!out.contains("\\\""));
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back["t"], "a-->b <i> & \"q\" --");
    }

    #[test]
    fn escaping_keeps_trailing_backslash_strings_intact() {
        let original = attrs(json!({"path": "C:\\", "n": -1}));
        let out = serialize_attributes(&original);
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back, Value::Object(original));
    }

    #[test]
    fn parses_single_block() {
        let doc = "<!-- wp:test/test-align-true {\"align\":\"right\"} -->\n\
                   <div class=\"alignright\">T</div>\n\
                   <!-- /wp:test/test-align-true -->";
        let blocks = parse_document(doc).unwrap();
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.name.as_deref(), Some("test/test-align-true"));
        assert_eq!(block.attrs.get("align"), Some(&json!("right")));
        assert_eq!(block.inner_html.trim(), "<div class=\"alignright\">T</div>");
        assert_eq!(block.source, doc);
    }

    #[test]
    fn parses_void_core_and_freeform() {
        let doc = "intro text\n<!-- wp:separator /-->\n<!-- just a comment -->\n<!-- wp:test/a {\"k\":1} /-->";
        let blocks = parse_document(doc).unwrap();
        assert_eq!(blocks.len(), 4);
        assert!(blocks[0].is_freeform());
        assert_eq!(blocks[0].source, "intro text");
        assert_eq!(blocks[1].name.as_deref(), Some("core/separator"));
        assert!(blocks[2].is_freeform());
        assert_eq!(blocks[2].source, "<!-- just a comment -->");
        assert_eq!(blocks[3].name.as_deref(), Some("test/a"));
        assert_eq!(blocks[3].attrs.get("k"), Some(&json!(1)));
    }

    #[test]
    fn void_without_space_before_slash() {
        let blocks = parse_document("<!-- wp:test/a/-->").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name.as_deref(), Some("test/a"));
    }

    #[test]
    fn whitespace_only_document_has_no_blocks() {
        assert!(parse_document("").unwrap().is_empty());
        assert!(parse_document("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn unbalanced_delimiters_are_errors() {
        assert!(matches!(
            parse_document("<!-- wp:test/a -->x"),
            Err(MarkupError::Unclosed { .. })
        ));
        assert!(matches!(
            parse_document("x<!-- /wp:test/a -->"),
            Err(MarkupError::UnexpectedCloser { .. })
        ));
        assert!(matches!(
            parse_document("<!-- wp:test/a -->x<!-- /wp:test/b -->"),
            Err(MarkupError::MismatchedCloser { .. })
        ));
        assert!(matches!(
            parse_document("<!-- wp:test/a --><!-- wp:test/b /--><!-- /wp:test/a -->"),
            Err(MarkupError::NestedBlock { .. })
        ));
        assert!(matches!(
            parse_document("<!-- wp:test/a "),
            Err(MarkupError::UnterminatedComment { offset: 0 })
        ));
    }

    #[test]
    fn malformed_attributes_are_errors() {
        assert!(matches!(
            parse_document("<!-- wp:test/a [1] /-->"),
            Err(MarkupError::MalformedDelimiter { .. })
        ));
        assert!(matches!(
            parse_document("<!-- wp:test/a {\"align\": } /-->"),
            Err(MarkupError::MalformedDelimiter { .. })
        ));
        assert!(matches!(
            parse_document("<!-- wp:Test/A /-->"),
            Err(MarkupError::MalformedDelimiter { .. })
        ));
    }

    #[test]
    fn escaped_attributes_parse_back() {
        let original = attrs(json!({"align": "left", "note": "x--y<z>"}));
        let doc = serialize_block("test/a", &original, "<p>T</p>");
        let blocks = parse_document(&doc).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].attrs, original);
    }
}
