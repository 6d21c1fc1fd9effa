//! Tolerant HTML tree builder
//!
//! Never fails: anything that does not tokenize as markup is kept as text or as
//! a verbatim raw node, so `parse(s).to_html() == s` for every input.
//!
//! Tree construction is deliberately simple: an end tag closes the nearest open
//! element with the same name (implicitly closing everything above it), and a
//! stray end tag with no open match is kept verbatim.

use crate::dom::document::{is_void_tag, Document, Element, NodeId, NodeKind, SourceTags};
use crate::dom::entities::decode;
use crate::dom::PageDom;

/// Elements whose content is not tokenized
const RAW_TEXT_TAGS: [&str; 4] = ["script", "style", "textarea", "title"];

/// A tokenized start tag
#[derive(Debug)]
struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    /// Byte offset just past the closing `>`
    end: usize,
}

/// Parse a page into a [`Document`]
pub fn parse(html: &str) -> Document {
    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let parent = *stack.last().unwrap_or(&doc.root());

        if bytes[i] != b'<' || !is_markup_start(bytes, i) {
            let end = next_markup_start(bytes, i + 1);
            doc.create_node(Some(parent), NodeKind::Text(html[i..end].to_string()));
            i = end;
            continue;
        }

        if starts_with_at(bytes, i, b"<!--") {
            let end = find_subslice(bytes, i + 4, b"-->").map_or(bytes.len(), |p| p + 3);
            doc.create_node(Some(parent), NodeKind::Comment(html[i..end].to_string()));
            i = end;
            continue;
        }

        if bytes[i + 1] == b'!' || bytes[i + 1] == b'?' {
            let end = find_byte(bytes, i + 2, b'>').map_or(bytes.len(), |p| p + 1);
            doc.create_node(Some(parent), NodeKind::Raw(html[i..end].to_string()));
            i = end;
            continue;
        }

        if bytes[i + 1] == b'/' {
            let (name, end) = parse_end_tag(html, i);
            let raw = html[i..end].to_string();
            match stack
                .iter()
                .rposition(|id| *id != doc.root() && doc.tag_name(*id) == Some(name.as_str()))
            {
                Some(pos) => {
                    let closed = stack[pos];
                    stack.truncate(pos);
                    set_end_tag(&mut doc, closed, raw);
                }
                None => {
                    doc.create_node(Some(parent), NodeKind::Raw(raw));
                }
            }
            i = end;
            continue;
        }

        let Some(tag) = parse_start_tag(html, i) else {
            // Unterminated start tag: the rest of the input is text.
            doc.create_node(Some(parent), NodeKind::Text(html[i..].to_string()));
            break;
        };

        let element = Element {
            name: tag.name.clone(),
            attrs: tag.attrs,
            source: Some(SourceTags {
                start: html[i..tag.end].to_string(),
                end: None,
            }),
        };
        let node = doc.create_node(Some(parent), NodeKind::Element(element));
        i = tag.end;

        if tag.self_closing || is_void_tag(&tag.name) {
            continue;
        }

        if RAW_TEXT_TAGS.contains(&tag.name.as_str()) {
            match find_end_tag(bytes, i, tag.name.as_bytes()) {
                Some(close) => {
                    if close > i {
                        doc.create_node(Some(node), NodeKind::Text(html[i..close].to_string()));
                    }
                    let (_, end) = parse_end_tag(html, close);
                    set_end_tag(&mut doc, node, html[close..end].to_string());
                    i = end;
                }
                None => {
                    if i < bytes.len() {
                        doc.create_node(Some(node), NodeKind::Text(html[i..].to_string()));
                    }
                    i = bytes.len();
                }
            }
            continue;
        }

        stack.push(node);
    }

    doc
}

fn set_end_tag(doc: &mut Document, node: NodeId, raw: String) {
    if let Some(source) = doc.element_mut(node).and_then(|e| e.source.as_mut()) {
        source.end = Some(raw);
    }
}

/// Whether `<` at `at` begins a comment, doctype, processing instruction or tag
fn is_markup_start(bytes: &[u8], at: usize) -> bool {
    match bytes.get(at + 1) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'!' || *b == b'?' => true,
        Some(b'/') => bytes.get(at + 2).is_some_and(|b| b.is_ascii_alphabetic()),
        _ => false,
    }
}

fn next_markup_start(bytes: &[u8], from: usize) -> usize {
    let mut j = from;
    while j < bytes.len() {
        if bytes[j] == b'<' && is_markup_start(bytes, j) {
            return j;
        }
        j += 1;
    }
    bytes.len()
}

/// Parse `<name attr=value ...>` at `at`; `None` if the input ends first
fn parse_start_tag(html: &str, at: usize) -> Option<StartTag> {
    let bytes = html.as_bytes();
    let mut i = at + 1;

    let name_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let name = html[name_start..i].to_ascii_lowercase();

    let mut attrs: Vec<(String, String)> = Vec::new();
    loop {
        skip_ws(bytes, &mut i);
        match bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                    end: i + 1,
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                    end: i + 2,
                });
            }
            b'/' | b'=' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        let attr_name = html[attr_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, &mut i)?
        } else {
            String::new()
        };

        // First occurrence wins, as in browsers.
        if !attrs.iter().any(|(k, _)| *k == attr_name) {
            attrs.push((attr_name, value));
        }
    }
}

fn parse_attr_value(html: &str, i: &mut usize) -> Option<String> {
    let bytes = html.as_bytes();
    let quote = *bytes.get(*i)?;

    if quote == b'"' || quote == b'\'' {
        let start = *i + 1;
        let close = find_byte(bytes, start, quote)?;
        *i = close + 1;
        return Some(decode(&html[start..close]));
    }

    let start = *i;
    while *i < bytes.len() && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b'>' {
        *i += 1;
    }
    Some(decode(&html[start..*i]))
}

/// Parse `</name ...>` at `at`, returning the lowercase name and the offset past it.
/// An unterminated end tag runs to the end of input.
fn parse_end_tag(html: &str, at: usize) -> (String, usize) {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    let name_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let name = html[name_start..i].to_ascii_lowercase();
    let end = find_byte(bytes, i, b'>').map_or(bytes.len(), |p| p + 1);
    (name, end)
}

/// Offset of the `</tag` that closes a raw text element
fn find_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + 2 + tag.len() <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + tag.len()].eq_ignore_ascii_case(tag)
            && bytes
                .get(i + 2 + tag.len())
                .map_or(true, |b| !is_tag_char(*b))
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_attr_name_char(b: u8) -> bool {
    !(b.is_ascii_whitespace() || b == b'/' || b == b'>' || b == b'=')
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes.get(at..at + needle.len()) == Some(needle)
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|b| *b == needle)
        .map(|p| p + from)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}
