//! Conversion from raw serialized graph sources to structured records
//!
//! The extraction system serializes its graph as GraphML. Conversion sits
//! behind [`SourceConverter`] so the pipeline never depends on the wire
//! format; the built-in [`GraphmlConverter`] covers the subset the
//! extraction system emits (a `<key>` table mapping data keys to attribute
//! names, then `<node>`/`<edge>` elements with `<data>` payloads), without
//! pulling in a full XML dependency.

use crate::record::{Edge, GraphRecord, Node};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from converting a raw serialized source
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    #[error("not a graphml document")]
    NotGraphml,

    #[error("malformed graphml: {0}")]
    Malformed(String),
}

/// Converts raw serialized graph bytes into a structured record.
///
/// Implementations are pure: same input, same output, no I/O.
pub trait SourceConverter: Send + Sync {
    fn convert(&self, raw: &str) -> Result<GraphRecord, ConvertError>;
}

/// Built-in converter for GraphML as written by the extraction system.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphmlConverter;

impl GraphmlConverter {
    pub fn new() -> Self {
        Self
    }
}

impl SourceConverter for GraphmlConverter {
    fn convert(&self, raw: &str) -> Result<GraphRecord, ConvertError> {
        parse_graphml(raw)
    }
}

/// Which element domain a `<key>` declaration applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KeyDomain {
    Node,
    Edge,
}

/// Element currently being populated with `<data>` payloads
enum OpenElement {
    Node(Node),
    Edge(Edge),
}

#[derive(Default)]
struct Parser {
    /// (domain, key id) -> attribute name, from `<key>` declarations
    keys: HashMap<(KeyDomain, String), String>,
    record: GraphRecord,
    open: Option<OpenElement>,
    saw_graphml: bool,
}

fn parse_graphml(raw: &str) -> Result<GraphRecord, ConvertError> {
    let mut parser = Parser::default();
    let mut rest = raw;

    while let Some(start) = rest.find('<') {
        rest = &rest[start..];
        if let Some(skipped) = skip_non_element(rest) {
            rest = skipped;
            continue;
        }

        let (tag, after_tag) = read_tag(rest)?;
        rest = after_tag;

        if tag.closing {
            parser.close(&tag.name);
            continue;
        }

        // <data> carries text content up to its closing tag.
        if tag.name == "data" && !tag.self_closing {
            let text_end = rest
                .find('<')
                .ok_or_else(|| ConvertError::Malformed("unterminated data element".into()))?;
            let text = unescape(&rest[..text_end]);
            rest = &rest[text_end..];
            parser.data(&tag, text);
            continue;
        }

        parser.open(&tag);
        if tag.self_closing {
            parser.close(&tag.name);
        }
    }

    if !parser.saw_graphml {
        return Err(ConvertError::NotGraphml);
    }
    Ok(parser.record)
}

impl Parser {
    fn open(&mut self, tag: &Tag) {
        match tag.name.as_str() {
            "graphml" => self.saw_graphml = true,
            "key" => {
                let domain = match tag.attr("for") {
                    Some("node") => KeyDomain::Node,
                    Some("edge") => KeyDomain::Edge,
                    _ => return,
                };
                if let (Some(id), Some(name)) = (tag.attr("id"), tag.attr("attr.name")) {
                    self.keys.insert((domain, id.to_string()), name.to_string());
                }
            }
            "node" => {
                let id = tag.attr("id").unwrap_or("").to_string();
                self.open = Some(OpenElement::Node(Node::new(id)));
            }
            "edge" => {
                let source = tag.attr("source").unwrap_or("");
                let target = tag.attr("target").unwrap_or("");
                self.open = Some(OpenElement::Edge(Edge::new(source, target)));
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match (name, self.open.take()) {
            ("node", Some(OpenElement::Node(node))) => self.record.nodes.push(node),
            ("edge", Some(OpenElement::Edge(edge))) => self.record.edges.push(edge),
            (_, open) => self.open = open,
        }
    }

    fn data(&mut self, tag: &Tag, text: String) {
        let Some(key_id) = tag.attr("key") else {
            return;
        };
        let domain = match self.open {
            Some(OpenElement::Node(_)) => KeyDomain::Node,
            Some(OpenElement::Edge(_)) => KeyDomain::Edge,
            None => return,
        };
        let Some(attr_name) = self.keys.get(&(domain, key_id.to_string())) else {
            return;
        };

        match (&mut self.open, attr_name.as_str()) {
            (Some(OpenElement::Node(node)), "description") => node.description = text,
            (Some(OpenElement::Edge(edge)), "description") => edge.description = Some(text),
            (Some(OpenElement::Edge(edge)), "label" | "relation" | "keywords") => {
                edge.label = Some(text)
            }
            (Some(OpenElement::Edge(edge)), "strength") => {
                edge.strength = Some(Value::String(text))
            }
            (Some(OpenElement::Edge(edge)), "weight") => edge.weight = Some(Value::String(text)),
            _ => {}
        }
    }
}

/// A parsed start or end tag
struct Tag {
    name: String,
    attrs: Vec<(String, String)>,
    closing: bool,
    self_closing: bool,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Skip XML declarations, processing instructions, comments, and doctypes.
/// Returns the remainder after the construct, or `None` if `input` starts
/// an ordinary element.
fn skip_non_element(input: &str) -> Option<&str> {
    if let Some(rest) = input.strip_prefix("<!--") {
        let end = rest.find("-->")?;
        return Some(&rest[end + 3..]);
    }
    if input.starts_with("<?") {
        let end = input.find("?>")?;
        return Some(&input[end + 2..]);
    }
    if input.starts_with("<!") {
        let end = input.find('>')?;
        return Some(&input[end + 1..]);
    }
    None
}

/// Read one tag starting at `<`, returning it and the remaining input.
fn read_tag(input: &str) -> Result<(Tag, &str), ConvertError> {
    let end = find_tag_end(input)
        .ok_or_else(|| ConvertError::Malformed("unterminated tag".into()))?;
    let inner = &input[1..end];
    let rest = &input[end + 1..];

    let closing = inner.starts_with('/');
    let inner = inner.strip_prefix('/').unwrap_or(inner);
    let self_closing = inner.ends_with('/');
    let inner = inner.strip_suffix('/').unwrap_or(inner).trim();

    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_string();
    if name.is_empty() {
        return Err(ConvertError::Malformed("empty tag name".into()));
    }

    let attrs = parse_attrs(&inner[name_end..])?;
    Ok((
        Tag {
            name,
            attrs,
            closing,
            self_closing,
        },
        rest,
    ))
}

/// Find the index of the `>` closing the tag that starts at `input[0] == '<'`,
/// respecting quoted attribute values.
fn find_tag_end(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

fn parse_attrs(mut input: &str) -> Result<Vec<(String, String)>, ConvertError> {
    let mut attrs = Vec::new();
    loop {
        input = input.trim_start();
        if input.is_empty() {
            return Ok(attrs);
        }
        let eq = input
            .find('=')
            .ok_or_else(|| ConvertError::Malformed(format!("attribute without value: {}", input)))?;
        let name = input[..eq].trim().to_string();
        input = input[eq + 1..].trim_start();

        let mut chars = input.chars();
        let quote = match chars.next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(ConvertError::Malformed(format!("unquoted attribute: {}", name))),
        };
        let value_end = input[1..]
            .find(quote)
            .ok_or_else(|| ConvertError::Malformed(format!("unterminated attribute: {}", name)))?;
        attrs.push((name, unescape(&input[1..1 + value_end])));
        input = &input[value_end + 2..];
    }
}

/// Decode the predefined XML entities and decimal/hex character references.
fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(semi) = rest.find(';') else {
            out.push_str(rest);
            return out;
        };
        let entity = &rest[1..semi];
        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => {
                let decoded = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32);
                match decoded {
                    Some(c) => out.push(c),
                    None => out.push_str(&rest[..=semi]),
                }
            }
        }
        rest = &rest[semi + 1..];
    }
    out.push_str(rest);
    out
}
