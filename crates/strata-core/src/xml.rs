//! # XML Element Tree
//!
//! An owned, ElementTree-style model of an XML document: each element has
//! a tag name, an ordered attribute list, ordered children, an optional
//! `text` (content before the first child) and an optional `tail`
//! (content after the element's end tag, before the next sibling).
//!
//! Parsing is driven by the `quick-xml` event reader and enforces
//! well-formedness: exactly one root element, balanced and matching tags,
//! unique attributes, valid entity references, and no character data
//! outside the root. Comments, processing instructions, the XML
//! declaration and the doctype are dropped, so text split by a comment is
//! rejoined.
//!
//! Documents nested deeper than [`MAX_DEPTH`] elements are rejected, so
//! the recursive passes over a parsed tree stay within the stack.
//!
//! Qualified names are kept verbatim (`xs:element`, `xmlns:xs`); the tree
//! does no namespace resolution.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::XmlError;

/// Maximum element nesting accepted by [`XmlNode::parse`].
pub const MAX_DEPTH: usize = 256;

/// A single XML element and everything nested inside it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XmlNode {
    /// Tag name, including any namespace prefix.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Character data before the first child element.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
    /// Character data following this element's end tag.
    pub tail: Option<String>,
}

impl XmlNode {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a complete document and return its root element.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] positioned at the first well-formedness violation.
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let event_start = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                XmlError::at_offset(e.to_string(), source, reader.buffer_position() as usize)
            })?;

            match event {
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(junk_after_root(source, event_start));
                    }
                    check_depth(stack.len(), source, event_start)?;
                    stack.push(element_from_start(&start, source, event_start)?);
                }
                Event::Empty(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(junk_after_root(source, event_start));
                    }
                    check_depth(stack.len(), source, event_start)?;
                    let node = element_from_start(&start, source, event_start)?;
                    close_element(node, &mut stack, &mut root);
                }
                Event::End(_) => {
                    let node = stack.pop().ok_or_else(|| {
                        XmlError::at_offset("unexpected end tag", source, event_start)
                    })?;
                    close_element(node, &mut stack, &mut root);
                }
                Event::Text(text) => {
                    let content = text.unescape().map_err(|e| {
                        XmlError::at_offset(e.to_string(), source, event_start)
                    })?;
                    append_character_data(&content, &mut stack, root.is_some(), source, event_start)?;
                }
                Event::CData(cdata) => {
                    let raw = cdata.into_inner();
                    let content = std::str::from_utf8(&raw).map_err(|e| {
                        XmlError::at_offset(format!("invalid UTF-8 in CDATA: {e}"), source, event_start)
                    })?;
                    append_character_data(content, &mut stack, root.is_some(), source, event_start)?;
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::at_offset(
                format!("unclosed token: <{}>", open.name),
                source,
                source.len(),
            ));
        }
        root.ok_or_else(|| XmlError::at_offset("no element found", source, source.len()))
    }

    /// The tag name with any namespace prefix removed.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Look up an attribute value by its exact (possibly prefixed) name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Serialize this element, including its own tail.
    ///
    /// Elements with neither text nor children use the short form `<a />`.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

/// Returns true when `content` is absent or whitespace only.
pub fn is_blank(content: Option<&str>) -> bool {
    content.map_or(true, |s| s.trim().is_empty())
}

/// The part of a qualified name after the namespace prefix.
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn check_depth(open: usize, source: &str, offset: usize) -> Result<(), XmlError> {
    if open >= MAX_DEPTH {
        return Err(XmlError::at_offset(
            format!("document nesting exceeds {MAX_DEPTH} levels"),
            source,
            offset,
        ));
    }
    Ok(())
}

fn junk_after_root(source: &str, offset: usize) -> XmlError {
    XmlError::at_offset("junk after document element", source, offset)
}

fn element_from_start(
    start: &BytesStart<'_>,
    source: &str,
    offset: usize,
) -> Result<XmlNode, XmlError> {
    let name = utf8(start.name().as_ref(), source, offset)?.to_string();
    let mut node = XmlNode::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::at_offset(e.to_string(), source, offset))?;
        let key = utf8(attr.key.as_ref(), source, offset)?.to_string();
        // Attribute-value normalization: literal tab/newline/CR become spaces
        // before entity expansion, so `&#10;` survives as a newline.
        let raw = utf8(&attr.value, source, offset)?.replace(['\t', '\n', '\r'], " ");
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| XmlError::at_offset(e.to_string(), source, offset))?;
        node.attributes.push((key, value.into_owned()));
    }
    Ok(node)
}

fn utf8<'a>(bytes: &'a [u8], source: &str, offset: usize) -> Result<&'a str, XmlError> {
    std::str::from_utf8(bytes)
        .map_err(|e| XmlError::at_offset(format!("invalid UTF-8: {e}"), source, offset))
}

fn close_element(node: XmlNode, stack: &mut [XmlNode], root: &mut Option<XmlNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

fn append_character_data(
    content: &str,
    stack: &mut [XmlNode],
    seen_root: bool,
    source: &str,
    offset: usize,
) -> Result<(), XmlError> {
    let Some(current) = stack.last_mut() else {
        if content.trim().is_empty() {
            return Ok(());
        }
        let message = if seen_root {
            "junk after document element"
        } else {
            "syntax error: character data before root element"
        };
        return Err(XmlError::at_offset(message, source, offset));
    };

    let slot = match current.children.last_mut() {
        Some(last_child) => &mut last_child.tail,
        None => &mut current.text,
    };
    slot.get_or_insert_with(String::new).push_str(content);
    Ok(())
}

fn write_element(node: &XmlNode, out: &mut String) {
    out.push('<');
    out.push_str(&node.name);
    for (key, value) in &node.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }

    let has_text = node.text.as_deref().is_some_and(|t| !t.is_empty());
    if !has_text && node.children.is_empty() {
        out.push_str(" />");
    } else {
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(&escape_text(text));
        }
        for child in &node.children {
            write_element(child, out);
        }
        out.push_str("</");
        out.push_str(&node.name);
        out.push('>');
    }

    if let Some(tail) = &node.tail {
        out.push_str(&escape_text(tail));
    }
}

fn escape_text(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

fn escape_attribute(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\n', '\r', '\t']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#09;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
