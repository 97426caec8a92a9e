//! # Recursive XML Pretty-Printing
//!
//! Indentation is expressed purely through the ElementTree `text`/`tail`
//! slots: for an element at depth `d`, with `i = "\n" + d * indent`,
//!
//! - an element with children gets blank `text` replaced by `i + indent`
//!   and blank `tail` replaced by `i`, then every child is rewritten at
//!   depth `d + 1`;
//! - a leaf below the root gets blank `tail` replaced by `i`.
//!
//! Text or tail containing anything other than whitespace is left exactly
//! as it was, so mixed content is never altered. Applying the rewrite to
//! its own output changes nothing.

use strata_core::{is_blank, XmlDocument, XmlNode};

use crate::error::FormatError;

/// Indent unit used when a caller does not choose one.
pub const DEFAULT_XML_INDENT: &str = "  ";

/// Pretty-print an XML document using `indent` as the per-level unit.
///
/// # Errors
///
/// Returns [`FormatError::InvalidXml`] if text input is not well-formed.
pub fn format_xml(document: impl Into<XmlDocument>, indent: &str) -> Result<String, FormatError> {
    let root = document.into().into_root()?;
    Ok(prettify(root, indent, 0).to_xml_string())
}

/// Rewrite an owned tree's whitespace-only text and tail for indentation.
pub fn prettify(mut node: XmlNode, indent: &str, depth: usize) -> XmlNode {
    let newline = line_prefix(indent, depth);

    if node.children.is_empty() {
        if depth > 0 && is_blank(node.tail.as_deref()) {
            node.tail = Some(newline);
        }
        return node;
    }

    if is_blank(node.text.as_deref()) {
        node.text = Some(format!("{newline}{indent}"));
    }
    if is_blank(node.tail.as_deref()) {
        node.tail = Some(newline);
    }
    node.children = std::mem::take(&mut node.children)
        .into_iter()
        .map(|child| prettify(child, indent, depth + 1))
        .collect();
    node
}

fn line_prefix(indent: &str, depth: usize) -> String {
    let mut out = String::with_capacity(1 + indent.len() * depth);
    out.push('\n');
    for _ in 0..depth {
        out.push_str(indent);
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn element() -> impl Strategy<Value = XmlNode> {
        let leaf = ("[a-z]{1,6}", proptest::option::of("[a-z ]{0,6}")).prop_map(|(name, text)| {
            let mut node = XmlNode::new(name);
            node.text = text;
            node
        });
        leaf.prop_recursive(4, 32, 4, |inner| {
            (
                "[a-z]{1,6}",
                prop::collection::vec(inner, 1..4),
                proptest::option::of("[ \n]{0,3}|[a-z]{1,3}"),
            )
                .prop_map(|(name, children, text)| {
                    let mut node = XmlNode::new(name);
                    node.children = children;
                    node.text = text;
                    node
                })
        })
    }

    proptest! {
        /// The output re-parses and formatting it again is a fixed point.
        #[test]
        fn format_xml_is_idempotent(tree in element(), indent in "( {1,4}|\t)") {
            let source = tree.to_xml_string();
            let once = format_xml(source.as_str(), &indent).unwrap();
            prop_assert!(XmlNode::parse(&once).is_ok());
            let twice = format_xml(once.as_str(), &indent).unwrap();
            prop_assert_eq!(twice, once);
        }
    }
}
