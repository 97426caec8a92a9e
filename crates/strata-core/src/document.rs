//! # Dual-Entry Documents
//!
//! JSON and XML operations accept either raw text or an already-parsed
//! tree. These tagged unions make that choice explicit at the type level;
//! the `From` impls keep call sites short (`format_json("{}", 2)`).

use serde_json::Value;

use crate::error::{JsonSyntaxError, XmlError};
use crate::xml::XmlNode;

/// A JSON document, as text or as a parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonDocument {
    /// Unparsed JSON text.
    Text(String),
    /// An already-parsed value.
    Parsed(Value),
}

impl JsonDocument {
    /// Resolve into a parsed value, parsing text if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`JsonSyntaxError`] if the text is not valid JSON.
    pub fn into_value(self) -> Result<Value, JsonSyntaxError> {
        match self {
            Self::Text(text) => Ok(serde_json::from_str(&text)?),
            Self::Parsed(value) => Ok(value),
        }
    }
}

impl From<&str> for JsonDocument {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for JsonDocument {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for JsonDocument {
    fn from(value: Value) -> Self {
        Self::Parsed(value)
    }
}

/// An XML document, as text or as a parsed element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlDocument {
    /// Unparsed XML text.
    Text(String),
    /// An already-parsed root element.
    Parsed(XmlNode),
}

impl XmlDocument {
    /// Resolve into an owned root element, parsing text if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] if the text is not well-formed.
    pub fn into_root(self) -> Result<XmlNode, XmlError> {
        match self {
            Self::Text(text) => XmlNode::parse(&text),
            Self::Parsed(root) => Ok(root),
        }
    }
}

impl From<&str> for XmlDocument {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for XmlDocument {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<XmlNode> for XmlDocument {
    fn from(root: XmlNode) -> Self {
        Self::Parsed(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_text_is_parsed() {
        let doc = JsonDocument::from(r#"{"a": [1, 2]}"#);
        assert_eq!(doc.into_value().unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_json_parsed_passes_through() {
        let value = json!({"k": null});
        assert_eq!(JsonDocument::from(value.clone()).into_value().unwrap(), value);
    }

    #[test]
    fn test_json_text_error_has_position() {
        let err = JsonDocument::from("{\n  \"a\": ,\n}").into_value().unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_json_preserves_key_order() {
        let value = JsonDocument::from(r#"{"b":1,"a":2}"#).into_value().unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn test_xml_text_is_parsed() {
        let root = XmlDocument::from("<a><b/></a>").into_root().unwrap();
        assert_eq!(root.children[0].name, "b");
    }

    #[test]
    fn test_xml_parsed_passes_through() {
        let node = XmlNode::new("solo");
        assert_eq!(XmlDocument::from(node.clone()).into_root().unwrap(), node);
    }

    #[test]
    fn test_xml_text_error() {
        assert!(XmlDocument::from(String::from("<a>")).into_root().is_err());
    }
}
