//! # XML Schema (XSD subset)
//!
//! Compiles an XSD document into an in-memory model and checks instance
//! trees against it.
//!
//! ## Supported constructs
//!
//! - global `xs:element`, named and anonymous `xs:complexType` / `xs:simpleType`
//! - `xs:sequence`, `xs:choice`, `xs:all` (nestable), `minOccurs` / `maxOccurs`
//!   including `unbounded`, element `ref`
//! - `mixed` content, `xs:attribute` with `use` and `fixed`
//! - `xs:simpleContent` with `xs:extension`
//! - `xs:restriction` facets: `enumeration`, `pattern`, `length`,
//!   `minLength`, `maxLength`, `minInclusive`, `maxInclusive`,
//!   `minExclusive`, `maxExclusive`
//! - the built-in types listed in [`Builtin`]
//!
//! Anything else in a schema is rejected at compile time with
//! `InvalidSchema` rather than silently ignored. Elements and attributes
//! are matched by local name; namespace declarations and `xsi:*`
//! attributes are always allowed on instances.

mod builtin;
mod compile;
mod instance;

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use strata_core::XmlNode;

use crate::error::ValidationError;

pub use builtin::Builtin;

/// A compiled XML schema.
#[derive(Debug, Clone)]
pub struct XmlSchema {
    elements: HashMap<String, ElementDecl>,
    types: HashMap<String, TypeDef>,
}

impl XmlSchema {
    /// Compile a schema from XSD text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSchema`] if the text is not
    /// well-formed XML, is not an `xs:schema` document, uses an unsupported
    /// construct, or references an undeclared type or element.
    pub fn parse(xsd: &str) -> Result<Self, ValidationError> {
        let root = XmlNode::parse(xsd)
            .map_err(|e| ValidationError::invalid_schema(format!("schema is not well-formed: {e}")))?;
        let schema = compile::compile(&root)?;
        tracing::debug!(
            elements = schema.elements.len(),
            types = schema.types.len(),
            "compiled XML schema"
        );
        Ok(schema)
    }

    /// Compile a schema from an `.xsd` file.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSchema`] if the file cannot be read
    /// or does not compile.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::invalid_schema(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// Names of the global element declarations, sorted.
    pub fn root_elements(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.elements.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check a parsed instance tree against the schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError::SchemaViolation`] found, in
    /// document order.
    pub fn validate(&self, root: &XmlNode) -> Result<(), ValidationError> {
        instance::validate(self, root)
    }
}

/// Reference to a type: built in, named in the schema, or declared inline.
#[derive(Debug, Clone)]
enum TypeRef {
    Builtin(Builtin),
    Named(String),
    Inline(Box<TypeDef>),
}

#[derive(Debug, Clone)]
enum TypeDef {
    Simple(SimpleType),
    Complex(ComplexType),
}

/// A restriction of a base simple type by facets.
#[derive(Debug, Clone)]
struct SimpleType {
    base: TypeRef,
    facets: Facets,
}

#[derive(Debug, Clone, Default)]
struct Facets {
    enumeration: Vec<String>,
    /// Alternatives from one derivation step; a value must match at least one.
    patterns: Vec<Regex>,
    length: Option<usize>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    min_inclusive: Option<String>,
    max_inclusive: Option<String>,
    min_exclusive: Option<String>,
    max_exclusive: Option<String>,
}

#[derive(Debug, Clone)]
struct ComplexType {
    mixed: bool,
    content: Content,
    attributes: Vec<AttributeDecl>,
}

#[derive(Debug, Clone)]
enum Content {
    Empty,
    Elements(Particle),
    /// Text content of the given simple type.
    Simple(TypeRef),
}

#[derive(Debug, Clone)]
struct Particle {
    min_occurs: u32,
    /// `None` is `unbounded`.
    max_occurs: Option<u32>,
    term: Term,
}

#[derive(Debug, Clone)]
enum Term {
    Element(Box<ElementDecl>),
    Ref(String),
    Sequence(Vec<Particle>),
    Choice(Vec<Particle>),
    All(Vec<Particle>),
}

#[derive(Debug, Clone)]
struct ElementDecl {
    name: String,
    type_ref: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeUse {
    Optional,
    Required,
    Prohibited,
}

#[derive(Debug, Clone)]
struct AttributeDecl {
    name: String,
    type_ref: TypeRef,
    usage: AttributeUse,
    fixed: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="order">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="item" maxOccurs="unbounded">
          <xs:complexType>
            <xs:attribute name="sku" type="xs:string" use="required"/>
            <xs:attribute name="qty" type="xs:positiveInteger"/>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
      <xs:attribute name="id" type="xs:integer" use="required"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    #[test]
    fn test_parse_lists_root_elements() {
        let schema = XmlSchema::parse(ORDER_XSD).unwrap();
        assert_eq!(schema.root_elements(), vec!["order"]);
    }

    #[test]
    fn test_validate_conforming_instance() {
        let schema = XmlSchema::parse(ORDER_XSD).unwrap();
        let doc = XmlNode::parse(r#"<order id="1"><item sku="a"/><item sku="b" qty="2"/></order>"#)
            .unwrap();
        assert!(schema.validate(&doc).is_ok());
    }

    #[test]
    fn test_violation_path_indexes_repeated_siblings() {
        let schema = XmlSchema::parse(ORDER_XSD).unwrap();
        let doc = XmlNode::parse(r#"<order id="1"><item sku="a"/><item qty="2"/></order>"#).unwrap();
        match schema.validate(&doc).unwrap_err() {
            ValidationError::SchemaViolation { path, rule, message } => {
                assert_eq!(path, "/order/item[2]");
                assert_eq!(rule, "attribute");
                assert!(message.contains("sku"), "{message}");
            }
            other => panic!("expected SchemaViolation, got {other}"),
        }
    }

    #[test]
    fn test_not_well_formed_schema() {
        let err = XmlSchema::parse("<xs:schema").unwrap_err();
        assert_eq!(err.code(), "InvalidSchema");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.xsd");
        std::fs::write(&path, ORDER_XSD).unwrap();
        let schema = XmlSchema::from_file(&path).unwrap();
        assert_eq!(schema.root_elements(), vec!["order"]);
    }

    #[test]
    fn test_from_missing_file() {
        let err = XmlSchema::from_file("/nonexistent/strata/schema.xsd").unwrap_err();
        assert_eq!(err.code(), "InvalidSchema");
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_schema_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XmlSchema>();
    }
}
