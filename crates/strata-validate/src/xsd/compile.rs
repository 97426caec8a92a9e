//! XSD document → schema model.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use strata_core::{local_part, XmlNode};

use super::{
    AttributeDecl, AttributeUse, Builtin, ComplexType, Content, ElementDecl, Facets, Particle,
    SimpleType, Term, TypeDef, TypeRef, XmlSchema,
};
use crate::error::ValidationError;

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

pub(super) fn compile(root: &XmlNode) -> Result<XmlSchema, ValidationError> {
    if root.local_name() != "schema" {
        return Err(ValidationError::invalid_schema(format!(
            "root element is <{}>, expected <xs:schema>",
            root.name
        )));
    }
    let compiler = Compiler::new(root);
    let mut schema = XmlSchema {
        elements: HashMap::new(),
        types: HashMap::new(),
    };

    for child in components(root) {
        match child.local_name() {
            "element" => {
                let decl = compiler.element_decl(child)?;
                if schema.elements.contains_key(&decl.name) {
                    return Err(duplicate("element", &decl.name));
                }
                schema.elements.insert(decl.name.clone(), decl);
            }
            "complexType" => {
                let name = required_attr(child, "name")?.to_string();
                let def = TypeDef::Complex(compiler.complex_type(child)?);
                if schema.types.insert(name.clone(), def).is_some() {
                    return Err(duplicate("type", &name));
                }
            }
            "simpleType" => {
                let name = required_attr(child, "name")?.to_string();
                let def = TypeDef::Simple(compiler.simple_type(child)?);
                if schema.types.insert(name.clone(), def).is_some() {
                    return Err(duplicate("type", &name));
                }
            }
            other => return Err(unsupported(other)),
        }
    }

    References { schema: &schema }.check()?;
    Ok(schema)
}

/// Schema children that carry meaning (annotations are skipped).
fn components(node: &XmlNode) -> impl Iterator<Item = &XmlNode> {
    node.children
        .iter()
        .filter(|child| child.local_name() != "annotation")
}

fn required_attr<'n>(node: &'n XmlNode, name: &str) -> Result<&'n str, ValidationError> {
    node.attribute(name).ok_or_else(|| {
        ValidationError::invalid_schema(format!("<{}> is missing the {name:?} attribute", node.name))
    })
}

fn unsupported(construct: &str) -> ValidationError {
    ValidationError::invalid_schema(format!("unsupported schema construct <xs:{construct}>"))
}

fn duplicate(kind: &str, name: &str) -> ValidationError {
    ValidationError::invalid_schema(format!("duplicate {kind} declaration {name:?}"))
}

fn parse_count(node: &XmlNode, attr: &str, raw: &str) -> Result<usize, ValidationError> {
    raw.trim().parse().map_err(|_| {
        ValidationError::invalid_schema(format!(
            "<{}> has a non-numeric {attr} value {raw:?}",
            node.name
        ))
    })
}

struct Compiler {
    /// Prefixes bound to the XSD namespace; `None` is the default namespace.
    xsd_prefixes: HashSet<Option<String>>,
}

impl Compiler {
    fn new(root: &XmlNode) -> Self {
        let mut xsd_prefixes = HashSet::new();
        for (name, value) in &root.attributes {
            if value != XSD_NAMESPACE {
                continue;
            }
            if name == "xmlns" {
                xsd_prefixes.insert(None);
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                xsd_prefixes.insert(Some(prefix.to_string()));
            }
        }
        if xsd_prefixes.is_empty() {
            // Undeclared but conventional.
            xsd_prefixes.insert(Some("xs".to_string()));
            xsd_prefixes.insert(Some("xsd".to_string()));
        }
        Self { xsd_prefixes }
    }

    fn type_ref(&self, qname: &str) -> Result<TypeRef, ValidationError> {
        let (prefix, local) = match qname.trim().split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local),
            None => (None, qname.trim()),
        };
        if self.xsd_prefixes.contains(&prefix) {
            Builtin::from_name(local).map(TypeRef::Builtin).ok_or_else(|| {
                ValidationError::invalid_schema(format!("unsupported built-in type {qname:?}"))
            })
        } else {
            Ok(TypeRef::Named(local.to_string()))
        }
    }

    fn element_decl(&self, node: &XmlNode) -> Result<ElementDecl, ValidationError> {
        let name = required_attr(node, "name")?.to_string();
        let mut inline = None;
        for child in components(node) {
            let def = match child.local_name() {
                "complexType" => TypeDef::Complex(self.complex_type(child)?),
                "simpleType" => TypeDef::Simple(self.simple_type(child)?),
                other => return Err(unsupported(other)),
            };
            if inline.replace(def).is_some() {
                return Err(ValidationError::invalid_schema(format!(
                    "element {name:?} declares more than one anonymous type"
                )));
            }
        }

        let type_ref = match (node.attribute("type"), inline) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::invalid_schema(format!(
                    "element {name:?} has both a type attribute and an anonymous type"
                )))
            }
            (Some(qname), None) => self.type_ref(qname)?,
            (None, Some(def)) => TypeRef::Inline(Box::new(def)),
            (None, None) => TypeRef::Builtin(Builtin::AnyType),
        };
        Ok(ElementDecl { name, type_ref })
    }

    fn occurs(&self, node: &XmlNode) -> Result<(u32, Option<u32>), ValidationError> {
        let bound = |attr: &str, raw: &str| -> Result<u32, ValidationError> {
            raw.trim().parse().map_err(|_| {
                ValidationError::invalid_schema(format!(
                    "<{}> has an invalid {attr} value {raw:?}",
                    node.name
                ))
            })
        };
        let min = match node.attribute("minOccurs") {
            Some(raw) => bound("minOccurs", raw)?,
            None => 1,
        };
        let max = match node.attribute("maxOccurs") {
            Some(raw) if raw.trim() == "unbounded" => None,
            Some(raw) => Some(bound("maxOccurs", raw)?),
            None => Some(1),
        };
        if max.is_some_and(|max| max < min) {
            return Err(ValidationError::invalid_schema(format!(
                "<{}> has maxOccurs below minOccurs",
                node.name
            )));
        }
        Ok((min, max))
    }

    fn particle(&self, node: &XmlNode) -> Result<Particle, ValidationError> {
        let (min_occurs, max_occurs) = self.occurs(node)?;
        let term = match node.local_name() {
            "element" => match node.attribute("ref") {
                Some(target) => Term::Ref(local_part(target.trim()).to_string()),
                None => Term::Element(Box::new(self.element_decl(node)?)),
            },
            "sequence" => Term::Sequence(self.particles(node)?),
            "choice" => Term::Choice(self.particles(node)?),
            "all" => {
                let members = self.particles(node)?;
                let well_formed = max_occurs == Some(1)
                    && min_occurs <= 1
                    && members.iter().all(|p| {
                        matches!(p.term, Term::Element(_) | Term::Ref(_))
                            && p.max_occurs.is_some_and(|max| max <= 1)
                    });
                if !well_formed {
                    return Err(ValidationError::invalid_schema(
                        "<xs:all> may only hold elements occurring at most once",
                    ));
                }
                Term::All(members)
            }
            other => return Err(unsupported(other)),
        };
        Ok(Particle {
            min_occurs,
            max_occurs,
            term,
        })
    }

    fn particles(&self, group: &XmlNode) -> Result<Vec<Particle>, ValidationError> {
        components(group).map(|child| self.particle(child)).collect()
    }

    fn complex_type(&self, node: &XmlNode) -> Result<ComplexType, ValidationError> {
        let mixed = matches!(node.attribute("mixed").map(str::trim), Some("true" | "1"));
        let mut content = None;
        let mut attributes = Vec::new();

        for child in components(node) {
            if child.local_name() == "attribute" {
                attributes.push(self.attribute_decl(child)?);
                continue;
            }
            if !attributes.is_empty() {
                return Err(ValidationError::invalid_schema(
                    "attribute declarations must follow the content model",
                ));
            }
            let model = match child.local_name() {
                "sequence" | "choice" | "all" => Content::Elements(self.particle(child)?),
                "simpleContent" => Content::Simple(self.simple_content(child, &mut attributes)?),
                other => return Err(unsupported(other)),
            };
            if content.replace(model).is_some() {
                return Err(ValidationError::invalid_schema(
                    "complex type declares more than one content model",
                ));
            }
        }

        Ok(ComplexType {
            mixed,
            content: content.unwrap_or(Content::Empty),
            attributes,
        })
    }

    fn simple_content(
        &self,
        node: &XmlNode,
        attributes: &mut Vec<AttributeDecl>,
    ) -> Result<TypeRef, ValidationError> {
        let mut parts = components(node);
        let (Some(extension), None) = (parts.next(), parts.next()) else {
            return Err(ValidationError::invalid_schema(
                "<xs:simpleContent> must hold exactly one <xs:extension>",
            ));
        };
        if extension.local_name() != "extension" {
            return Err(unsupported(&format!("simpleContent/{}", extension.local_name())));
        }
        let base = self.type_ref(required_attr(extension, "base")?)?;
        for child in components(extension) {
            match child.local_name() {
                "attribute" => attributes.push(self.attribute_decl(child)?),
                other => return Err(unsupported(other)),
            }
        }
        Ok(base)
    }

    fn attribute_decl(&self, node: &XmlNode) -> Result<AttributeDecl, ValidationError> {
        if node.attribute("ref").is_some() {
            return Err(unsupported("attribute ref"));
        }
        let name = required_attr(node, "name")?.to_string();
        let usage = match node.attribute("use").map(str::trim) {
            None | Some("optional") => AttributeUse::Optional,
            Some("required") => AttributeUse::Required,
            Some("prohibited") => AttributeUse::Prohibited,
            Some(other) => {
                return Err(ValidationError::invalid_schema(format!(
                    "attribute {name:?} has an invalid use {other:?}"
                )))
            }
        };

        let mut inline = None;
        for child in components(node) {
            match child.local_name() {
                "simpleType" if inline.is_none() => inline = Some(self.simple_type(child)?),
                other => return Err(unsupported(other)),
            }
        }
        let type_ref = match (node.attribute("type"), inline) {
            (Some(qname), None) => self.type_ref(qname)?,
            (None, Some(simple)) => TypeRef::Inline(Box::new(TypeDef::Simple(simple))),
            (None, None) => TypeRef::Builtin(Builtin::AnySimpleType),
            (Some(_), Some(_)) => {
                return Err(ValidationError::invalid_schema(format!(
                    "attribute {name:?} has both a type attribute and an anonymous type"
                )))
            }
        };

        Ok(AttributeDecl {
            name,
            type_ref,
            usage,
            fixed: node.attribute("fixed").map(str::to_string),
        })
    }

    fn simple_type(&self, node: &XmlNode) -> Result<SimpleType, ValidationError> {
        let mut parts = components(node);
        let (Some(restriction), None) = (parts.next(), parts.next()) else {
            return Err(ValidationError::invalid_schema(
                "<xs:simpleType> must hold exactly one <xs:restriction>",
            ));
        };
        if restriction.local_name() != "restriction" {
            return Err(unsupported(restriction.local_name()));
        }
        let base = self.type_ref(required_attr(restriction, "base")?)?;

        let mut facets = Facets::default();
        for facet in components(restriction) {
            let value = required_attr(facet, "value")?;
            match facet.local_name() {
                "enumeration" => facets.enumeration.push(value.to_string()),
                "pattern" => facets.patterns.push(compile_facet_pattern(value)?),
                "length" => facets.length = Some(parse_count(facet, "value", value)?),
                "minLength" => facets.min_length = Some(parse_count(facet, "value", value)?),
                "maxLength" => facets.max_length = Some(parse_count(facet, "value", value)?),
                "minInclusive" => facets.min_inclusive = Some(value.trim().to_string()),
                "maxInclusive" => facets.max_inclusive = Some(value.trim().to_string()),
                "minExclusive" => facets.min_exclusive = Some(value.trim().to_string()),
                "maxExclusive" => facets.max_exclusive = Some(value.trim().to_string()),
                other => return Err(unsupported(other)),
            }
        }
        Ok(SimpleType { base, facets })
    }
}

/// XSD patterns always match the whole value.
fn compile_facet_pattern(pattern: &str) -> Result<Regex, ValidationError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
        ValidationError::invalid_schema(format!("invalid pattern facet {pattern:?}: {e}"))
    })
}

/// Cross-reference checks run once the whole schema is loaded.
struct References<'s> {
    schema: &'s XmlSchema,
}

impl References<'_> {
    fn check(&self) -> Result<(), ValidationError> {
        for decl in self.schema.elements.values() {
            self.type_ref(&decl.type_ref)?;
        }
        for (name, def) in &self.schema.types {
            self.type_def(def)?;
            self.derivation_is_acyclic(name)?;
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<&TypeDef, ValidationError> {
        self.schema
            .types
            .get(name)
            .ok_or_else(|| ValidationError::invalid_schema(format!("reference to undeclared type {name:?}")))
    }

    fn type_ref(&self, type_ref: &TypeRef) -> Result<(), ValidationError> {
        match type_ref {
            TypeRef::Builtin(_) => Ok(()),
            TypeRef::Named(name) => self.lookup(name).map(|_| ()),
            TypeRef::Inline(def) => self.type_def(def),
        }
    }

    /// A type usable for text: built in, a simple type, or simple content.
    fn simple_ref(&self, type_ref: &TypeRef) -> Result<(), ValidationError> {
        let def = match type_ref {
            TypeRef::Builtin(_) => return Ok(()),
            TypeRef::Named(name) => self.lookup(name)?,
            TypeRef::Inline(def) => def.as_ref(),
        };
        match def {
            TypeDef::Simple(_) | TypeDef::Complex(ComplexType {
                content: Content::Simple(_),
                ..
            }) => self.type_ref(type_ref),
            TypeDef::Complex(_) => Err(ValidationError::invalid_schema(
                "a complex type with element content is used where a simple type is required",
            )),
        }
    }

    fn type_def(&self, def: &TypeDef) -> Result<(), ValidationError> {
        match def {
            TypeDef::Simple(simple) => self.simple_ref(&simple.base),
            TypeDef::Complex(complex) => {
                for attribute in &complex.attributes {
                    self.simple_ref(&attribute.type_ref)?;
                }
                match &complex.content {
                    Content::Empty => Ok(()),
                    Content::Simple(base) => self.simple_ref(base),
                    Content::Elements(particle) => self.particle(particle),
                }
            }
        }
    }

    fn particle(&self, particle: &Particle) -> Result<(), ValidationError> {
        match &particle.term {
            Term::Element(decl) => self.type_ref(&decl.type_ref),
            Term::Ref(name) => {
                if self.schema.elements.contains_key(name) {
                    Ok(())
                } else {
                    Err(ValidationError::invalid_schema(format!(
                        "reference to undeclared element {name:?}"
                    )))
                }
            }
            Term::Sequence(items) | Term::Choice(items) | Term::All(items) => {
                items.iter().try_for_each(|p| self.particle(p))
            }
        }
    }

    /// Follow the base-type chain from `start` and fail if it loops.
    fn derivation_is_acyclic(&self, start: &str) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        let mut current = start;
        loop {
            if !seen.insert(current) {
                return Err(ValidationError::invalid_schema(format!(
                    "type {start:?} is derived from itself"
                )));
            }
            let base = match self.schema.types.get(current) {
                Some(TypeDef::Simple(simple)) => &simple.base,
                Some(TypeDef::Complex(ComplexType {
                    content: Content::Simple(base),
                    ..
                })) => base,
                _ => return Ok(()),
            };
            match base {
                TypeRef::Named(next) => current = next,
                _ => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_str(xsd: &str) -> Result<XmlSchema, ValidationError> {
        compile(&XmlNode::parse(xsd).unwrap())
    }

    fn schema_with(body: &str) -> String {
        format!(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#)
    }

    #[test]
    fn test_named_types_and_refs() {
        let xsd = schema_with(
            r#"<xs:simpleType name="code"><xs:restriction base="xs:string"><xs:pattern value="[A-Z]{3}"/></xs:restriction></xs:simpleType>
               <xs:complexType name="lineType"><xs:sequence><xs:element name="code" type="code"/></xs:sequence></xs:complexType>
               <xs:element name="line" type="lineType"/>
               <xs:element name="lines"><xs:complexType><xs:sequence><xs:element ref="line" maxOccurs="unbounded"/></xs:sequence></xs:complexType></xs:element>"#,
        );
        let schema = compile_str(&xsd).unwrap();
        assert_eq!(schema.root_elements(), vec!["line", "lines"]);
        assert_eq!(schema.types.len(), 2);
    }

    #[test]
    fn test_default_namespace_prefix() {
        let xsd = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema"><element name="n" type="integer"/></schema>"#;
        let schema = compile_str(xsd).unwrap();
        assert!(matches!(
            schema.elements["n"].type_ref,
            TypeRef::Builtin(Builtin::Integer)
        ));
    }

    #[test]
    fn test_not_a_schema() {
        let err = compile_str("<root/>").unwrap_err();
        assert!(err.to_string().contains("expected <xs:schema>"));
    }

    #[test]
    fn test_unsupported_construct() {
        let xsd = schema_with(r#"<xs:import namespace="urn:x"/>"#);
        let err = compile_str(&xsd).unwrap_err();
        assert!(err.to_string().contains("xs:import"), "{err}");
    }

    #[test]
    fn test_unknown_builtin() {
        let xsd = schema_with(r#"<xs:element name="y" type="xs:gYear"/>"#);
        assert_eq!(compile_str(&xsd).unwrap_err().code(), "InvalidSchema");
    }

    #[test]
    fn test_undeclared_type() {
        let xsd = schema_with(r#"<xs:element name="a" type="missingType"/>"#);
        let err = compile_str(&xsd).unwrap_err();
        assert!(err.to_string().contains("missingType"));
    }

    #[test]
    fn test_undeclared_element_ref() {
        let xsd = schema_with(
            r#"<xs:element name="a"><xs:complexType><xs:sequence><xs:element ref="ghost"/></xs:sequence></xs:complexType></xs:element>"#,
        );
        assert!(compile_str(&xsd).unwrap_err().to_string().contains("ghost"));
    }

    #[test]
    fn test_circular_derivation() {
        let xsd = schema_with(
            r#"<xs:simpleType name="a"><xs:restriction base="b"/></xs:simpleType>
               <xs:simpleType name="b"><xs:restriction base="a"/></xs:simpleType>"#,
        );
        assert!(compile_str(&xsd).unwrap_err().to_string().contains("derived from itself"));
    }

    #[test]
    fn test_occurs_bounds() {
        let xsd = schema_with(
            r#"<xs:element name="a"><xs:complexType><xs:sequence><xs:element name="b" minOccurs="3" maxOccurs="2"/></xs:sequence></xs:complexType></xs:element>"#,
        );
        assert_eq!(compile_str(&xsd).unwrap_err().code(), "InvalidSchema");
    }

    #[test]
    fn test_all_group_members_at_most_once() {
        let xsd = schema_with(
            r#"<xs:element name="a"><xs:complexType><xs:all><xs:element name="b" maxOccurs="2"/></xs:all></xs:complexType></xs:element>"#,
        );
        assert_eq!(compile_str(&xsd).unwrap_err().code(), "InvalidSchema");
    }

    #[test]
    fn test_invalid_pattern_facet() {
        let xsd = schema_with(
            r#"<xs:simpleType name="t"><xs:restriction base="xs:string"><xs:pattern value="(["/></xs:restriction></xs:simpleType>"#,
        );
        assert!(compile_str(&xsd).unwrap_err().to_string().contains("pattern"));
    }

    #[test]
    fn test_attribute_type_must_be_simple() {
        let xsd = schema_with(
            r#"<xs:complexType name="c"><xs:sequence><xs:element name="x"/></xs:sequence></xs:complexType>
               <xs:element name="a"><xs:complexType><xs:attribute name="k" type="c"/></xs:complexType></xs:element>"#,
        );
        assert_eq!(compile_str(&xsd).unwrap_err().code(), "InvalidSchema");
    }

    #[test]
    fn test_annotations_are_ignored() {
        let xsd = schema_with(
            r#"<xs:annotation><xs:documentation>Orders</xs:documentation></xs:annotation>
               <xs:element name="a" type="xs:string"><xs:annotation/></xs:element>"#,
        );
        assert!(compile_str(&xsd).is_ok());
    }
}
