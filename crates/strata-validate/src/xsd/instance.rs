//! Instance checking against a compiled [`XmlSchema`].
//!
//! Violations are reported with an element path built from tag names;
//! a step gets a 1-based `[n]` index when its parent has more than one
//! child of that name (`/order/item[2]`). Attribute failures append
//! `/@name`.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use strata_core::{is_blank, local_part, XmlNode};

use super::{
    AttributeUse, Builtin, ComplexType, Content, ElementDecl, Facets, Particle, SimpleType, Term,
    TypeDef, TypeRef, XmlSchema,
};
use crate::error::ValidationError;

pub(super) fn validate(schema: &XmlSchema, root: &XmlNode) -> Result<(), ValidationError> {
    let path = format!("/{}", root.name);
    let decl = schema.elements.get(root.local_name()).ok_or_else(|| {
        ValidationError::violation(
            &path,
            "element",
            format!("no global declaration for element '{}'", root.local_name()),
        )
    })?;
    Checker { schema }.element(root, decl, &path)
}

/// A type reference with named types looked up.
enum Resolved<'s> {
    Builtin(Builtin),
    Simple(&'s SimpleType),
    Complex(&'s ComplexType),
}

struct Checker<'s> {
    schema: &'s XmlSchema,
}

impl<'s> Checker<'s> {
    fn resolve(&self, type_ref: &'s TypeRef) -> Result<Resolved<'s>, ValidationError> {
        let def = match type_ref {
            TypeRef::Builtin(builtin) => return Ok(Resolved::Builtin(*builtin)),
            TypeRef::Named(name) => self.schema.types.get(name).ok_or_else(|| {
                ValidationError::invalid_schema(format!("reference to undeclared type {name:?}"))
            })?,
            TypeRef::Inline(def) => def.as_ref(),
        };
        Ok(match def {
            TypeDef::Simple(simple) => Resolved::Simple(simple),
            TypeDef::Complex(complex) => Resolved::Complex(complex),
        })
    }

    /// The built-in type at the bottom of a derivation chain.
    fn primitive(&self, type_ref: &'s TypeRef) -> Builtin {
        match self.resolve(type_ref) {
            Ok(Resolved::Builtin(builtin)) => builtin,
            Ok(Resolved::Simple(simple)) => self.primitive(&simple.base),
            Ok(Resolved::Complex(ComplexType {
                content: Content::Simple(base),
                ..
            })) => self.primitive(base),
            _ => Builtin::AnySimpleType,
        }
    }

    fn element(&self, node: &XmlNode, decl: &'s ElementDecl, path: &str) -> Result<(), ValidationError> {
        match self.resolve(&decl.type_ref)? {
            Resolved::Builtin(Builtin::AnyType) => Ok(()),
            Resolved::Builtin(_) | Resolved::Simple(_) => {
                if let Some(child) = node.children.first() {
                    return Err(ValidationError::violation(
                        path,
                        "simpleType",
                        format!(
                            "element '{}' has simple content and may not contain <{}>",
                            node.local_name(),
                            child.name
                        ),
                    ));
                }
                self.no_attributes(node, path)?;
                self.simple_value(&decl.type_ref, node.text.as_deref().unwrap_or(""), path)
            }
            Resolved::Complex(complex) => self.complex(node, complex, path),
        }
    }

    fn no_attributes(&self, node: &XmlNode, path: &str) -> Result<(), ValidationError> {
        match node.attributes.iter().find(|(name, _)| !is_namespace_attribute(name)) {
            Some((name, _)) => Err(ValidationError::violation(
                format!("{path}/@{name}"),
                "attribute",
                format!("attribute '{name}' is not allowed on element '{}'", node.local_name()),
            )),
            None => Ok(()),
        }
    }

    fn complex(&self, node: &XmlNode, complex: &'s ComplexType, path: &str) -> Result<(), ValidationError> {
        self.attributes(node, complex, path)?;

        match &complex.content {
            Content::Simple(base) => {
                if let Some(child) = node.children.first() {
                    return Err(ValidationError::violation(
                        path,
                        "simpleContent",
                        format!("element '{}' may not contain <{}>", node.local_name(), child.name),
                    ));
                }
                self.simple_value(base, node.text.as_deref().unwrap_or(""), path)
            }
            Content::Empty => {
                if let Some(child) = node.children.first() {
                    return Err(ValidationError::violation(
                        path,
                        "content",
                        format!("element '{}' must be empty but contains <{}>", node.local_name(), child.name),
                    ));
                }
                if !complex.mixed && !is_blank(node.text.as_deref()) {
                    return Err(text_not_allowed(node, path));
                }
                Ok(())
            }
            Content::Elements(particle) => {
                if !complex.mixed {
                    let stray_text = !is_blank(node.text.as_deref())
                        || node.children.iter().any(|c| !is_blank(c.tail.as_deref()));
                    if stray_text {
                        return Err(text_not_allowed(node, path));
                    }
                }
                let paths = child_paths(node, path);
                self.content_model(node, particle, path, &paths)?;

                let mut decls = HashMap::new();
                self.collect_decls(particle, &mut decls);
                for (child, child_path) in node.children.iter().zip(&paths) {
                    // Present because the content model matched.
                    if let Some(&decl) = decls.get(child.local_name()) {
                        self.element(child, decl, child_path)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn attributes(&self, node: &XmlNode, complex: &'s ComplexType, path: &str) -> Result<(), ValidationError> {
        for (name, value) in &node.attributes {
            if is_namespace_attribute(name) {
                continue;
            }
            let attr_path = format!("{path}/@{name}");
            let decl = complex
                .attributes
                .iter()
                .find(|decl| decl.name == *name || decl.name == local_part(name))
                .ok_or_else(|| {
                    ValidationError::violation(
                        &attr_path,
                        "attribute",
                        format!("attribute '{name}' is not declared for element '{}'", node.local_name()),
                    )
                })?;
            if decl.usage == AttributeUse::Prohibited {
                return Err(ValidationError::violation(
                    &attr_path,
                    "attribute",
                    format!("attribute '{name}' is prohibited"),
                ));
            }
            self.simple_value(&decl.type_ref, value, &attr_path)?;
            if let Some(fixed) = &decl.fixed {
                if value.trim() != fixed.trim() {
                    return Err(ValidationError::violation(
                        &attr_path,
                        "fixed",
                        format!("attribute '{name}' must be {fixed:?}, got {value:?}"),
                    ));
                }
            }
        }

        let missing = complex.attributes.iter().find(|decl| {
            decl.usage == AttributeUse::Required
                && !node
                    .attributes
                    .iter()
                    .any(|(name, _)| *name == decl.name || local_part(name) == decl.name)
        });
        match missing {
            Some(decl) => Err(ValidationError::violation(
                path,
                "attribute",
                format!(
                    "element '{}' is missing required attribute '{}'",
                    node.local_name(),
                    decl.name
                ),
            )),
            None => Ok(()),
        }
    }

    fn simple_value(&self, type_ref: &'s TypeRef, raw: &str, path: &str) -> Result<(), ValidationError> {
        match self.resolve(type_ref)? {
            Resolved::Builtin(builtin) => {
                let value = builtin.normalize(raw);
                if builtin.accepts(&value) {
                    Ok(())
                } else {
                    Err(ValidationError::violation(
                        path,
                        "type",
                        format!("{raw:?} is not a valid {builtin}"),
                    ))
                }
            }
            Resolved::Simple(simple) => {
                self.simple_value(&simple.base, raw, path)?;
                let primitive = self.primitive(&simple.base);
                let value = primitive.normalize(raw);
                check_facets(&simple.facets, &value, primitive.is_numeric())
                    .map_err(|(rule, message)| ValidationError::violation(path, rule, message))
            }
            Resolved::Complex(ComplexType {
                content: Content::Simple(base),
                ..
            }) => self.simple_value(base, raw, path),
            Resolved::Complex(_) => Err(ValidationError::invalid_schema(
                "a complex type with element content is used where a simple type is required",
            )),
        }
    }

    fn content_model(
        &self,
        node: &XmlNode,
        particle: &'s Particle,
        path: &str,
        paths: &[String],
    ) -> Result<(), ValidationError> {
        let names: Vec<&str> = node.children.iter().map(XmlNode::local_name).collect();
        let mut matcher = Matcher {
            schema: self.schema,
            names: &names,
            furthest: 0,
            expected: BTreeSet::new(),
        };
        let ends = matcher.particle(particle, &BTreeSet::from([0]));
        if ends.contains(&names.len()) {
            return Ok(());
        }

        let expected = if matcher.expected.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = matcher.expected.iter().map(String::as_str).collect();
            format!("; expected {}", names.join(" or "))
        };
        match node.children.get(matcher.furthest) {
            Some(child) => Err(ValidationError::violation(
                &paths[matcher.furthest],
                "content",
                format!("unexpected element '{}'{expected}", child.local_name()),
            )),
            None => Err(ValidationError::violation(
                path,
                "content",
                format!("content of element '{}' is incomplete{expected}", node.local_name()),
            )),
        }
    }

    fn collect_decls(&self, particle: &'s Particle, out: &mut HashMap<&'s str, &'s ElementDecl>) {
        match &particle.term {
            Term::Element(decl) => {
                out.entry(decl.name.as_str()).or_insert(&**decl);
            }
            Term::Ref(name) => {
                if let Some(decl) = self.schema.elements.get(name) {
                    out.entry(decl.name.as_str()).or_insert(decl);
                }
            }
            Term::Sequence(items) | Term::Choice(items) | Term::All(items) => {
                for item in items {
                    self.collect_decls(item, out);
                }
            }
        }
    }
}

/// Matches a child-name sequence against a content model.
///
/// Works on sets of reachable positions so that optional and repeated
/// particles backtrack naturally. Tracks the furthest position any
/// element test reached, and the names that were tried there, for error
/// reporting.
struct Matcher<'a> {
    schema: &'a XmlSchema,
    names: &'a [&'a str],
    furthest: usize,
    expected: BTreeSet<String>,
}

impl Matcher<'_> {
    fn particle(&mut self, particle: &Particle, starts: &BTreeSet<usize>) -> BTreeSet<usize> {
        let min = particle.min_occurs;
        let max = particle.max_occurs.unwrap_or(u32::MAX);
        let mut ends = BTreeSet::new();
        if min == 0 {
            ends.extend(starts.iter().copied());
        }

        let mut current = starts.clone();
        let mut count = 0u32;
        while count < max && !current.is_empty() {
            count += 1;
            let mut next = BTreeSet::new();
            for &pos in &current {
                next.extend(self.term(&particle.term, pos));
            }
            if next == current {
                // Repeating further reaches nothing new; max >= min.
                ends.extend(next);
                break;
            }
            if count >= min {
                let before = ends.len();
                ends.extend(next.iter().copied());
                if ends.len() == before {
                    break;
                }
            }
            current = next;
        }
        ends
    }

    fn term(&mut self, term: &Term, pos: usize) -> BTreeSet<usize> {
        match term {
            Term::Element(decl) => self.element(&decl.name, pos),
            Term::Ref(name) => self.element(name, pos),
            Term::Sequence(items) => {
                let mut current = BTreeSet::from([pos]);
                for item in items {
                    current = self.particle(item, &current);
                    if current.is_empty() {
                        break;
                    }
                }
                current
            }
            Term::Choice(items) => {
                let start = BTreeSet::from([pos]);
                let mut ends = BTreeSet::new();
                for item in items {
                    ends.extend(self.particle(item, &start));
                }
                ends
            }
            Term::All(items) => self.all(items, pos),
        }
    }

    /// `xs:all`: each member at most once, in any order.
    fn all(&mut self, items: &[Particle], pos: usize) -> BTreeSet<usize> {
        let mut used = vec![false; items.len()];
        let mut at = pos;
        while at < self.names.len() {
            let hit = items.iter().enumerate().position(|(i, item)| {
                !used[i] && self.element_name(&item.term).is_some_and(|name| name == self.names[at])
            });
            match hit {
                Some(i) => {
                    used[i] = true;
                    self.advance(at);
                    at += 1;
                }
                None => break,
            }
        }

        let mut complete = true;
        for (i, item) in items.iter().enumerate() {
            if !used[i] {
                if let Some(name) = self.element_name(&item.term).map(str::to_string) {
                    self.miss(at, name);
                }
                if item.min_occurs > 0 {
                    complete = false;
                }
            }
        }
        if complete {
            BTreeSet::from([at])
        } else {
            BTreeSet::new()
        }
    }

    fn element_name<'t>(&'t self, term: &'t Term) -> Option<&'t str> {
        match term {
            Term::Element(decl) => Some(decl.name.as_str()),
            Term::Ref(name) => self
                .schema
                .elements
                .get(name)
                .map(|decl| decl.name.as_str()),
            _ => None,
        }
    }

    fn element(&mut self, name: &str, pos: usize) -> BTreeSet<usize> {
        if self.names.get(pos).is_some_and(|actual| *actual == name) {
            self.advance(pos);
            BTreeSet::from([pos + 1])
        } else {
            self.miss(pos, name.to_string());
            BTreeSet::new()
        }
    }

    fn advance(&mut self, pos: usize) {
        if pos + 1 > self.furthest {
            self.furthest = pos + 1;
            self.expected.clear();
        }
    }

    fn miss(&mut self, pos: usize, name: String) {
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest {
            self.expected.insert(name);
        }
    }
}

fn is_namespace_attribute(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:") || name.starts_with("xsi:")
}

fn text_not_allowed(node: &XmlNode, path: &str) -> ValidationError {
    ValidationError::violation(
        path,
        "mixed",
        format!("element '{}' may not contain character data", node.local_name()),
    )
}

/// Paths of `node`'s children, indexed where a name repeats.
fn child_paths(node: &XmlNode, path: &str) -> Vec<String> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for child in &node.children {
        *totals.entry(child.name.as_str()).or_default() += 1;
    }
    let mut seen: HashMap<&str, usize> = HashMap::new();
    node.children
        .iter()
        .map(|child| {
            let name = child.name.as_str();
            if totals[name] > 1 {
                let n = seen.entry(name).or_default();
                *n += 1;
                format!("{path}/{name}[{n}]")
            } else {
                format!("{path}/{name}")
            }
        })
        .collect()
}

fn check_facets(facets: &Facets, value: &str, numeric: bool) -> Result<(), (&'static str, String)> {
    if !facets.enumeration.is_empty() && !facets.enumeration.iter().any(|allowed| allowed == value) {
        return Err((
            "enumeration",
            format!("{value:?} is not one of {:?}", facets.enumeration),
        ));
    }
    if !facets.patterns.is_empty() && !facets.patterns.iter().any(|re| re.is_match(value)) {
        let patterns: Vec<&str> = facets.patterns.iter().map(|re| re.as_str()).collect();
        return Err(("pattern", format!("{value:?} does not match {}", patterns.join(" | "))));
    }

    let length = value.chars().count();
    if let Some(expected) = facets.length {
        if length != expected {
            return Err(("length", format!("length {length} is not {expected}")));
        }
    }
    if let Some(min) = facets.min_length {
        if length < min {
            return Err(("minLength", format!("length {length} is below {min}")));
        }
    }
    if let Some(max) = facets.max_length {
        if length > max {
            return Err(("maxLength", format!("length {length} is above {max}")));
        }
    }

    let bounds: [(&'static str, &Option<String>, fn(Ordering) -> bool); 4] = [
        ("minInclusive", &facets.min_inclusive, |o| o != Ordering::Less),
        ("maxInclusive", &facets.max_inclusive, |o| o != Ordering::Greater),
        ("minExclusive", &facets.min_exclusive, |o| o == Ordering::Greater),
        ("maxExclusive", &facets.max_exclusive, |o| o == Ordering::Less),
    ];
    for (rule, bound, holds) in bounds {
        if let Some(bound) = bound {
            let ordering = compare(value, bound, numeric);
            if !ordering.is_some_and(holds) {
                return Err((rule, format!("{value:?} violates {rule} {bound:?}")));
            }
        }
    }
    Ok(())
}

/// Numeric types compare by value; everything else lexically, which
/// orders ISO 8601 dates and times of equal shape correctly.
fn compare(value: &str, bound: &str, numeric: bool) -> Option<Ordering> {
    if numeric {
        let value: f64 = value.parse().ok()?;
        let bound: f64 = bound.parse().ok()?;
        value.partial_cmp(&bound)
    } else {
        Some(value.cmp(bound))
    }
}
