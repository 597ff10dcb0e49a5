//! Model-driven instance decoding
//!
//! A reference decoder that reads an instance document against the compiled
//! model, behaving the way a generated parser must: the root is dispatched
//! over the global elements, attributes and content are checked against the
//! classified type, and every mismatch is a terminal [`InstanceError`].
//!
//! Sequences are matched greedily in declaration order; choices dispatch on
//! the first alternative whose possible first elements include the incoming
//! (name, namespace) pair.

use indexmap::IndexMap;
use serde::Serialize;

use crate::classifier::{
    attribute_name, attribute_type, element_name, element_type, first_names, particle_emptiable, particle_group,
    particle_occurs,
};
use crate::collection::DocumentCollection;
use crate::components::{
    AttributeId, Cardinality, ComplexTypeId, Compositor, ContentModel, ElementId, GroupId, Occurs, Particle,
    SchemaModel, SimpleDerivation, TypeRef,
};
use crate::documents::{Document, Element};
use crate::error::{Error, InstanceError, InstanceErrorKind, Result};
use crate::exports::match_root;
use crate::identifiers::particle_field;
use crate::XML_NAMESPACE;

/// XML Schema instance namespace; its attributes are never declared
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// A decoded element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    /// Element local name
    pub name: String,
    /// Element namespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Declared or synthetic type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Attribute values keyed by field identifier
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Decoded content
    pub content: Content,
}

impl Instance {
    /// Attribute value by field identifier
    pub fn attribute(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }

    /// Member of sequence content by field identifier
    pub fn field(&self, field: &str) -> Option<&Field> {
        match &self.content {
            Content::Sequence(fields) => fields.get(field),
            Content::Choice { alternative, value } if alternative == field => Some(value),
            _ => None,
        }
    }

    /// Text of simple content
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Content of a decoded element or group occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    /// No content
    Empty,
    /// Simple content (`_value`)
    Text(String),
    /// Sequence members keyed by field identifier
    Sequence(IndexMap<String, Field>),
    /// The selected alternative of a choice
    Choice {
        /// Field identifier of the alternative
        alternative: String,
        /// Its value
        value: Box<Field>,
    },
}

/// A member value shaped by its cardinality
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Mandatory member
    Single(Item),
    /// Optional member
    Optional(Option<Item>),
    /// Repeatable member
    Many(Vec<Item>),
}

impl Field {
    /// All occurrences of the member
    pub fn items(&self) -> Vec<&Item> {
        match self {
            Field::Single(item) => vec![item],
            Field::Optional(item) => item.iter().collect(),
            Field::Many(items) => items.iter().collect(),
        }
    }

    /// Number of occurrences
    pub fn len(&self) -> usize {
        match self {
            Field::Single(_) => 1,
            Field::Optional(item) => usize::from(item.is_some()),
            Field::Many(items) => items.len(),
        }
    }

    /// Check if the member did not occur
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One occurrence of a member
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Item {
    /// Element member
    Element(Instance),
    /// Nested group occurrence
    Group(Content),
}

impl Item {
    /// The element, if this is an element occurrence
    pub fn as_element(&self) -> Option<&Instance> {
        match self {
            Item::Element(instance) => Some(instance),
            Item::Group(_) => None,
        }
    }
}

fn instance_error(kind: InstanceErrorKind, message: impl Into<String>, path: &str) -> Error {
    InstanceError::new(kind, message).with_path(path).into()
}

/// Decodes instance documents against a compiled model
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    model: &'a SchemaModel,
    collection: &'a DocumentCollection,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over a compiled model
    pub fn new(model: &'a SchemaModel, collection: &'a DocumentCollection) -> Self {
        Self { model, collection }
    }

    /// Decode a parsed document
    pub fn decode(&self, document: &Document) -> Result<Instance> {
        let root = document
            .root()
            .ok_or_else(|| Error::Xml("document has no root element".to_string()))?;
        self.decode_root(root)
    }

    /// Decode XML text
    pub fn decode_str(&self, xml: &str) -> Result<Instance> {
        self.decode(&Document::from_string(xml)?)
    }

    /// Dispatch a root element and decode it
    pub fn decode_root(&self, root: &Element) -> Result<Instance> {
        let id = match_root(self.model, self.collection, root.local_name(), root.namespace())?;
        tracing::debug!(root = %root.qname, "decoding instance");
        self.element(id, root, &format!("/{}", root.local_name()))
    }

    fn element(&self, id: ElementId, node: &Element, path: &str) -> Result<Instance> {
        let type_ref = element_type(self.model, id);
        let mut instance = Instance {
            name: node.local_name().to_string(),
            namespace: node.namespace().map(str::to_string),
            type_name: type_ref.and_then(|t| self.type_name(t)),
            attributes: IndexMap::new(),
            content: Content::Empty,
        };

        match type_ref {
            None => {
                self.check_attributes(node, &[], path)?;
                self.check_empty(node, path)?;
            }
            Some(TypeRef::Complex(complex)) => {
                instance.attributes = self.attributes(complex, node, path)?;
                instance.content = self.complex_content(complex, node, path)?;
            }
            Some(simple) => {
                self.check_attributes(node, &[], path)?;
                instance.content = Content::Text(self.simple_value(simple, node, path)?);
            }
        }
        Ok(instance)
    }

    fn type_name(&self, type_ref: TypeRef) -> Option<String> {
        match type_ref {
            TypeRef::Primitive(primitive) => Some(primitive.name.to_string()),
            TypeRef::Simple(id) => self.model.simple_type(id).display_name().map(str::to_string),
            TypeRef::Complex(id) => self.model.complex_type(id).display_name().map(str::to_string),
        }
    }

    fn check_empty(&self, node: &Element, path: &str) -> Result<()> {
        if let Some(child) = node.children.first() {
            return Err(instance_error(
                InstanceErrorKind::UnexpectedElement,
                format!("element '{}' is not allowed in empty content", child.qname),
                path,
            ));
        }
        if let Some(text) = node.significant_text() {
            return Err(instance_error(
                InstanceErrorKind::UnexpectedText,
                format!("text '{}' is not allowed in empty content", text.trim()),
                path,
            ));
        }
        Ok(())
    }

    fn simple_value(&self, type_ref: TypeRef, node: &Element, path: &str) -> Result<String> {
        if let Some(child) = node.children.first() {
            return Err(instance_error(
                InstanceErrorKind::UnexpectedElement,
                format!("element '{}' is not allowed in simple content", child.qname),
                path,
            ));
        }
        let value = node.text.clone().unwrap_or_default();
        self.check_value(type_ref, &value, path)?;
        Ok(value)
    }

    /// Check a value against the enumeration facets along a derivation chain
    fn check_value(&self, type_ref: TypeRef, value: &str, path: &str) -> Result<()> {
        let mut current = type_ref;
        for _ in 0..=self.model.simple_types().count() {
            let TypeRef::Simple(id) = current else {
                return Ok(());
            };
            let decl = self.model.simple_type(id);
            match &decl.derivation {
                SimpleDerivation::Restriction { base, enumerations } => {
                    if !enumerations.is_empty() && !enumerations.iter().any(|e| e == value) {
                        return Err(instance_error(
                            InstanceErrorKind::InvalidValue,
                            format!(
                                "'{}' is not one of {} allowed by {}",
                                value,
                                enumerations.join(", "),
                                decl.display_name().unwrap_or("the type")
                            ),
                            path,
                        ));
                    }
                    match base.target() {
                        Some(next) => current = next,
                        None => return Ok(()),
                    }
                }
                SimpleDerivation::List { item } => {
                    let Some(item) = item.target() else {
                        return Ok(());
                    };
                    for token in value.split_whitespace() {
                        self.check_value(item, token, path)?;
                    }
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn attributes(&self, id: ComplexTypeId, node: &Element, path: &str) -> Result<IndexMap<String, String>> {
        let declared = &self.model.complex_type(id).effective_attributes;
        self.check_attributes(node, declared, path)?;

        let mut values = IndexMap::new();
        for &attr in declared {
            let decl = self.model.attribute(attr);
            let Some(name) = attribute_name(self.model, attr) else {
                continue;
            };
            let field = decl
                .field
                .as_ref()
                .map(|f| f.field_name.clone())
                .unwrap_or_else(|| name.local_name.clone());

            let value = match node.get_attribute_qname(&name) {
                Some(value) => value.to_string(),
                None if decl.occurs().min > 0 => {
                    return Err(instance_error(
                        InstanceErrorKind::MissingAttribute,
                        format!("attribute '{}' is required", name),
                        path,
                    ));
                }
                None => match decl.fixed.as_ref().or(decl.default.as_ref()) {
                    Some(value) => value.clone(),
                    None => continue,
                },
            };
            self.check_value(attribute_type(self.model, attr), &value, &format!("{}/@{}", path, name.local_name))?;
            values.insert(field, value);
        }
        Ok(values)
    }

    fn check_attributes(&self, node: &Element, declared: &[AttributeId], path: &str) -> Result<()> {
        for name in node.attributes.keys() {
            if matches!(name.namespace.as_deref(), Some(XSI_NAMESPACE) | Some(XML_NAMESPACE)) {
                continue;
            }
            let known = declared
                .iter()
                .any(|&attr| attribute_name(self.model, attr).as_ref() == Some(name));
            if !known {
                return Err(instance_error(
                    InstanceErrorKind::UnexpectedAttribute,
                    format!("attribute '{}' is not declared", name),
                    path,
                ));
            }
        }
        Ok(())
    }

    fn complex_content(&self, id: ComplexTypeId, node: &Element, path: &str) -> Result<Content> {
        match self.model.complex_type(id).content.unwrap_or(ContentModel::Empty) {
            ContentModel::Empty => {
                self.check_empty(node, path)?;
                Ok(Content::Empty)
            }
            ContentModel::SimpleContent { base } => Ok(Content::Text(self.simple_value(base, node, path)?)),
            ContentModel::Sequence(group) | ContentModel::Choice(group) => {
                if let Some(text) = node.significant_text() {
                    return Err(instance_error(
                        InstanceErrorKind::UnexpectedText,
                        format!("text '{}' is not allowed in element content", text.trim()),
                        path,
                    ));
                }

                let mut matcher = Matcher {
                    decoder: self,
                    nodes: &node.children,
                    pos: 0,
                    path,
                };
                let occurs = self.model.group(group).occurs;
                let content = if occurs == Occurs::once() {
                    matcher.group(group, true)?.unwrap_or(Content::Empty)
                } else {
                    // A repeated top-level group is decoded as one repeatable member
                    let particle = Particle::Group(group);
                    let mut fields = IndexMap::new();
                    fields.insert("content".to_string(), matcher.particle(&particle)?);
                    Content::Sequence(fields)
                };

                if let Some(extra) = node.children.get(matcher.pos) {
                    return Err(instance_error(
                        InstanceErrorKind::UnexpectedElement,
                        format!("element '{}' is not expected here", extra.qname),
                        path,
                    ));
                }
                Ok(content)
            }
        }
    }
}

/// Cursor over the children of one element
struct Matcher<'d, 'a> {
    decoder: &'d Decoder<'a>,
    nodes: &'d [Element],
    pos: usize,
    path: &'d str,
}

impl<'d, 'a> Matcher<'d, 'a> {
    fn model(&self) -> &SchemaModel {
        self.decoder.model
    }

    fn current(&self) -> Option<&'d Element> {
        self.nodes.get(self.pos)
    }

    fn starts(&self, particle: &Particle, node: &Element) -> bool {
        first_names(self.model(), particle).contains(&node.qname)
    }

    fn child_path(&self, node: &Element) -> String {
        let index = self.nodes[..self.pos]
            .iter()
            .filter(|n| n.qname == node.qname)
            .count();
        format!("{}/{}[{}]", self.path, node.local_name(), index + 1)
    }

    /// Decode one occurrence of a group; None when an optional choice matches nothing
    fn group(&mut self, id: GroupId, required: bool) -> Result<Option<Content>> {
        let model = self.decoder.model;
        let group = model.group(id);
        match group.compositor {
            Compositor::Sequence => {
                let mut fields = IndexMap::new();
                for particle in &group.particles {
                    let Some(field) = particle_field(model, particle) else {
                        continue;
                    };
                    let value = self.particle(particle)?;
                    fields.insert(field.field_name.clone(), value);
                }
                Ok(Some(Content::Sequence(fields)))
            }
            Compositor::Choice => {
                let selected = match self.current() {
                    Some(node) => group.particles.iter().find(|p| self.starts(p, node)),
                    None => None,
                };
                let selected = selected.or_else(|| {
                    if required {
                        group
                            .particles
                            .iter()
                            .find(|p| particle_emptiable(model, p))
                    } else {
                        None
                    }
                });

                match selected {
                    Some(particle) => {
                        let alternative = particle_field(model, particle)
                            .map(|f| f.field_name.clone())
                            .unwrap_or_default();
                        let value = self.particle(particle)?;
                        Ok(Some(Content::Choice {
                            alternative,
                            value: Box::new(value),
                        }))
                    }
                    None if required => {
                        let expected: Vec<String> = group
                            .particles
                            .iter()
                            .flat_map(|p| first_names(model, p))
                            .map(|q| q.to_string())
                            .collect();
                        Err(Error::NoMatchingElement {
                            name: self
                                .current()
                                .map(|n| n.qname.to_string())
                                .unwrap_or_else(|| "(end of content)".to_string()),
                            expected: expected.join(", "),
                        })
                    }
                    None => Ok(None),
                }
            }
        }
    }

    /// Decode all occurrences of a particle
    fn particle(&mut self, particle: &Particle) -> Result<Field> {
        let model = self.decoder.model;
        let occurs = particle_occurs(model, particle);
        let mut items = Vec::new();

        while !occurs.is_over(items.len() as u32) {
            let Some(node) = self.current() else {
                break;
            };
            if !self.starts(particle, node) {
                break;
            }
            match particle {
                Particle::Element(id) => {
                    let path = self.child_path(node);
                    let instance = self.decoder.element(*id, node, &path)?;
                    self.pos += 1;
                    items.push(Item::Element(instance));
                }
                _ => {
                    let Some(group) = particle_group(particle) else {
                        break;
                    };
                    let start = self.pos;
                    match self.group(group, false)? {
                        Some(content) => items.push(Item::Group(content)),
                        None => break,
                    }
                    if self.pos == start {
                        break;
                    }
                }
            }
        }

        // Groups that can match nothing still produce their mandatory occurrences
        let mut satisfied = false;
        if let Some(group) = particle_group(particle) {
            while occurs.is_missing(items.len() as u32) {
                let start = self.pos;
                match self.group(group, true)? {
                    Some(content) => items.push(Item::Group(content)),
                    None => break,
                }
                // One empty occurrence stands for the rest
                if self.pos == start {
                    satisfied = true;
                    break;
                }
            }
        }

        if !satisfied && occurs.is_missing(items.len() as u32) {
            let expected = match particle {
                Particle::Element(id) => element_name(model, *id).map(|q| q.to_string()).unwrap_or_default(),
                _ => first_names(model, particle)
                    .iter()
                    .map(|q| q.to_string())
                    .collect::<Vec<_>>()
                    .join(" | "),
            };
            let found = match self.current() {
                Some(node) => format!("found '{}'", node.qname),
                None => "found end of content".to_string(),
            };
            return Err(instance_error(
                InstanceErrorKind::MissingElement,
                format!(
                    "expected at least {} occurrence(s) of '{}', {}",
                    occurs.min, expected, found
                ),
                self.path,
            ));
        }

        Ok(match occurs.cardinality() {
            Cardinality::Mandatory => match items.pop() {
                Some(item) => Field::Single(item),
                None => Field::Many(Vec::new()),
            },
            Cardinality::Optional => Field::Optional(items.pop()),
            Cardinality::Repeated => Field::Many(items),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::components::parsing::{parse_document, Origin};
    use crate::identifiers::{normalize, NamingRules};
    use crate::limits::Limits;
    use crate::locations::Location;
    use crate::resolver::resolve;
    use pretty_assertions::assert_eq;

    fn compiled(xsd: &str) -> (SchemaModel, DocumentCollection) {
        let doc = Document::from_string(xsd).unwrap();
        let mut model = SchemaModel::new();
        let mut collection = DocumentCollection::new();
        let id = parse_document(
            &mut model,
            doc.root().unwrap(),
            Location::String(xsd.into()),
            Origin::Root,
            &Limits::default(),
        )
        .unwrap();
        collection.add_document(&model, id).unwrap();
        resolve(&mut model, &collection).unwrap();
        classify(&mut model).unwrap();
        normalize(&mut model, &collection, &NamingRules::default()).unwrap();
        (model, collection)
    }

    fn instance_kind(err: Error) -> InstanceErrorKind {
        match err {
            Error::Instance(e) => e.kind,
            other => panic!("unexpected error: {}", other),
        }
    }

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:element name="library">
            <xs:complexType>
                <xs:sequence>
                    <xs:element name="book" type="bookType" maxOccurs="unbounded"/>
                </xs:sequence>
                <xs:attribute name="city" type="xs:string" use="required"/>
            </xs:complexType>
        </xs:element>
        <xs:complexType name="bookType">
            <xs:sequence>
                <xs:element name="title" type="xs:string"/>
                <xs:element name="subtitle" type="xs:string" minOccurs="0"/>
                <xs:choice>
                    <xs:element name="isbn" type="xs:string"/>
                    <xs:element name="catalog" type="xs:int"/>
                </xs:choice>
                <xs:element name="shelved" minOccurs="0"/>
            </xs:sequence>
            <xs:attribute name="format" type="format"/>
        </xs:complexType>
        <xs:simpleType name="format">
            <xs:restriction base="xs:string">
                <xs:enumeration value="paper"/>
                <xs:enumeration value="ebook"/>
            </xs:restriction>
        </xs:simpleType>
    </xs:schema>"#;

    #[test]
    fn test_decode_nested_content() {
        let (model, collection) = compiled(SCHEMA);
        let decoder = Decoder::new(&model, &collection);
        let library = decoder
            .decode_str(
                r#"<library city="Brisbane">
                    <book format="ebook"><title>Dune</title><isbn>0441013597</isbn><shelved/></book>
                    <book><title>Emma</title><subtitle>A Novel</subtitle><catalog>12</catalog></book>
                </library>"#,
            )
            .unwrap();

        assert_eq!(library.attribute("city"), Some("Brisbane"));
        let books = library.field("book").unwrap().items();
        assert_eq!(books.len(), 2);

        let dune = books[0].as_element().unwrap();
        assert_eq!(dune.type_name.as_deref(), Some("bookType"));
        assert_eq!(dune.attribute("format"), Some("ebook"));
        let title = dune.field("title").unwrap().items()[0].as_element().unwrap();
        assert_eq!(title.text(), Some("Dune"));
        assert!(dune.field("subtitle").unwrap().is_empty());
        assert_eq!(dune.field("shelved").unwrap().len(), 1);

        let emma = books[1].as_element().unwrap();
        match emma.field("_anon2").unwrap() {
            Field::Single(Item::Group(Content::Choice { alternative, .. })) => assert_eq!(alternative, "catalog"),
            other => panic!("unexpected field: {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_attribute() {
        let (model, collection) = compiled(SCHEMA);
        let err = Decoder::new(&model, &collection)
            .decode_str("<library><book><title>x</title><isbn>1</isbn></book></library>")
            .unwrap_err();
        assert_eq!(instance_kind(err), InstanceErrorKind::MissingAttribute);
    }

    #[test]
    fn test_unexpected_attribute() {
        let (model, collection) = compiled(SCHEMA);
        let err = Decoder::new(&model, &collection)
            .decode_str(r#"<library city="x" country="y"><book><title>x</title><isbn>1</isbn></book></library>"#)
            .unwrap_err();
        assert_eq!(instance_kind(err), InstanceErrorKind::UnexpectedAttribute);
    }

    #[test]
    fn test_missing_element() {
        let (model, collection) = compiled(SCHEMA);
        let err = Decoder::new(&model, &collection)
            .decode_str(r#"<library city="x"/>"#)
            .unwrap_err();
        assert_eq!(instance_kind(err), InstanceErrorKind::MissingElement);
    }

    #[test]
    fn test_unmatched_choice() {
        let (model, collection) = compiled(SCHEMA);
        let err = Decoder::new(&model, &collection)
            .decode_str(r#"<library city="x"><book><title>x</title><shelved/></book></library>"#)
            .unwrap_err();
        match err {
            Error::NoMatchingElement { name, expected } => {
                assert_eq!(name, "shelved");
                assert_eq!(expected, "isbn, catalog");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unexpected_trailing_element() {
        let (model, collection) = compiled(SCHEMA);
        let err = Decoder::new(&model, &collection)
            .decode_str(r#"<library city="x"><book><title>x</title><isbn>1</isbn><title>y</title></book></library>"#)
            .unwrap_err();
        assert_eq!(instance_kind(err), InstanceErrorKind::UnexpectedElement);
    }

    #[test]
    fn test_text_in_empty_content() {
        let (model, collection) = compiled(SCHEMA);
        let err = Decoder::new(&model, &collection)
            .decode_str(r#"<library city="x"><book><title>x</title><isbn>1</isbn><shelved>yes</shelved></book></library>"#)
            .unwrap_err();
        assert_eq!(instance_kind(err), InstanceErrorKind::UnexpectedText);
    }

    #[test]
    fn test_enumeration_facet() {
        let (model, collection) = compiled(SCHEMA);
        let err = Decoder::new(&model, &collection)
            .decode_str(r#"<library city="x"><book format="scroll"><title>x</title><isbn>1</isbn></book></library>"#)
            .unwrap_err();
        assert_eq!(instance_kind(err), InstanceErrorKind::InvalidValue);
    }

    #[test]
    fn test_unknown_root() {
        let (model, collection) = compiled(SCHEMA);
        let err = Decoder::new(&model, &collection).decode_str("<book/>").unwrap_err();
        assert!(matches!(err, Error::NoMatchingElement { ref name, .. } if name == "book"));
    }

    #[test]
    fn test_xsi_attributes_are_ignored() {
        let (model, collection) = compiled(SCHEMA);
        let library = Decoder::new(&model, &collection)
            .decode_str(
                r#"<library xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="lib.xsd" city="x">
                    <book><title>x</title><isbn>1</isbn></book>
                </library>"#,
            )
            .unwrap();
        assert_eq!(library.attributes.len(), 1);
    }

    #[test]
    fn test_emptiable_group_with_large_minimum() {
        let (model, collection) = compiled(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="bag">
                    <xs:complexType>
                        <xs:sequence>
                            <xs:sequence minOccurs="4000000000" maxOccurs="unbounded">
                                <xs:element name="x" type="xs:string" minOccurs="0"/>
                            </xs:sequence>
                        </xs:sequence>
                    </xs:complexType>
                </xs:element>
            </xs:schema>"#,
        );
        let bag = Decoder::new(&model, &collection).decode_str("<bag/>").unwrap();
        match &bag.content {
            Content::Sequence(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].len(), 1);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }
}
