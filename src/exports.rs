//! Model export
//!
//! The boundary handed to code emitters: a serializable, fully resolved view
//! of the compiled model, grouped per target namespace in first-seen order.
//! Every type carries its classification tag, its flattened attributes and
//! its content members with canonical cardinality; anonymous nodes are
//! listed in the synthetic-name table.
//!
//! The exporter only reads the model. It must run after normalization and
//! cycle analysis.

use serde::Serialize;

use crate::classifier::{
    attribute_name, attribute_type, effective_element, element_name, element_type, particle_group, particle_occurs,
};
use crate::collection::DocumentCollection;
use crate::components::builtins::XSD_NAMESPACE;
use crate::components::schemas::TopLevel;
use crate::components::{
    Cardinality, ComplexTypeId, Compositor, ContentModel, DocumentId, ElementId, GroupId, Occurs, Particle, Primitive,
    SchemaModel, SimpleDerivation, SimpleTypeId, SimpleTypeRef, TypeRef, ValueKind,
};
use crate::cycles::CycleAnalysis;
use crate::error::{Error, Result};
use crate::identifiers::Identifier;
use crate::namespaces::QName;

/// Kind of a referenced type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Built-in XSD type
    Primitive,
    /// Simple type definition
    Simple,
    /// Complex type definition
    Complex,
}

/// A reference to a type by its declared or synthetic name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeName {
    /// Namespace of the type
    pub namespace: Option<String>,
    /// Declared or synthetic name
    pub name: String,
    /// Kind of type
    pub kind: TypeKind,
}

impl TypeName {
    fn of(model: &SchemaModel, type_ref: TypeRef) -> Self {
        match type_ref {
            TypeRef::Primitive(primitive) => Self {
                namespace: Some(XSD_NAMESPACE.to_string()),
                name: primitive.name.to_string(),
                kind: TypeKind::Primitive,
            },
            TypeRef::Simple(id) => {
                let decl = model.simple_type(id);
                Self {
                    namespace: decl.namespace.clone(),
                    name: decl.display_name().unwrap_or_default().to_string(),
                    kind: TypeKind::Simple,
                }
            }
            TypeRef::Complex(id) => {
                let decl = model.complex_type(id);
                Self {
                    namespace: decl.namespace.clone(),
                    name: decl.display_name().unwrap_or_default().to_string(),
                    kind: TypeKind::Complex,
                }
            }
        }
    }
}

/// A global element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementExport {
    /// Element name and field identifier
    #[serde(flatten)]
    pub field: Identifier,
    /// Element namespace
    pub namespace: Option<String>,
    /// Element type; None for empty elements
    #[serde(rename = "type")]
    pub type_name: Option<TypeName>,
    /// Whether the element is nillable
    pub nillable: bool,
    /// Documentation text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl ElementExport {
    /// Expanded name of the element
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.clone(), self.field.xml_name.clone())
    }
}

/// An attribute of a complex type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeExport {
    /// XML name and field identifier
    #[serde(flatten)]
    pub field: Identifier,
    /// Attribute namespace
    pub namespace: Option<String>,
    /// Value type
    #[serde(rename = "type")]
    pub type_name: TypeName,
    /// Mandatory or optional
    pub cardinality: Cardinality,
    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Fixed value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
}

/// A content member of a sequence or choice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberExport {
    /// Element member
    Element {
        /// XML name and field identifier
        #[serde(flatten)]
        field: Identifier,
        /// Element namespace
        namespace: Option<String>,
        /// Element type; None for empty elements
        #[serde(rename = "type")]
        type_name: Option<TypeName>,
        /// Canonical occurrence bounds
        occurs: Occurs,
        /// Representation of the member
        cardinality: Cardinality,
        /// Whether the member closes a type cycle and needs indirection
        boxed: bool,
    },
    /// Nested or referenced model group
    Group {
        /// Field identifier (the group's name)
        #[serde(flatten)]
        field: Identifier,
        /// Sequence or choice
        compositor: Compositor,
        /// Canonical occurrence bounds
        occurs: Occurs,
        /// Representation of the member
        cardinality: Cardinality,
    },
}

impl MemberExport {
    /// Field identifier of the member
    pub fn field(&self) -> &Identifier {
        match self {
            MemberExport::Element { field, .. } | MemberExport::Group { field, .. } => field,
        }
    }

    /// Cardinality of the member
    pub fn cardinality(&self) -> Cardinality {
        match self {
            MemberExport::Element { cardinality, .. } | MemberExport::Group { cardinality, .. } => *cardinality,
        }
    }
}

/// A complex type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeExport {
    /// Declared or synthetic name
    pub name: String,
    /// Whether the name is synthetic
    pub anonymous: bool,
    /// Classification tag: `empty`, `simple_content`, `sequence` or `choice`
    pub content: &'static str,
    /// Value type of simple content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeName>,
    /// Occurrence bounds of the top-level sequence or choice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_occurs: Option<Occurs>,
    /// Whether the type is part of a type cycle
    pub recursive: bool,
    /// Effective attributes, inherited first
    pub attributes: Vec<AttributeExport>,
    /// Content members in declaration order
    pub members: Vec<MemberExport>,
    /// Documentation text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl TypeExport {
    /// Look up an attribute by XML name
    pub fn attribute(&self, xml_name: &str) -> Option<&AttributeExport> {
        self.attributes.iter().find(|a| a.field.xml_name == xml_name)
    }

    /// Look up a member by field identifier
    pub fn member(&self, field_name: &str) -> Option<&MemberExport> {
        self.members.iter().find(|m| m.field().field_name == field_name)
    }
}

/// A named or synthetic model group nested in content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupExport {
    /// Declared or synthetic name
    pub name: String,
    /// Whether the name is synthetic
    pub anonymous: bool,
    /// Sequence or choice
    pub compositor: Compositor,
    /// Members in declaration order
    pub members: Vec<MemberExport>,
}

/// A simple type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleTypeExport {
    /// Declared or synthetic name
    pub name: String,
    /// Whether the name is synthetic
    pub anonymous: bool,
    /// `restriction` or `list`
    pub derivation: &'static str,
    /// Base (restriction) or item (list) type
    pub base: Option<TypeName>,
    /// Built-in type at the root of the derivation chain
    pub primitive: Option<Primitive>,
    /// Value space family of the root
    pub value_kind: Option<ValueKind>,
    /// Enumeration values
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enumerations: Vec<String>,
}

/// Kind of an anonymous node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymousKind {
    /// Inline complex type
    ComplexType,
    /// Inline simple type
    SimpleType,
    /// Nested sequence or choice
    Group,
}

/// One entry of the synthetic-name table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymousExport {
    /// Synthetic name
    pub name: String,
    /// Node kind
    pub kind: AnonymousKind,
    /// Location of the node in the schema
    pub path: String,
}

/// Everything declared in one target namespace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceExport {
    /// Target namespace
    pub namespace: Option<String>,
    /// Source documents in registration order
    pub documents: Vec<String>,
    /// Imported namespaces
    pub imports: Vec<Option<String>>,
    /// Global elements in declaration order
    pub elements: Vec<ElementExport>,
    /// Complex types: named in declaration order, then anonymous
    pub types: Vec<TypeExport>,
    /// Nested and named model groups
    pub groups: Vec<GroupExport>,
    /// Simple types: named in declaration order, then anonymous
    pub simple_types: Vec<SimpleTypeExport>,
    /// Synthetic-name table
    pub anonymous: Vec<AnonymousExport>,
}

impl NamespaceExport {
    /// Look up a type by declared or synthetic name
    pub fn complex_type(&self, name: &str) -> Option<&TypeExport> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Look up a simple type by declared or synthetic name
    pub fn simple_type(&self, name: &str) -> Option<&SimpleTypeExport> {
        self.simple_types.iter().find(|t| t.name == name)
    }
}

/// The exported model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaExport {
    /// Namespaces in first-seen order
    pub namespaces: Vec<NamespaceExport>,
}

impl SchemaExport {
    /// Entry of one namespace
    pub fn namespace(&self, namespace: Option<&str>) -> Option<&NamespaceExport> {
        self.namespaces.iter().find(|n| n.namespace.as_deref() == namespace)
    }

    /// Find the global element matching a root node, in declaration order
    pub fn match_root(&self, local_name: &str, namespace: Option<&str>) -> Result<&ElementExport> {
        let candidates = || self.namespaces.iter().flat_map(|n| n.elements.iter());
        candidates()
            .find(|e| e.qname().matches(local_name, namespace))
            .ok_or_else(|| no_match(local_name, namespace, candidates().map(ElementExport::qname)))
    }

    /// Render as JSON
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }
}

fn no_match(local_name: &str, namespace: Option<&str>, candidates: impl Iterator<Item = QName>) -> Error {
    Error::NoMatchingElement {
        name: QName::new(namespace, local_name).to_string(),
        expected: candidates.map(|q| q.to_string()).collect::<Vec<_>>().join(", "),
    }
}

/// Global elements of the collection in root-dispatch order
pub fn root_elements(model: &SchemaModel, collection: &DocumentCollection) -> Vec<ElementId> {
    collection
        .namespaces()
        .flat_map(|ns| collection.documents(ns).iter())
        .flat_map(|&doc| model.document(doc).items.iter())
        .filter_map(|item| match item {
            TopLevel::Element(id) => Some(*id),
            _ => None,
        })
        .collect()
}

/// Root dispatch over the model: the first global element named `(local_name, namespace)`
pub fn match_root(
    model: &SchemaModel,
    collection: &DocumentCollection,
    local_name: &str,
    namespace: Option<&str>,
) -> Result<ElementId> {
    let roots = root_elements(model, collection);
    roots
        .iter()
        .copied()
        .find(|&id| {
            model
                .element(id)
                .qname()
                .is_some_and(|q| q.matches(local_name, namespace))
        })
        .ok_or_else(|| no_match(local_name, namespace, roots.iter().filter_map(|&id| model.element(id).qname())))
}

/// Built-in type at the root of a simple type's derivation chain
pub fn primitive_root(model: &SchemaModel, type_ref: TypeRef) -> Option<Primitive> {
    let mut current = type_ref;
    // Chains are finite unless the schema loops; bound the walk by the arena size
    for _ in 0..=model.simple_types().count() {
        current = match current {
            TypeRef::Primitive(primitive) => return Some(primitive),
            TypeRef::Complex(_) => return None,
            TypeRef::Simple(id) => match &model.simple_type(id).derivation {
                SimpleDerivation::Restriction { base, .. } => base.target()?,
                SimpleDerivation::List { .. } => {
                    return Some(Primitive {
                        name: "anySimpleType",
                        kind: ValueKind::List,
                    })
                }
            },
        };
    }
    None
}

/// Counter of a synthetic name
fn synthetic_index(prefix: &str, name: &str) -> usize {
    name.strip_prefix(prefix)
        .and_then(|counter| counter.parse().ok())
        .unwrap_or(usize::MAX)
}

struct Exporter<'a> {
    model: &'a SchemaModel,
    cycles: &'a CycleAnalysis,
}

impl<'a> Exporter<'a> {
    fn element(&self, id: ElementId) -> ElementExport {
        let decl = self.model.element(id);
        ElementExport {
            field: decl.field.clone().unwrap_or_else(|| Identifier::verbatim(decl.name.clone().unwrap_or_default())),
            namespace: decl.namespace.clone(),
            type_name: element_type(self.model, id).map(|t| TypeName::of(self.model, t)),
            nillable: decl.nillable,
            documentation: decl.documentation.clone(),
        }
    }

    fn complex_type(&self, id: ComplexTypeId) -> TypeExport {
        let decl = self.model.complex_type(id);
        let content = decl.content.unwrap_or(ContentModel::Empty);

        let attributes = decl
            .effective_attributes
            .iter()
            .map(|&attr| {
                let target = self.model.attribute(attr);
                let name = attribute_name(self.model, attr);
                AttributeExport {
                    field: target
                        .field
                        .clone()
                        .unwrap_or_else(|| Identifier::verbatim(name.as_ref().map(|q| q.local_name.clone()).unwrap_or_default())),
                    namespace: name.and_then(|q| q.namespace),
                    type_name: TypeName::of(self.model, attribute_type(self.model, attr)),
                    cardinality: target.occurs().cardinality(),
                    default: target.default.clone(),
                    fixed: target.fixed.clone(),
                }
            })
            .collect();

        let (base, content_occurs, members) = match content {
            ContentModel::SimpleContent { base } => (Some(TypeName::of(self.model, base)), None, Vec::new()),
            ContentModel::Sequence(group) | ContentModel::Choice(group) => (
                None,
                Some(self.model.group(group).occurs),
                self.members(group, Some(id)),
            ),
            ContentModel::Empty => (None, None, Vec::new()),
        };

        TypeExport {
            name: decl.display_name().unwrap_or_default().to_string(),
            anonymous: decl.is_anonymous(),
            content: content.tag(),
            base,
            content_occurs,
            recursive: decl.recursive,
            attributes,
            members,
            documentation: decl.documentation.clone(),
        }
    }

    fn members(&self, group: GroupId, owner: Option<ComplexTypeId>) -> Vec<MemberExport> {
        self.model
            .group(group)
            .particles
            .iter()
            .filter_map(|particle| {
                let occurs = particle_occurs(self.model, particle);
                match particle {
                    Particle::Element(id) => {
                        let name = element_name(self.model, *id);
                        let effective = effective_element(self.model, *id);
                        Some(MemberExport::Element {
                            field: self.model.element(*id).field.clone().unwrap_or_else(|| {
                                Identifier::verbatim(name.as_ref().map(|q| q.local_name.clone()).unwrap_or_default())
                            }),
                            namespace: self.model.element(effective).namespace.clone(),
                            type_name: element_type(self.model, *id).map(|t| TypeName::of(self.model, t)),
                            occurs,
                            cardinality: occurs.cardinality(),
                            boxed: match owner {
                                Some(owner) => self.cycles.is_boxed(owner, *id),
                                None => self.cycles.is_boxed_member(*id),
                            },
                        })
                    }
                    Particle::Group(_) | Particle::GroupRef(_) => {
                        let target = particle_group(particle)?;
                        let group = self.model.group(target);
                        Some(MemberExport::Group {
                            field: group.field.clone()?,
                            compositor: group.compositor,
                            occurs,
                            cardinality: occurs.cardinality(),
                        })
                    }
                    Particle::Unsupported { .. } => None,
                }
            })
            .collect()
    }

    fn group(&self, id: GroupId) -> Option<GroupExport> {
        let group = self.model.group(id);
        Some(GroupExport {
            name: group.display_name()?.to_string(),
            anonymous: group.name.is_none(),
            compositor: group.compositor,
            members: self.members(id, None),
        })
    }

    fn simple_type(&self, id: SimpleTypeId) -> SimpleTypeExport {
        let decl = self.model.simple_type(id);
        let (derivation, base) = match &decl.derivation {
            SimpleDerivation::Restriction { base, .. } => ("restriction", base),
            SimpleDerivation::List { item } => ("list", item),
        };
        let base = match base {
            SimpleTypeRef::Named { .. } => base.target(),
            SimpleTypeRef::Inline(inline) => Some(TypeRef::Simple(*inline)),
        };
        let primitive = primitive_root(self.model, TypeRef::Simple(id));
        SimpleTypeExport {
            name: decl.display_name().unwrap_or_default().to_string(),
            anonymous: decl.name.is_none(),
            derivation,
            base: base.map(|b| TypeName::of(self.model, b)),
            primitive,
            value_kind: primitive.map(|p| p.kind),
            enumerations: decl.enumerations().to_vec(),
        }
    }

    fn namespace(&self, collection: &DocumentCollection, namespace: Option<&str>) -> NamespaceExport {
        let model = self.model;
        let documents = collection.documents(namespace);
        let in_namespace = |doc: DocumentId| documents.contains(&doc);

        let mut elements = Vec::new();
        let mut types = Vec::new();
        let mut groups = Vec::new();
        let mut simple_types = Vec::new();
        for &doc in documents {
            for item in &model.document(doc).items {
                match *item {
                    TopLevel::Element(id) => elements.push(self.element(id)),
                    TopLevel::ComplexType(id) => types.push(self.complex_type(id)),
                    TopLevel::SimpleType(id) => simple_types.push(self.simple_type(id)),
                    TopLevel::Group(id) => groups.extend(self.group(id)),
                    TopLevel::Attribute(_) | TopLevel::AttributeGroup(_) => {}
                }
            }
        }

        let mut anonymous = Vec::new();
        for (id, decl) in model.complex_types().filter(|(_, t)| t.is_anonymous() && in_namespace(t.document)) {
            if let Some(name) = &decl.synthetic_name {
                anonymous.push((name.clone(), AnonymousKind::ComplexType, decl.path.clone()));
                types.push(self.complex_type(id));
            }
        }
        for (id, decl) in model.simple_types().filter(|(_, t)| t.name.is_none() && in_namespace(t.document)) {
            if let Some(name) = &decl.synthetic_name {
                anonymous.push((name.clone(), AnonymousKind::SimpleType, decl.path.clone()));
                simple_types.push(self.simple_type(id));
            }
        }
        for (id, group) in model.groups().filter(|(_, g)| g.name.is_none() && in_namespace(g.document)) {
            if let Some(name) = &group.synthetic_name {
                anonymous.push((name.clone(), AnonymousKind::Group, group.path.clone()));
                groups.extend(self.group(id));
            }
        }

        let prefix = model.anonymous_prefix().unwrap_or_default();
        let by_counter = |name: &str, anonymous: bool| if anonymous { synthetic_index(prefix, name) } else { 0 };
        // Stable sorts keep declaration order among named entries
        types.sort_by_key(|t| by_counter(&t.name, t.anonymous));
        simple_types.sort_by_key(|t| by_counter(&t.name, t.anonymous));
        groups.sort_by_key(|g| by_counter(&g.name, g.anonymous));
        anonymous.sort_by_key(|(name, _, _)| synthetic_index(prefix, name));

        NamespaceExport {
            namespace: namespace.map(str::to_string),
            documents: documents.iter().map(|&d| model.document(d).location.to_string()).collect(),
            imports: collection.imports(namespace).to_vec(),
            elements,
            types,
            groups,
            simple_types,
            anonymous: anonymous
                .into_iter()
                .map(|(name, kind, path)| AnonymousExport { name, kind, path })
                .collect(),
        }
    }
}

/// Export the compiled model
pub fn export(model: &SchemaModel, collection: &DocumentCollection, cycles: &CycleAnalysis) -> SchemaExport {
    let exporter = Exporter { model, cycles };
    SchemaExport {
        namespaces: collection
            .namespaces()
            .map(|ns| exporter.namespace(collection, ns))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::components::parsing::{parse_document, Origin};
    use crate::cycles::analyze;
    use crate::documents::Document;
    use crate::identifiers::{normalize, NamingRules};
    use crate::limits::Limits;
    use crate::locations::Location;
    use crate::resolver::resolve;
    use pretty_assertions::assert_eq;

    fn compiled(xsd: &str) -> Result<(SchemaModel, DocumentCollection, SchemaExport)> {
        let doc = Document::from_string(xsd)?;
        let root = doc.root().ok_or_else(|| Error::Xml("empty".into()))?;
        let mut model = SchemaModel::new();
        let mut collection = DocumentCollection::new();
        let id = parse_document(&mut model, root, Location::String(xsd.into()), Origin::Root, &Limits::default())?;
        collection.add_document(&model, id)?;
        resolve(&mut model, &collection)?;
        classify(&mut model)?;
        normalize(&mut model, &collection, &NamingRules::default())?;
        let cycles = analyze(&mut model);
        let export = export(&model, &collection, &cycles);
        Ok((model, collection, export))
    }

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
            xmlns:t="urn:t" targetNamespace="urn:t" elementFormDefault="qualified">
        <xs:element name="order" type="t:orderType"/>
        <xs:element name="note" type="xs:string"/>
        <xs:complexType name="orderType">
            <xs:sequence>
                <xs:element name="id" type="xs:int"/>
                <xs:element name="comment" type="xs:string" minOccurs="0"/>
                <xs:element name="line" maxOccurs="unbounded">
                    <xs:complexType>
                        <xs:attribute name="sku" type="xs:string" use="required"/>
                    </xs:complexType>
                </xs:element>
                <xs:choice minOccurs="0">
                    <xs:element name="pickup" type="xs:string"/>
                    <xs:element name="ship" type="xs:string"/>
                </xs:choice>
            </xs:sequence>
            <xs:attribute name="status" type="t:status"/>
        </xs:complexType>
        <xs:simpleType name="status">
            <xs:restriction base="xs:token">
                <xs:enumeration value="open"/>
                <xs:enumeration value="closed"/>
            </xs:restriction>
        </xs:simpleType>
    </xs:schema>"#;

    #[test]
    fn test_export_layout() {
        let (_, _, export) = compiled(SCHEMA).unwrap();
        assert_eq!(export.namespaces.len(), 1);
        let ns = export.namespace(Some("urn:t")).unwrap();

        let elements: Vec<&str> = ns.elements.iter().map(|e| e.field.xml_name.as_str()).collect();
        assert_eq!(elements, vec!["order", "note"]);
        assert_eq!(ns.elements[0].type_name.as_ref().unwrap().name, "orderType");

        let order = ns.complex_type("orderType").unwrap();
        assert_eq!(order.content, "sequence");
        let members: Vec<(&str, Cardinality)> = order
            .members
            .iter()
            .map(|m| (m.field().field_name.as_str(), m.cardinality()))
            .collect();
        assert_eq!(
            members,
            vec![
                ("id", Cardinality::Mandatory),
                ("comment", Cardinality::Optional),
                ("line", Cardinality::Repeated),
                ("_anon2", Cardinality::Optional),
            ]
        );
        let status = order.attribute("status").unwrap();
        assert_eq!(status.cardinality, Cardinality::Optional);
        assert_eq!(status.type_name.kind, TypeKind::Simple);

        let anonymous: Vec<(&str, AnonymousKind)> = ns.anonymous.iter().map(|a| (a.name.as_str(), a.kind)).collect();
        assert_eq!(
            anonymous,
            vec![("_anon1", AnonymousKind::ComplexType), ("_anon2", AnonymousKind::Group)]
        );
        let line = ns.complex_type("_anon1").unwrap();
        assert!(line.anonymous);
        assert_eq!(line.content, "empty");
        assert_eq!(line.attribute("sku").unwrap().cardinality, Cardinality::Mandatory);
    }

    #[test]
    fn test_simple_type_root() {
        let (_, _, export) = compiled(SCHEMA).unwrap();
        let status = export.namespace(Some("urn:t")).unwrap().simple_type("status").unwrap();
        assert_eq!(status.derivation, "restriction");
        assert_eq!(status.primitive.map(|p| p.name), Some("token"));
        assert_eq!(status.enumerations, vec!["open", "closed"]);
    }

    #[test]
    fn test_match_root() {
        let (model, collection, export) = compiled(SCHEMA).unwrap();
        assert_eq!(export.match_root("note", Some("urn:t")).unwrap().field.xml_name, "note");

        let id = match_root(&model, &collection, "order", Some("urn:t")).unwrap();
        assert_eq!(model.element(id).name.as_deref(), Some("order"));

        let err = export.match_root("order", None).unwrap_err();
        match err {
            Error::NoMatchingElement { name, expected } => {
                assert_eq!(name, "order");
                assert_eq!(expected, "{urn:t}order, {urn:t}note");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(matches!(
            match_root(&model, &collection, "line", Some("urn:t")),
            Err(Error::NoMatchingElement { .. })
        ));
    }

    #[test]
    fn test_json_rendering() {
        let (_, _, export) = compiled(SCHEMA).unwrap();
        let json: serde_json::Value = serde_json::from_str(&export.to_json(false).unwrap()).unwrap();
        let order = &json["namespaces"][0]["types"][0];
        assert_eq!(order["name"], "orderType");
        assert_eq!(order["members"][2]["kind"], "element");
        assert_eq!(order["members"][2]["cardinality"], "repeated");
        assert_eq!(order["members"][2]["occurs"]["max"], serde_json::Value::Null);
        assert_eq!(order["attributes"][0]["xml_name"], "status");
    }
}
