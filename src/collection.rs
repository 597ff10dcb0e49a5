//! Namespace and document collection
//!
//! Groups parsed schema documents by target namespace and indexes their
//! global declarations by `(kind, namespace, local name)`. Documents that
//! share a namespace (through `xs:include`) are merged into one entry; each
//! imported namespace gets an entry of its own.
//!
//! Registration is the first of the two resolution passes: every global
//! declaration of every document is indexed here before any reference is
//! looked up.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::components::schemas::TopLevel;
use crate::components::{
    AttributeGroupId, AttributeId, ComplexTypeId, DocumentId, ElementId, GroupId, SchemaModel, SimpleTypeId,
};
use crate::error::{Error, Result};
use crate::namespaces::QName;

/// XSD symbol spaces; names in different kinds never clash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Global elements
    Element,
    /// Global attributes
    Attribute,
    /// Complex and simple types share one symbol space
    Type,
    /// Attribute groups
    AttributeGroup,
    /// Model groups
    Group,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Element => "element",
            ComponentKind::Attribute => "attribute",
            ComponentKind::Type => "type",
            ComponentKind::AttributeGroup => "attribute group",
            ComponentKind::Group => "group",
        };
        f.write_str(name)
    }
}

/// A registered global component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalComponent {
    /// Global element
    Element(ElementId),
    /// Global attribute
    Attribute(AttributeId),
    /// Named complex type
    ComplexType(ComplexTypeId),
    /// Named simple type
    SimpleType(SimpleTypeId),
    /// Named attribute group
    AttributeGroup(AttributeGroupId),
    /// Named model group
    Group(GroupId),
}

impl GlobalComponent {
    /// Symbol space of the component
    pub fn kind(&self) -> ComponentKind {
        match self {
            GlobalComponent::Element(_) => ComponentKind::Element,
            GlobalComponent::Attribute(_) => ComponentKind::Attribute,
            GlobalComponent::ComplexType(_) | GlobalComponent::SimpleType(_) => ComponentKind::Type,
            GlobalComponent::AttributeGroup(_) => ComponentKind::AttributeGroup,
            GlobalComponent::Group(_) => ComponentKind::Group,
        }
    }

    /// Expanded name of the component
    pub fn qname(&self, model: &SchemaModel) -> Option<QName> {
        match *self {
            GlobalComponent::Element(id) => model.element(id).qname(),
            GlobalComponent::Attribute(id) => model.attribute(id).qname(),
            GlobalComponent::ComplexType(id) => model.complex_type(id).qname(),
            GlobalComponent::SimpleType(id) => model.simple_type(id).qname(),
            GlobalComponent::AttributeGroup(id) => Some(model.attribute_group(id).qname()),
            GlobalComponent::Group(id) => model.group(id).qname(),
        }
    }
}

impl From<TopLevel> for GlobalComponent {
    fn from(item: TopLevel) -> Self {
        match item {
            TopLevel::Element(id) => GlobalComponent::Element(id),
            TopLevel::Attribute(id) => GlobalComponent::Attribute(id),
            TopLevel::ComplexType(id) => GlobalComponent::ComplexType(id),
            TopLevel::SimpleType(id) => GlobalComponent::SimpleType(id),
            TopLevel::AttributeGroup(id) => GlobalComponent::AttributeGroup(id),
            TopLevel::Group(id) => GlobalComponent::Group(id),
        }
    }
}

/// All documents of one target namespace
#[derive(Debug, Clone, Default)]
pub struct NamespaceEntry {
    /// Documents in registration order
    pub documents: Vec<DocumentId>,
    /// Namespaces imported by any of the documents, first-seen order
    pub imports: Vec<Option<String>>,
}

/// Documents grouped by namespace, with the global declaration index
#[derive(Debug, Clone, Default)]
pub struct DocumentCollection {
    entries: IndexMap<Option<String>, NamespaceEntry>,
    index: HashMap<(ComponentKind, QName), GlobalComponent>,
}

impl DocumentCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parsed document and index its global declarations
    pub fn add_document(&mut self, model: &SchemaModel, id: DocumentId) -> Result<()> {
        let document = model.document(id);
        let namespace = document.target_namespace.clone();

        // Check the whole document before touching the index
        let mut pending = Vec::with_capacity(document.items.len());
        for &item in &document.items {
            let component = GlobalComponent::from(item);
            let Some(name) = component.qname(model) else {
                continue;
            };
            let key = (component.kind(), name);
            if self.index.contains_key(&key) || pending.iter().any(|(k, _)| k == &key) {
                return Err(Error::DuplicateDeclaration {
                    kind: key.0.to_string(),
                    name: key.1.to_string(),
                });
            }
            pending.push((key, component));
        }

        let registered = pending.len();
        self.index.extend(pending);

        let entry = self.entries.entry(namespace.clone()).or_default();
        entry.documents.push(id);
        for import in document.imports() {
            if !entry.imports.contains(&import.namespace) {
                entry.imports.push(import.namespace.clone());
            }
        }

        tracing::debug!(
            document = %document.location,
            namespace = ?namespace,
            registered,
            "registered schema document"
        );
        Ok(())
    }

    /// Distinct target namespaces in first-seen order
    pub fn namespaces(&self) -> impl Iterator<Item = Option<&str>> {
        self.entries.keys().map(|ns| ns.as_deref())
    }

    /// Look up a global declaration
    pub fn lookup_global(&self, namespace: Option<&str>, local_name: &str, kind: ComponentKind) -> Option<GlobalComponent> {
        self.lookup(&QName::new(namespace, local_name), kind)
    }

    /// Look up a global declaration by expanded name
    pub fn lookup(&self, name: &QName, kind: ComponentKind) -> Option<GlobalComponent> {
        self.index.get(&(kind, name.clone())).copied()
    }

    /// Entry of a namespace
    pub fn entry(&self, namespace: Option<&str>) -> Option<&NamespaceEntry> {
        self.entries.get(&namespace.map(str::to_string))
    }

    /// Documents registered under a namespace
    pub fn documents(&self, namespace: Option<&str>) -> &[DocumentId] {
        self.entry(namespace).map(|e| e.documents.as_slice()).unwrap_or(&[])
    }

    /// Namespaces imported from a namespace
    pub fn imports(&self, namespace: Option<&str>) -> &[Option<String>] {
        self.entry(namespace).map(|e| e.imports.as_slice()).unwrap_or(&[])
    }

    /// Number of registered global declarations
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::parsing::{parse_document, Origin};
    use crate::documents::Document;
    use crate::limits::Limits;
    use crate::locations::Location;

    fn add(model: &mut SchemaModel, collection: &mut DocumentCollection, xsd: &str) -> Result<DocumentId> {
        let doc = Document::from_string(xsd)?;
        let root = doc.root().ok_or_else(|| Error::Xml("empty".into()))?;
        let id = parse_document(model, root, Location::String(xsd.into()), Origin::Root, &Limits::default())?;
        collection.add_document(model, id)?;
        Ok(id)
    }

    #[test]
    fn test_merge_same_namespace() {
        let mut model = SchemaModel::new();
        let mut collection = DocumentCollection::new();
        let a = add(
            &mut model,
            &mut collection,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:a">
                <xs:element name="x" type="xs:string"/>
                <xs:import namespace="urn:b"/>
            </xs:schema>"#,
        )
        .unwrap();
        let b = add(
            &mut model,
            &mut collection,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:b">
                <xs:element name="x" type="xs:string"/>
            </xs:schema>"#,
        )
        .unwrap();
        let c = add(
            &mut model,
            &mut collection,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:a">
                <xs:complexType name="x"/>
            </xs:schema>"#,
        )
        .unwrap();

        assert_eq!(collection.namespaces().collect::<Vec<_>>(), vec![Some("urn:a"), Some("urn:b")]);
        assert_eq!(collection.documents(Some("urn:a")), &[a, c]);
        assert_eq!(collection.documents(Some("urn:b")), &[b]);
        assert_eq!(collection.imports(Some("urn:a")), &[Some("urn:b".to_string())]);
        assert_eq!(collection.len(), 3);

        assert!(matches!(
            collection.lookup_global(Some("urn:a"), "x", ComponentKind::Type),
            Some(GlobalComponent::ComplexType(_))
        ));
        assert!(matches!(
            collection.lookup_global(Some("urn:b"), "x", ComponentKind::Element),
            Some(GlobalComponent::Element(_))
        ));
        assert_eq!(collection.lookup_global(None, "x", ComponentKind::Element), None);
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut model = SchemaModel::new();
        let mut collection = DocumentCollection::new();
        add(
            &mut model,
            &mut collection,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:a">
                <xs:simpleType name="code"><xs:restriction base="xs:string"/></xs:simpleType>
            </xs:schema>"#,
        )
        .unwrap();
        let err = add(
            &mut model,
            &mut collection,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:a">
                <xs:complexType name="code"/>
            </xs:schema>"#,
        )
        .unwrap_err();

        match err {
            Error::DuplicateDeclaration { kind, name } => {
                assert_eq!(kind, "type");
                assert_eq!(name, "{urn:a}code");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_duplicate_within_one_document() {
        let mut model = SchemaModel::new();
        let mut collection = DocumentCollection::new();
        let err = add(
            &mut model,
            &mut collection,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="a" type="xs:string"/>
                <xs:element name="a" type="xs:int"/>
            </xs:schema>"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateDeclaration { .. }));
        assert!(collection.is_empty());
    }
}
