//! Schema documents and the component arena
//!
//! [`SchemaModel`] owns every component of a compilation unit. Components
//! are appended while documents are parsed and never removed; handles stay
//! valid for the lifetime of the model.

use std::sync::Arc;

use super::{
    AttributeDecl, AttributeGroupDecl, AttributeGroupId, AttributeId, ComplexTypeDecl, ComplexTypeId,
    DocumentId, ElementDecl, ElementId, FormDefault, GroupId, ModelGroup, SimpleTypeDecl, SimpleTypeId,
};
use crate::locations::Location;
use crate::namespaces::NamespaceContext;

/// `xs:include` or `xs:import`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Same-namespace inclusion
    Include,
    /// Foreign-namespace import
    Import,
}

/// An include/import directive of a schema document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDirective {
    /// Directive kind
    pub kind: DirectiveKind,
    /// `namespace=` of an import
    pub namespace: Option<String>,
    /// `schemaLocation=`
    pub location: Option<String>,
}

/// A top-level declaration, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevel {
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

/// One parsed XSD file
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    /// Where the document was loaded from
    pub location: Location,
    /// Target namespace (None = no namespace)
    pub target_namespace: Option<String>,
    /// `elementFormDefault`
    pub element_form: FormDefault,
    /// `attributeFormDefault`
    pub attribute_form: FormDefault,
    /// Namespace bindings of the `xs:schema` element
    pub namespaces: Arc<NamespaceContext>,
    /// Top-level declarations in document order
    pub items: Vec<TopLevel>,
    /// Include and import directives in document order
    pub directives: Vec<SchemaDirective>,
}

impl SchemaDocument {
    /// Create an empty document record
    pub fn new(location: Location, target_namespace: Option<String>) -> Self {
        Self {
            location,
            target_namespace,
            element_form: FormDefault::default(),
            attribute_form: FormDefault::default(),
            namespaces: Arc::new(NamespaceContext::new()),
            items: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// Include directives
    pub fn includes(&self) -> impl Iterator<Item = &SchemaDirective> {
        self.directives.iter().filter(|d| d.kind == DirectiveKind::Include)
    }

    /// Import directives
    pub fn imports(&self) -> impl Iterator<Item = &SchemaDirective> {
        self.directives.iter().filter(|d| d.kind == DirectiveKind::Import)
    }
}

macro_rules! arena {
    ($field:ident, $id:ident, $decl:ty, $add:ident, $get:ident, $get_mut:ident, $iter:ident) => {
        #[doc = concat!("Append a component to the `", stringify!($field), "` arena")]
        pub fn $add(&mut self, decl: $decl) -> $id {
            self.$field.push(decl);
            $id(self.$field.len() - 1)
        }

        #[doc = concat!("Get a component from the `", stringify!($field), "` arena")]
        pub fn $get(&self, id: $id) -> &$decl {
            &self.$field[id.0]
        }

        #[doc = concat!("Get a mutable component from the `", stringify!($field), "` arena")]
        pub fn $get_mut(&mut self, id: $id) -> &mut $decl {
            &mut self.$field[id.0]
        }

        #[doc = concat!("Iterate over the `", stringify!($field), "` arena with handles")]
        pub fn $iter(&self) -> impl Iterator<Item = ($id, &$decl)> + '_ {
            self.$field.iter().enumerate().map(|(i, d)| ($id(i), d))
        }
    };
}

/// All documents and components of a compilation unit
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    documents: Vec<SchemaDocument>,
    elements: Vec<ElementDecl>,
    attributes: Vec<AttributeDecl>,
    complex_types: Vec<ComplexTypeDecl>,
    simple_types: Vec<SimpleTypeDecl>,
    attribute_groups: Vec<AttributeGroupDecl>,
    groups: Vec<ModelGroup>,
    anonymous_prefix: Option<String>,
}

impl SchemaModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    arena!(documents, DocumentId, SchemaDocument, add_document, document, document_mut, documents);
    arena!(elements, ElementId, ElementDecl, add_element, element, element_mut, elements);
    arena!(attributes, AttributeId, AttributeDecl, add_attribute, attribute, attribute_mut, attributes);
    arena!(complex_types, ComplexTypeId, ComplexTypeDecl, add_complex_type, complex_type, complex_type_mut, complex_types);
    arena!(simple_types, SimpleTypeId, SimpleTypeDecl, add_simple_type, simple_type, simple_type_mut, simple_types);
    arena!(attribute_groups, AttributeGroupId, AttributeGroupDecl, add_attribute_group, attribute_group, attribute_group_mut, attribute_groups);
    arena!(groups, GroupId, ModelGroup, add_group, group, group_mut, groups);

    /// Number of documents
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Prefix of the synthetic names, once they are assigned
    pub fn anonymous_prefix(&self) -> Option<&str> {
        self.anonymous_prefix.as_deref()
    }

    pub(crate) fn set_anonymous_prefix(&mut self, prefix: impl Into<String>) {
        self.anonymous_prefix = Some(prefix.into());
    }

    /// Total number of components across all arenas
    pub fn component_count(&self) -> usize {
        self.elements.len()
            + self.attributes.len()
            + self.complex_types.len()
            + self.simple_types.len()
            + self.attribute_groups.len()
            + self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Compositor, Scope};

    #[test]
    fn test_arena_handles() {
        let mut model = SchemaModel::new();
        let doc = model.add_document(SchemaDocument::new(Location::String("<schema/>".into()), None));
        assert_eq!(doc.index(), 0);

        let e1 = model.add_element(ElementDecl::new(Some("a".into()), Scope::Global, doc, "element 'a'"));
        let e2 = model.add_element(ElementDecl::new(Some("b".into()), Scope::Global, doc, "element 'b'"));
        assert_ne!(e1, e2);
        assert_eq!(model.element(e2).name.as_deref(), Some("b"));

        model.element_mut(e1).nillable = true;
        assert!(model.element(e1).nillable);

        model.add_group(ModelGroup::new(Compositor::Sequence, doc, "sequence"));
        assert_eq!(model.component_count(), 3);
        assert_eq!(model.elements().map(|(id, _)| id).collect::<Vec<_>>(), vec![e1, e2]);
    }

    #[test]
    fn test_directive_filters() {
        let mut doc = SchemaDocument::new(Location::String(String::new()), Some("urn:a".into()));
        doc.directives.push(SchemaDirective {
            kind: DirectiveKind::Include,
            namespace: None,
            location: Some("b.xsd".into()),
        });
        doc.directives.push(SchemaDirective {
            kind: DirectiveKind::Import,
            namespace: Some("urn:c".into()),
            location: None,
        });
        assert_eq!(doc.includes().count(), 1);
        assert_eq!(doc.imports().next().and_then(|d| d.namespace.as_deref()), Some("urn:c"));
    }
}
