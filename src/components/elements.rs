//! XSD element declarations

use super::particles::Occurs;
use super::{
    ComplexTypeId, DocumentId, ElementId, RawRef, Resolved, Scope, SimpleTypeId, TypeRef,
};
use crate::identifiers::Identifier;
use crate::namespaces::QName;

/// A type declared inline inside an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineType {
    /// Anonymous `xs:complexType`
    Complex(ComplexTypeId),
    /// Anonymous `xs:simpleType`
    Simple(SimpleTypeId),
}

impl InlineType {
    /// The inline type as a type reference
    pub fn type_ref(self) -> TypeRef {
        match self {
            InlineType::Complex(id) => TypeRef::Complex(id),
            InlineType::Simple(id) => TypeRef::Simple(id),
        }
    }
}

/// Structural form of an element declaration after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementForm {
    /// `ref=`: name and type come from a global element
    Ref {
        /// Referenced global element
        target: ElementId,
    },
    /// `type=` or an inline type registered as a synthetic named type
    NamedType {
        /// The element's type
        type_ref: TypeRef,
        /// Whether the type was declared inline
        anonymous: bool,
    },
    /// Neither a type, a reference nor an inline type
    EmptyInline,
}

/// An `xs:element` declaration
#[derive(Debug, Clone)]
pub struct ElementDecl {
    /// Local name (None for references)
    pub name: Option<String>,
    /// Namespace of the element name (target namespace when qualified)
    pub namespace: Option<String>,
    /// Global or local
    pub scope: Scope,
    /// `ref=` reference
    pub ref_name: Option<RawRef>,
    /// `type=` reference
    pub type_name: Option<RawRef>,
    /// Inline anonymous type
    pub inline_type: Option<InlineType>,
    /// Occurrence constraints
    pub occurs: Occurs,
    /// Whether the element is nillable
    pub nillable: bool,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Documentation text from annotations
    pub documentation: Option<String>,
    /// Component path used in diagnostics
    pub path: String,
    /// Declaring document
    pub document: DocumentId,

    /// Target of `ref=`, set by the resolver
    pub resolved_ref: Option<Resolved<ElementId>>,
    /// Target of `type=`, set by the resolver
    pub resolved_type: Option<Resolved<TypeRef>>,
    /// Structural form, set by the classifier
    pub form: Option<ElementForm>,
    /// Member identifier, set by the normalizer
    pub field: Option<Identifier>,
}

impl ElementDecl {
    /// Create a named element declaration
    pub fn new(name: Option<String>, scope: Scope, document: DocumentId, path: impl Into<String>) -> Self {
        Self {
            name,
            namespace: None,
            scope,
            ref_name: None,
            type_name: None,
            inline_type: None,
            occurs: Occurs::once(),
            nillable: false,
            default: None,
            fixed: None,
            documentation: None,
            path: path.into(),
            document,
            resolved_ref: None,
            resolved_type: None,
            form: None,
            field: None,
        }
    }

    /// Qualified name of a named declaration
    pub fn qname(&self) -> Option<QName> {
        self.name
            .as_ref()
            .map(|name| QName::new(self.namespace.clone(), name.clone()))
    }

    /// Check if this is a top-level declaration
    pub fn is_global(&self) -> bool {
        self.scope == Scope::Global
    }

    /// Describe this element for diagnostics
    pub fn describe(&self) -> String {
        self.path.clone()
    }
}
