//! Schema components
//!
//! The in-memory schema model. Components live in per-kind arenas owned by
//! [`SchemaModel`]; every link between components is an index handle, so
//! recursive type graphs are plain data with no ownership cycles.
//!
//! Each component carries the textual references captured at parse time
//! (`ref=`, `type=`, `base=`) together with slots that the later passes fill
//! exactly once: resolved targets, the classification tag and the normalized
//! identifiers.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::namespaces::{NamespaceContext, QName};

pub mod attributes;
pub mod builtins;
pub mod complex_types;
pub mod elements;
pub mod groups;
pub mod parsing;
pub mod particles;
pub mod schemas;
pub mod simple_types;

pub use attributes::{AttributeDecl, AttributeForm, AttributeGroupDecl, AttributeGroupRef, AttributeMember, AttributeUse};
pub use builtins::{Primitive, ValueKind, XSD_NAMESPACE};
pub use complex_types::{ComplexTypeDecl, ContentModel, DeclaredContent};
pub use elements::{ElementDecl, ElementForm, InlineType};
pub use groups::{Compositor, GroupRef, ModelGroup, Particle};
pub use particles::{Cardinality, Occurs};
pub use schemas::{DirectiveKind, SchemaDirective, SchemaDocument, SchemaModel, TopLevel};
pub use simple_types::{SimpleDerivation, SimpleTypeDecl, SimpleTypeRef};

macro_rules! component_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the component in its arena
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

component_id!(
    /// Handle of a parsed schema document
    DocumentId
);
component_id!(
    /// Handle of an element declaration
    ElementId
);
component_id!(
    /// Handle of an attribute declaration
    AttributeId
);
component_id!(
    /// Handle of a complex type definition
    ComplexTypeId
);
component_id!(
    /// Handle of a simple type definition
    SimpleTypeId
);
component_id!(
    /// Handle of an attribute group definition
    AttributeGroupId
);
component_id!(
    /// Handle of a model group (sequence or choice)
    GroupId
);

/// Whether a declaration is global or nested inside another component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Top-level, referenceable by name
    Global,
    /// Declared inline
    Local,
}

/// A QName reference as written in the schema, with the bindings in scope
/// where it was written
#[derive(Debug, Clone, PartialEq)]
pub struct RawRef {
    /// Reference text, e.g. `xs:string` or `tns:person`
    pub text: String,
    /// In-scope namespace bindings of the declaring element
    pub namespaces: Arc<NamespaceContext>,
}

impl RawRef {
    /// Create a new reference
    pub fn new(text: impl Into<String>, namespaces: Arc<NamespaceContext>) -> Self {
        Self {
            text: text.into(),
            namespaces,
        }
    }

    /// Expand the prefix into a namespace
    pub fn expand(&self) -> Result<QName> {
        self.namespaces.resolve(self.text.trim())
    }
}

impl fmt::Display for RawRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A reference resolved to its target, with the expanded name used
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    /// Target component handle
    pub target: T,
    /// Expanded name the reference was resolved through
    pub name: QName,
}

impl<T> Resolved<T> {
    /// Create a resolved reference
    pub fn new(target: T, name: QName) -> Self {
        Self { target, name }
    }
}

/// Target of a type reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A built-in XSD type
    Primitive(Primitive),
    /// A user defined simple type
    Simple(SimpleTypeId),
    /// A complex type
    Complex(ComplexTypeId),
}

impl TypeRef {
    /// Check whether values of this type are plain text
    pub fn is_simple(&self) -> bool {
        !matches!(self, TypeRef::Complex(_))
    }

    /// The complex type, if this references one
    pub fn as_complex(&self) -> Option<ComplexTypeId> {
        match self {
            TypeRef::Complex(id) => Some(*id),
            _ => None,
        }
    }
}

/// Whether local declarations are namespace qualified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormDefault {
    /// Local names carry the target namespace
    Qualified,
    /// Local names have no namespace
    #[default]
    Unqualified,
}

impl FormDefault {
    /// Parse from attribute value
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }

    /// Check if qualified
    pub fn is_qualified(&self) -> bool {
        matches!(self, Self::Qualified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_ref_expansion() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", XSD_NAMESPACE);
        let raw = RawRef::new(" xs:string ", Arc::new(ctx));
        assert_eq!(raw.expand().unwrap(), QName::namespaced(XSD_NAMESPACE, "string"));
    }

    #[test]
    fn test_form_default() {
        assert_eq!(FormDefault::from_str("qualified"), Some(FormDefault::Qualified));
        assert!(!FormDefault::default().is_qualified());
        assert_eq!(FormDefault::from_str("bogus"), None);
    }

    #[test]
    fn test_type_ref_helpers() {
        let primitive = TypeRef::Primitive(builtins::lookup_primitive("int").unwrap());
        assert!(primitive.is_simple());
        assert_eq!(TypeRef::Complex(ComplexTypeId(3)).as_complex(), Some(ComplexTypeId(3)));
    }
}
