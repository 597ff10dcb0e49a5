//! XSD simple type definitions
//!
//! Only restriction (with enumeration facets) and list derivations are
//! modeled. Other facets are kept out of the model: they constrain values,
//! not structure.

use super::{DocumentId, RawRef, Resolved, SimpleTypeId, TypeRef};
use crate::namespaces::QName;

/// A base or item type reference: named, or an inline `xs:simpleType`
#[derive(Debug, Clone)]
pub enum SimpleTypeRef {
    /// `base=`/`itemType=` attribute
    Named {
        /// Reference text
        name: RawRef,
        /// Target, set by the resolver
        resolved: Option<Resolved<TypeRef>>,
    },
    /// Nested anonymous simple type
    Inline(SimpleTypeId),
}

impl SimpleTypeRef {
    /// Create an unresolved named reference
    pub fn named(name: RawRef) -> Self {
        SimpleTypeRef::Named { name, resolved: None }
    }

    /// The referenced type, once resolved
    pub fn target(&self) -> Option<TypeRef> {
        match self {
            SimpleTypeRef::Named { resolved, .. } => resolved.as_ref().map(|r| r.target),
            SimpleTypeRef::Inline(id) => Some(TypeRef::Simple(*id)),
        }
    }
}

/// How a simple type is derived
#[derive(Debug, Clone)]
pub enum SimpleDerivation {
    /// `xs:restriction`
    Restriction {
        /// Base type
        base: SimpleTypeRef,
        /// Enumeration facet values, in declaration order
        enumerations: Vec<String>,
    },
    /// `xs:list`
    List {
        /// Item type
        item: SimpleTypeRef,
    },
}

/// An `xs:simpleType` definition
#[derive(Debug, Clone)]
pub struct SimpleTypeDecl {
    /// Type name (None for anonymous types)
    pub name: Option<String>,
    /// Target namespace
    pub namespace: Option<String>,
    /// Derivation
    pub derivation: SimpleDerivation,
    /// Documentation text from annotations
    pub documentation: Option<String>,
    /// Component path used in diagnostics
    pub path: String,
    /// Declaring document
    pub document: DocumentId,

    /// Synthetic name for anonymous types, set by the normalizer
    pub synthetic_name: Option<String>,
}

impl SimpleTypeDecl {
    /// Qualified name of a named type
    pub fn qname(&self) -> Option<QName> {
        self.name
            .as_ref()
            .map(|name| QName::new(self.namespace.clone(), name.clone()))
    }

    /// Declared or synthetic name
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.synthetic_name.as_deref())
    }

    /// Enumeration values declared directly on this type
    pub fn enumerations(&self) -> &[String] {
        match &self.derivation {
            SimpleDerivation::Restriction { enumerations, .. } => enumerations,
            SimpleDerivation::List { .. } => &[],
        }
    }

    /// Describe this type for diagnostics
    pub fn describe(&self) -> String {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::NamespaceContext;
    use std::sync::Arc;

    #[test]
    fn test_simple_type_ref_target() {
        let named = SimpleTypeRef::named(RawRef::new("xs:string", Arc::new(NamespaceContext::new())));
        assert_eq!(named.target(), None);

        let inline = SimpleTypeRef::Inline(SimpleTypeId(4));
        assert_eq!(inline.target(), Some(TypeRef::Simple(SimpleTypeId(4))));
    }

    #[test]
    fn test_enumerations() {
        let decl = SimpleTypeDecl {
            name: Some("color".into()),
            namespace: None,
            derivation: SimpleDerivation::Restriction {
                base: SimpleTypeRef::Inline(SimpleTypeId(0)),
                enumerations: vec!["red".into(), "green".into()],
            },
            documentation: None,
            path: "simpleType 'color'".into(),
            document: DocumentId(0),
            synthetic_name: None,
        };
        assert_eq!(decl.enumerations(), &["red".to_string(), "green".to_string()]);
        assert_eq!(decl.display_name(), Some("color"));
    }
}
