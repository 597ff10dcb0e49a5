//! XSD attribute declarations and attribute groups

use serde::Serialize;

use super::particles::Occurs;
use super::{AttributeGroupId, AttributeId, DocumentId, RawRef, Resolved, Scope, SimpleTypeId, TypeRef};
use crate::identifiers::Identifier;
use crate::namespaces::QName;

/// Attribute use (`use=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeUse {
    /// Attribute must be present
    Required,
    /// Attribute may be present
    #[default]
    Optional,
    /// Attribute must not be present
    Prohibited,
}

impl AttributeUse {
    /// Parse from attribute value
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "required" => Some(Self::Required),
            "optional" => Some(Self::Optional),
            "prohibited" => Some(Self::Prohibited),
            _ => None,
        }
    }
}

/// Structural form of an attribute declaration after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeForm {
    /// `ref=`: name and type come from a global attribute
    Ref(AttributeId),
    /// `type=` naming a built-in or simple type
    NamedType(TypeRef),
    /// Inline anonymous simple type
    InlineType(SimpleTypeId),
    /// No type given; values are untyped text
    Untyped,
}

/// An `xs:attribute` declaration
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    /// Local name (None for references)
    pub name: Option<String>,
    /// Namespace of the attribute name
    pub namespace: Option<String>,
    /// Global or local
    pub scope: Scope,
    /// `ref=` reference
    pub ref_name: Option<RawRef>,
    /// `type=` reference
    pub type_name: Option<RawRef>,
    /// Inline anonymous simple type
    pub inline_type: Option<SimpleTypeId>,
    /// `use=`
    pub use_mode: AttributeUse,
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
    pub resolved_ref: Option<Resolved<AttributeId>>,
    /// Target of `type=`, set by the resolver
    pub resolved_type: Option<Resolved<TypeRef>>,
    /// Structural form, set by the classifier
    pub form: Option<AttributeForm>,
    /// Member identifier, set by the normalizer
    pub field: Option<Identifier>,
}

impl AttributeDecl {
    /// Create an attribute declaration
    pub fn new(name: Option<String>, scope: Scope, document: DocumentId, path: impl Into<String>) -> Self {
        Self {
            name,
            namespace: None,
            scope,
            ref_name: None,
            type_name: None,
            inline_type: None,
            use_mode: AttributeUse::default(),
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

    /// Attributes occur at most once; required ones exactly once
    pub fn occurs(&self) -> Occurs {
        match self.use_mode {
            AttributeUse::Required => Occurs::once(),
            AttributeUse::Optional => Occurs::optional(),
            AttributeUse::Prohibited => Occurs::new(0, Some(0)),
        }
    }

    /// Describe this attribute for diagnostics
    pub fn describe(&self) -> String {
        self.path.clone()
    }
}

/// `<xs:attributeGroup ref="..."/>` inside a type or another group
#[derive(Debug, Clone)]
pub struct AttributeGroupRef {
    /// Reference text
    pub name: RawRef,
    /// Component path used in diagnostics
    pub path: String,
    /// Target, set by the resolver
    pub resolved: Option<Resolved<AttributeGroupId>>,
}

/// Entry of an attribute list, in declaration order
#[derive(Debug, Clone)]
pub enum AttributeMember {
    /// An attribute declaration or attribute reference
    Attribute(AttributeId),
    /// A reference to an attribute group
    GroupRef(AttributeGroupRef),
}

/// A named `xs:attributeGroup` definition
#[derive(Debug, Clone)]
pub struct AttributeGroupDecl {
    /// Group name
    pub name: String,
    /// Target namespace
    pub namespace: Option<String>,
    /// Members in declaration order
    pub members: Vec<AttributeMember>,
    /// Component path used in diagnostics
    pub path: String,
    /// Declaring document
    pub document: DocumentId,
}

impl AttributeGroupDecl {
    /// Qualified name of the group
    pub fn qname(&self) -> QName {
        QName::new(self.namespace.clone(), self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_use() {
        assert_eq!(AttributeUse::from_str("required"), Some(AttributeUse::Required));
        assert_eq!(AttributeUse::from_str("sometimes"), None);
        assert_eq!(AttributeUse::default(), AttributeUse::Optional);
    }

    #[test]
    fn test_attribute_occurs() {
        let mut decl = AttributeDecl::new(Some("name".into()), Scope::Local, DocumentId(0), "attribute 'name'");
        assert_eq!(decl.occurs(), Occurs::optional());

        decl.use_mode = AttributeUse::Required;
        assert_eq!(decl.occurs(), Occurs::once());
        assert_eq!(decl.qname(), Some(QName::local("name")));
    }
}
