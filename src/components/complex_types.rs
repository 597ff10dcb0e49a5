//! XSD complex type definitions
//!
//! A complex type records what it *declares* as parsed ([`DeclaredContent`])
//! and, after classification, the single structural form it reduces to
//! ([`ContentModel`]).

use std::fmt;

use super::attributes::AttributeMember;
use super::{AttributeId, ComplexTypeId, DocumentId, GroupId, RawRef, Resolved, TypeRef};
use crate::namespaces::QName;

/// A content declaration found directly under `xs:complexType`
#[derive(Debug, Clone)]
pub enum DeclaredContent {
    /// `xs:sequence`, or a top-level `xs:group ref` wrapped in one
    Sequence(GroupId),
    /// `xs:choice`
    Choice(GroupId),
    /// `xs:simpleContent/xs:extension`
    SimpleExtension {
        /// `base=` reference
        base: RawRef,
        /// Target, set by the resolver
        resolved: Option<Resolved<TypeRef>>,
    },
    /// `xs:complexContent/xs:extension`
    ComplexExtension {
        /// `base=` reference
        base: RawRef,
        /// Target, set by the resolver
        resolved: Option<Resolved<ComplexTypeId>>,
        /// Content added by the extension
        content: Option<GroupId>,
    },
    /// A construct that has no structural form (`xs:all`)
    Unsupported {
        /// Construct name
        construct: String,
        /// Component path used in diagnostics
        path: String,
    },
}

impl DeclaredContent {
    /// Short name of the declared construct
    pub fn kind_name(&self) -> &str {
        match self {
            DeclaredContent::Sequence(_) => "sequence",
            DeclaredContent::Choice(_) => "choice",
            DeclaredContent::SimpleExtension { .. } => "simpleContent",
            DeclaredContent::ComplexExtension { .. } => "complexContent",
            DeclaredContent::Unsupported { construct, .. } => construct,
        }
    }
}

/// The classified structural form of a complex type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// No content; attributes only
    Empty,
    /// Text payload held in `_value`
    SimpleContent {
        /// Type of the text payload
        base: TypeRef,
    },
    /// Ordered tuple of members
    Sequence(GroupId),
    /// Exclusive selection among alternatives
    Choice(GroupId),
}

impl ContentModel {
    /// The model group carrying the members, if any
    pub fn group(&self) -> Option<GroupId> {
        match self {
            ContentModel::Sequence(id) | ContentModel::Choice(id) => Some(*id),
            _ => None,
        }
    }

    /// Tag name used in exports
    pub fn tag(&self) -> &'static str {
        match self {
            ContentModel::Empty => "empty",
            ContentModel::SimpleContent { .. } => "simple_content",
            ContentModel::Sequence(_) => "sequence",
            ContentModel::Choice(_) => "choice",
        }
    }
}

impl fmt::Display for ContentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// An `xs:complexType` definition
#[derive(Debug, Clone)]
pub struct ComplexTypeDecl {
    /// Type name (None for anonymous types)
    pub name: Option<String>,
    /// Target namespace
    pub namespace: Option<String>,
    /// `mixed="true"`
    pub mixed: bool,
    /// Content declarations in document order; well formed types have at most one
    pub declared: Vec<DeclaredContent>,
    /// Attribute declarations and group references in declaration order
    pub attributes: Vec<AttributeMember>,
    /// Documentation text from annotations
    pub documentation: Option<String>,
    /// Component path used in diagnostics
    pub path: String,
    /// Declaring document
    pub document: DocumentId,

    /// Classified content, set by the classifier
    pub content: Option<ContentModel>,
    /// Attributes after group flattening and inheritance, set by the classifier
    pub effective_attributes: Vec<AttributeId>,
    /// Synthetic name for anonymous types, set by the normalizer
    pub synthetic_name: Option<String>,
    /// Whether the type takes part in a reference cycle, set by cycle analysis
    pub recursive: bool,
}

impl ComplexTypeDecl {
    /// Create a complex type
    pub fn new(name: Option<String>, document: DocumentId, path: impl Into<String>) -> Self {
        Self {
            name,
            namespace: None,
            mixed: false,
            declared: Vec::new(),
            attributes: Vec::new(),
            documentation: None,
            path: path.into(),
            document,
            content: None,
            effective_attributes: Vec::new(),
            synthetic_name: None,
            recursive: false,
        }
    }

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

    /// Check if the type was declared inline
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    /// Describe this type for diagnostics
    pub fn describe(&self) -> String {
        match (&self.name, &self.synthetic_name) {
            (None, Some(synthetic)) => format!("{} ({})", self.path, synthetic),
            _ => self.path.clone(),
        }
    }
}
