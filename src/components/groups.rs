//! XSD model groups
//!
//! Sequences and choices, either inline inside a complex type or defined
//! globally with `xs:group name="..."`.

use std::fmt;

use serde::Serialize;

use super::particles::Occurs;
use super::{DocumentId, ElementId, GroupId, RawRef, Resolved};
use crate::identifiers::Identifier;
use crate::namespaces::QName;

/// Model group compositor type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compositor {
    /// Ordered sequence of particles
    Sequence,
    /// One of multiple alternatives
    Choice,
}

impl Compositor {
    /// Parse from element tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            _ => None,
        }
    }
}

impl fmt::Display for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
        }
    }
}

/// `<xs:group ref="..."/>` used as a particle
#[derive(Debug, Clone)]
pub struct GroupRef {
    /// Reference text
    pub name: RawRef,
    /// Occurrence constraints of the reference
    pub occurs: Occurs,
    /// Component path used in diagnostics
    pub path: String,
    /// Target, set by the resolver
    pub resolved: Option<Resolved<GroupId>>,
}

/// A particle in a model group
#[derive(Debug, Clone)]
pub enum Particle {
    /// Element declaration or element reference
    Element(ElementId),
    /// Nested anonymous sequence or choice
    Group(GroupId),
    /// Reference to a named model group
    GroupRef(GroupRef),
    /// `xs:any` or `xs:all`, kept so classification can reject it by location
    Unsupported {
        /// Construct name
        construct: String,
        /// Component path used in diagnostics
        path: String,
    },
}

/// An `xs:sequence` or `xs:choice`
#[derive(Debug, Clone)]
pub struct ModelGroup {
    /// Compositor
    pub compositor: Compositor,
    /// Particles in declaration order
    pub particles: Vec<Particle>,
    /// Occurrence constraints of the group itself
    pub occurs: Occurs,
    /// Name of a global `xs:group` definition
    pub name: Option<String>,
    /// Target namespace (named groups)
    pub namespace: Option<String>,
    /// Component path used in diagnostics
    pub path: String,
    /// Declaring document
    pub document: DocumentId,

    /// Synthetic name for anonymous nested groups, set by the normalizer
    pub synthetic_name: Option<String>,
    /// Member identifier when used as a particle, set by the normalizer
    pub field: Option<Identifier>,
}

impl ModelGroup {
    /// Create an anonymous model group
    pub fn new(compositor: Compositor, document: DocumentId, path: impl Into<String>) -> Self {
        Self {
            compositor,
            particles: Vec::new(),
            occurs: Occurs::once(),
            name: None,
            namespace: None,
            path: path.into(),
            document,
            synthetic_name: None,
            field: None,
        }
    }

    /// Qualified name of a named group
    pub fn qname(&self) -> Option<QName> {
        self.name
            .as_ref()
            .map(|name| QName::new(self.namespace.clone(), name.clone()))
    }

    /// Declared or synthetic name
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.synthetic_name.as_deref())
    }

    /// Describe this group for diagnostics
    pub fn describe(&self) -> String {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compositor_from_tag() {
        assert_eq!(Compositor::from_tag("sequence"), Some(Compositor::Sequence));
        assert_eq!(Compositor::from_tag("choice"), Some(Compositor::Choice));
        assert_eq!(Compositor::from_tag("all"), None);
        assert_eq!(Compositor::Choice.to_string(), "choice");
    }

    #[test]
    fn test_group_names() {
        let mut group = ModelGroup::new(Compositor::Sequence, DocumentId(0), "group 'g'");
        assert_eq!(group.display_name(), None);
        group.synthetic_name = Some("_anon1".into());
        assert_eq!(group.display_name(), Some("_anon1"));
        group.name = Some("g".into());
        assert_eq!(group.qname(), Some(QName::local("g")));
        assert_eq!(group.display_name(), Some("g"));
    }
}
