//! Error types for xmlschema-codegen
//!
//! This module defines all error types used throughout the library.
//! Compile-time errors abort the whole compilation unit; instance errors are
//! reported by the model-driven decoder against documents.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for schema compilation
#[derive(Error, Debug)]
pub enum Error {
    /// Two documents in one namespace declare the same global name
    #[error("duplicate declaration: {kind} '{name}' is declared more than once")]
    DuplicateDeclaration {
        /// Kind of the component (element, type, ...)
        kind: String,
        /// Qualified name of the duplicated component
        name: String,
    },

    /// A `ref`/`type`/`base` reference did not resolve
    #[error("unresolved reference: {component} refers to {kind} '{name}' which is not declared")]
    UnresolvedReference {
        /// The referencing component
        component: String,
        /// Expected kind of the target
        kind: String,
        /// Expanded qualified name that failed to resolve
        name: String,
    },

    /// Two declarations that exclude each other are both present
    #[error("{component} declares both {first} and {second}")]
    MutuallyExclusive {
        /// The offending component
        component: String,
        /// First declared property
        first: String,
        /// Second declared property
        second: String,
    },

    /// A complex type declares more than one content model, or a choice
    /// cannot be dispatched unambiguously
    #[error("ambiguous content model in {component}: {reason}")]
    AmbiguousContentModel {
        /// The offending component
        component: String,
        /// What makes the content model ambiguous
        reason: String,
    },

    /// The content model does not fit any structural form
    #[error("unclassifiable content model in {component}: {reason}")]
    UnclassifiableContentModel {
        /// The offending component
        component: String,
        /// Why classification failed
        reason: String,
    },

    /// Two members of one member set end up with the same field name
    #[error("name collision in {scope}: '{first}' and '{second}' both map to field '{field}'")]
    NameCollision {
        /// The member set (type, group or namespace)
        scope: String,
        /// XML name of the first member
        first: String,
        /// XML name of the second member
        second: String,
        /// Colliding field identifier
        field: String,
    },

    /// A derivation or attribute group chain loops back on itself
    #[error("circular reference: {0}")]
    CircularReference(String),

    /// A (name, namespace) pair matched nothing in a candidate list
    #[error("no matching element for '{name}'; expected one of: {expected}")]
    NoMatchingElement {
        /// Qualified name of the unmatched element
        name: String,
        /// Candidate names, comma separated
        expected: String,
    },

    /// A document failed to load, so the compilation unit was discarded
    #[error("compilation unit rejected: {0}")]
    Rejected(String),

    /// Schema document parsing error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Instance document does not match the compiled model
    #[error("instance error: {0}")]
    Instance(#[from] InstanceError),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// XML Schema parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema (document and component path)
    pub location: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Kind of mismatch between an instance document and the compiled model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceErrorKind {
    /// A required attribute is absent
    MissingAttribute,
    /// An attribute is not declared for the element's type
    UnexpectedAttribute,
    /// Fewer occurrences of an element than minOccurs
    MissingElement,
    /// A child element does not fit the content model
    UnexpectedElement,
    /// Non-whitespace text where the content model allows none
    UnexpectedText,
    /// A value violates an enumeration facet
    InvalidValue,
}

impl fmt::Display for InstanceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttribute => write!(f, "missing attribute"),
            Self::UnexpectedAttribute => write!(f, "unexpected attribute"),
            Self::MissingElement => write!(f, "missing element"),
            Self::UnexpectedElement => write!(f, "unexpected element"),
            Self::UnexpectedText => write!(f, "unexpected text"),
            Self::InvalidValue => write!(f, "invalid value"),
        }
    }
}

/// Instance decoding error with context
#[derive(Debug, Clone)]
pub struct InstanceError {
    /// What went wrong
    pub kind: InstanceErrorKind,
    /// Error message
    pub message: String,
    /// Path to the element that failed to decode
    pub path: Option<String>,
}

impl InstanceError {
    /// Create a new instance error
    pub fn new(kind: InstanceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
        }
    }

    /// Set the path where decoding failed
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;

        if let Some(ref path) = self.path {
            write!(f, "\n\nPath: {}", path)?;
        }

        Ok(())
    }
}

impl std::error::Error for InstanceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_error_display() {
        let err = InstanceError::new(InstanceErrorKind::MissingAttribute, "attribute 'name' is required")
            .with_path("/addressbook/person");

        let msg = format!("{}", err);
        assert!(msg.contains("missing attribute"));
        assert!(msg.contains("attribute 'name' is required"));
        assert!(msg.contains("Path: /addressbook/person"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("maxOccurs value must be a non-negative integer or 'unbounded'")
            .with_location("schema.xsd: complexType 'person'/element 'phone'");

        let msg = format!("{}", err);
        assert!(msg.contains("maxOccurs"));
        assert!(msg.contains("Location:"));
    }

    #[test]
    fn test_unresolved_reference_names_target() {
        let err = Error::UnresolvedReference {
            component: "element 'item'".to_string(),
            kind: "type".to_string(),
            name: "{http://x}missing".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("{http://x}missing"));
        assert!(msg.contains("element 'item'"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ParseError::new("test").into();
        assert!(matches!(err, Error::Parse(_)));

        let err: Error = InstanceError::new(InstanceErrorKind::UnexpectedText, "text").into();
        assert!(matches!(err, Error::Instance(_)));
    }
}
