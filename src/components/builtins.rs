//! XSD built-in types
//!
//! The fixed table of primitive and built-in derived types that references
//! short-circuit to during resolution.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};

/// XSD 1.0 Namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Value space family of a built-in type, used by emitters to pick a scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Character data
    String,
    /// true/false/1/0
    Boolean,
    /// Arbitrary precision integer and its bounded derivations
    Integer,
    /// Decimal number
    Decimal,
    /// IEEE floating point
    Float,
    /// Dates, times and durations
    Temporal,
    /// Binary data (hex or base64)
    Binary,
    /// Whitespace separated list of tokens
    List,
    /// anyType / anySimpleType
    Any,
}

/// A built-in XSD type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Primitive {
    /// Local name in the XSD namespace
    pub name: &'static str,
    /// Value space family
    pub kind: ValueKind,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xs:{}", self.name)
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const BUILTINS: &[(&str, ValueKind)] = &[
    ("string", ValueKind::String),
    ("normalizedString", ValueKind::String),
    ("token", ValueKind::String),
    ("language", ValueKind::String),
    ("Name", ValueKind::String),
    ("NCName", ValueKind::String),
    ("ID", ValueKind::String),
    ("IDREF", ValueKind::String),
    ("ENTITY", ValueKind::String),
    ("NMTOKEN", ValueKind::String),
    ("anyURI", ValueKind::String),
    ("QName", ValueKind::String),
    ("NOTATION", ValueKind::String),
    ("IDREFS", ValueKind::List),
    ("ENTITIES", ValueKind::List),
    ("NMTOKENS", ValueKind::List),
    ("boolean", ValueKind::Boolean),
    ("decimal", ValueKind::Decimal),
    ("integer", ValueKind::Integer),
    ("long", ValueKind::Integer),
    ("int", ValueKind::Integer),
    ("short", ValueKind::Integer),
    ("byte", ValueKind::Integer),
    ("nonNegativeInteger", ValueKind::Integer),
    ("positiveInteger", ValueKind::Integer),
    ("unsignedLong", ValueKind::Integer),
    ("unsignedInt", ValueKind::Integer),
    ("unsignedShort", ValueKind::Integer),
    ("unsignedByte", ValueKind::Integer),
    ("nonPositiveInteger", ValueKind::Integer),
    ("negativeInteger", ValueKind::Integer),
    ("float", ValueKind::Float),
    ("double", ValueKind::Float),
    ("duration", ValueKind::Temporal),
    ("dateTime", ValueKind::Temporal),
    ("time", ValueKind::Temporal),
    ("date", ValueKind::Temporal),
    ("gYearMonth", ValueKind::Temporal),
    ("gYear", ValueKind::Temporal),
    ("gMonthDay", ValueKind::Temporal),
    ("gDay", ValueKind::Temporal),
    ("gMonth", ValueKind::Temporal),
    ("hexBinary", ValueKind::Binary),
    ("base64Binary", ValueKind::Binary),
    ("anyType", ValueKind::Any),
    ("anySimpleType", ValueKind::Any),
];

static PRIMITIVES: Lazy<HashMap<&'static str, Primitive>> = Lazy::new(|| {
    BUILTINS
        .iter()
        .map(|&(name, kind)| (name, Primitive { name, kind }))
        .collect()
});

/// Look up a built-in type by its local name in the XSD namespace
pub fn lookup_primitive(local_name: &str) -> Option<Primitive> {
    PRIMITIVES.get(local_name).copied()
}

/// Look up a built-in type by expanded name; other namespaces never match
pub fn lookup_qualified(namespace: Option<&str>, local_name: &str) -> Option<Primitive> {
    if namespace == Some(XSD_NAMESPACE) {
        lookup_primitive(local_name)
    } else {
        None
    }
}

/// The type assumed for attributes and simple content with no declared type
pub fn any_simple_type() -> Primitive {
    Primitive {
        name: "anySimpleType",
        kind: ValueKind::Any,
    }
}
