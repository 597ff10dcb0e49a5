//! Occurrence constraints
//!
//! `minOccurs`/`maxOccurs` parsing and the canonical cardinality derived from
//! them. Every member of a sequence or choice, every element and every
//! attribute ends up with an [`Occurs`] pair and one [`Cardinality`] tag.

use std::fmt;

use serde::Serialize;

use crate::error::{ParseError, Result};

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// Check if this particle can be empty (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if occurrence count is under the minimum
    pub fn is_missing(&self, count: u32) -> bool {
        count < self.min
    }

    /// Check if occurrence count is at or over the maximum
    pub fn is_over(&self, count: u32) -> bool {
        match self.max {
            Some(max) => count >= max,
            None => false,
        }
    }

    /// Canonical field shape for this occurrence range
    pub fn cardinality(&self) -> Cardinality {
        match self.max {
            Some(1) if self.min == 0 => Cardinality::Optional,
            Some(1) => Cardinality::Mandatory,
            _ => Cardinality::Repeated,
        }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "({}, {})", self.min, max),
            None => write!(f, "({}, unbounded)", self.min),
        }
    }
}

/// How a member is represented downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// (1, 1): a plain scalar field
    Mandatory,
    /// (0, 1): a nullable field
    Optional,
    /// max != 1: an ordered collection
    Repeated,
}

impl Cardinality {
    /// Check if the member is modeled as a collection
    pub fn is_repeated(&self) -> bool {
        matches!(self, Self::Repeated)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mandatory => write!(f, "mandatory"),
            Self::Optional => write!(f, "optional"),
            Self::Repeated => write!(f, "repeated"),
        }
    }
}

/// Parse minOccurs/maxOccurs from XML attribute values
pub fn parse_occurs(min_occurs: Option<&str>, max_occurs: Option<&str>) -> Result<Occurs> {
    let mut occurs = Occurs::once();

    if let Some(min_str) = min_occurs {
        occurs.min = min_str.trim().parse::<u32>().map_err(|_| {
            ParseError::new(format!(
                "minOccurs value '{}' is not a valid non-negative integer",
                min_str
            ))
        })?;
    }

    match max_occurs.map(str::trim) {
        Some("unbounded") => occurs.max = None,
        Some(max_str) => {
            let max = max_str.parse::<u32>().map_err(|_| {
                ParseError::new(format!(
                    "maxOccurs value '{}' must be a non-negative integer or 'unbounded'",
                    max_str
                ))
            })?;
            if occurs.min > max {
                return Err(ParseError::new(
                    "maxOccurs must be 'unbounded' or greater than minOccurs",
                )
                .into());
            }
            occurs.max = Some(max);
        }
        None => {
            // Default maxOccurs is 1, but must be >= minOccurs
            if occurs.min > 1 {
                return Err(ParseError::new(
                    "minOccurs must be lesser or equal than maxOccurs",
                )
                .into());
            }
        }
    }

    Ok(occurs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_occurs_default() {
        let occurs = parse_occurs(None, None).unwrap();
        assert_eq!(occurs, Occurs::once());
        assert_eq!(occurs.cardinality(), Cardinality::Mandatory);
    }

    #[test]
    fn test_parse_occurs_values() {
        let occurs = parse_occurs(Some("0"), Some("5")).unwrap();
        assert_eq!(occurs, Occurs::new(0, Some(5)));

        let occurs = parse_occurs(Some("1"), Some("unbounded")).unwrap();
        assert_eq!(occurs, Occurs::new(1, None));
    }

    #[test]
    fn test_parse_occurs_errors() {
        assert!(parse_occurs(Some("abc"), None).is_err());
        assert!(parse_occurs(Some("-1"), None).is_err());
        assert!(parse_occurs(None, Some("abc")).is_err());
        assert!(parse_occurs(Some("5"), Some("3")).is_err());
        assert!(parse_occurs(Some("5"), None).is_err());
    }

    #[test]
    fn test_cardinality_rules() {
        assert_eq!(parse_occurs(None, None).unwrap().cardinality(), Cardinality::Mandatory);
        assert_eq!(parse_occurs(Some("0"), None).unwrap().cardinality(), Cardinality::Optional);
        assert_eq!(
            parse_occurs(None, Some("unbounded")).unwrap().cardinality(),
            Cardinality::Repeated
        );
        assert_eq!(
            parse_occurs(Some("0"), Some("unbounded")).unwrap().cardinality(),
            Cardinality::Repeated
        );
        assert_eq!(parse_occurs(Some("2"), Some("3")).unwrap().cardinality(), Cardinality::Repeated);
        assert_eq!(Occurs::new(0, Some(0)).cardinality(), Cardinality::Repeated);
    }

    #[test]
    fn test_occurs_counts() {
        let occurs = Occurs::new(1, Some(2));
        assert!(occurs.is_missing(0));
        assert!(!occurs.is_over(1));
        assert!(occurs.is_over(2));
        assert!(!Occurs::zero_or_more().is_over(1000));
        assert_eq!(Occurs::zero_or_more().to_string(), "(0, unbounded)");
    }

    proptest! {
        #[test]
        fn prop_unbounded_is_always_repeated(min in 0u32..1000) {
            let occurs = parse_occurs(Some(&min.to_string()), Some("unbounded")).unwrap();
            prop_assert_eq!(occurs.cardinality(), Cardinality::Repeated);
        }

        #[test]
        fn prop_single_max_is_never_repeated(min in 0u32..=1) {
            let occurs = parse_occurs(Some(&min.to_string()), None).unwrap();
            prop_assert!(!occurs.cardinality().is_repeated());
            prop_assert_eq!(occurs.cardinality() == Cardinality::Optional, min == 0);
        }

        #[test]
        fn prop_bounded_max_above_one_is_repeated(min in 0u32..10, extra in 0u32..10) {
            let max = (min + extra).max(2);
            let occurs = parse_occurs(Some(&min.to_string()), Some(&max.to_string())).unwrap();
            prop_assert_eq!(occurs.cardinality(), Cardinality::Repeated);
        }
    }
}
