//! Resource location resolution
//!
//! This module resolves the locations of schema documents, including the
//! `schemaLocation` of `xs:include`/`xs:import` relative to the document
//! that declares them.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

/// Resource location - a file path, a URL or an in-memory source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// URL (http, https, ftp, etc.)
    Url(Url),
    /// In-memory source text
    String(String),
}

impl Location {
    /// Create a location from a reference string (auto-detect type)
    pub fn parse(s: &str) -> Self {
        if let Ok(url) = Url::parse(s) {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return Location::Path(path);
                }
            } else if url.scheme().len() > 1 {
                // Single-letter schemes are Windows drive letters
                return Location::Url(url);
            }
        }

        Location::Path(PathBuf::from(s))
    }

    /// Get the location as a string
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::Url(u) => u.to_string(),
            Location::String(_) => "<string>".to_string(),
        }
    }

    /// Directory that relative references from this location resolve against
    pub fn base_dir(&self) -> Option<&Path> {
        match self {
            Location::Path(p) => p.parent(),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolve a `schemaLocation` value against the location of the referencing document
pub fn resolve_schema_location(schema_location: &str, referrer: Option<&Location>) -> Location {
    match Location::parse(schema_location) {
        Location::Path(path) if path.is_relative() => {
            match referrer {
                Some(Location::Url(base)) => match base.join(schema_location) {
                    Ok(url) => Location::Url(url),
                    Err(_) => Location::Path(path),
                },
                Some(other) => match other.base_dir() {
                    Some(dir) => Location::Path(dir.join(path)),
                    None => Location::Path(path),
                },
                None => Location::Path(path),
            }
        }
        resolved => resolved,
    }
}
