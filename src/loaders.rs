//! Resource loading utilities
//!
//! This module handles loading of schema and instance documents.

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;

/// Resource loader for schemas and documents
#[derive(Debug, Clone, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a resource as a string
    pub fn load(&self, location: &Location) -> Result<String> {
        match location {
            Location::Path(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
                })?;

                self.limits.check_xml_size(content.len())?;
                tracing::debug!(path = %path.display(), bytes = content.len(), "loaded resource");

                Ok(content)
            }
            Location::Url(url) => Err(Error::Resource(format!(
                "Remote resources are not supported: {}",
                url
            ))),
            Location::String(s) => {
                self.limits.check_xml_size(s.len())?;
                Ok(s.clone())
            }
        }
    }

    /// Canonical identity of a location, used to load each document once
    pub fn canonical(&self, location: &Location) -> Option<PathBuf> {
        match location {
            Location::Path(path) => path.canonicalize().ok(),
            _ => None,
        }
    }
}
