//! Compilation pipeline
//!
//! [`Compiler`] collects schema documents: each added document is parsed and
//! its globals registered immediately, and include/import locations are
//! followed through an iterative worklist. [`Compiler::compile`] consumes
//! the compiler and runs the remaining phases in order:
//!
//! 1. resolve every reference against the complete registry
//! 2. classify types, elements and attributes
//! 3. assign synthetic names and field identifiers
//! 4. analyze recursive types
//!
//! Since `compile` takes the compiler by value, no document can be
//! registered once resolution has begun. Any error aborts the whole unit.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::collection::DocumentCollection;
use crate::components::parsing::{parse_document, Origin};
use crate::components::{DirectiveKind, DocumentId, ElementId, SchemaModel};
use crate::cycles::{analyze, CycleAnalysis};
use crate::documents::Document;
use crate::error::{Error, ParseError, Result};
use crate::exports::{export, match_root, SchemaExport};
use crate::identifiers::{
    normalize, NamingRules, DEFAULT_ANONYMOUS_PREFIX, DEFAULT_RESERVED_SUFFIX, DEFAULT_RESERVED_WORDS,
};
use crate::instances::{Decoder, Instance};
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::locations::{resolve_schema_location, Location};
use crate::resolver::resolve;

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Resource limits
    pub limits: Limits,
    /// Names that cannot be used as field identifiers
    pub reserved_words: Vec<String>,
    /// Suffix appended to reserved names
    pub reserved_suffix: String,
    /// Prefix of synthetic names for anonymous nodes
    pub anonymous_prefix: String,
    /// Whether include/import locations are loaded
    pub follow_locations: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            reserved_words: DEFAULT_RESERVED_WORDS.iter().map(|w| w.to_string()).collect(),
            reserved_suffix: DEFAULT_RESERVED_SUFFIX.to_string(),
            anonymous_prefix: DEFAULT_ANONYMOUS_PREFIX.to_string(),
            follow_locations: true,
        }
    }
}

impl CompilerOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the resource limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Add a reserved word
    pub fn with_reserved_word(mut self, word: impl Into<String>) -> Self {
        let word = word.into();
        if !self.reserved_words.contains(&word) {
            self.reserved_words.push(word);
        }
        self
    }

    /// Replace the reserved word list
    pub fn with_reserved_words(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.reserved_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Set the reserved-name suffix
    pub fn with_reserved_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.reserved_suffix = suffix.into();
        self
    }

    /// Set the synthetic-name prefix
    pub fn with_anonymous_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.anonymous_prefix = prefix.into();
        self
    }

    /// Set whether include/import locations are followed
    pub fn with_follow_locations(mut self, follow: bool) -> Self {
        self.follow_locations = follow;
        self
    }

    /// Naming rules for the normalizer
    pub fn naming_rules(&self) -> NamingRules {
        NamingRules::new(
            self.reserved_words.iter().cloned(),
            self.reserved_suffix.clone(),
            self.anonymous_prefix.clone(),
        )
    }
}

/// How a queued document was reached
#[derive(Debug, Clone)]
enum Reached {
    Root,
    Include(Option<String>),
    Import(Option<String>),
}

impl Reached {
    fn origin(&self) -> Origin<'_> {
        match self {
            Reached::Root => Origin::Root,
            Reached::Include(ns) => Origin::Include(ns.as_deref()),
            Reached::Import(ns) => Origin::Import(ns.as_deref()),
        }
    }
}

/// A document waiting to be loaded
#[derive(Debug)]
struct PendingDocument {
    location: Location,
    text: Option<String>,
    reached: Reached,
    depth: usize,
}

/// Collects schema documents into one compilation unit
#[derive(Debug)]
pub struct Compiler {
    options: CompilerOptions,
    loader: Loader,
    model: SchemaModel,
    collection: DocumentCollection,
    loaded: HashMap<PathBuf, DocumentId>,
    /// First loading error; the unit cannot be compiled after it
    failed: Option<String>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl Compiler {
    /// Create a compiler
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            loader: Loader::new().with_limits(options.limits.clone()),
            options,
            model: SchemaModel::new(),
            collection: DocumentCollection::new(),
            loaded: HashMap::new(),
            failed: None,
        }
    }

    /// Compiler options
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Number of registered documents
    pub fn document_count(&self) -> usize {
        self.model.document_count()
    }

    /// Add a schema given as text; relative locations resolve against the working directory
    pub fn add_source(&mut self, text: impl Into<String>) -> Result<DocumentId> {
        let text = text.into();
        self.load(PendingDocument {
            location: Location::String(text.clone()),
            text: Some(text),
            reached: Reached::Root,
            depth: 0,
        })
    }

    /// Add a schema file and everything it includes or imports
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<DocumentId> {
        self.load(PendingDocument {
            location: Location::Path(path.as_ref().to_path_buf()),
            text: None,
            reached: Reached::Root,
            depth: 0,
        })
    }

    /// Load a document and its references, rejecting the unit on failure
    fn load(&mut self, first: PendingDocument) -> Result<DocumentId> {
        if let Some(reason) = &self.failed {
            return Err(Error::Rejected(reason.clone()));
        }
        let result = self.load_all(first);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "compilation unit rejected");
            self.failed = Some(err.to_string());
        }
        result
    }

    /// Load a document and, breadth first, the documents it references
    fn load_all(&mut self, first: PendingDocument) -> Result<DocumentId> {
        let limits = self.options.limits.clone();
        let mut pending = VecDeque::from([first]);
        let mut root = None;

        while let Some(mut work) = pending.pop_front() {
            let canonical = self.loader.canonical(&work.location);
            if let Some(existing) = canonical.as_ref().and_then(|c| self.loaded.get(c)) {
                tracing::debug!(location = %work.location, "document already loaded");
                root.get_or_insert(*existing);
                continue;
            }
            limits.check_schema_depth(work.depth)?;

            let text = match work.text.take() {
                Some(text) => text,
                None => self.loader.load(&work.location)?,
            };
            let document = Document::from_string_with_limits(&text, &limits)?;
            let element = document.root().ok_or_else(|| {
                Error::from(ParseError::new("Empty schema document").with_location(work.location.as_str()))
            })?;

            let id = parse_document(&mut self.model, element, work.location.clone(), work.reached.origin(), &limits)?;
            self.collection.add_document(&self.model, id)?;
            if let Some(canonical) = canonical {
                self.loaded.insert(canonical, id);
            }
            root.get_or_insert(id);

            if !self.options.follow_locations {
                continue;
            }
            let schema = self.model.document(id);
            for directive in &schema.directives {
                let Some(location) = &directive.location else {
                    continue;
                };
                let reached = match directive.kind {
                    DirectiveKind::Include => Reached::Include(schema.target_namespace.clone()),
                    DirectiveKind::Import => Reached::Import(directive.namespace.clone()),
                };
                let location = resolve_schema_location(location, Some(&work.location));
                tracing::debug!(from = %work.location, to = %location, kind = ?directive.kind, "queued schema");
                pending.push_back(PendingDocument {
                    location,
                    text: None,
                    reached,
                    depth: work.depth + 1,
                });
            }
        }

        root.ok_or_else(|| Error::from(ParseError::new("No schema document was loaded")))
    }

    /// Run the compilation phases
    pub fn compile(self) -> Result<CompiledSchema> {
        let Compiler {
            options,
            mut model,
            collection,
            failed,
            ..
        } = self;
        if let Some(reason) = failed {
            return Err(Error::Rejected(reason));
        }

        tracing::info!(
            documents = model.document_count(),
            namespaces = collection.namespaces().count(),
            globals = collection.len(),
            "registration completed"
        );

        let links = resolve(&mut model, &collection)?;
        tracing::info!(links, "resolution completed");

        classify(&mut model)?;
        tracing::info!(components = model.component_count(), "classification completed");

        let synthetic = normalize(&mut model, &collection, &options.naming_rules())?;
        tracing::info!(synthetic, "normalization completed");

        let cycles = analyze(&mut model);
        tracing::info!(recursive_groups = cycles.groups().len(), "cycle analysis completed");

        Ok(CompiledSchema {
            model,
            collection,
            cycles,
        })
    }
}

/// A resolved, classified and normalized compilation unit
#[derive(Debug)]
pub struct CompiledSchema {
    model: SchemaModel,
    collection: DocumentCollection,
    cycles: CycleAnalysis,
}

impl CompiledSchema {
    /// Compile a single schema given as text
    pub fn from_source(text: impl Into<String>) -> Result<Self> {
        let mut compiler = Compiler::default();
        compiler.add_source(text)?;
        compiler.compile()
    }

    /// Compile a schema file and its includes/imports
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut compiler = Compiler::default();
        compiler.add_file(path)?;
        compiler.compile()
    }

    /// The component model
    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    /// Documents by namespace
    pub fn collection(&self) -> &DocumentCollection {
        &self.collection
    }

    /// Recursive type analysis
    pub fn cycles(&self) -> &CycleAnalysis {
        &self.cycles
    }

    /// Export the model for emitters
    pub fn export(&self) -> SchemaExport {
        export(&self.model, &self.collection, &self.cycles)
    }

    /// Global element matching a root node
    pub fn match_root(&self, local_name: &str, namespace: Option<&str>) -> Result<ElementId> {
        match_root(&self.model, &self.collection, local_name, namespace)
    }

    /// Decoder over this schema
    pub fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.model, &self.collection)
    }

    /// Decode a parsed instance document
    pub fn decode(&self, document: &Document) -> Result<Instance> {
        self.decoder().decode(document)
    }

    /// Decode instance XML text
    pub fn decode_str(&self, xml: &str) -> Result<Instance> {
        self.decoder().decode_str(xml)
    }
}
