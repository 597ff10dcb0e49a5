//! # xmlschema-codegen
//!
//! An XML Schema (XSD) compiler front end. It reads one or more schema
//! documents and produces a fully resolved, classified model from which a
//! code emitter can generate parsing and serialization logic.
//!
//! The pipeline:
//!
//! 1. **Parse** each document into the component arena ([`components`])
//! 2. **Register** its global declarations by namespace ([`collection`])
//! 3. **Resolve** every `ref`/`type`/`base` reference ([`resolver`])
//! 4. **Classify** every type, element and attribute into one structural
//!    form ([`classifier`])
//! 5. **Normalize** names: synthetic `_anon<N>` names for anonymous nodes
//!    and collision-free field identifiers ([`identifiers`])
//! 6. **Analyze** recursive types ([`cycles`]) and **export** the model
//!    ([`exports`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use xmlschema_codegen::{Compiler, CompilerOptions};
//!
//! let mut compiler = Compiler::new(CompilerOptions::default());
//! compiler.add_file("addressbook.xsd")?;
//! let schema = compiler.compile()?;
//!
//! println!("{}", schema.export().to_json(true)?);
//! let person = schema.decode_str(&std::fs::read_to_string("person.xml")?)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;
pub mod locations;

// Resource loading
pub mod documents;
pub mod loaders;

// Schema model
pub mod components;

// Pipeline stages
pub mod collection;
pub mod resolver;
pub mod classifier;
pub mod identifiers;
pub mod cycles;
pub mod exports;
pub mod instances;
pub mod compiler;

// Re-exports for convenience
pub use collection::{ComponentKind, DocumentCollection, GlobalComponent};
pub use compiler::{CompiledSchema, Compiler, CompilerOptions};
pub use components::{Cardinality, ContentModel, Occurs, SchemaModel, XSD_NAMESPACE};
pub use error::{Error, Result};
pub use exports::SchemaExport;
pub use identifiers::{Identifier, NamingRules};
pub use instances::{Content, Field, Instance, Item};
pub use limits::Limits;
pub use namespaces::QName;

/// Version of the xmlschema-codegen library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
