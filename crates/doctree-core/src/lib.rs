//! Doctree Core - symbol tree resolution for documentation records
//!
//! This crate provides:
//! - Records: the flat, per-entity output of documentation parsers
//! - Identifiers: structured `Owner.static#instance@event` ids
//! - Tree resolution: section guessing, nesting, classification,
//!   inheritance and output partitioning
//! - Registry: pluggable parsers (by extension) and renderers (by name)
//! - Built-in JSON/TOML record parsers and a JSON renderer

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run configuration (`doctree.toml`)
pub mod config;

/// Error types
pub mod error;

/// Structured symbol identifiers
pub mod ident;

/// Built-in record file parsers
pub mod parsers;

/// Parse, resolve and render in one run
pub mod pipeline;

/// Symbol records
pub mod record;

/// Parser and renderer registry
pub mod registry;

/// Renderers and the render view model
pub mod render;

/// Symbol tree resolution
pub mod tree;

pub use config::{BrokenLinks, Config, GlobalProfile, OutputPolicy, CONFIG_FILE};
pub use error::{ConfigError, Error, ParseError, Relation, RenderError, ResolveError, Result};
pub use ident::{compare_ids, QualifiedName, Qualifier};
pub use pipeline::Outcome;
pub use record::{NodeType, ParseOutput, Record, RecordKind, ReportEntry, SourceLocation};
pub use registry::{Parser, Registry, Renderer};
pub use tree::{Ancestor, ChildRef, Collection, DocTree, Node, NodeId};
