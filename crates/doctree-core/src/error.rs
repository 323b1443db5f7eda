//! Error types for the documentation pipeline

use std::path::PathBuf;

use thiserror::Error;

use crate::record::SourceLocation;

/// Invalid configuration. Always fatal, raised before any resolution work.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown renderer: {0}")]
    UnknownRenderer(String),

    #[error("unknown global object profile '{0}', expected one of: javascript, js")]
    UnknownGlobalProfile(String),

    #[error("split-by-class and split-from-ns cannot be combined")]
    ConflictingPolicies,

    #[error("malformed extension alias '{0}', expected `alias:extension`")]
    MalformedAlias(String),

    #[error("invalid {field} '{value}': must not contain path separators")]
    InvalidAffix { field: &'static str, value: String },
}

/// Malformed parser input. Fatal: the run stops with file/line context.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{location}: {message}")]
    Syntax {
        location: SourceLocation,
        message: String,
    },

    #[error("no parser registered for '{}'", .0.display())]
    NoParser(PathBuf),
}

/// Structural inconsistency found while resolving the tree.
///
/// These never abort resolution; the affected node degrades and the error
/// is recorded in the tree's diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("name clash on '{id}': {kept} kept, {dropped} dropped")]
    NameClash {
        id: String,
        kept: SourceLocation,
        dropped: SourceLocation,
    },

    #[error("{class} {relation} '{ancestor}', which does not exist")]
    MissingAncestor {
        class: String,
        ancestor: String,
        relation: Relation,
    },

    #[error("inheritance cycle: {}", .path.join(" -> "))]
    Cycle { class: String, path: Vec<String> },
}

/// Relation through which an ancestor was referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Superclass,
    Inherits,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Superclass => f.write_str("extends"),
            Relation::Inherits => f.write_str("inherits from"),
        }
    }
}

/// Renderer failure
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Any error that stops a run
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("resolution failed in strict mode: {0}")]
    Strict(#[from] ResolveError),
}

pub type Result<T> = std::result::Result<T, Error>;
