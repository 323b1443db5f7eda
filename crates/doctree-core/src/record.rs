//! Symbol records as produced by parsers

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a record (or a diagnostic about it) came from
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file
    pub file: PathBuf,
    /// 1-based line, 0 when unknown
    pub line: u32,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Kind of a record as emitted by a parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Section,
    Class,
    Method,
    Property,
    Constructor,
    Event,
    Cfg,
    CssVar,
    CssMixin,
    Utility,
}

/// Final type of a resolved node.
///
/// Generic methods and properties are split into instance and class
/// variants by the type classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Section,
    Class,
    Method,
    Property,
    InstanceMethod,
    InstanceProperty,
    ClassMethod,
    ClassProperty,
    Constructor,
    Event,
    Cfg,
    CssVar,
    CssMixin,
    Utility,
}

impl NodeType {
    /// Display name, e.g. `"instance method"`
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Section => "section",
            NodeType::Class => "class",
            NodeType::Method => "method",
            NodeType::Property => "property",
            NodeType::InstanceMethod => "instance method",
            NodeType::InstanceProperty => "instance property",
            NodeType::ClassMethod => "class method",
            NodeType::ClassProperty => "class property",
            NodeType::Constructor => "constructor",
            NodeType::Event => "event",
            NodeType::Cfg => "cfg",
            NodeType::CssVar => "css_var",
            NodeType::CssMixin => "css_mixin",
            NodeType::Utility => "utility",
        }
    }

    /// Whether this is a generic method or property still open to
    /// reclassification
    pub fn is_generic_member(&self) -> bool {
        matches!(self, NodeType::Method | NodeType::Property)
    }
}

impl From<RecordKind> for NodeType {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Section => NodeType::Section,
            RecordKind::Class => NodeType::Class,
            RecordKind::Method => NodeType::Method,
            RecordKind::Property => NodeType::Property,
            RecordKind::Constructor => NodeType::Constructor,
            RecordKind::Event => NodeType::Event,
            RecordKind::Cfg => NodeType::Cfg,
            RecordKind::CssVar => NodeType::CssVar,
            RecordKind::CssMixin => NodeType::CssMixin,
            RecordKind::Utility => NodeType::Utility,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One documented entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Id relative to the section, e.g. `Button#render`
    pub id: String,

    /// Record kind
    #[serde(rename = "type")]
    pub kind: RecordKind,

    /// Owning section, when the parser knows it
    #[serde(default)]
    pub section: Option<String>,

    /// Full description
    #[serde(default)]
    pub description: String,

    /// One-line summary
    #[serde(default)]
    pub short_description: String,

    /// Source file
    #[serde(default)]
    pub file: PathBuf,

    /// Source line
    #[serde(default)]
    pub line: u32,

    /// Display superclass
    #[serde(default)]
    pub superclass: Option<String>,

    /// Classes whose members are merged into this one
    #[serde(default)]
    pub inherits: Vec<String>,

    /// Canonical record this one is an alias of
    #[serde(default)]
    pub alias_of: Option<String>,

    /// Prototype-bound method: also exposed as an instance member
    #[serde(default)]
    pub bound: bool,

    /// Augments an entity defined in another file
    #[serde(default)]
    pub extension: bool,

    /// Record to copy documentation from
    #[serde(default)]
    pub inheritdoc: Option<String>,

    /// Parser-specific fields passed through to renderers
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a new record with empty documentation
    pub fn new(id: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            id: id.into(),
            kind,
            section: None,
            description: String::new(),
            short_description: String::new(),
            file: PathBuf::new(),
            line: 0,
            superclass: None,
            inherits: Vec::new(),
            alias_of: None,
            bound: false,
            extension: false,
            inheritdoc: None,
            extra: Map::new(),
        }
    }

    /// Set the owning section
    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Set the source location
    pub fn at(mut self, file: impl Into<PathBuf>, line: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Source location of the record
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.line)
    }

    /// Clash precedence, smaller wins. The source location decides; kind and
    /// documentation settle records sharing one location.
    pub fn precedence(&self) -> (SourceLocation, &'static str, &str, &str) {
        (
            self.location(),
            NodeType::from(self.kind).as_str(),
            self.description.as_str(),
            self.short_description.as_str(),
        )
    }

    /// Key in the collection: `<section>.<id>`, sections keyed by their id
    pub fn key(&self) -> String {
        if self.kind == RecordKind::Section {
            self.id.clone()
        } else {
            format!("{}.{}", self.section.as_deref().unwrap_or(""), self.id)
        }
    }
}

/// A note a parser wants surfaced in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Where the note applies
    pub location: SourceLocation,
    /// Human readable message
    pub message: String,
}

/// Everything a parser produced for one file
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    /// Records in source order
    pub records: Vec<Record>,
    /// Report entries
    pub report: Vec<ReportEntry>,
}

impl ParseOutput {
    /// Create output from records alone
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            report: Vec::new(),
        }
    }

    /// Fill in a missing file on every record
    pub fn default_file(&mut self, path: &Path) {
        for record in &mut self.records {
            if record.file.as_os_str().is_empty() {
                record.file = path.to_path_buf();
            }
        }
    }
}
