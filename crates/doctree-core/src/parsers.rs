//! Built-in record file parsers
//!
//! Both formats carry already extracted records, one entry per documented
//! entity:
//!
//! ```json
//! [{ "id": "Ajax.Request", "type": "class", "section": "Ajax" }]
//! ```
//!
//! ```toml
//! [[record]]
//! id = "Ajax.Request"
//! type = "class"
//! section = "Ajax"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::config::Config;
use crate::error::ParseError;
use crate::record::{NodeType, ParseOutput, Record, RecordKind, ReportEntry, SourceLocation};
use crate::registry::Registry;

/// Register the `json` and `toml` parsers
pub fn register(registry: &mut Registry) {
    registry.register_parser("json", parse_json);
    registry.register_parser("toml", parse_toml);
}

/// Parse a JSON array of records
pub fn parse_json(path: &Path, _config: &Config) -> Result<ParseOutput, ParseError> {
    let content = read(path)?;
    let records: Vec<Record> = serde_json::from_str(&content).map_err(|e| ParseError::Syntax {
        location: SourceLocation::new(path, u32::try_from(e.line()).unwrap_or(u32::MAX)),
        message: e.to_string(),
    })?;
    Ok(finish(path, records))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlRecords {
    #[serde(default)]
    record: Vec<Record>,
}

/// Parse `[[record]]` tables
pub fn parse_toml(path: &Path, _config: &Config) -> Result<ParseOutput, ParseError> {
    let content = read(path)?;
    let file: TomlRecords = toml::from_str(&content).map_err(|e| {
        let line = e
            .span()
            .and_then(|span| content.get(..span.start))
            .map_or(0, |before| before.matches('\n').count() + 1);
        ParseError::Syntax {
            location: SourceLocation::new(path, u32::try_from(line).unwrap_or(u32::MAX)),
            message: e.message().to_string(),
        }
    })?;
    Ok(finish(path, file.record))
}

fn read(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn finish(path: &Path, records: Vec<Record>) -> ParseOutput {
    let mut output = ParseOutput::from_records(records);
    output.default_file(path);
    output.report = output
        .records
        .iter()
        .filter(|r| r.kind != RecordKind::Section && r.description.trim().is_empty())
        .map(|r| ReportEntry {
            location: r.location(),
            message: format!("{} '{}' has no description", NodeType::from(r.kind), r.id),
        })
        .collect();
    output
}
