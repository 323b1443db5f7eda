//! Record collection across files

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ResolveError;
use crate::ident::QualifiedName;
use crate::record::{ParseOutput, Record, RecordKind, ReportEntry};

use super::{DocTree, Resolver};

/// Every record produced by the parsers of one run, keyed by
/// `<section>.<id>` (sections by their own id, the root section by `""`).
///
/// Resolving consumes the collection, so the stages can never run twice
/// over the same records.
#[derive(Debug, Clone)]
pub struct Collection {
    records: BTreeMap<String, Record>,
    bound_pairs: Vec<(String, String)>,
    report: Vec<ReportEntry>,
    diagnostics: Vec<ResolveError>,
    files: Vec<PathBuf>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    /// Create a collection holding only the root section
    pub fn new() -> Self {
        let mut records = BTreeMap::new();
        records.insert(String::new(), Record::new("", RecordKind::Section));
        Self {
            records,
            bound_pairs: Vec::new(),
            report: Vec::new(),
            diagnostics: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Merge the output of one parsed file
    pub fn add_file(&mut self, path: &Path, output: ParseOutput) {
        debug!(file = %path.display(), records = output.records.len(), "collecting records");
        self.files.push(path.to_path_buf());
        self.report.extend(output.report);
        for record in output.records {
            self.insert(record);
        }
    }

    /// Add a single record.
    ///
    /// A bound method `Owner.name` also produces its instance twin
    /// `Owner#name`; the two are cross-linked once final ids are known.
    pub fn insert(&mut self, record: Record) {
        let key = record.key();

        if record.kind == RecordKind::Method && record.bound {
            if let Some(twin) = QualifiedName::parse(&record.id).to_instance_member() {
                let mut sibling = record.clone();
                sibling.id = twin.to_string();
                let sibling_key = sibling.key();
                self.bound_pairs.push((key.clone(), sibling_key.clone()));
                self.insert_keyed(sibling_key, sibling);
            }
        }

        self.insert_keyed(key, record);
    }

    fn insert_keyed(&mut self, key: String, record: Record) {
        match self.records.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
            Entry::Occupied(mut entry) => {
                let existing = entry.get().location();
                let incoming = record.location();
                let incoming_wins = record.precedence() < entry.get().precedence();
                let (kept, dropped) = if incoming_wins {
                    entry.insert(record);
                    (incoming, existing)
                } else {
                    (existing, incoming)
                };
                warn!(id = %entry.key(), kept = %kept, dropped = %dropped, "name clash");
                self.diagnostics.push(ResolveError::NameClash {
                    id: entry.key().clone(),
                    kept,
                    dropped,
                });
            }
        }
    }

    /// Number of records, root section included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.len() <= 1
    }

    /// Collection key lookup
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    /// Aggregated parser report
    pub fn report(&self) -> &[ReportEntry] {
        &self.report
    }

    /// Clashes found while collecting
    pub fn diagnostics(&self) -> &[ResolveError] {
        &self.diagnostics
    }

    /// Run every resolution stage and hand out the finished tree
    pub fn resolve(self, config: &Config) -> DocTree {
        Resolver::new(config, self.records, &self.bound_pairs, self.diagnostics).run(self.files)
    }
}
