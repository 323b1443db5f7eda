//! One documentation run: parse, collect, resolve, render
//!
//! Configuration problems are reported before any file is read. Files are
//! parsed one after another and the first parse error ends the run.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, ParseError, Result};
use crate::record::ReportEntry;
use crate::registry::Registry;
use crate::tree::{Collection, DocTree};

/// Result of a successful run
#[derive(Debug)]
pub enum Outcome {
    /// The resolved tree, ready for rendering
    Tree(DocTree),
    /// Parser report only (`report-only`)
    Report(Vec<ReportEntry>),
}

impl Outcome {
    /// The tree, if one was built
    pub fn tree(&self) -> Option<&DocTree> {
        match self {
            Outcome::Tree(tree) => Some(tree),
            Outcome::Report(_) => None,
        }
    }
}

/// Parse and resolve `files`
pub fn run(files: &[PathBuf], config: &Config, registry: &Registry) -> Result<Outcome> {
    config.validate()?;
    if !config.report_only {
        registry.renderer(&config.renderer)?;
    }

    let collection = collect(files, config, registry)?;

    if config.report || config.report_only {
        log_report(collection.report());
    }
    if config.report_only {
        return Ok(Outcome::Report(collection.report().to_vec()));
    }

    let tree = collection.resolve(config);
    if config.strict {
        if let Some(first) = tree.diagnostics().first() {
            return Err(Error::Strict(first.clone()));
        }
    }

    info!(
        files = files.len(),
        nodes = tree.len(),
        diagnostics = tree.diagnostics().len(),
        "resolved documentation"
    );
    Ok(Outcome::Tree(tree))
}

/// Parse every file in order into one collection
pub fn collect(files: &[PathBuf], config: &Config, registry: &Registry) -> Result<Collection> {
    let mut collection = Collection::new();
    for path in files {
        let parser = registry
            .parser_for(path)
            .ok_or_else(|| ParseError::NoParser(path.clone()))?;
        debug!(file = %path.display(), "parsing");
        let output = parser.parse(path, config)?;
        collection.add_file(path, output);
    }
    Ok(collection)
}

/// Hand a tree to the configured renderer
pub fn render(tree: &DocTree, config: &Config, registry: &Registry) -> Result<()> {
    let renderer = registry.renderer(&config.renderer)?;
    renderer.render(tree, config)?;
    Ok(())
}

fn log_report(report: &[ReportEntry]) {
    for entry in report {
        warn!(location = %entry.location, "{}", entry.message);
    }
    info!(entries = report.len(), "parser report");
}
