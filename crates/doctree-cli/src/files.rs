//! Input file discovery

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use doctree_core::Registry;
use tracing::debug;

/// Expand command-line inputs into the sorted list of files to parse.
///
/// Each input is a file, a directory (searched recursively for files some
/// parser handles) or a glob pattern. Paths matching any `exclude` pattern
/// are dropped.
pub fn discover(inputs: &[String], exclude: &[String], registry: &Registry) -> Result<Vec<PathBuf>> {
    let excludes = exclude
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).with_context(|| format!("invalid exclude pattern '{pattern}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut files = BTreeSet::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.insert(path.to_path_buf());
        } else if path.is_dir() {
            collect_dir(path, registry, &mut files)?;
        } else {
            let entries =
                glob::glob(input).with_context(|| format!("invalid path pattern '{input}'"))?;
            let mut matched = false;
            for entry in entries {
                let entry = entry.context("failed to read glob match")?;
                matched = true;
                if entry.is_dir() {
                    collect_dir(&entry, registry, &mut files)?;
                } else if registry.supports(&entry) {
                    files.insert(entry);
                }
            }
            if !matched {
                anyhow::bail!("no such file or directory: {input}");
            }
        }
    }

    let files: Vec<PathBuf> = files
        .into_iter()
        .filter(|file| !is_excluded(file, &excludes))
        .collect();
    debug!(count = files.len(), "discovered input files");
    Ok(files)
}

fn collect_dir(dir: &Path, registry: &Registry, files: &mut BTreeSet<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read directory '{}'", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            // Skip hidden directories
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if !hidden {
                collect_dir(&path, registry, files)?;
            }
        } else if registry.supports(&path) {
            files.insert(path);
        }
    }

    Ok(())
}

fn is_excluded(path: &Path, excludes: &[glob::Pattern]) -> bool {
    excludes.iter().any(|pattern| pattern.matches_path(path))
}
