//! JSON renderer
//!
//! Writes the whole tree into `<output>/<basename(output)>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::config::{Config, GlobalProfile};
use crate::error::RenderError;
use crate::registry::Renderer;
use crate::tree::DocTree;

use super::view::DocumentView;

const NO_GLOBALS: &[&str] = &[];

/// Renders the tree as a single JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    /// Target file for an output directory
    pub fn target(output: &Path) -> Result<PathBuf, RenderError> {
        let name = output
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                RenderError::Other(format!("output path '{}' has no file name", output.display()))
            })?;
        Ok(output.join(format!("{name}.json")))
    }

    /// Serialize a document, pretty-printed with four-space indentation
    /// when `pretty` is set
    pub fn to_bytes(document: &DocumentView<'_>, pretty: bool) -> Result<Vec<u8>, RenderError> {
        if !pretty {
            return Ok(serde_json::to_vec(document)?);
        }
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        document.serialize(&mut serializer)?;
        Ok(buf)
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, tree: &DocTree, config: &Config) -> Result<(), RenderError> {
        let globals = config
            .global_profile()
            .map_err(|e| RenderError::Other(e.to_string()))?
            .map_or(NO_GLOBALS, GlobalProfile::objects);

        let output = &config.output;
        let target = Self::target(output)?;

        if !config.keep_out_dir && output.exists() {
            fs::remove_dir_all(output)?;
        }
        fs::create_dir_all(output)?;

        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let document = DocumentView::new(tree, &config.title, date, globals);
        fs::write(&target, Self::to_bytes(&document, config.format_json)?)?;

        info!(path = %target.display(), nodes = tree.len(), "wrote JSON documentation");
        Ok(())
    }
}
