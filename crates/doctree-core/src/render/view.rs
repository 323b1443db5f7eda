//! Serializable view of a resolved tree
//!
//! Renderers never write back onto tree nodes. Values that only exist for
//! presentation (links, edge-specific partitions) are computed here.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::tree::{Ancestor, ChildRef, DocTree, Node};

/// Keys written by [`NodeView`] itself; parser extras never override them
const RESERVED_KEYS: &[&str] = &[
    "id",
    "name",
    "name_prefix",
    "path",
    "type",
    "description",
    "short_description",
    "file",
    "line",
    "superclass",
    "subclasses",
    "inherits",
    "hierarchy",
    "alias_of",
    "aliases",
    "bound",
    "extension",
    "out_file",
    "anchor",
    "link",
    "inherited_from",
    "children",
];

/// Top-level document handed to serializing renderers
#[derive(Debug, Serialize)]
pub struct DocumentView<'a> {
    pub title: &'a str,
    pub date: String,
    /// Built-in global objects of the configured profile
    pub globals: &'static [&'static str],
    pub tree: Vec<NodeView<'a>>,
}

impl<'a> DocumentView<'a> {
    pub fn new(
        tree: &'a DocTree,
        title: &'a str,
        date: String,
        globals: &'static [&'static str],
    ) -> Self {
        Self {
            title,
            date,
            globals,
            tree: tree
                .children()
                .iter()
                .map(|edge| NodeView::from_edge(tree, edge, true))
                .collect(),
        }
    }
}

/// One node as presented to a renderer
#[derive(Debug, Serialize)]
pub struct NodeView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub name_prefix: &'a str,
    pub path: &'a str,
    #[serde(rename = "type")]
    pub node_type: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub short_description: &'a str,
    pub file: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty")]
    pub subclasses: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    pub inherits: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    pub hierarchy: &'a [Ancestor],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty")]
    pub aliases: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub extension: bool,
    /// Partition as seen through the edge that led here
    pub out_file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<&'a str>,
    /// `out_file`, plus `#anchor` for members
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<&'a str>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView<'a>>,
}

impl<'a> NodeView<'a> {
    /// View of the node behind an edge.
    ///
    /// Inherited nodes are shown with their owned subtree only; following
    /// their inherited edges again could loop back onto the class that
    /// merged them.
    pub fn from_edge(tree: &'a DocTree, edge: &'a ChildRef, with_inherited: bool) -> Self {
        let node = tree.node(edge.node);
        let out_file = edge.partition.as_deref().unwrap_or(&node.out_file);
        let with_inherited = with_inherited && edge.is_owned();

        let children = node
            .children
            .iter()
            .filter(|child| with_inherited || child.is_owned())
            .map(|child| NodeView::from_edge(tree, child, with_inherited))
            .collect();

        let mut view = Self::from_node(node, out_file);
        view.inherited_from = edge.inherited_from.as_deref();
        view.children = children;
        view
    }

    fn from_node(node: &'a Node, out_file: &'a str) -> Self {
        let link = match &node.anchor {
            Some(anchor) => format!("{out_file}#{anchor}"),
            None => out_file.to_string(),
        };

        Self {
            id: &node.id,
            name: &node.name,
            name_prefix: &node.name_prefix,
            path: &node.path,
            node_type: node.node_type.as_str(),
            description: &node.description,
            short_description: &node.short_description,
            file: node.location.file.display().to_string(),
            line: node.location.line,
            superclass: node.superclass.as_deref(),
            subclasses: &node.subclasses,
            inherits: &node.inherits,
            hierarchy: &node.hierarchy,
            alias_of: node.alias_of.as_deref(),
            aliases: &node.aliases,
            bound: node.bound.as_deref(),
            extension: node.extension,
            out_file,
            anchor: node.anchor.as_deref(),
            link,
            inherited_from: None,
            extra: node
                .extra
                .iter()
                .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            children: Vec::new(),
        }
    }
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}
