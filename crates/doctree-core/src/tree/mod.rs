//! Symbol tree resolution
//!
//! Turns the flat, string-keyed record collection into one hierarchical,
//! classified and cross-linked [`DocTree`]. The stages run in a fixed order
//! over a single [`Resolver`] value:
//!
//! 1. section guessing ([`section`])
//! 2. hierarchy building ([`hierarchy`])
//! 3. type classification ([`classify`])
//! 4. alias, superclass and inheritance linking ([`inherit`])
//! 5. output partitioning ([`output`])

mod classify;
mod collect;
mod hierarchy;
mod inherit;
mod output;
mod section;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ResolveError;
use crate::ident::compare_ids;
use crate::record::{NodeType, Record, SourceLocation};

pub use collect::Collection;

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// Edge from a node to one of its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    /// The child node
    pub node: NodeId,
    /// Id of the ancestor class the child was merged from; `None` for
    /// children the parent owns
    pub inherited_from: Option<String>,
    /// Output partition of an inherited child as seen from this parent
    pub partition: Option<String>,
}

impl ChildRef {
    fn owned(node: NodeId) -> Self {
        Self {
            node,
            inherited_from: None,
            partition: None,
        }
    }

    fn inherited(node: NodeId, ancestor: &str) -> Self {
        Self {
            node,
            inherited_from: Some(ancestor.to_string()),
            partition: None,
        }
    }

    /// Whether the parent owns this child
    pub fn is_owned(&self) -> bool {
        self.inherited_from.is_none()
    }
}

/// One ancestor reached through `inherits`, with the ancestors it inherits
/// from in turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ancestor {
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<Ancestor>,
}

/// A resolved documentation node
#[derive(Debug, Clone)]
pub struct Node {
    /// Id relative to the section, e.g. `Button#render`
    pub id: String,
    /// Trailing segment of the id
    pub name: String,
    /// Id up to and including the last structural delimiter
    pub name_prefix: String,
    /// Navigation path (`#` as `.prototype.`, `@` as `.event.`)
    pub path: String,
    /// Final type
    pub node_type: NodeType,
    pub description: String,
    pub short_description: String,
    pub location: SourceLocation,
    pub superclass: Option<String>,
    /// Ids of classes naming this one as their superclass
    pub subclasses: Vec<String>,
    pub inherits: Vec<String>,
    /// Ancestor tree walked while merging `inherits`
    pub hierarchy: Vec<Ancestor>,
    pub alias_of: Option<String>,
    /// Ids of records that are aliases of this one
    pub aliases: Vec<String>,
    /// Final id of the bound-method sibling
    pub bound: Option<String>,
    pub extension: bool,
    pub inheritdoc: Option<String>,
    pub children: Vec<ChildRef>,
    /// Output partition
    pub out_file: String,
    /// Fragment inside the partition, for members
    pub anchor: Option<String>,
    /// Parser-specific fields
    pub extra: Map<String, Value>,

    key: String,
    bound_sibling: Option<NodeId>,
}

impl Node {
    fn from_record(key: String, record: Record) -> Self {
        let location = record.location();
        Self {
            id: record.id,
            name: String::new(),
            name_prefix: String::new(),
            path: String::new(),
            node_type: record.kind.into(),
            description: record.description,
            short_description: record.short_description,
            location,
            superclass: record.superclass,
            subclasses: Vec::new(),
            inherits: record.inherits,
            hierarchy: Vec::new(),
            alias_of: record.alias_of,
            aliases: Vec::new(),
            bound: None,
            extension: record.extension,
            inheritdoc: record.inheritdoc,
            children: Vec::new(),
            out_file: String::new(),
            anchor: None,
            extra: record.extra,
            key,
            bound_sibling: None,
        }
    }

    /// Whether the node is a section container
    pub fn is_section(&self) -> bool {
        self.node_type == NodeType::Section
    }

    /// Children the node owns, without inherited members
    pub fn owned_children(&self) -> impl Iterator<Item = &ChildRef> {
        self.children.iter().filter(|c| c.is_owned())
    }

    fn precedence(&self) -> (&SourceLocation, &'static str, &str, &str) {
        (
            &self.location,
            self.node_type.as_str(),
            self.description.as_str(),
            self.short_description.as_str(),
        )
    }
}

/// The resolved documentation tree.
///
/// Read-only: every derived value a renderer needs beyond what is stored
/// here belongs in the renderer's own view model.
#[derive(Debug, Clone)]
pub struct DocTree {
    nodes: Vec<Node>,
    children: Vec<ChildRef>,
    lookup: BTreeMap<String, NodeId>,
    diagnostics: Vec<ResolveError>,
    files: Vec<PathBuf>,
}

impl DocTree {
    /// Top-level children: root section members first, then one node per
    /// named section and any promoted records
    pub fn children(&self) -> &[ChildRef] {
        &self.children
    }

    /// Node behind an id handed out by this tree
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Look up a non-section node by final id
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.lookup.get(id).map(|&n| self.node(n))
    }

    /// Final ids in lookup order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.lookup.keys().map(String::as_str)
    }

    /// All non-section nodes
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.lookup.values().map(|&n| self.node(n))
    }

    /// Number of non-section nodes
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Child nodes of a node, in order
    pub fn children_of<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> {
        node.children.iter().map(|c| self.node(c.node))
    }

    /// Recoverable problems found while resolving
    pub fn diagnostics(&self) -> &[ResolveError] {
        &self.diagnostics
    }

    /// Source files the records came from, in parse order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// Working state threaded through the resolution stages
struct Resolver<'a> {
    config: &'a Config,
    nodes: Vec<Node>,
    /// Collection keys (`<section>.<id>`), valid until the hierarchy is built
    keys: BTreeMap<String, NodeId>,
    /// Top-level children of the tree
    top: Vec<ChildRef>,
    /// Final id lookup, sections excluded
    lookup: BTreeMap<String, NodeId>,
    diagnostics: Vec<ResolveError>,
}

impl<'a> Resolver<'a> {
    fn new(
        config: &'a Config,
        records: BTreeMap<String, Record>,
        bound_pairs: &[(String, String)],
        diagnostics: Vec<ResolveError>,
    ) -> Self {
        let mut nodes = Vec::with_capacity(records.len());
        let mut keys = BTreeMap::new();

        for (key, record) in records {
            let id = NodeId(nodes.len());
            keys.insert(key.clone(), id);
            nodes.push(Node::from_record(key, record));
        }

        for (static_key, instance_key) in bound_pairs {
            if let (Some(&a), Some(&b)) = (keys.get(static_key), keys.get(instance_key)) {
                nodes[a.0].bound_sibling = Some(b);
                nodes[b.0].bound_sibling = Some(a);
            }
        }

        Self {
            config,
            nodes,
            keys,
            top: Vec::new(),
            lookup: BTreeMap::new(),
            diagnostics,
        }
    }

    fn run(mut self, files: Vec<PathBuf>) -> DocTree {
        self.assign_sections();
        self.build_hierarchy();
        self.classify();
        self.link_relations();
        self.assign_partitions();

        debug!(
            nodes = self.lookup.len(),
            diagnostics = self.diagnostics.len(),
            "resolved documentation tree"
        );

        DocTree {
            nodes: self.nodes,
            children: self.top,
            lookup: self.lookup,
            diagnostics: self.diagnostics,
            files,
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Every non-section node placed in the tree, lookup losers included,
    /// in canonical id order
    fn placed(&self) -> Vec<NodeId> {
        let mut placed = Vec::new();
        let mut stack: Vec<NodeId> = self.top.iter().map(|c| c.node).collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !node.is_section() {
                placed.push(id);
            }
            stack.extend(node.owned_children().map(|c| c.node));
        }

        placed.sort_by(|&a, &b| {
            let (a, b) = (self.node(a), self.node(b));
            compare_ids(&a.id, &b.id).then_with(|| a.precedence().cmp(&b.precedence()))
        });
        placed
    }

    /// Resolve a reference to a final id, following constructor renames
    fn resolve_reference(&self, reference: &str) -> Option<NodeId> {
        self.lookup.get(reference).copied().or_else(|| {
            let base = reference.strip_suffix(".new")?;
            self.lookup.get(&format!("new {base}")).copied()
        })
    }

    /// Settle two nodes competing for one id.
    ///
    /// The node from the earlier source location wins, so the outcome does
    /// not depend on file order. The clash is recorded either way.
    fn settle_clash(&mut self, id: &str, existing: NodeId, incoming: NodeId) -> NodeId {
        let existing_loc = self.node(existing).location.clone();
        let incoming_loc = self.node(incoming).location.clone();
        let incoming_wins = self.node(incoming).precedence() < self.node(existing).precedence();
        let (kept, kept_loc, dropped_loc) = if incoming_wins {
            (incoming, incoming_loc, existing_loc)
        } else {
            (existing, existing_loc, incoming_loc)
        };

        warn!(id, kept = %kept_loc, dropped = %dropped_loc, "name clash");
        self.diagnostics.push(ResolveError::NameClash {
            id: id.to_string(),
            kept: kept_loc,
            dropped: dropped_loc,
        });
        kept
    }
}
