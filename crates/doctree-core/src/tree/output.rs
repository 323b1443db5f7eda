//! Output partitioning
//!
//! Every node gets the name of the output unit it belongs to (`out_file`).
//! Partitions are assigned top-down after inheritance merging, so inherited
//! edges take the partition of the class they were merged into.

use tracing::debug;

use crate::config::{Config, OutputPolicy};
use crate::ident::QualifiedName;
use crate::record::NodeType;

use super::{ChildRef, Node, NodeId, Resolver};

impl Resolver<'_> {
    pub(super) fn assign_partitions(&mut self) {
        let policy = self.config.output_policy();
        if policy == OutputPolicy::SplitFromNs {
            self.hoist_namespace_classes();
        }

        let top: Vec<NodeId> = self.top.iter().map(|c| c.node).collect();
        for id in top {
            self.assign_subtree(id, None);
        }
        self.redirect_extensions();

        debug!(?policy, "assigned output partitions");
    }

    fn assign_subtree(&mut self, id: NodeId, owner: Option<String>) {
        let node = self.node(id);
        let section = node.is_section();
        let out_file = if section {
            String::new()
        } else {
            match (self.config.output_policy(), node.node_type, owner) {
                (OutputPolicy::SplitByClass, NodeType::Class, _) => self.config.partition_name(&node.id),
                (OutputPolicy::SplitByClass, _, Some(owner)) => owner,
                _ => file_partition(self.config, node),
            }
        };
        let anchor = (!section && node.node_type != NodeType::Class).then(|| node.path.clone());

        let node = self.node_mut(id);
        node.out_file.clone_from(&out_file);
        node.anchor = anchor;

        let children = node.children.clone();
        for (idx, child) in children.into_iter().enumerate() {
            if child.is_owned() {
                let owner = (!section).then(|| out_file.clone());
                self.assign_subtree(child.node, owner);
            } else {
                self.node_mut(id).children[idx].partition = Some(out_file.clone());
            }
        }
    }

    /// Move extension members into their logical owner's partition. The
    /// source location is left untouched.
    fn redirect_extensions(&mut self) {
        for id in self.placed() {
            let node = self.node(id);
            if !node.extension || matches!(node.node_type, NodeType::Class | NodeType::Section) {
                continue;
            }

            let owner = owner_candidates(&node.id)
                .into_iter()
                .find_map(|candidate| self.lookup.get(&candidate).copied());
            let Some(owner) = owner.filter(|&owner| owner != id) else {
                debug!(id = %node.id, "extension owner not found, keeping file partition");
                continue;
            };

            let partition = self.node(owner).out_file.clone();
            self.repartition(id, &partition);
        }
    }

    fn repartition(&mut self, id: NodeId, partition: &str) {
        let split_by_class = self.config.output_policy() == OutputPolicy::SplitByClass;
        let node = self.node_mut(id);
        node.out_file = partition.to_string();

        let children = node.children.clone();
        for (idx, child) in children.into_iter().enumerate() {
            if !child.is_owned() {
                self.node_mut(id).children[idx].partition = Some(partition.to_string());
            } else if !(split_by_class && self.node(child.node).node_type == NodeType::Class) {
                self.repartition(child.node, partition);
            }
        }
    }

    /// Lift class children of namespace nodes to the level of the namespace.
    /// Applies to top-level nodes and to the direct children of sections.
    fn hoist_namespace_classes(&mut self) {
        let top = std::mem::take(&mut self.top);
        self.top = self.hoist_from(top);

        let sections: Vec<NodeId> = self
            .top
            .iter()
            .map(|c| c.node)
            .filter(|&n| self.node(n).is_section())
            .collect();
        for section in sections {
            let children = std::mem::take(&mut self.node_mut(section).children);
            let hoisted = self.hoist_from(children);
            self.node_mut(section).children = hoisted;
        }
    }

    fn hoist_from(&mut self, branches: Vec<ChildRef>) -> Vec<ChildRef> {
        let mut out = Vec::with_capacity(branches.len());
        for branch in branches {
            let id = branch.node;
            out.push(branch);
            if self.node(id).is_section() {
                continue;
            }

            let children = std::mem::take(&mut self.node_mut(id).children);
            let (classes, rest): (Vec<_>, Vec<_>) = children
                .into_iter()
                .partition(|c| c.is_owned() && self.node(c.node).node_type == NodeType::Class);
            self.node_mut(id).children = rest;

            if !classes.is_empty() {
                debug!(namespace = %self.node(id).id, classes = classes.len(), "hoisted classes");
            }
            out.extend(classes);
        }
        out
    }
}

/// Lowercased source file stem with prefix and suffix applied
fn file_partition(config: &Config, node: &Node) -> String {
    let stem = node
        .location
        .file
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or_default()
        .to_lowercase();
    config.partition_name(&stem)
}

/// Ids an extension's owner may be filed under: the id minus its trailing
/// segment, then the same id with any leading delimiters removed
fn owner_candidates(id: &str) -> Vec<String> {
    let Some(owner) = QualifiedName::parse(id).parent() else {
        return Vec::new();
    };
    let owner = owner.to_string();
    let trimmed = owner.trim_start_matches(['.', '#', '@']).to_string();
    if trimmed == owner {
        vec![owner]
    } else {
        vec![owner, trimmed]
    }
}
