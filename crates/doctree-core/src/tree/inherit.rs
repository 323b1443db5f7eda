//! Alias, superclass and inheritance linking
//!
//! `superclass` is a display relation: the subclass is listed in the
//! superclass's `subclasses` and shown as its own branch. `inherits` is a
//! content relation: members of every ancestor are merged into the class's
//! children. A class may use either, both or neither.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{Relation, ResolveError};
use crate::ident::{compare_ids, QualifiedName};
use crate::record::NodeType;

use super::{Ancestor, ChildRef, NodeId, Resolver};

impl Resolver<'_> {
    pub(super) fn link_relations(&mut self) {
        let order = self.placed();
        self.link_aliases(&order);
        self.copy_inherited_docs(&order);
        self.group_subclasses(&order);
        self.merge_inherited_members(&order);
    }

    fn link_aliases(&mut self, order: &[NodeId]) {
        for &id in order {
            let Some(target_ref) = self.node(id).alias_of.clone() else {
                continue;
            };
            let Some(target) = self.resolve_reference(&target_ref) else {
                debug!(alias = %self.node(id).id, target = %target_ref, "alias target not found");
                continue;
            };
            let alias_id = self.node(id).id.clone();
            let aliases = &mut self.node_mut(target).aliases;
            if !aliases.contains(&alias_id) {
                aliases.push(alias_id);
            }
        }
    }

    /// Fill empty documentation from the `inheritdoc` source, following
    /// chains of `inheritdoc` until a documented record is found
    fn copy_inherited_docs(&mut self, order: &[NodeId]) {
        for &id in order {
            if self.node(id).inheritdoc.is_none() {
                continue;
            }

            let mut visited = HashSet::from([id]);
            let mut current = id;
            let mut sources = Vec::new();
            while let Some(source_ref) = self.node(current).inheritdoc.clone() {
                match self.resolve_reference(&source_ref) {
                    Some(source) if visited.insert(source) => {
                        sources.push(source);
                        current = source;
                    }
                    Some(_) => break,
                    None => {
                        debug!(id = %self.node(id).id, source = %source_ref, "inheritdoc source not found");
                        break;
                    }
                }
            }

            for source in sources {
                let source = self.node(source).clone();
                let node = self.node_mut(id);
                if node.description.is_empty() {
                    node.description = source.description;
                }
                if node.short_description.is_empty() {
                    node.short_description = source.short_description;
                }
                for (key, value) in source.extra {
                    node.extra.entry(key).or_insert(value);
                }
            }
        }
    }

    fn group_subclasses(&mut self, order: &[NodeId]) {
        for &id in order {
            let node = self.node(id);
            if node.node_type != NodeType::Class {
                continue;
            }
            let Some(superclass) = node.superclass.clone() else {
                continue;
            };
            let class_id = node.id.clone();

            match self.lookup.get(&superclass).copied() {
                Some(parent) if parent == id => {
                    self.report(ResolveError::Cycle {
                        path: vec![class_id.clone(), class_id.clone()],
                        class: class_id,
                    });
                }
                Some(parent) if self.node(parent).node_type == NodeType::Class => {
                    let parent_node = self.node_mut(parent);
                    if !parent_node.subclasses.contains(&class_id) {
                        parent_node.subclasses.push(class_id);
                    }
                    let before = parent_node.children.len();
                    parent_node.children.retain(|c| c.node != id);
                    if parent_node.children.len() != before {
                        // no longer nested anywhere: show it as its own branch
                        self.top.push(ChildRef::owned(id));
                    }
                }
                _ => self.report(ResolveError::MissingAncestor {
                    class: class_id,
                    ancestor: superclass,
                    relation: Relation::Superclass,
                }),
            }
        }
    }

    fn merge_inherited_members(&mut self, order: &[NodeId]) {
        // merges read the pre-merge children of every ancestor so the result
        // does not depend on which class is merged first
        let own: Vec<Vec<ChildRef>> = self
            .nodes
            .iter()
            .map(|n| n.owned_children().cloned().collect())
            .collect();

        for &id in order {
            let node = self.node(id);
            if node.node_type != NodeType::Class || node.inherits.is_empty() {
                continue;
            }
            let class_id = node.id.clone();
            let inherits = node.inherits.clone();

            let mut stack = vec![class_id.clone()];
            let mut inherited = Vec::new();
            let hierarchy =
                self.collect_ancestor_members(&class_id, &inherits, &own, &mut stack, &mut inherited);

            // own members shadow inherited ones; a static and an instance
            // member of one name are distinct
            let mut merged = own[id.0].clone();
            let mut keys: HashSet<String> = merged.iter().map(|c| self.member_key(c.node)).collect();
            for child in inherited {
                if keys.insert(self.member_key(child.node)) {
                    merged.push(child);
                }
            }
            merged.sort_by(|a, b| {
                compare_ids(&self.member_key(a.node), &self.member_key(b.node))
            });

            debug!(class = %class_id, members = merged.len(), "merged inherited members");
            let node = self.node_mut(id);
            node.children = merged;
            node.hierarchy = hierarchy;
        }
    }

    /// Trailing qualifier and name of a member, e.g. `#render` or `.create`
    fn member_key(&self, id: NodeId) -> String {
        let node = self.node(id);
        if node.node_type == NodeType::Constructor {
            return node.name.clone();
        }
        match QualifiedName::parse(&node.id).members().last() {
            Some((qualifier, name)) => format!("{}{name}", qualifier.as_char()),
            None => node.id.clone(),
        }
    }

    /// Depth-first walk over `inherits`, in declaration order. Returns the
    /// ancestor tree of the walk.
    fn collect_ancestor_members(
        &mut self,
        class: &str,
        ancestors: &[String],
        own: &[Vec<ChildRef>],
        stack: &mut Vec<String>,
        out: &mut Vec<ChildRef>,
    ) -> Vec<Ancestor> {
        let mut hierarchy = Vec::new();
        let mut seen = HashSet::new();
        for ancestor in ancestors {
            if !seen.insert(ancestor) {
                continue;
            }

            if stack.contains(ancestor) {
                let mut path = stack.clone();
                path.push(ancestor.clone());
                self.report(ResolveError::Cycle {
                    class: class.to_string(),
                    path,
                });
                continue;
            }

            let Some(&ancestor_id) = self.lookup.get(ancestor) else {
                self.report(ResolveError::MissingAncestor {
                    class: class.to_string(),
                    ancestor: ancestor.clone(),
                    relation: Relation::Inherits,
                });
                continue;
            };

            out.extend(
                own[ancestor_id.0]
                    .iter()
                    .map(|c| ChildRef::inherited(c.node, ancestor)),
            );

            let next = self.node(ancestor_id).inherits.clone();
            let mut parents = Vec::new();
            if !next.is_empty() {
                stack.push(ancestor.clone());
                parents = self.collect_ancestor_members(class, &next, own, stack, out);
                stack.pop();
            }
            hierarchy.push(Ancestor {
                id: ancestor.clone(),
                parents,
            });
        }
        hierarchy
    }

    fn report(&mut self, error: ResolveError) {
        warn!("{error}");
        self.diagnostics.push(error);
    }
}
