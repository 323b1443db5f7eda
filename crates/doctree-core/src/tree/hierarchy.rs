//! Hierarchy building
//!
//! Keys are visited in reverse canonical order. Every descendant of a key
//! sorts after it, so by the time a key is examined all of its own children
//! have already been attached and it can be moved under its parent in one
//! pass.

use std::collections::HashSet;

use tracing::debug;

use crate::ident::{compare_ids, QualifiedName};
use crate::record::NodeType;

use super::{ChildRef, NodeId, Resolver};

impl Resolver<'_> {
    pub(super) fn build_hierarchy(&mut self) {
        let mut sorted: Vec<(String, NodeId)> =
            self.keys.iter().map(|(key, &id)| (key.clone(), id)).collect();
        sorted.sort_by(|a, b| compare_ids(&a.0, &b.0));

        let mut nested = HashSet::new();
        for (key, id) in sorted.iter().rev() {
            let Some(parent_key) = QualifiedName::parse(key).parent().map(|p| p.to_string()) else {
                continue;
            };
            let Some(&parent) = self.keys.get(&parent_key) else {
                continue;
            };
            self.node_mut(parent).children.insert(0, ChildRef::owned(*id));
            nested.insert(*id);
        }

        for (key, id) in &sorted {
            self.rewrite_ids(key, *id);
        }

        // sections only exist as containers; everything else goes into the
        // flat lookup
        for (_, id) in &sorted {
            if self.node(*id).is_section() {
                continue;
            }
            let final_id = self.node(*id).id.clone();
            let winner = match self.lookup.get(&final_id) {
                Some(&existing) => self.settle_clash(&final_id, existing, *id),
                None => *id,
            };
            self.lookup.insert(final_id, winner);
        }

        for (key, id) in &sorted {
            if nested.contains(id) {
                continue;
            }
            if key.is_empty() {
                let hoisted = std::mem::take(&mut self.node_mut(*id).children);
                self.top.extend(hoisted);
            } else {
                self.top.push(ChildRef::owned(*id));
            }
        }

        for (_, id) in &sorted {
            if let Some(sibling) = self.node(*id).bound_sibling {
                let sibling_id = self.node(sibling).id.clone();
                self.node_mut(*id).bound = Some(sibling_id);
            }
        }

        self.keys.clear();
        debug!(top_level = self.top.len(), "built hierarchy");
    }

    /// Strip the section prefix and derive name, prefix and path
    fn rewrite_ids(&mut self, key: &str, id: NodeId) {
        let relative = QualifiedName::parse(key).strip_head();
        let node = self.node_mut(id);

        node.name = relative.name().to_string();
        node.name_prefix = relative.name_prefix();
        node.id = relative.to_string();
        if node.node_type == NodeType::Section {
            node.id = node.id.to_lowercase();
            node.path.clone_from(&node.id);
        } else {
            node.path = relative.path();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ident::compare_ids;
    use crate::record::RecordKind;
    use crate::tree::test_support::{child_ids, record, resolve};

    #[test]
    fn test_members_nest_under_their_owner() {
        let tree = resolve(vec![
            record("Element", RecordKind::Class),
            record("Element#hide", RecordKind::Method),
            record("Element.extend", RecordKind::Method),
            record("Element@click", RecordKind::Event),
            record("Element.Layout", RecordKind::Class),
            record("Element.Layout#get", RecordKind::Method),
        ]);

        assert_eq!(
            child_ids(&tree, "Element"),
            vec!["Element@click", "Element.extend", "Element#hide", "Element.Layout"]
        );
        assert_eq!(child_ids(&tree, "Element.Layout"), vec!["Element.Layout#get"]);

        let hide = tree.get("Element#hide").unwrap();
        assert_eq!(hide.name, "hide");
        assert_eq!(hide.name_prefix, "Element#");
        assert_eq!(hide.path, "Element.prototype.hide");
        assert_eq!(tree.get("Element@click").unwrap().path, "Element.event.click");
    }

    #[test]
    fn test_event_name_with_delimiters() {
        let tree = resolve(vec![
            record("Form", RecordKind::Class),
            record("Form@field.changed", RecordKind::Event),
        ]);
        let event = tree.get("Form@field.changed").unwrap();
        assert_eq!(event.name, "field.changed");
        assert_eq!(child_ids(&tree, "Form"), vec!["Form@field.changed"]);
    }

    #[test]
    fn test_sections_pruned_and_lowercased() {
        let tree = resolve(vec![
            record("DOM", RecordKind::Section),
            record("Element", RecordKind::Class).in_section("DOM"),
            record("Ajax", RecordKind::Class),
        ]);

        assert!(tree.get("dom").is_none());
        assert!(tree.get("DOM").is_none());
        let top: Vec<_> = tree.children().iter().map(|c| tree.node(c.node)).collect();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, "Ajax");
        assert_eq!(top[1].id, "dom");
        assert_eq!(top[1].name, "DOM");
        assert_eq!(tree.children_of(top[1]).next().unwrap().id, "Element");
    }

    #[test]
    fn test_every_record_reachable_once() {
        let tree = resolve(vec![
            record("Ajax", RecordKind::Class),
            record("Ajax.Request", RecordKind::Class),
            record("Ajax.Request#send", RecordKind::Method),
            record("Loose.thing", RecordKind::Property),
        ]);

        let mut seen = Vec::new();
        let mut stack: Vec<_> = tree.children().iter().map(|c| c.node).collect();
        while let Some(id) = stack.pop() {
            let node = tree.node(id);
            seen.push(node.id.clone());
            stack.extend(node.owned_children().map(|c| c.node));
        }
        seen.sort();
        assert_eq!(seen, vec!["Ajax", "Ajax.Request", "Ajax.Request#send", "Loose.thing"]);
    }

    #[test]
    fn test_child_order_is_canonical_sort() {
        let tree = resolve(vec![
            record("Hash", RecordKind::Class),
            record("Hash#values", RecordKind::Method),
            record("Hash#Keys", RecordKind::Method),
            record("Hash.from", RecordKind::Method),
            record("Hash#each", RecordKind::Method),
        ]);

        let children = child_ids(&tree, "Hash");
        let mut resorted = children.clone();
        resorted.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(children, resorted);
        assert_eq!(children, vec!["Hash#each", "Hash.from", "Hash#Keys", "Hash#values"]);
    }
}
