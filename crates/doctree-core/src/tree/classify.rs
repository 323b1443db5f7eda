//! Type classification
//!
//! Generic methods and properties get their final subtype from the shape of
//! their relative id; constructors are renamed to `new <Class>`.

use crate::ident::{Qualifier, QualifiedName};
use crate::record::NodeType;

use super::Resolver;

impl Resolver<'_> {
    pub(super) fn classify(&mut self) {
        let mut renamed = Vec::new();

        for id in self.placed() {
            let node = &mut self.nodes[id.0];
            match node.node_type {
                NodeType::Constructor => {
                    let old_id = node.id.clone();
                    let class = old_id.strip_suffix(".new").unwrap_or(&old_id);
                    node.id = format!("new {class}");
                    renamed.push((old_id, id));
                }
                generic if generic.is_generic_member() => {
                    node.node_type = classify_member(&node.id, generic);
                }
                _ => {}
            }
        }

        for (old_id, id) in renamed {
            // lookup losers stay in the tree but are not addressable
            if self.lookup.get(&old_id) != Some(&id) {
                continue;
            }
            self.lookup.remove(&old_id);
            let new_id = self.node(id).id.clone();
            let winner = match self.lookup.get(&new_id) {
                Some(&existing) => self.settle_clash(&new_id, existing, id),
                None => id,
            };
            self.lookup.insert(new_id, winner);
        }
    }
}

/// First matching rule wins
fn classify_member(id: &str, generic: NodeType) -> NodeType {
    if id.starts_with('$') {
        return NodeType::Utility;
    }

    let name = QualifiedName::parse(id);
    let method = generic == NodeType::Method;

    if name.contains(Qualifier::Event) {
        NodeType::Event
    } else if name.contains(Qualifier::Instance) {
        if method {
            NodeType::InstanceMethod
        } else {
            NodeType::InstanceProperty
        }
    } else if name.contains(Qualifier::Static) {
        if method {
            NodeType::ClassMethod
        } else {
            NodeType::ClassProperty
        }
    } else {
        generic
    }
}
