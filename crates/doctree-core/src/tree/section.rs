//! Section guessing for records parsed without a section
//!
//! An unsectioned key such as `.Ajax.Updater` is matched against the other
//! keys in canonical order; the first key with a non-empty section whose
//! second segment is `Ajax` donates its section, so the record becomes
//! `SECTION.Ajax.Updater`.
//!
//! First match wins. When two sections both contain an entity with the same
//! name, the section that sorts first gets every unsectioned member of that
//! name; this is a known limitation of guessing, not a statement about which
//! section is correct.

use tracing::debug;

use crate::ident::{compare_ids, QualifiedName};

use super::Resolver;

impl Resolver<'_> {
    pub(super) fn assign_sections(&mut self) {
        let mut sorted: Vec<(String, QualifiedName)> = self
            .keys
            .keys()
            .filter(|key| !key.is_empty())
            .map(|key| (key.clone(), QualifiedName::parse(key)))
            .collect();
        sorted.sort_by(|a, b| compare_ids(&a.0, &b.0));

        for idx in 0..sorted.len() {
            let (key, name) = &sorted[idx];
            if !name.head().is_empty() {
                continue;
            }
            let Some(entity) = name.second() else {
                continue;
            };

            let found = sorted
                .iter()
                .find(|(_, other)| !other.head().is_empty() && other.second() == Some(entity))
                .map(|(_, other)| other.head().to_string());
            let Some(section) = found else {
                continue;
            };

            let old_key = key.clone();
            let renamed = name.with_head(&section);
            let new_key = renamed.to_string();

            let Some(moving) = self.keys.remove(&old_key) else {
                continue;
            };

            if let Some(&existing) = self.keys.get(&new_key) {
                let kept = self.settle_clash(&new_key, existing, moving);
                self.keys.insert(new_key.clone(), kept);
            } else {
                debug!(from = %old_key, to = %new_key, "guessed section");
                self.keys.insert(new_key.clone(), moving);
            }

            self.node_mut(moving).key.clone_from(&new_key);
            sorted[idx] = (new_key, renamed);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ResolveError;
    use crate::record::{RecordKind, SourceLocation};
    use crate::tree::test_support::{child_ids, record, resolve};

    #[test]
    fn test_unsectioned_member_joins_known_section() {
        let tree = resolve(vec![
            record("UI", RecordKind::Section),
            record("Button", RecordKind::Class).in_section("UI"),
            record("Button#render", RecordKind::Method).in_section("UI"),
            record("Button.disable", RecordKind::Method),
        ]);

        let disable = tree.get("Button.disable").unwrap();
        assert_eq!(disable.node_type.as_str(), "class method");
        assert_eq!(child_ids(&tree, "Button"), vec!["Button.disable", "Button#render"]);

        // nested under the section, not promoted to the root
        let top: Vec<_> = tree.children().iter().map(|c| tree.node(c.node).id.clone()).collect();
        assert_eq!(top, vec!["ui"]);
    }

    #[test]
    fn test_first_section_in_order_wins() {
        let tree = resolve(vec![
            record("Alpha", RecordKind::Section),
            record("Beta", RecordKind::Section),
            record("Shared", RecordKind::Class).in_section("Beta").at("b.js", 1),
            record("Shared", RecordKind::Class).in_section("Alpha").at("a.js", 1),
            record("Shared.extra", RecordKind::Property),
        ]);

        let alpha = tree
            .children()
            .iter()
            .map(|c| tree.node(c.node))
            .find(|n| n.id == "alpha")
            .unwrap();
        let shared = tree.children_of(alpha).next().unwrap();
        let members: Vec<_> = tree.children_of(shared).map(|n| n.name.clone()).collect();
        assert_eq!(members, vec!["extra"]);

        // both sections yield the relative id `Shared`
        assert_eq!(
            tree.diagnostics(),
            &[ResolveError::NameClash {
                id: "Shared".into(),
                kept: SourceLocation::new("a.js", 1),
                dropped: SourceLocation::new("b.js", 1),
            }]
        );
        assert_eq!(tree.get("Shared").unwrap().location.file.to_str(), Some("a.js"));
    }

    #[test]
    fn test_guessed_section_clash_reported() {
        let tree = resolve(vec![
            record("UI", RecordKind::Section),
            record("Button", RecordKind::Class).in_section("UI").at("ui.js", 5),
            record("Button", RecordKind::Class).at("button.js", 1),
        ]);

        assert_eq!(
            tree.diagnostics(),
            &[ResolveError::NameClash {
                id: "UI.Button".into(),
                kept: SourceLocation::new("button.js", 1),
                dropped: SourceLocation::new("ui.js", 5),
            }]
        );
        assert_eq!(tree.get("Button").unwrap().location.file.to_str(), Some("button.js"));
    }

    #[test]
    fn test_no_match_stays_top_level() {
        let tree = resolve(vec![record("Orphan.member", RecordKind::Property)]);
        let top: Vec<_> = tree.children().iter().map(|c| tree.node(c.node).id.clone()).collect();
        assert_eq!(top, vec!["Orphan.member"]);
    }
}
