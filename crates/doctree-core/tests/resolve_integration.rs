//! Integration tests for tree resolution through the public API

use std::fs;
use std::path::PathBuf;

use doctree_core::pipeline::{self, Outcome};
use doctree_core::render::DocumentView;
use doctree_core::{
    compare_ids, Collection, Config, DocTree, Error, Record, RecordKind, Registry, ResolveError,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn resolve(records: Vec<Record>, config: &Config) -> DocTree {
    let mut collection = Collection::new();
    for record in records {
        collection.insert(record);
    }
    collection.resolve(config)
}

fn child_ids(tree: &DocTree, id: &str) -> Vec<String> {
    let node = tree.get(id).unwrap();
    tree.children_of(node).map(|n| n.id.clone()).collect()
}

fn serialize(tree: &DocTree) -> serde_json::Value {
    serde_json::to_value(DocumentView::new(tree, "t", String::new(), &[])).unwrap()
}

#[test]
fn test_instance_members_nested_and_classified() {
    let tree = resolve(
        vec![
            Record::new("Hash", RecordKind::Class).at("hash.js", 1),
            Record::new("Hash#get", RecordKind::Method).at("hash.js", 5),
            Record::new("Hash#size", RecordKind::Property).at("hash.js", 9),
        ],
        &Config::default(),
    );

    for id in tree.ids().filter(|id| id.contains('#')) {
        let node = tree.get(id).unwrap();
        let (owner, name) = id.split_once('#').unwrap();
        assert_eq!(node.name, name);
        assert!(node.node_type.as_str().starts_with("instance "));
        assert!(child_ids(&tree, owner).contains(&id.to_string()));
    }
}

#[test]
fn test_section_guessing_example() {
    let tree = resolve(
        vec![
            Record::new("UI", RecordKind::Section).at("ui.js", 1),
            Record::new("Button", RecordKind::Class).in_section("UI").at("ui.js", 2),
            Record::new("Button#render", RecordKind::Method).in_section("UI").at("ui.js", 3),
            Record::new("Button.disable", RecordKind::Method).at("button.js", 1),
        ],
        &Config::default(),
    );

    let disable = tree.get("Button.disable").unwrap();
    assert_eq!(disable.node_type.to_string(), "class method");
    assert_eq!(child_ids(&tree, "Button"), vec!["Button.disable", "Button#render"]);
}

#[test]
fn test_children_sorted_idempotently() {
    let tree = resolve(
        vec![
            Record::new("Str", RecordKind::Class),
            Record::new("Str#trim", RecordKind::Method),
            Record::new("Str#Strip", RecordKind::Method),
            Record::new("Str.interpret", RecordKind::Method),
            Record::new("Str#blank", RecordKind::Method),
        ],
        &Config::default(),
    );

    for node in tree.iter() {
        let ids: Vec<String> = tree.children_of(node).map(|n| n.id.clone()).collect();
        let mut resorted = ids.clone();
        resorted.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(ids, resorted, "children of {}", node.id);
    }
}

#[test]
fn test_superclass_and_alias_relations() {
    let mut updater = Record::new("Ajax.Updater", RecordKind::Class);
    updater.superclass = Some("Ajax.Request".into());
    let mut alias = Record::new("Ajax.Request#abort", RecordKind::Method);
    alias.alias_of = Some("Ajax.Request#cancel".into());

    let tree = resolve(
        vec![
            Record::new("Ajax", RecordKind::Class),
            Record::new("Ajax.Request", RecordKind::Class),
            Record::new("Ajax.Request#cancel", RecordKind::Method),
            updater,
            alias,
        ],
        &Config::default(),
    );

    let request = tree.get("Ajax.Request").unwrap();
    assert_eq!(request.subclasses, vec!["Ajax.Updater"]);
    assert!(!child_ids(&tree, "Ajax.Request").contains(&"Ajax.Updater".to_string()));

    assert_eq!(tree.get("Ajax.Request#cancel").unwrap().aliases, vec!["Ajax.Request#abort"]);
    assert!(tree.get("Ajax.Request#abort").unwrap().aliases.is_empty());
    assert!(tree.diagnostics().is_empty());
}

#[test]
fn test_bound_method_siblings() {
    let mut foo = Record::new("Element.foo", RecordKind::Method);
    foo.bound = true;
    let tree = resolve(
        vec![Record::new("Element", RecordKind::Class), foo],
        &Config::default(),
    );

    assert_eq!(tree.get("Element.foo").unwrap().bound.as_deref(), Some("Element#foo"));
    assert_eq!(tree.get("Element#foo").unwrap().bound.as_deref(), Some("Element.foo"));
}

#[test]
fn test_split_by_class_example() {
    let config = Config {
        split_by_class: true,
        suffix: Some(".html".into()),
        ..Config::default()
    };
    let tree = resolve(
        vec![
            Record::new("A", RecordKind::Class).at("shapes.js", 1),
            Record::new("A#area", RecordKind::Method).at("shapes.js", 2),
            Record::new("B", RecordKind::Class).at("shapes.js", 10),
            Record::new("B#area", RecordKind::Method).at("shapes.js", 11),
        ],
        &config,
    );

    assert_eq!(tree.get("A").unwrap().out_file, "A.html");
    assert_eq!(tree.get("B").unwrap().out_file, "B.html");
    assert_eq!(tree.get("A#area").unwrap().out_file, "A.html");
}

#[test]
fn test_self_inheritance_cycle_reported() {
    let mut p = Record::new("P", RecordKind::Class);
    p.inherits = vec!["P".into()];
    let tree = resolve(vec![p], &Config::default());

    assert!(matches!(
        tree.diagnostics(),
        [ResolveError::Cycle { class, .. }] if class == "P"
    ));
}

#[test]
fn test_resolution_ignores_file_order() {
    let dir = TempDir::new().unwrap();
    let a = write(
        &dir,
        "a.json",
        r#"[
            {"id": "Shared", "type": "class", "line": 1, "description": "from a"},
            {"id": "Shared#one", "type": "method", "line": 2}
        ]"#,
    );
    let b = write(
        &dir,
        "b.json",
        r#"[
            {"id": "Shared", "type": "class", "line": 1, "description": "from b"},
            {"id": "Shared.two", "type": "method", "line": 2}
        ]"#,
    );
    let registry = Registry::with_builtins();
    let config = Config::default();

    let forward = pipeline::run(&[a.clone(), b.clone()], &config, &registry).unwrap();
    let backward = pipeline::run(&[b, a], &config, &registry).unwrap();
    let (Outcome::Tree(forward), Outcome::Tree(backward)) = (forward, backward) else {
        panic!("expected trees");
    };

    assert_eq!(serialize(&forward), serialize(&backward));
    assert_eq!(forward.get("Shared").unwrap().description, "from a");
    assert_eq!(forward.diagnostics(), backward.diagnostics());
    assert!(matches!(forward.diagnostics(), [ResolveError::NameClash { .. }]));
}

#[test]
fn test_strict_run_from_toml_records() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "widgets.toml",
        r#"
[[record]]
id = "Widget"
type = "class"
superclass = "Base"
description = "A widget."
"#,
    );
    let config = Config {
        strict: true,
        ..Config::default()
    };

    let err = pipeline::run(&[file], &config, &Registry::with_builtins()).unwrap_err();
    assert!(matches!(err, Error::Strict(ResolveError::MissingAncestor { .. })));
}

#[test]
fn test_build_and_render_json() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "dom.json",
        r#"[
            {"id": "DOM", "type": "section", "description": "DOM helpers."},
            {"id": "Element", "type": "class", "section": "DOM", "description": "An element."},
            {"id": "Element#hide", "type": "method", "section": "DOM", "description": "Hides."}
        ]"#,
    );
    let config = Config {
        title: "DOM".into(),
        output: dir.path().join("doc"),
        ..Config::default()
    };
    let registry = Registry::with_builtins();

    let outcome = pipeline::run(&[file], &config, &registry).unwrap();
    pipeline::render(outcome.tree().unwrap(), &config, &registry).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("doc/doc.json")).unwrap()).unwrap();
    let section = &json["tree"][0];
    assert_eq!(section["id"], "dom");
    let hide = &section["children"][0]["children"][0];
    assert_eq!(hide["id"], "Element#hide");
    assert_eq!(hide["type"], "instance method");
    assert_eq!(hide["anchor"], "Element.prototype.hide");
    assert_eq!(hide["out_file"], "dom");
}
