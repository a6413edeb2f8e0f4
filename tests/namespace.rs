//! Integration tests for kiln-namespace crate.

use kiln_artifact::ArtifactCoordinate;
use kiln_namespace::{NamespaceError, NamespaceRegistry, UseValue};
use kiln_search::{RuntimeProbe, VersionSearch};
use std::collections::BTreeMap;

// Inheritance

#[test]
fn test_parent_requirement_guards_child() {
    let mut registry = NamespaceRegistry::new();
    let parent = registry.instance("app");
    let child = registry.instance("app:web");
    registry
        .namespace_mut(parent)
        .need_named("lib", "org.x:lib:jar:>=1.0")
        .unwrap();

    let mut web = registry.namespace_mut(child);
    assert!(matches!(
        web.select("lib", "0.9"),
        Err(NamespaceError::UnsatisfiedRequirement { .. })
    ));
    web.select("lib", "1.5").unwrap();
    assert_eq!(
        registry.namespace(child).spec("lib").unwrap().to_spec(),
        "org.x:lib:jar:1.5"
    );
    assert!(!registry.namespace(parent).has("lib"));
}

#[test]
fn test_root_requirement_reaches_grandchild() {
    let mut registry = NamespaceRegistry::new();
    let root = registry.root();
    let leaf = registry.instance("a:b:c");
    registry
        .namespace_mut(root)
        .need("org.x:lib:jar:~>2.0")
        .unwrap();

    assert!(registry.namespace_mut(leaf).select("lib", "3.0").is_err());
    assert!(
        registry
            .namespace_mut(leaf)
            .select("lib", "org.x:lib:jar:3.0")
            .is_err()
    );
    registry.namespace_mut(leaf).select("lib", "2.7").unwrap();
    assert!(registry.namespace(leaf).has("lib"));
}

#[test]
fn test_child_lookup_falls_back_on_parent() {
    let mut registry = NamespaceRegistry::new();
    let parent = registry.instance("app");
    let child = registry.instance("app:web");
    registry
        .namespace_mut(parent)
        .select("lib", "org.x:lib:jar:1.2")
        .unwrap();

    let view = registry.namespace(child);
    assert_eq!(view.spec("lib").unwrap().version(), Some("1.2"));
    assert!(view.to_vec(false).is_empty());
    assert_eq!(view.to_vec(true).len(), 1);
}

// Aliases

#[test]
fn test_name_and_identity_agree() {
    let mut registry = NamespaceRegistry::new();
    let id = registry.instance("app");
    let mut ns = registry.namespace_mut(id);
    ns.need_named("lib", "org.x:lib:jar:~>1.0").unwrap();
    ns.alias("library", "lib").unwrap();
    ns.select("library", "1.4").unwrap();

    let view = registry.namespace(id);
    for name in ["lib", "library", "org.x:lib:jar"] {
        assert_eq!(
            view.spec(name).unwrap().to_spec(),
            "org.x:lib:jar:1.4",
            "lookup by {name}"
        );
    }
}

// Copies

#[test]
fn test_copies_between_namespaces_are_independent() {
    let mut registry = NamespaceRegistry::new();
    let a = registry.instance("a");
    let b = registry.instance("b");
    registry
        .namespace_mut(a)
        .select("lib", "org.x:lib:jar:1.0")
        .unwrap();

    let entry = registry.namespace(a).get("lib").unwrap();
    registry.namespace_mut(b).select("lib", &entry).unwrap();
    registry.namespace_mut(a).select("lib", "2.0").unwrap();

    assert_eq!(registry.namespace(a).spec("lib").unwrap().version(), Some("2.0"));
    assert_eq!(registry.namespace(b).spec("lib").unwrap().version(), Some("1.0"));
}

#[test]
fn test_use_inherited_pins_parent_value() {
    let mut registry = NamespaceRegistry::new();
    let parent = registry.instance("app");
    let child = registry.instance("app:web");
    registry
        .namespace_mut(parent)
        .select("lib", "org.x:lib:jar:1.0")
        .unwrap();
    registry.namespace_mut(child).use_inherited("lib").unwrap();
    registry.namespace_mut(parent).select("lib", "1.1").unwrap();

    assert_eq!(registry.namespace(child).spec("lib").unwrap().version(), Some("1.0"));
    assert!(matches!(
        registry.namespace_mut(child).use_inherited("missing"),
        Err(NamespaceError::UndefinedName(_))
    ));
}

#[test]
fn test_use_value_classification() {
    assert!(matches!(UseValue::from("1.0"), UseValue::Version(_)));
    assert!(matches!(UseValue::from("org.x:lib:jar"), UseValue::Spec(_)));
    assert!(matches!(UseValue::from("other"), UseValue::Reference(_)));
}

// Resolution

#[test]
fn test_resolve_requirements_in_child() {
    let mut registry = NamespaceRegistry::new();
    let parent = registry.instance("app");
    let child = registry.instance("app:web");
    registry
        .namespace_mut(parent)
        .need_named("lib", "org.x:lib:jar:>=1.0 <2")
        .unwrap();

    let probe = RuntimeProbe::from_specs(&[
        ArtifactCoordinate::parse("org.x:lib:jar:2.2").unwrap(),
        ArtifactCoordinate::parse("org.x:lib:jar:1.8").unwrap(),
    ]);
    let search = VersionSearch::new().with_probe(probe);

    let resolved = registry
        .namespace_mut(child)
        .resolve("lib", &search)
        .unwrap();
    assert_eq!(resolved.version(), Some("1.8"));
    assert!(registry.namespace(child).has("lib"));
    assert!(!registry.namespace(parent).has("lib"));
}

// Loading

#[test]
fn test_load_table() {
    let mut registry = NamespaceRegistry::new();
    let table: BTreeMap<String, BTreeMap<String, String>> = [
        ("app:web", vec![("lib", "1.3")]),
        ("app", vec![("lib", "org.x:lib:jar:~>1.0")]),
        ("~", vec![("tool", "org.x:tool:jar:4.0")]),
    ]
    .into_iter()
    .map(|(ns, entries)| {
        let entries: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        (ns.to_string(), entries)
    })
    .collect();
    registry.load(&table).unwrap();

    let web = registry.lookup("app:web").unwrap();
    let view = registry.namespace(web);
    assert_eq!(view.spec("lib").unwrap().version(), Some("1.3"));
    assert_eq!(view.spec("tool").unwrap().version(), Some("4.0"));
    assert_eq!(registry.names(), vec!["app", "app:web", "root"]);
}
