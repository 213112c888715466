//! Hook registry lifecycle integration tests
//!
//! Exercises the registry end-to-end over a file-backed settings store:
//! listing through queries, mutations, and re-reads across store loads.

use modkit_core::{FileSettingsStore, SettingsStore};
use modkit_hooks::{query, HookQuery, HookRegistry, NewHook, SortKey};
use tempfile::TempDir;

fn seeded_store(temp: &TempDir) -> FileSettingsStore {
    let path = temp.path().join("settings.yaml");
    let mut store = FileSettingsStore::load(&path).unwrap();
    store
        .set("integrate_actions", "Foo::bar,!Baz::qux")
        .unwrap();
    store
        .set("integrate_menu", "Menu.php|Nav::build#")
        .unwrap();
    store
}

#[test]
fn listing_spans_all_hook_keys() {
    let temp = TempDir::new().unwrap();
    let mut registry = HookRegistry::new(seeded_store(&temp));

    let page = query::run(registry.records(), &HookQuery::default());
    assert_eq!(page.total, 3);

    let method = page
        .records
        .iter()
        .find(|r| r.hook_name == "integrate_menu")
        .unwrap();
    assert!(method.is_method);
    assert_eq!(method.source_file, "Menu.php");
    assert_eq!(method.callable, "Nav::build");
}

#[test]
fn toggle_persists_to_the_settings_file() {
    let temp = TempDir::new().unwrap();
    let mut registry = HookRegistry::new(seeded_store(&temp));

    let disabled = registry
        .records()
        .iter()
        .find(|r| !r.enabled)
        .unwrap()
        .clone();
    assert!(registry.toggle(&disabled.identity).unwrap().applied());

    // A fresh store sees the rewritten value.
    let reloaded = FileSettingsStore::load(temp.path().join("settings.yaml")).unwrap();
    assert_eq!(
        reloaded.get("integrate_actions").as_deref(),
        Some("Foo::bar,Baz::qux")
    );
}

#[test]
fn modify_then_query_reflects_new_reference() {
    let temp = TempDir::new().unwrap();
    let mut registry = HookRegistry::new(seeded_store(&temp));

    let target = registry
        .records()
        .iter()
        .find(|r| r.callable == "Foo::bar")
        .unwrap()
        .clone();

    registry
        .modify(
            &target.identity,
            &NewHook {
                hook_name: "integrate_actions".into(),
                callable: "Foo::replacement".into(),
                source_file: "Foo.php".into(),
                is_method: true,
            },
        )
        .unwrap();

    let page = query::run(
        registry.records(),
        &HookQuery {
            callable: Some("replacement".into()),
            sort: SortKey::Callable,
            ..Default::default()
        },
    );
    assert_eq!(page.total, 1);
    assert_eq!(page.records[0].raw_reference, "Foo.php|Foo::replacement#");
    assert_ne!(page.records[0].identity, target.identity);
}
