//! Hook registry
//!
//! Parses the platform settings into [`HookRecord`]s and applies
//! mutations (toggle/add/delete/modify) as whole-value rewrites of the
//! affected hook's delimited list. Records are rebuilt from the store on
//! demand; the cache lives for one registry instance (one request) only.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use modkit_core::{Result, SettingsStore};

use crate::reference::{self, HookReference, HOOK_PREFIX};

/// Callable substring that marks a registration as belonging to this
/// toolkit itself.
pub const SELF_MARKER: &str = "Modkit";

/// Setting that reveals the toolkit's own hooks in listings.
pub const SHOW_ALL_HOOKS_KEY: &str = "modkit_show_all_hooks";

/// One registered integration point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookRecord {
    /// Settings key, `integrate_`-prefixed.
    pub hook_name: String,

    /// Verbatim settings-value element, negation marker included.
    pub raw_reference: String,

    /// The de-negated callable.
    pub callable: String,

    /// Source file the callable loads from, empty when none.
    pub source_file: String,

    /// Object-method reference vs. plain function.
    pub is_method: bool,

    /// Derived from the absence of the negation marker.
    pub enabled: bool,

    /// Content fingerprint of `raw_reference`. Not a stable primary key:
    /// any edit to the reference changes it.
    pub identity: String,
}

impl HookRecord {
    fn from_reference(hook_name: &str, reference: &HookReference) -> Self {
        Self {
            hook_name: hook_name.to_string(),
            raw_reference: reference.raw().to_string(),
            callable: reference.callable().to_string(),
            source_file: reference.source_file().to_string(),
            is_method: reference.is_method(),
            enabled: reference.enabled(),
            identity: reference.identity(),
        }
    }
}

/// Input fields for adding or modifying a hook registration.
#[derive(Debug, Clone)]
pub struct NewHook {
    pub hook_name: String,
    pub callable: String,
    pub source_file: String,
    pub is_method: bool,
}

/// Result of a keyed mutation.
///
/// `NotModified` covers the zero-match and many-match cases: an
/// ambiguous fingerprint must never trigger a destructive mass update,
/// so the registry passes through without touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    NotModified,
}

impl MutationOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// The hook registry over an injected settings store.
pub struct HookRegistry<S: SettingsStore> {
    store: S,
    cache: Option<Vec<HookRecord>>,
}

impl<S: SettingsStore> HookRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store, cache: None }
    }

    /// Consume the registry, handing the store back.
    pub fn into_store(self) -> S {
        self.store
    }

    /// All current records, parsed fresh from the store when the cache
    /// is cold.
    pub fn records(&mut self) -> &[HookRecord] {
        if self.cache.is_none() {
            self.cache = Some(self.parse_store());
        }
        self.cache.as_deref().unwrap_or_default()
    }

    /// Drop the cache so the next read re-parses the store.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn parse_store(&self) -> Vec<HookRecord> {
        let show_all = self.store.flag(SHOW_ALL_HOOKS_KEY);
        let mut records = Vec::new();

        for (key, value) in self.store.all() {
            if !key.starts_with(HOOK_PREFIX) || value.is_empty() {
                continue;
            }
            for part in reference::split_value(&value) {
                let parsed = HookReference::parse(part);
                if !show_all && parsed.raw().contains(SELF_MARKER) {
                    continue;
                }
                records.push(HookRecord::from_reference(&key, &parsed));
            }
        }

        debug!("Parsed {} hook records from settings", records.len());
        records
    }

    /// Locate the unique record whose identity starts with `needle`.
    ///
    /// Returns `None` when zero or more than one record matches.
    fn find_unique(&mut self, needle: &str) -> Option<HookRecord> {
        let needle = needle.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return None;
        }

        let mut matches = self
            .records()
            .iter()
            .filter(|r| r.identity.starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(record), None) => Some(record.clone()),
            _ => None,
        }
    }

    /// Look up a record by fingerprint without mutating anything.
    pub fn get(&mut self, identity: &str) -> Option<HookRecord> {
        self.find_unique(identity)
    }

    /// Flip a registration's enabled state.
    pub fn toggle(&mut self, identity: &str) -> Result<MutationOutcome> {
        let Some(record) = self.find_unique(identity) else {
            return Ok(MutationOutcome::NotModified);
        };

        let old = HookReference::parse(&record.raw_reference);
        let new = old.toggled();

        self.remove_reference(&record.hook_name, old.raw())?;
        self.add_reference(&record.hook_name, new.raw())?;
        self.invalidate();

        info!(
            "Toggled {} on {} ({} -> {})",
            record.callable,
            record.hook_name,
            record.enabled,
            new.enabled()
        );
        Ok(MutationOutcome::Applied)
    }

    /// Register a new hook reference, returning the record as stored
    /// (sanitized, prefix-qualified).
    pub fn add(&mut self, hook: &NewHook) -> Result<HookRecord> {
        self.add_inner(hook, true)
    }

    fn add_inner(&mut self, hook: &NewHook, rebuild: bool) -> Result<HookRecord> {
        let hook_name = qualify_hook_name(&sanitize(&hook.hook_name));
        let reference = HookReference::compose(
            &sanitize(&hook.callable),
            &sanitize(&hook.source_file),
            hook.is_method,
            true,
        );

        self.add_reference(&hook_name, reference.raw())?;
        if rebuild {
            self.invalidate();
        }

        info!("Added {} to {}", reference.callable(), hook_name);
        Ok(HookRecord::from_reference(&hook_name, &reference))
    }

    /// Remove the registration matching the fingerprint.
    pub fn delete(&mut self, identity: &str) -> Result<MutationOutcome> {
        self.delete_inner(identity, true)
    }

    fn delete_inner(&mut self, identity: &str, rebuild: bool) -> Result<MutationOutcome> {
        let Some(record) = self.find_unique(identity) else {
            return Ok(MutationOutcome::NotModified);
        };

        self.remove_reference(&record.hook_name, &record.raw_reference)?;
        if rebuild {
            self.invalidate();
        }

        info!("Deleted {} from {}", record.callable, record.hook_name);
        Ok(MutationOutcome::Applied)
    }

    /// Replace a registration: delete the old reference, then add the
    /// new fields. The fingerprint necessarily changes when the
    /// reference string does.
    pub fn modify(&mut self, identity: &str, hook: &NewHook) -> Result<MutationOutcome> {
        if self.delete_inner(identity, false)? == MutationOutcome::NotModified {
            return Ok(MutationOutcome::NotModified);
        }
        self.add_inner(hook, true)?;
        Ok(MutationOutcome::Applied)
    }

    /// Append a raw reference to a hook's delimited list, rewriting the
    /// whole value. References form a set keyed by content; an exact
    /// duplicate is a no-op.
    pub fn add_reference(&mut self, hook_name: &str, raw: &str) -> Result<()> {
        let value = self.store.get(hook_name).unwrap_or_default();
        let mut parts = reference::split_value(&value);
        if parts.contains(&raw) {
            return Ok(());
        }
        parts.push(raw);
        self.store.set(hook_name, &reference::join_value(parts))
    }

    /// Remove every exact occurrence of a raw reference from a hook's
    /// list. A list left empty drops the settings key entirely.
    pub fn remove_reference(&mut self, hook_name: &str, raw: &str) -> Result<()> {
        let Some(value) = self.store.get(hook_name) else {
            return Ok(());
        };

        let remaining: Vec<&str> = reference::split_value(&value)
            .into_iter()
            .filter(|part| *part != raw)
            .collect();

        if remaining.is_empty() {
            self.store.remove(hook_name)
        } else {
            self.store.set(hook_name, &reference::join_value(remaining))
        }
    }
}

/// Ensure a hook name carries the namespace prefix.
fn qualify_hook_name(name: &str) -> String {
    if name.starts_with(HOOK_PREFIX) {
        name.to_string()
    } else {
        format!("{HOOK_PREFIX}{name}")
    }
}

/// Strip markup, map whitespace to underscores and drop NUL bytes from
/// operator-supplied input.
fn sanitize(input: &str) -> String {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    let markup = MARKUP.get_or_init(|| Regex::new(r"<[^>]*>").expect("static pattern"));

    markup
        .replace_all(input, "")
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::MemorySettingsStore;

    fn registry_with(pairs: &[(&str, &str)]) -> HookRegistry<MemorySettingsStore> {
        HookRegistry::new(MemorySettingsStore::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn parses_only_prefixed_keys() {
        let mut reg = registry_with(&[
            ("integrate_actions", "Foo::bar"),
            ("unrelated_setting", "Baz::qux"),
        ]);
        let records = reg.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hook_name, "integrate_actions");
    }

    #[test]
    fn self_marker_is_hidden_by_default() {
        let mut reg = registry_with(&[("integrate_admin", "Modkit::menu,Foo::bar")]);
        assert_eq!(reg.records().len(), 1);

        let mut reg = registry_with(&[
            ("integrate_admin", "Modkit::menu,Foo::bar"),
            (SHOW_ALL_HOOKS_KEY, "1"),
        ]);
        assert_eq!(reg.records().len(), 2);
    }

    #[test]
    fn listing_scenario_from_two_references() {
        let mut reg = registry_with(&[("integrate_actions", "Foo::bar,!Baz::qux")]);
        let records: Vec<_> = reg.records().to_vec();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].callable, "Foo::bar");
        assert!(records[0].enabled);
        assert_eq!(records[1].callable, "Baz::qux");
        assert!(!records[1].enabled);
    }

    #[test]
    fn toggle_rewrites_the_marker() {
        let mut reg = registry_with(&[("integrate_actions", "Foo::bar,!Baz::qux")]);
        let disabled = reg.records()[1].clone();

        assert!(reg.toggle(&disabled.identity).unwrap().applied());

        let store = reg.into_store();
        assert_eq!(
            store.get("integrate_actions").as_deref(),
            Some("Foo::bar,Baz::qux")
        );
    }

    #[test]
    fn toggle_twice_restores_enabled_state() {
        let mut reg = registry_with(&[("integrate_actions", "Foo::bar")]);
        let record = reg.records()[0].clone();

        reg.toggle(&record.identity).unwrap();
        let toggled = reg
            .records()
            .iter()
            .find(|r| r.callable == "Foo::bar")
            .unwrap()
            .clone();
        assert!(!toggled.enabled);

        reg.toggle(&toggled.identity).unwrap();
        let back = reg
            .records()
            .iter()
            .find(|r| r.callable == "Foo::bar")
            .unwrap()
            .clone();
        assert!(back.enabled);
        assert_eq!(back.identity, record.identity);
    }

    #[test]
    fn ambiguous_identity_is_not_modified() {
        // Same reference registered under two hook names: two records,
        // one shared fingerprint.
        let mut reg = registry_with(&[
            ("integrate_actions", "Foo::bar"),
            ("integrate_menu", "Foo::bar"),
        ]);
        let identity = reg.records()[0].identity.clone();

        assert_eq!(
            reg.toggle(&identity).unwrap(),
            MutationOutcome::NotModified
        );
        assert_eq!(
            reg.delete(&identity).unwrap(),
            MutationOutcome::NotModified
        );
    }

    #[test]
    fn unknown_identity_is_not_modified() {
        let mut reg = registry_with(&[("integrate_actions", "Foo::bar")]);
        assert_eq!(
            reg.delete("deadbeef").unwrap(),
            MutationOutcome::NotModified
        );
    }

    #[test]
    fn add_then_delete_restores_the_record_set() {
        let mut reg = registry_with(&[("integrate_actions", "Foo::bar")]);
        let before: Vec<_> = reg.records().to_vec();

        reg.add(&NewHook {
            hook_name: "actions".into(),
            callable: "New::thing".into(),
            source_file: String::new(),
            is_method: false,
        })
        .unwrap();

        let added = reg
            .records()
            .iter()
            .find(|r| r.callable == "New::thing")
            .unwrap()
            .clone();
        assert_eq!(added.hook_name, "integrate_actions");

        reg.delete(&added.identity).unwrap();
        assert_eq!(reg.records(), before.as_slice());
    }

    #[test]
    fn add_sanitizes_and_prefixes() {
        let mut reg = registry_with(&[]);
        let added = reg
            .add(&NewHook {
                hook_name: "my hook".into(),
                callable: "<b>Foo::bar</b>".into(),
                source_file: "Some File.php".into(),
                is_method: false,
            })
            .unwrap();

        // The returned record reflects the stored form, not the input.
        assert_eq!(added.hook_name, "integrate_my_hook");
        assert_eq!(added.callable, "Foo::bar");
        assert_eq!(added.source_file, "Some_File.php");

        let records = reg.records();
        assert_eq!(records[0].hook_name, "integrate_my_hook");
        assert_eq!(records[0].callable, "Foo::bar");
        assert_eq!(records[0].source_file, "Some_File.php");
        assert_eq!(records[0], added);
    }

    #[test]
    fn modify_changes_identity() {
        let mut reg = registry_with(&[("integrate_actions", "Foo::bar")]);
        let record = reg.records()[0].clone();

        reg.modify(
            &record.identity,
            &NewHook {
                hook_name: "integrate_actions".into(),
                callable: "Foo::baz".into(),
                source_file: String::new(),
                is_method: false,
            },
        )
        .unwrap();

        let records = reg.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].callable, "Foo::baz");
        assert_ne!(records[0].identity, record.identity);
    }

    #[test]
    fn empty_list_drops_the_settings_key() {
        let mut reg = registry_with(&[("integrate_actions", "Foo::bar")]);
        let identity = reg.records()[0].identity.clone();
        reg.delete(&identity).unwrap();

        let store = reg.into_store();
        assert_eq!(store.get("integrate_actions"), None);
    }
}
