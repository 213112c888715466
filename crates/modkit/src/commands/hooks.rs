//! Hook registry commands

use anyhow::{bail, Result};
use tabled::{
    settings::{object::Columns, Modify, Style, Width},
    Table, Tabled,
};

use modkit_core::FileSettingsStore;
use modkit_hooks::{HookQuery, HookRegistry, MutationOutcome, NewHook, SortKey};

use crate::cli::{Cli, HooksAddArgs, HooksCommands, HooksKeyArgs, HooksListArgs, HooksModifyArgs};
use crate::output;
use crate::utils;

pub fn run(args: HooksCommands, cli: &Cli) -> Result<()> {
    let store = utils::open_settings(cli)?;
    let mut registry = HookRegistry::new(store);

    match args {
        HooksCommands::List(args) => list(&mut registry, args),
        HooksCommands::Add(args) => add(&mut registry, args),
        HooksCommands::Toggle(args) => toggle(&mut registry, args),
        HooksCommands::Delete(args) => delete(&mut registry, args),
        HooksCommands::Modify(args) => modify(&mut registry, args),
    }
}

#[derive(Tabled)]
struct HookRow {
    #[tabled(rename = "Hook")]
    hook: String,
    #[tabled(rename = "Callable")]
    callable: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
}

fn list(registry: &mut HookRegistry<FileSettingsStore>, args: HooksListArgs) -> Result<()> {
    let query = HookQuery {
        start: args.start,
        per_page: if args.per_page == 0 {
            usize::MAX
        } else {
            args.per_page
        },
        sort: SortKey::from_name(&args.sort),
        descending: args.desc,
        hook_name: args.hook_name,
        source_file: args.file,
        callable: args.callable,
    };

    let page = modkit_hooks::query::run(registry.records(), &query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.records.is_empty() {
        output::info("No hooks matched");
        return Ok(());
    }

    let rows: Vec<HookRow> = page
        .records
        .iter()
        .map(|record| HookRow {
            hook: record.hook_name.clone(),
            callable: if record.is_method {
                format!("{} (method)", record.callable)
            } else {
                record.callable.clone()
            },
            file: if record.source_file.is_empty() {
                "-".to_string()
            } else {
                record.source_file.clone()
            },
            status: if record.enabled {
                "enabled".to_string()
            } else {
                "disabled".to_string()
            },
            fingerprint: record.identity.chars().take(12).collect(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Width::wrap(40).keep_words(true)));
    println!("{table}");
    output::info(&format!(
        "Showing {} of {} hook(s)",
        page.records.len(),
        page.total
    ));
    Ok(())
}

fn add(registry: &mut HookRegistry<FileSettingsStore>, args: HooksAddArgs) -> Result<()> {
    let hook = NewHook {
        hook_name: args.hook,
        callable: args.callable,
        source_file: args.file.unwrap_or_default(),
        is_method: args.method,
    };

    let added = registry.add(&hook)?;
    output::success(&format!(
        "Registered {} on {}",
        added.callable, added.hook_name
    ));
    output::kv("Fingerprint", &added.identity);
    Ok(())
}

fn toggle(registry: &mut HookRegistry<FileSettingsStore>, args: HooksKeyArgs) -> Result<()> {
    match registry.toggle(&args.identity)? {
        MutationOutcome::Applied => {
            output::success("Hook toggled");
            Ok(())
        }
        MutationOutcome::NotModified => no_unique_match(&args.identity),
    }
}

fn delete(registry: &mut HookRegistry<FileSettingsStore>, args: HooksKeyArgs) -> Result<()> {
    match registry.delete(&args.identity)? {
        MutationOutcome::Applied => {
            output::success("Hook removed");
            Ok(())
        }
        MutationOutcome::NotModified => no_unique_match(&args.identity),
    }
}

fn modify(registry: &mut HookRegistry<FileSettingsStore>, args: HooksModifyArgs) -> Result<()> {
    let hook = NewHook {
        hook_name: args.hook,
        callable: args.callable,
        source_file: args.file.unwrap_or_default(),
        is_method: args.method,
    };

    match registry.modify(&args.identity, &hook)? {
        MutationOutcome::Applied => {
            output::success(&format!(
                "Hook replaced with {} on {}",
                hook.callable, hook.hook_name
            ));
            Ok(())
        }
        MutationOutcome::NotModified => no_unique_match(&args.identity),
    }
}

fn no_unique_match(identity: &str) -> Result<()> {
    output::warning(&format!(
        "Fingerprint {identity:?} matched no hook, or more than one; nothing changed"
    ));
    bail!("No unique hook matched fingerprint {identity:?}")
}
