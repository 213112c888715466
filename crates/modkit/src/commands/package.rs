//! Extension package commands

use anyhow::{bail, Context, Result};
use tabled::{
    settings::{object::Columns, Modify, Style, Width},
    Table, Tabled,
};

use modkit_hooks::HookRegistry;
use modkit_packages::{
    extract_file_ops, extract_hooks, find_package, install_hooks, list_packages,
    select_install_block, sync_files, uninstall_hooks, InstallBlock, PackageEntry, SyncDirection,
    SyncReport, SyncResult,
};

use crate::cli::{Cli, PackageCommands, PackageListArgs, PackageNameArgs};
use crate::output;
use crate::utils;

pub fn run(args: PackageCommands, cli: &Cli) -> Result<()> {
    match args {
        PackageCommands::List(args) => list(args, cli),
        PackageCommands::InstallHooks(args) => hooks(args, cli, false),
        PackageCommands::UninstallHooks(args) => hooks(args, cli, true),
        PackageCommands::SyncIn(args) => sync(args, cli, SyncDirection::IntoPackage),
        PackageCommands::SyncOut(args) => sync(args, cli, SyncDirection::OutOfPackage),
    }
}

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Directory")]
    dir: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
}

fn list(args: PackageListArgs, cli: &Cli) -> Result<()> {
    let store = utils::open_settings(cli)?;
    let packages_dir = utils::packages_dir(cli);
    let entries = list_packages(&packages_dir, &store)
        .with_context(|| format!("Failed to scan {}", packages_dir.display()))?;

    if args.json {
        let payload: Vec<_> = entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "dir_name": entry.dir_name,
                    "path": entry.path,
                    "id": entry.info.id,
                    "name": entry.info.name,
                    "version": entry.info.version,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if entries.is_empty() {
        output::info(&format!("No packages under {}", packages_dir.display()));
        return Ok(());
    }

    let rows: Vec<PackageRow> = entries
        .iter()
        .map(|entry| PackageRow {
            dir: entry.dir_name.clone(),
            id: entry.info.id.clone(),
            name: entry.info.name.clone(),
            version: entry.info.version.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Width::wrap(32).keep_words(true)));
    println!("{table}");
    Ok(())
}

/// Look up the package and the install block active for the configured
/// platform version.
fn active_block<'a>(entry: &'a PackageEntry, cli: &Cli) -> Result<&'a InstallBlock> {
    match select_install_block(&entry.info, &cli.platform_version) {
        Some(block) => Ok(block),
        None => bail!(
            "{} declares no install block for platform version {}",
            entry.dir_name,
            cli.platform_version
        ),
    }
}

fn hooks(args: PackageNameArgs, cli: &Cli, uninstall: bool) -> Result<()> {
    let store = utils::open_settings(cli)?;
    let entry = find_package(&utils::packages_dir(cli), &store, &args.package)?;
    let block = active_block(&entry, cli)?;
    let directives = extract_hooks(block);

    if directives.is_empty() {
        output::info(&format!("{} declares no hooks", entry.dir_name));
        return Ok(());
    }

    let mut registry = HookRegistry::new(store);
    let applied = if uninstall {
        uninstall_hooks(&mut registry, &directives)?
    } else {
        install_hooks(&mut registry, &directives)?
    };

    output::success(&format!(
        "{} {} hook directive(s) for {}",
        if uninstall { "Retracted" } else { "Applied" },
        applied,
        entry.dir_name
    ));
    Ok(())
}

fn sync(args: PackageNameArgs, cli: &Cli, direction: SyncDirection) -> Result<()> {
    let store = utils::open_settings(cli)?;
    let entry = find_package(&utils::packages_dir(cli), &store, &args.package)?;
    let block = active_block(&entry, cli)?;
    let operations = extract_file_ops(block, &entry.manifest_dir, &utils::path_tokens(cli));

    if operations.is_empty() {
        output::info(&format!("{} declares no file operations", entry.dir_name));
        return Ok(());
    }

    let report = sync_files(&operations, direction);
    render_report(&report, direction);

    if !report.ok() {
        bail!(
            "{} of {} operation(s) did not complete; fix and re-run",
            report.failures().len(),
            report.outcomes.len()
        );
    }
    Ok(())
}

fn render_report(report: &SyncReport, direction: SyncDirection) {
    output::header(match direction {
        SyncDirection::IntoPackage => "Sync into package",
        SyncDirection::OutOfPackage => "Sync out of package",
    });

    for outcome in &report.outcomes {
        let (src, dst) = match direction {
            SyncDirection::IntoPackage => {
                (&outcome.operation.install_path, &outcome.operation.package_path)
            }
            SyncDirection::OutOfPackage => {
                (&outcome.operation.package_path, &outcome.operation.install_path)
            }
        };
        let line = format!("{} -> {}", src.display(), dst.display());
        match outcome.result {
            SyncResult::Succeeded => output::success(&line),
            SyncResult::Failed => output::error(&format!(
                "{line}{}",
                if outcome.writable {
                    ""
                } else {
                    " (destination not writable)"
                }
            )),
            SyncResult::Unknown => output::warning(&format!("{line} (source missing)")),
        }
    }
}
