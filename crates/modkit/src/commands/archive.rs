//! Archive building commands

use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};

use modkit_archive::{backend_for, sweep_stale, ArchiveJob, ArchiveKind, BackendKind};
use modkit_packages::find_package;

use crate::cli::{ArchiveBuildArgs, ArchiveCommands, ArchiveSweepArgs, Cli};
use crate::output;
use crate::utils;

pub fn run(args: ArchiveCommands, cli: &Cli) -> Result<()> {
    match args {
        ArchiveCommands::Build(args) => build(args, cli),
        ArchiveCommands::Sweep(args) => sweep(args),
    }
}

fn build(args: ArchiveBuildArgs, cli: &Cli) -> Result<()> {
    let store = utils::open_settings(cli)?;
    let entry = find_package(&utils::packages_dir(cli), &store, &args.package)?;

    let mut exclusions = entry
        .info
        .packaging
        .as_ref()
        .map(|p| p.exclusions.clone())
        .unwrap_or_default();
    exclusions.extend(args.exclude.iter().cloned());

    let kind = ArchiveKind::resolve(&args.format);
    let target_name = modkit_archive::target_file_name(&entry.info, &entry.dir_name);
    let job = ArchiveJob::new(&entry.path, exclusions, target_name, kind, &[], &[])?;

    let backend = backend_for(BackendKind::resolve(&args.backend));
    let size = job.build(backend.as_ref())?;

    let destination = args.output.as_std_path().join(job.download_name());
    let mut out = BufWriter::new(
        File::create(&destination)
            .with_context(|| format!("Failed to create {}", destination.display()))?,
    );
    job.stream_to(&mut out)?;

    output::success(&format!(
        "Built {} ({size} bytes) from {}",
        destination.display(),
        entry.dir_name
    ));
    Ok(())
}

fn sweep(args: ArchiveSweepArgs) -> Result<()> {
    let temp_dir = match &args.temp_dir {
        Some(dir) => dir.as_std_path().to_path_buf(),
        None => std::env::temp_dir(),
    };

    let removed = sweep_stale(&temp_dir)?;
    if removed == 0 {
        output::info("No stale archive files found");
    } else {
        output::success(&format!(
            "Removed {removed} stale archive file(s) from {}",
            temp_dir.display()
        ));
    }
    Ok(())
}
