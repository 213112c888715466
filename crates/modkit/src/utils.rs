//! Shared command helpers

use std::path::PathBuf;

use anyhow::{Context, Result};

use modkit_core::{FileSettingsStore, PathTokens};

use crate::cli::Cli;

/// Open the settings store named by the global `--settings` flag.
pub fn open_settings(cli: &Cli) -> Result<FileSettingsStore> {
    FileSettingsStore::load(cli.settings.as_std_path())
        .with_context(|| format!("Failed to open settings store at {}", cli.settings))
}

/// The effective packages directory.
pub fn packages_dir(cli: &Cli) -> PathBuf {
    match &cli.packages_dir {
        Some(dir) => dir.as_std_path().to_path_buf(),
        None => cli.board_dir.as_std_path().join("Packages"),
    }
}

/// Path tokens for the configured install layout.
pub fn path_tokens(cli: &Cli) -> PathTokens {
    PathTokens::standard(cli.board_dir.as_std_path(), &packages_dir(cli))
}
