//! Package discovery
//!
//! Scans the packages directory for extension packages: entries that
//! are directories and carry a readable descriptor. Everything else in
//! the directory (archives, strays, unreadable trees) is skipped
//! without failing the listing.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use modkit_core::{Result, SettingsStore};

use crate::descriptor::{load_info, locate_manifest, PackageInfo};

/// Descriptor id of this toolkit's own package, hidden from listings by
/// default so it cannot be operated on by accident.
pub const SELF_PACKAGE_ID: &str = "modkit:toolkit";

/// Settings flag that reveals the toolkit's own package in listings.
pub const SHOW_ALL_PACKAGES_KEY: &str = "modkit_show_all_packages";

/// One discovered package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageEntry {
    /// Directory name under the packages directory.
    pub dir_name: String,

    /// Absolute path of the package directory.
    pub path: PathBuf,

    /// Directory the descriptor was found in, which may be nested.
    pub manifest_dir: PathBuf,

    #[serde(skip)]
    pub info: PackageInfo,
}

/// Discover packages under `packages_dir`, sorted by directory name.
pub fn list_packages<S: SettingsStore>(
    packages_dir: &Path,
    store: &S,
) -> Result<Vec<PackageEntry>> {
    let show_all = store.flag(SHOW_ALL_PACKAGES_KEY);
    let mut entries = Vec::new();

    for entry in std::fs::read_dir(packages_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let Some(manifest_dir) = locate_manifest(&path) else {
            debug!("No descriptor under {:?}, skipping", path);
            continue;
        };

        let info = match load_info(&manifest_dir) {
            Ok(info) => info,
            Err(e) => {
                warn!("Unreadable descriptor under {:?}: {e}", path);
                continue;
            }
        };

        if info.id == SELF_PACKAGE_ID && !show_all {
            continue;
        }

        entries.push(PackageEntry {
            dir_name: entry.file_name().to_string_lossy().into_owned(),
            path,
            manifest_dir,
            info,
        });
    }

    entries.sort_by(|a, b| a.dir_name.cmp(&b.dir_name));
    Ok(entries)
}

/// Find one package by its directory name.
///
/// A directory that exists but carries no descriptor is reported as a
/// missing manifest, distinct from the directory itself being absent.
pub fn find_package<S: SettingsStore>(
    packages_dir: &Path,
    store: &S,
    dir_name: &str,
) -> Result<PackageEntry> {
    if let Some(entry) = list_packages(packages_dir, store)?
        .into_iter()
        .find(|entry| entry.dir_name == dir_name)
    {
        return Ok(entry);
    }

    let path = packages_dir.join(dir_name);
    if path.is_dir() && locate_manifest(&path).is_none() {
        return Err(modkit_core::Error::manifest_missing(dir_name));
    }
    Err(modkit_core::Error::package_not_found(dir_name))
}

/// Reduce a free-form package name to a filesystem-safe token: every
/// run of characters outside `[a-zA-Z0-9._-]` collapses to one `-`.
pub fn sanitize_package_name(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_runs = UNSAFE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\-_.]+").unwrap());
    unsafe_runs.replace_all(name, "-").into_owned()
}
