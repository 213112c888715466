//! Package descriptor reading
//!
//! Every extension package carries a declarative descriptor,
//! `package-info.yaml`, at its root or nested somewhere below it. The
//! descriptor lists install blocks scoped to platform version
//! constraints; each block holds directives. This reader only interprets
//! hook and file-copy directives — the rest of the install-action
//! grammar belongs to the platform's own package manager and is ignored
//! here.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use modkit_core::{version_matches, Error, PathTokens, Result};

use crate::sync::SyncOperation;

/// The descriptor file looked for inside packages.
pub const PACKAGE_INFO_NAME: &str = "package-info.yaml";

/// A parsed package descriptor. Read-only: reconstructed from the file
/// on every operation, never cached or mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageInfo {
    /// Package id, `author:package` form.
    pub id: String,

    /// Human-readable customization name.
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub install: Vec<InstallBlock>,

    /// Archive-building hints, absent from most packages.
    #[serde(default)]
    pub packaging: Option<PackagingSection>,
}

/// One install block, optionally scoped to a platform version range.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallBlock {
    /// Version constraint; a block without one matches every platform.
    #[serde(default, rename = "for")]
    pub for_version: Option<String>,

    #[serde(default)]
    pub actions: Vec<InstallAction>,
}

/// Install directives this reader understands. Unrecognized directive
/// kinds deserialize to `Unknown` and are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum InstallAction {
    Hook {
        hook: String,
        #[serde(default)]
        function: String,
        #[serde(default)]
        file: String,
        #[serde(default)]
        reverse: bool,
        #[serde(default)]
        method: bool,
    },
    RequireFile {
        #[serde(default)]
        name: String,
        #[serde(default)]
        from: Option<String>,
        destination: String,
    },
    RequireDir {
        #[serde(default)]
        name: String,
        #[serde(default)]
        from: Option<String>,
        destination: String,
    },
    #[serde(other)]
    Unknown,
}

/// Archive-building hints declared by the package author.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackagingSection {
    /// Download filename template, `{VERSION}`-style tokens allowed.
    #[serde(default)]
    pub package_name: Option<String>,

    /// Exclusion tokens for the archive walker.
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// One hook directive extracted from an install block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookDirective {
    pub hook_name: String,
    pub callable: String,
    pub source_file: String,
    /// A reversed directive swaps add/remove during install/uninstall.
    pub reverse: bool,
    pub is_method: bool,
}

/// Find the directory containing the package descriptor.
///
/// The platform only supports the descriptor at the package root; this
/// looks harder and accepts one nested anywhere in the tree, so a
/// package that would not install cleanly can still be inspected.
pub fn locate_manifest(package_dir: &Path) -> Option<PathBuf> {
    if package_dir.join(PACKAGE_INFO_NAME).is_file() {
        return Some(package_dir.to_path_buf());
    }

    for entry in WalkDir::new(package_dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && entry.file_name() == PACKAGE_INFO_NAME {
            return entry.path().parent().map(Path::to_path_buf);
        }
    }

    None
}

/// Parse the descriptor found in `base_dir`.
pub fn load_info(base_dir: &Path) -> Result<PackageInfo> {
    let path = base_dir.join(PACKAGE_INFO_NAME);
    let content = std::fs::read_to_string(&path)?;
    serde_yaml_ng::from_str(&content)
        .map_err(|e| Error::manifest_corrupt(format!("{}: {e}", path.display())))
}

/// Pick the active install block for a platform version: the first one
/// whose constraint matches, an unconstrained block matching always.
pub fn select_install_block<'a>(
    info: &'a PackageInfo,
    platform_version: &str,
) -> Option<&'a InstallBlock> {
    info.install.iter().find(|block| match &block.for_version {
        Some(constraint) => version_matches(platform_version, constraint),
        None => true,
    })
}

/// Extract the hook directives from an install block.
pub fn extract_hooks(block: &InstallBlock) -> Vec<HookDirective> {
    block
        .actions
        .iter()
        .filter_map(|action| match action {
            InstallAction::Hook {
                hook,
                function,
                file,
                reverse,
                method,
            } => Some(HookDirective {
                hook_name: hook.clone(),
                callable: function.clone(),
                source_file: file.clone(),
                reverse: *reverse,
                is_method: *method,
            }),
            _ => None,
        })
        .collect()
}

/// Extract file-copy directives as sync operations.
///
/// The package-side path is the expanded `from` attribute or
/// `base_dir/name`; the install-side path is the expanded `destination`
/// plus the basename of `name`.
pub fn extract_file_ops(
    block: &InstallBlock,
    base_dir: &Path,
    tokens: &PathTokens,
) -> Vec<SyncOperation> {
    let mut ops = Vec::new();

    for action in &block.actions {
        let (name, from, destination) = match action {
            InstallAction::RequireFile {
                name,
                from,
                destination,
            }
            | InstallAction::RequireDir {
                name,
                from,
                destination,
            } => (name, from, destination),
            other => {
                debug!("Skipping non-file install action: {other:?}");
                continue;
            }
        };

        let package_path = match from {
            Some(from) => tokens.expand(from),
            None => base_dir.join(name),
        };

        let mut install_path = tokens.expand(destination);
        if let Some(basename) = Path::new(name).file_name() {
            install_path.push(basename);
        }

        ops.push(SyncOperation {
            package_path,
            install_path,
        });
    }

    ops
}
