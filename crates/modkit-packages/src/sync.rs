//! File sync engine
//!
//! Copies files between a package's directory and its live install
//! locations, in either direction, and verifies the result. Naive write
//! signals can report false negatives when the destination is already in
//! sync, so failures are rescued by content comparison: byte-for-byte
//! for files, full-tree hash-mapping comparison for directories.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use walkdir::WalkDir;

use modkit_core::Result;

/// Direction of a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Live install tree → package directory (pull live edits in).
    IntoPackage,
    /// Package directory → live install tree (ship package contents out).
    OutOfPackage,
}

/// One file-level sync unit, produced by the descriptor reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOperation {
    pub package_path: PathBuf,
    pub install_path: PathBuf,
}

/// Tri-state result of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncResult {
    Succeeded,
    Failed,
    /// Source was neither a file nor a directory. Never treated as
    /// success: a missing source cannot be rescued by content
    /// comparison.
    Unknown,
}

/// Outcome row for one operation.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub operation: SyncOperation,
    /// Destination writability, recorded before mutating.
    pub writable: bool,
    pub result: SyncResult,
}

impl SyncOutcome {
    pub fn succeeded(&self) -> bool {
        self.result == SyncResult::Succeeded
    }
}

/// Aggregate of one sync pass. Already-synced files are never rolled
/// back on partial failure; the failures list drives a retry report.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    /// True only when every operation confirmed success.
    pub fn ok(&self) -> bool {
        self.outcomes.iter().all(SyncOutcome::succeeded)
    }

    /// The failing and ambiguous rows only.
    pub fn failures(&self) -> Vec<&SyncOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded()).collect()
    }
}

/// Run every operation in order, collecting per-row outcomes. Errors on
/// one row never abort the pass.
pub fn sync_files(operations: &[SyncOperation], direction: SyncDirection) -> SyncReport {
    let outcomes = operations
        .iter()
        .map(|op| {
            let (src, dst) = match direction {
                SyncDirection::IntoPackage => (&op.install_path, &op.package_path),
                SyncDirection::OutOfPackage => (&op.package_path, &op.install_path),
            };
            let writable = destination_writable(dst);
            let result = sync_one(src, dst);
            debug!("Synced {:?} -> {:?}: {:?}", src, dst, result);
            SyncOutcome {
                operation: op.clone(),
                writable,
                result,
            }
        })
        .collect();

    SyncReport { outcomes }
}

fn sync_one(src: &Path, dst: &Path) -> SyncResult {
    if src.is_dir() {
        let naive = copy_tree(src, dst).is_ok();
        // The copy's own signal is unreliable for trees; the hash
        // comparison is the authoritative verdict once both sides exist.
        if dst.is_dir() {
            return match directories_equal(src, dst) {
                Ok(true) => SyncResult::Succeeded,
                Ok(false) => SyncResult::Failed,
                Err(e) => {
                    warn!("Directory comparison failed for {:?}: {e}", dst);
                    SyncResult::Failed
                }
            };
        }
        return if naive {
            SyncResult::Succeeded
        } else {
            SyncResult::Failed
        };
    }

    if src.is_file() {
        let naive = copy_file(src, dst).is_ok();
        if naive {
            return SyncResult::Succeeded;
        }
        // Rescue false negatives: the destination may already hold the
        // exact content we failed to write.
        if dst.is_file() && files_equal(src, dst).unwrap_or(false) {
            return SyncResult::Succeeded;
        }
        return SyncResult::Failed;
    }

    SyncResult::Unknown
}

fn copy_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = fs::read(src)?;
    fs::write(dst, content)
}

/// Recursively copy a directory tree. Existing destination files are
/// overwritten; extra destination files are left alone.
pub fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn files_equal(a: &Path, b: &Path) -> std::io::Result<bool> {
    Ok(fs::read(a)? == fs::read(b)?)
}

/// Map every file under `root` (dot-entries skipped) to the hex SHA-256
/// of its content, keyed by `/`-separated relative path.
fn hash_tree(root: &Path) -> Result<BTreeMap<String, String>> {
    let mut hashes = BTreeMap::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_dot_entry(e.path(), root))
    {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let mut file = fs::File::open(entry.path())?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher)?;
        hashes.insert(relative, hex::encode(hasher.finalize()));
    }

    Ok(hashes)
}

fn is_dot_entry(path: &Path, root: &Path) -> bool {
    path != root
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'))
}

/// Compare two trees by their complete relative-path → content-hash
/// mappings: each side's mapping is serialized deterministically and
/// hashed, and the trees are equivalent iff those digests match. The
/// whole tree is always walked; there is no early-out on nested
/// directories.
pub fn directories_equal(a: &Path, b: &Path) -> Result<bool> {
    let digest = |root: &Path| -> Result<String> {
        let serialized = serde_json::to_vec(&hash_tree(root)?)?;
        Ok(hex::encode(Sha256::digest(&serialized)))
    };
    Ok(digest(a)? == digest(b)?)
}

/// Destination writability at sync time. A missing destination reports
/// the writability of its nearest existing ancestor.
fn destination_writable(path: &Path) -> bool {
    let mut probe = path;
    loop {
        match fs::metadata(probe) {
            Ok(meta) => return !meta.permissions().readonly(),
            Err(_) => match probe.parent() {
                Some(parent) => probe = parent,
                None => return false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn identical_trees_are_equal() {
        let temp = TempDir::new().unwrap();
        for side in ["a", "b"] {
            let root = temp.path().join(side);
            write(&root, "one.txt", "same");
            write(&root, "nested/two.txt", "also same");
        }
        assert!(directories_equal(&temp.path().join("a"), &temp.path().join("b")).unwrap());
    }

    #[test]
    fn single_differing_byte_is_unequal() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("a"), "nested/two.txt", "content-x");
        write(&temp.path().join("a"), "one.txt", "same");
        write(&temp.path().join("b"), "nested/two.txt", "content-y");
        write(&temp.path().join("b"), "one.txt", "same");
        assert!(!directories_equal(&temp.path().join("a"), &temp.path().join("b")).unwrap());
    }

    #[test]
    fn nested_difference_is_caught_even_past_a_directory_entry() {
        // Trees whose only difference hides below the first directory
        // entry; the full walk must still catch it.
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("a"), "sub/deep/file.txt", "left");
        write(&temp.path().join("b"), "sub/deep/file.txt", "right");
        assert!(!directories_equal(&temp.path().join("a"), &temp.path().join("b")).unwrap());
    }

    #[test]
    fn dot_entries_are_skipped_in_comparison() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("a"), "one.txt", "same");
        write(&temp.path().join("a"), ".git/config", "left only");
        write(&temp.path().join("b"), "one.txt", "same");
        assert!(directories_equal(&temp.path().join("a"), &temp.path().join("b")).unwrap());
    }

    #[test]
    fn file_sync_copies_and_succeeds() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "pkg/Example.php", "<?php v2");
        write(temp.path(), "live/Sources/Example.php", "<?php v1");

        let ops = vec![SyncOperation {
            package_path: temp.path().join("pkg/Example.php"),
            install_path: temp.path().join("live/Sources/Example.php"),
        }];

        let report = sync_files(&ops, SyncDirection::OutOfPackage);
        assert!(report.ok());
        assert_eq!(
            fs::read_to_string(temp.path().join("live/Sources/Example.php")).unwrap(),
            "<?php v2"
        );
    }

    #[test]
    fn missing_source_stays_unknown() {
        let temp = TempDir::new().unwrap();
        // Destination already has content, but the source is gone;
        // content comparison cannot rescue a missing source.
        write(temp.path(), "live/Example.php", "<?php v1");

        let ops = vec![SyncOperation {
            package_path: temp.path().join("pkg/Example.php"),
            install_path: temp.path().join("live/Example.php"),
        }];

        let report = sync_files(&ops, SyncDirection::OutOfPackage);
        assert!(!report.ok());
        assert_eq!(report.outcomes[0].result, SyncResult::Unknown);
        assert_eq!(report.failures().len(), 1);
    }

    #[test]
    fn directory_sync_verifies_by_tree_hash() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "pkg/images/a.png", "png-a");
        write(temp.path(), "pkg/images/sub/b.png", "png-b");

        let ops = vec![SyncOperation {
            package_path: temp.path().join("pkg/images"),
            install_path: temp.path().join("live/images"),
        }];

        let report = sync_files(&ops, SyncDirection::OutOfPackage);
        assert!(report.ok());
        assert!(temp.path().join("live/images/sub/b.png").is_file());
    }

    #[test]
    fn into_package_direction_pulls_live_edits() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "pkg/Example.php", "<?php stale");
        write(temp.path(), "live/Example.php", "<?php fresh");

        let ops = vec![SyncOperation {
            package_path: temp.path().join("pkg/Example.php"),
            install_path: temp.path().join("live/Example.php"),
        }];

        let report = sync_files(&ops, SyncDirection::IntoPackage);
        assert!(report.ok());
        assert_eq!(
            fs::read_to_string(temp.path().join("pkg/Example.php")).unwrap(),
            "<?php fresh"
        );
    }
}
