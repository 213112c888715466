//! Exclusion-aware directory walking
//!
//! Enumerates the files eligible for an archive. Two exclusion forms
//! apply: a token that exactly matches a directory's name prunes that
//! whole subtree, and a token interpreted as a glob against the
//! `/`-separated path relative to the source root drops individual
//! files. Dot-entries are always skipped.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use modkit_core::{Error, Result};

/// Collect the relative paths of every eligible file under `source`.
///
/// Fails with [`Error::EmptyArchive`] when nothing survives the
/// exclusions: an archive with zero entries is never produced.
pub fn collect_files(source: &Path, exclusions: &[String]) -> Result<Vec<PathBuf>> {
    let globs = build_globset(exclusions);
    let mut files = Vec::new();

    let walker = WalkDir::new(source).into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_string_lossy();
        if entry.path() != source && name.starts_with('.') {
            return false;
        }
        if entry.file_type().is_dir() && exclusions.iter().any(|token| token == name.as_ref()) {
            debug!("Pruning excluded directory {:?}", entry.path());
            return false;
        }
        true
    });

    for entry in walker {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source)
            .unwrap_or(entry.path())
            .to_path_buf();
        let portable = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if globs.is_match(&portable) {
            debug!("Excluding {portable}");
            continue;
        }
        files.push(relative);
    }

    if files.is_empty() {
        return Err(Error::empty_archive(source.display().to_string()));
    }

    files.sort();
    Ok(files)
}

fn build_globset(exclusions: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for token in exclusions {
        match Glob::new(token) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!("Ignoring malformed exclusion pattern {token:?}: {e}"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!("Exclusion set failed to compile, excluding nothing: {e}");
        GlobSet::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::write(temp.path().join("b.log"), "b").unwrap();
        fs::create_dir_all(temp.path().join("skip/deep")).unwrap();
        fs::write(temp.path().join("skip/inner.txt"), "x").unwrap();
        fs::write(temp.path().join("skip/deep/leaf.txt"), "y").unwrap();
        fs::write(temp.path().join(".hidden"), "h").unwrap();
        temp
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn directory_token_prunes_whole_subtree() {
        let temp = fixture();
        let files = collect_files(temp.path(), &["skip".to_string()]).unwrap();
        assert_eq!(names(&files), ["a.txt", "b.log"]);
    }

    #[test]
    fn glob_token_drops_matching_files_only() {
        let temp = fixture();
        let files = collect_files(temp.path(), &["*.log".to_string()]).unwrap();
        let listed = names(&files);
        assert!(listed.contains(&"a.txt".to_string()));
        assert!(!listed.contains(&"b.log".to_string()));
        assert!(listed.contains(&"skip/inner.txt".to_string()));
    }

    #[test]
    fn dot_entries_never_included() {
        let temp = fixture();
        let files = collect_files(temp.path(), &[]).unwrap();
        assert!(!names(&files).iter().any(|n| n.contains(".hidden")));
    }

    #[test]
    fn everything_excluded_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("only.log"), "b").unwrap();
        let result = collect_files(temp.path(), &["*.log".to_string()]);
        assert!(matches!(result, Err(Error::EmptyArchive { .. })));
    }
}
