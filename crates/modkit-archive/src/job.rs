//! Per-request archive jobs
//!
//! Each build request gets its own job with a uniquely named working
//! file in a temp location, so concurrent jobs never collide and
//! cleanup only ever touches the job's own file. Leftovers from
//! crashed jobs share a recognizable prefix and are removed by the
//! separate [`sweep_stale`] maintenance pass.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use modkit_core::{Error, Result};

use crate::backend::ArchiveBackend;
use crate::kind::ArchiveKind;
use crate::walker::collect_files;

/// Prefix shared by every working file, the handle for stale sweeps.
pub const TEMP_PREFIX: &str = "modkit-archive-";

/// Chunk size for streaming finished archives.
const STREAM_CHUNK: usize = 8192;

/// Transient state for one archive build.
pub struct ArchiveJob {
    source_dir: PathBuf,
    exclusions: Vec<String>,
    target_name: String,
    kind: ArchiveKind,
    working_path: PathBuf,
}

impl ArchiveJob {
    /// Create a job, choosing a working location from `temp_candidates`.
    ///
    /// A candidate outside `allowed_roots` (when the allow-list is
    /// non-empty) is skipped rather than failing the job; the error
    /// only surfaces when every candidate is denied.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        exclusions: Vec<String>,
        target_name: impl Into<String>,
        kind: ArchiveKind,
        temp_candidates: &[PathBuf],
        allowed_roots: &[PathBuf],
    ) -> Result<Self> {
        let temp_dir = choose_temp_dir(temp_candidates, allowed_roots)?;
        let working_path = temp_dir.join(format!(
            "{TEMP_PREFIX}{}.{}",
            Uuid::new_v4(),
            kind.extension()
        ));

        Ok(Self {
            source_dir: source_dir.into(),
            exclusions,
            target_name: target_name.into(),
            kind,
            working_path,
        })
    }

    /// The filename the archive should be saved under by the caller.
    pub fn download_name(&self) -> String {
        format!("{}.{}", self.target_name, self.kind.extension())
    }

    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Walk, filter, and pack. On any failure the working file is
    /// removed before the error propagates.
    pub fn build(&self, backend: &dyn ArchiveBackend) -> Result<u64> {
        let result = self.build_inner(backend);
        if result.is_err() {
            self.cleanup();
        }
        result
    }

    fn build_inner(&self, backend: &dyn ArchiveBackend) -> Result<u64> {
        let files = collect_files(&self.source_dir, &self.exclusions)?;
        info!(
            "Packing {} file(s) from {:?} as {}",
            files.len(),
            self.source_dir,
            self.kind
        );
        backend.build(&self.source_dir, &files, self.kind, &self.working_path)?;
        Ok(std::fs::metadata(&self.working_path)?.len())
    }

    /// Stream the finished archive into `out` in fixed-size chunks with
    /// a flush per chunk, returning the byte count. The working file is
    /// removed afterwards whether streaming succeeded or not.
    pub fn stream_to<W: Write>(&self, out: &mut W) -> Result<u64> {
        let result = self.stream_inner(out);
        self.cleanup();
        result
    }

    fn stream_inner<W: Write>(&self, out: &mut W) -> Result<u64> {
        let mut file = File::open(&self.working_path)?;
        let mut buffer = [0u8; STREAM_CHUNK];
        let mut total = 0u64;
        loop {
            let read = file.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            out.write_all(&buffer[..read])?;
            out.flush()?;
            total += read as u64;
        }
        debug!("Streamed {total} byte(s) of {:?}", self.working_path);
        Ok(total)
    }

    /// Remove this job's working file. Only its own file, never the
    /// whole prefix namespace.
    pub fn cleanup(&self) {
        match std::fs::remove_file(&self.working_path) {
            Ok(()) => debug!("Removed working file {:?}", self.working_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {:?}: {e}", self.working_path),
        }
    }
}

impl Drop for ArchiveJob {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn choose_temp_dir(candidates: &[PathBuf], allowed_roots: &[PathBuf]) -> Result<PathBuf> {
    let system_default = std::env::temp_dir();
    let pool: Vec<&PathBuf> = if candidates.is_empty() {
        vec![&system_default]
    } else {
        candidates.iter().collect()
    };

    let mut last_denied = None;
    for candidate in pool {
        let permitted = allowed_roots.is_empty()
            || allowed_roots.iter().any(|root| candidate.starts_with(root));
        if !permitted {
            debug!("Temp candidate {:?} outside allowed roots, skipping", candidate);
            last_denied = Some(candidate.clone());
            continue;
        }
        if candidate.is_dir() {
            return Ok(candidate.clone());
        }
    }

    let denied = last_denied.unwrap_or(system_default);
    Err(Error::restriction_denied(denied.display().to_string()))
}

/// Remove every prefix-named leftover in `temp_dir`, returning how many
/// were deleted. Maintenance only; live jobs clean up after themselves.
pub fn sweep_stale(temp_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(temp_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(TEMP_PREFIX) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not sweep {:?}: {e}", entry.path()),
        }
    }
    if removed > 0 {
        info!("Swept {removed} stale archive file(s) from {:?}", temp_dir);
    }
    Ok(removed)
}
