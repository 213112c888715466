//! Archive packing backends
//!
//! The walker decides what goes in; a backend decides how it is packed.
//! `LibraryBackend` packs in-process with the tar and gzip libraries.
//! `SystemBackend` drives the external `tar` and `zip` utilities, and
//! is the only route to zip output since no zip library is carried.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use duct::cmd;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use modkit_core::{Error, Result};

use crate::kind::{ArchiveKind, BackendKind};

/// Packs a pre-selected file list from `source` into `output`.
pub trait ArchiveBackend {
    fn build(&self, source: &Path, files: &[PathBuf], kind: ArchiveKind, output: &Path)
        -> Result<()>;
}

/// Pick the backend implementation for a configuration choice.
pub fn backend_for(kind: BackendKind) -> Box<dyn ArchiveBackend> {
    match kind {
        BackendKind::Library => Box::new(LibraryBackend),
        BackendKind::System => Box::new(SystemBackend),
    }
}

/// In-process packing via the `tar` and `flate2` crates.
pub struct LibraryBackend;

impl LibraryBackend {
    fn append_files<W: Write>(
        mut builder: tar::Builder<W>,
        source: &Path,
        files: &[PathBuf],
    ) -> Result<()> {
        for relative in files {
            builder.append_path_with_name(source.join(relative), relative)?;
        }
        builder.into_inner()?.flush()?;
        Ok(())
    }
}

impl ArchiveBackend for LibraryBackend {
    fn build(
        &self,
        source: &Path,
        files: &[PathBuf],
        kind: ArchiveKind,
        output: &Path,
    ) -> Result<()> {
        debug!("Packing {} file(s) as {kind} into {:?}", files.len(), output);
        let file = BufWriter::new(File::create(output)?);
        match kind {
            ArchiveKind::Tar => Self::append_files(tar::Builder::new(file), source, files),
            ArchiveKind::TarGz => {
                let encoder = GzEncoder::new(file, Compression::default());
                let mut builder = tar::Builder::new(encoder);
                for relative in files {
                    builder.append_path_with_name(source.join(relative), relative)?;
                }
                builder.into_inner()?.finish()?.flush()?;
                Ok(())
            }
            ArchiveKind::Zip => Err(Error::unsupported_archive(
                "zip output requires the system backend",
            )),
        }
    }
}

/// External-process packing via the system `tar` and `zip` utilities.
pub struct SystemBackend;

impl SystemBackend {
    fn locate(tool: &str) -> Result<PathBuf> {
        which::which(tool)
            .map_err(|_| Error::unsupported_archive(format!("{tool} utility not found in PATH")))
    }
}

impl ArchiveBackend for SystemBackend {
    fn build(
        &self,
        source: &Path,
        files: &[PathBuf],
        kind: ArchiveKind,
        output: &Path,
    ) -> Result<()> {
        debug!(
            "Invoking system utility for {} file(s) as {kind} into {:?}",
            files.len(),
            output
        );

        let expression = match kind {
            ArchiveKind::Tar | ArchiveKind::TarGz => {
                let tar = Self::locate("tar")?;
                let mut args = vec![
                    std::ffi::OsString::from(if kind == ArchiveKind::TarGz {
                        "-czf"
                    } else {
                        "-cf"
                    }),
                    output.as_os_str().to_os_string(),
                ];
                args.extend(files.iter().map(|f| f.as_os_str().to_os_string()));
                cmd(tar, args).dir(source)
            }
            ArchiveKind::Zip => {
                let zip = Self::locate("zip")?;
                let mut args = vec![
                    std::ffi::OsString::from("-q"),
                    output.as_os_str().to_os_string(),
                ];
                args.extend(files.iter().map(|f| f.as_os_str().to_os_string()));
                cmd(zip, args).dir(source)
            }
        };

        expression.run()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::collect_files;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), "alpha").unwrap();
        fs::write(src.join("nested/b.txt"), "beta").unwrap();
        temp
    }

    fn entry_names<R: std::io::Read>(archive: &mut tar::Archive<R>) -> Vec<String> {
        archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn library_backend_builds_plain_tar() {
        let temp = fixture();
        let src = temp.path().join("src");
        let out = temp.path().join("out.tar");
        let files = collect_files(&src, &[]).unwrap();

        LibraryBackend
            .build(&src, &files, ArchiveKind::Tar, &out)
            .unwrap();

        let mut archive = tar::Archive::new(fs::File::open(&out).unwrap());
        let names = entry_names(&mut archive);
        assert_eq!(names, ["a.txt", "nested/b.txt"]);

        // A finalized archive yields the file bodies, not just headers.
        let mut archive = tar::Archive::new(fs::File::open(&out).unwrap());
        let mut first = archive.entries().unwrap().next().unwrap().unwrap();
        let mut body = String::new();
        std::io::Read::read_to_string(&mut first, &mut body).unwrap();
        assert_eq!(body, "alpha");
    }

    #[test]
    fn library_backend_builds_gzipped_tar() {
        let temp = fixture();
        let src = temp.path().join("src");
        let out = temp.path().join("out.tgz");
        let files = collect_files(&src, &[]).unwrap();

        LibraryBackend
            .build(&src, &files, ArchiveKind::TarGz, &out)
            .unwrap();

        let decoder = GzDecoder::new(fs::File::open(&out).unwrap());
        let mut archive = tar::Archive::new(decoder);
        let names = entry_names(&mut archive);
        assert_eq!(names, ["a.txt", "nested/b.txt"]);
    }

    #[test]
    fn library_backend_rejects_zip() {
        let temp = fixture();
        let src = temp.path().join("src");
        let files = collect_files(&src, &[]).unwrap();
        let result = LibraryBackend.build(
            &src,
            &files,
            ArchiveKind::Zip,
            &temp.path().join("out.zip"),
        );
        assert!(matches!(result, Err(Error::UnsupportedArchive { .. })));
    }
}
