//! End-to-end archive builds: walk, pack, stream, clean up.

use std::fs;

use flate2::read::GzDecoder;
use tempfile::TempDir;

use modkit_archive::{backend_for, ArchiveJob, ArchiveKind, BackendKind};

fn fixture() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("package");
    fs::create_dir_all(src.join("Sources")).unwrap();
    fs::create_dir_all(src.join(".git")).unwrap();
    fs::create_dir_all(src.join("node_modules/dep")).unwrap();
    fs::write(src.join("package-info.yaml"), "id: a:b\nname: x\n").unwrap();
    fs::write(src.join("Sources/Mod.php"), "<?php").unwrap();
    fs::write(src.join("README.md"), "docs").unwrap();
    fs::write(src.join(".git/HEAD"), "ref").unwrap();
    fs::write(src.join("node_modules/dep/index.js"), "js").unwrap();
    (temp, src)
}

#[test]
fn builds_streams_and_cleans_up_a_tgz() {
    let (temp, src) = fixture();
    let work = temp.path().join("work");
    fs::create_dir_all(&work).unwrap();

    let job = ArchiveJob::new(
        &src,
        vec!["node_modules".to_string(), "*.md".to_string()],
        "example_1.0",
        ArchiveKind::TarGz,
        &[work.clone()],
        &[],
    )
    .unwrap();
    assert_eq!(job.download_name(), "example_1.0.tgz");

    let backend = backend_for(BackendKind::Library);
    let size = job.build(backend.as_ref()).unwrap();
    assert!(size > 0);

    let working_path = job.working_path().to_path_buf();
    assert!(working_path.is_file());

    let mut payload = Vec::new();
    let streamed = job.stream_to(&mut payload).unwrap();
    assert_eq!(streamed, payload.len() as u64);
    assert_eq!(streamed, size);

    // Working file is gone once streamed.
    assert!(!working_path.exists());

    let mut archive = tar::Archive::new(GzDecoder::new(payload.as_slice()));
    let names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["Sources/Mod.php", "package-info.yaml"]);
}

#[test]
fn fully_excluded_source_fails_and_leaves_no_working_file() {
    let (temp, src) = fixture();
    let work = temp.path().join("work");
    fs::create_dir_all(&work).unwrap();

    let job = ArchiveJob::new(
        &src,
        vec!["Sources".to_string(), "*.yaml".to_string(), "*.md".to_string(), "node_modules".to_string()],
        "empty",
        ArchiveKind::Tar,
        &[work.clone()],
        &[],
    )
    .unwrap();

    let backend = backend_for(BackendKind::Library);
    assert!(job.build(backend.as_ref()).is_err());
    assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
}
