//! Archive container and backend selection.

use std::fmt;

/// Container kinds the builder can produce. Requests are validated
/// against this allow-list; anything else substitutes the default
/// rather than erroring, so a stale or hand-edited request still yields
/// a usable archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveKind {
    Tar,
    #[default]
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Resolve a requested kind name, substituting the default for
    /// anything outside the allow-list.
    pub fn resolve(requested: &str) -> Self {
        match requested.to_ascii_lowercase().as_str() {
            "tar" => Self::Tar,
            "tgz" | "tar.gz" | "targz" => Self::TarGz,
            "zip" => Self::Zip,
            _ => Self::default(),
        }
    }

    /// File extension for the container.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tgz",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which archive implementation does the packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// In-process, using the tar and gzip libraries.
    #[default]
    Library,
    /// External `tar`/`zip` utilities driven as child processes.
    System,
}

impl BackendKind {
    pub fn resolve(requested: &str) -> Self {
        match requested.to_ascii_lowercase().as_str() {
            "system" => Self::System,
            _ => Self::Library,
        }
    }
}
