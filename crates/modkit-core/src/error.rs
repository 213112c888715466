//! Error types for modkit-core

use thiserror::Error;

/// Result type alias using modkit-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Modkit
#[derive(Error, Debug)]
pub enum Error {
    /// Package directory does not exist
    #[error("Package not found: {package}")]
    PackageNotFound { package: String },

    /// Package descriptor file missing from the package tree
    #[error("Package descriptor not found anywhere under: {package}")]
    ManifestMissing { package: String },

    /// Package descriptor failed to parse or lacks a required node
    #[error("Package descriptor is corrupt: {message}")]
    ManifestCorrupt { message: String },

    /// No files survived exclusion filtering
    #[error("No files eligible for the archive in: {directory}")]
    EmptyArchive { directory: String },

    /// A path fell outside the allowed roots
    #[error("Path restriction denied access to: {path}")]
    RestrictionDenied { path: String },

    /// The requested archive kind or backend is unavailable
    #[error("Unsupported archive request: {message}")]
    UnsupportedArchive { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a package not found error
    pub fn package_not_found(package: impl Into<String>) -> Self {
        Self::PackageNotFound {
            package: package.into(),
        }
    }

    /// Create a manifest missing error
    pub fn manifest_missing(package: impl Into<String>) -> Self {
        Self::ManifestMissing {
            package: package.into(),
        }
    }

    /// Create a manifest corrupt error
    pub fn manifest_corrupt(message: impl Into<String>) -> Self {
        Self::ManifestCorrupt {
            message: message.into(),
        }
    }

    /// Create an empty archive error
    pub fn empty_archive(directory: impl Into<String>) -> Self {
        Self::EmptyArchive {
            directory: directory.into(),
        }
    }

    /// Create a restriction denied error
    pub fn restriction_denied(path: impl Into<String>) -> Self {
        Self::RestrictionDenied { path: path.into() }
    }

    /// Create an unsupported archive error
    pub fn unsupported_archive(message: impl Into<String>) -> Self {
        Self::UnsupportedArchive {
            message: message.into(),
        }
    }
}
