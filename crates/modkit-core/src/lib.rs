//! Core library for Modkit
//!
//! Shared foundations for the developer toolkit:
//! - Error taxonomy ([`error`])
//! - The injected platform settings store ([`settings`])
//! - Platform version constraint matching ([`version`])
//! - Path token expansion for descriptor paths ([`paths`])

pub mod error;
pub mod paths;
pub mod settings;
pub mod version;

pub use error::{Error, Result};
pub use paths::PathTokens;
pub use settings::{FileSettingsStore, MemorySettingsStore, SettingsStore};
pub use version::{lenient_version, version_matches};
