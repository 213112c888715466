//! CLI command implementations

pub mod archive;
pub mod hooks;
pub mod package;
