//! Integration hook registry for Modkit
//!
//! This crate handles:
//! - Parsing the hook reference mini-language stored in platform settings
//! - Hook CRUD over an injected settings store (toggle/add/delete/modify)
//! - Listing with substring filters, sorting and pagination

pub mod query;
pub mod reference;
pub mod registry;

pub use query::{HookPage, HookQuery, SortKey, HOOKS_PER_PAGE};
pub use reference::{HookReference, HOOK_PREFIX, NEGATION_MARKER, REFERENCE_DELIMITER};
pub use registry::{HookRecord, HookRegistry, MutationOutcome, NewHook, SHOW_ALL_HOOKS_KEY};
