//! Archive building: exclusion-aware directory walking, pluggable
//! packing backends, uniquely named temp-resident jobs, and chunked
//! streaming of the result.

pub mod backend;
pub mod job;
pub mod kind;
pub mod naming;
pub mod walker;

pub use backend::{backend_for, ArchiveBackend, LibraryBackend, SystemBackend};
pub use job::{sweep_stale, ArchiveJob, TEMP_PREFIX};
pub use kind::{ArchiveKind, BackendKind};
pub use naming::target_file_name;
pub use walker::collect_files;
