//! Extension package handling: descriptor reading, discovery, hook
//! install/uninstall, and bidirectional file sync.

pub mod descriptor;
pub mod install;
pub mod listing;
pub mod sync;

pub use descriptor::{
    extract_file_ops, extract_hooks, load_info, locate_manifest, select_install_block,
    HookDirective, InstallAction, InstallBlock, PackageInfo, PackagingSection,
    PACKAGE_INFO_NAME,
};
pub use install::{install_hooks, uninstall_hooks};
pub use listing::{
    find_package, list_packages, sanitize_package_name, PackageEntry, SELF_PACKAGE_ID,
    SHOW_ALL_PACKAGES_KEY,
};
pub use sync::{
    directories_equal, sync_files, SyncDirection, SyncOperation, SyncOutcome, SyncReport,
    SyncResult,
};
