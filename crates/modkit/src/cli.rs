//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Modkit - inspect and mutate a forum's integration hooks, sync
/// extension package files, and build downloadable archives
#[derive(Parser, Debug)]
#[command(name = "modkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the settings store file
    #[arg(
        short,
        long,
        global = true,
        env = "MODKIT_SETTINGS",
        default_value = "modkit-settings.yaml"
    )]
    pub settings: Utf8PathBuf,

    /// Forum installation root
    #[arg(long, global = true, env = "MODKIT_BOARD_DIR", default_value = ".")]
    pub board_dir: Utf8PathBuf,

    /// Packages directory (defaults to <board-dir>/Packages)
    #[arg(long, global = true, env = "MODKIT_PACKAGES_DIR")]
    pub packages_dir: Option<Utf8PathBuf>,

    /// Running platform version for install-block selection
    #[arg(
        long,
        global = true,
        env = "MODKIT_PLATFORM_VERSION",
        default_value = "2.1.4"
    )]
    pub platform_version: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hook registry management
    #[command(subcommand)]
    Hooks(HooksCommands),

    /// Extension package management
    #[command(subcommand)]
    Package(PackageCommands),

    /// Archive building
    #[command(subcommand)]
    Archive(ArchiveCommands),
}

// Hook commands
#[derive(Subcommand, Debug, Clone)]
pub enum HooksCommands {
    /// List registered hooks
    List(HooksListArgs),

    /// Register a new hook
    Add(HooksAddArgs),

    /// Enable or disable a hook by fingerprint
    Toggle(HooksKeyArgs),

    /// Remove a hook by fingerprint
    Delete(HooksKeyArgs),

    /// Replace a hook's registration by fingerprint
    Modify(HooksModifyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct HooksListArgs {
    /// First record to show
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Records per page (0 shows everything)
    #[arg(long, default_value_t = modkit_hooks::HOOKS_PER_PAGE)]
    pub per_page: usize,

    /// Sort column: hook-name, callable, file, status
    #[arg(long, default_value = "hook-name")]
    pub sort: String,

    /// Reverse the sort order
    #[arg(long)]
    pub desc: bool,

    /// Filter by hook name (substring, case-insensitive)
    #[arg(long)]
    pub hook_name: Option<String>,

    /// Filter by source file (substring, case-insensitive)
    #[arg(long)]
    pub file: Option<String>,

    /// Filter by callable (substring, case-insensitive)
    #[arg(long)]
    pub callable: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct HooksAddArgs {
    /// Hook name (the integrate_ prefix is added when missing)
    pub hook: String,

    /// Callable to register
    pub callable: String,

    /// Source file to include before calling
    #[arg(long)]
    pub file: Option<String>,

    /// Register as an instantiated-class method
    #[arg(long)]
    pub method: bool,
}

#[derive(Args, Debug, Clone)]
pub struct HooksKeyArgs {
    /// Hook fingerprint (a unique prefix is enough)
    pub identity: String,
}

#[derive(Args, Debug, Clone)]
pub struct HooksModifyArgs {
    /// Hook fingerprint (a unique prefix is enough)
    pub identity: String,

    /// New hook name
    pub hook: String,

    /// New callable
    pub callable: String,

    /// New source file
    #[arg(long)]
    pub file: Option<String>,

    /// Register as an instantiated-class method
    #[arg(long)]
    pub method: bool,
}

// Package commands
#[derive(Subcommand, Debug, Clone)]
pub enum PackageCommands {
    /// List extension packages
    List(PackageListArgs),

    /// Apply a package's hook directives to the registry
    InstallHooks(PackageNameArgs),

    /// Retract a package's hook directives from the registry
    UninstallHooks(PackageNameArgs),

    /// Copy live files back into the package directory
    SyncIn(PackageNameArgs),

    /// Copy package files out to their install locations
    SyncOut(PackageNameArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PackageListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PackageNameArgs {
    /// Package directory name under the packages directory
    pub package: String,
}

// Archive commands
#[derive(Subcommand, Debug, Clone)]
pub enum ArchiveCommands {
    /// Build a package archive
    Build(ArchiveBuildArgs),

    /// Remove stale working files left by crashed builds
    Sweep(ArchiveSweepArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ArchiveBuildArgs {
    /// Package directory name under the packages directory
    pub package: String,

    /// Container kind: tar, tgz, zip (unknown values fall back to tgz)
    #[arg(long, default_value = "tgz")]
    pub format: String,

    /// Packing backend: library or system
    #[arg(long, default_value = "library")]
    pub backend: String,

    /// Directory to write the archive into
    #[arg(short, long, default_value = ".")]
    pub output: Utf8PathBuf,

    /// Extra exclusion patterns on top of the package's own
    #[arg(long)]
    pub exclude: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ArchiveSweepArgs {
    /// Temp directory to sweep (defaults to the system temp dir)
    #[arg(long)]
    pub temp_dir: Option<Utf8PathBuf>,
}
