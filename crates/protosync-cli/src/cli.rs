//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use protosync_core::SyncMode;

/// protosync - Keep a proto API tree in sync with its generated definitions
///
/// Examples:
///   protosync --mode check //envoy/config/core/v3:base.proto
///   protosync --mode fix --ci --api-shadow-root generated_api_shadow $(cat labels.txt)
#[derive(Parser, Debug)]
#[command(name = "protosync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Report divergence (check) or rewrite the API tree (fix)
    #[arg(long, value_enum)]
    pub mode: ModeArg,

    /// Live API tree
    #[arg(long, default_value = "./api")]
    pub api_root: PathBuf,

    /// Shadow API tree, synced in a second pass from the internal next-major artifacts
    #[arg(long)]
    pub api_shadow_root: Option<PathBuf>,

    /// Non-interactive run: every confirmation is answered yes
    #[arg(long)]
    pub ci: bool,

    /// Regenerate every artifact regardless of version-control history
    /// (also enabled by FORCE_PROTO_FORMAT=yes)
    #[arg(long)]
    pub force: bool,

    /// Configuration file (defaults to ./protosync.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Root the labels resolve under (overrides [artifacts] root)
    #[arg(long)]
    pub artifact_root: Option<PathBuf>,

    /// Worker threads for staging (defaults to one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the pass outcomes as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Build labels of the definition files, e.g. //envoy/config/core/v3:base.proto
    pub labels: Vec<String>,
}

/// Sync mode as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Check,
    Fix,
}

impl From<ModeArg> for SyncMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Check => SyncMode::Check,
            ModeArg::Fix => SyncMode::Fix,
        }
    }
}
