//! Sync configuration
//!
//! Loaded from an optional `protosync.toml`. Every section has defaults, so
//! an empty file (or no file) reproduces the stock layout:
//!
//! ```toml
//! [tools]
//! printer = "bazel-bin/tools/protoxform/protoprint"
//! merger = "bazel-bin/tools/protoxform/merge_active_shadow"
//!
//! [artifacts]
//! root = "bazel-bin"
//!
//! [sync]
//! tooling_paths = ["tools/proto_format", "tools/protoxform"]
//! jobs = 8
//!
//! [policy]
//! extension_allow_list = ["envoy.extensions.filters.http.squash.v3"]
//! ```

use std::path::{Path, PathBuf};

use protosync_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::policy::NamespacePolicy;
use crate::Result;

/// Default name of the configuration file, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "protosync.toml";

/// Environment variable that disables the modification gate when set to `yes`.
pub const FORCE_ENV_VAR: &str = "FORCE_PROTO_FORMAT";

/// Locations and arguments of the external printer and merger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Normalize-print tool: `printer <src> <dst> <type_db> <api_version>`
    pub printer: PathBuf,
    /// Version merge tool: `merger <active> <shadow> <dst>`
    pub merger: PathBuf,
    /// Type database handed to the printer
    pub type_db: PathBuf,
    /// API version file handed to the printer
    pub api_version: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            printer: PathBuf::from("bazel-bin/tools/protoxform/protoprint"),
            merger: PathBuf::from("bazel-bin/tools/protoxform/merge_active_shadow"),
            type_db: PathBuf::from(
                "bazel-bin/tools/protoxform/protoprint.runfiles/envoy/tools/type_whisperer/api_type_db.pb_text",
            ),
            api_version: PathBuf::from("API_VERSION"),
        }
    }
}

/// Where build-output artifacts are found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Root that `//pkg:file` labels resolve under
    pub root: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("bazel-bin"),
        }
    }
}

/// Synchronizer behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Paths whose modification forces a full sync
    pub tooling_paths: Vec<PathBuf>,
    /// Worker threads for merging and manifest generation; defaults to one per core
    pub jobs: Option<usize>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            tooling_paths: vec![PathBuf::from("tools/proto_format"), PathBuf::from("tools/protoxform")],
            jobs: None,
        }
    }
}

/// Complete configuration of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub tools: ToolsConfig,
    pub artifacts: ArtifactsConfig,
    pub sync: SyncSettings,
    pub policy: NamespacePolicy,
}

impl SyncConfig {
    /// Load from `path`, or from [`CONFIG_FILE_NAME`] in the working directory
    /// when no path is given. A missing default file yields the defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let store = ConfigStore::new();
        let config = match path {
            Some(path) => store.load(path)?,
            None => store.load_or_default(Path::new(CONFIG_FILE_NAME))?,
        };
        Ok(config)
    }
}

/// Whether `FORCE_PROTO_FORMAT=yes` is set in the environment.
pub fn force_from_env() -> bool {
    std::env::var(FORCE_ENV_VAR).is_ok_and(|v| v == "yes")
}
