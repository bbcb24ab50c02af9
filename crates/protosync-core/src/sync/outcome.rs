//! Result of one sync pass

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::diff::{ChangeKind, TreeDiff};

/// Whether a pass only reports divergence or also rewrites the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Check,
    Fix,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check => write!(f, "check"),
            Self::Fix => write!(f, "fix"),
        }
    }
}

/// What a pass found and did.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub api_root: PathBuf,
    pub mode: SyncMode,
    pub shadow: bool,
    /// Destination paths produced by this pass
    pub synced: usize,
    /// Destination paths carried over from the live tree unchanged
    pub skipped: usize,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    /// Whether the live tree was rewritten
    pub applied: bool,
    /// Unified diff between the live and proposed trees
    pub patch: String,
}

impl SyncOutcome {
    pub(crate) fn new(api_root: PathBuf, mode: SyncMode, shadow: bool, diff: &TreeDiff) -> Self {
        Self {
            api_root,
            mode,
            shadow,
            synced: 0,
            skipped: 0,
            added: diff.paths(ChangeKind::Added),
            modified: diff.paths(ChangeKind::Modified),
            deleted: diff.deletions(),
            applied: false,
            patch: diff.unified(),
        }
    }

    /// True when the live tree already matched the proposed tree.
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// True when a check pass found the tree out of date.
    pub fn diverged(&self) -> bool {
        self.mode == SyncMode::Check && !self.is_clean()
    }
}
