//! Candidate artifacts produced by the build
//!
//! Each build label names one definition file. The build emits up to three
//! renditions of it next to each other under the artifact root:
//!
//! | kind | suffix |
//! |------|--------|
//! | active or frozen | `.active_or_frozen.proto` |
//! | next major | `.next_major_version_candidate.proto` |
//! | next major, internal | `.next_major_version_candidate.envoy_internal.proto` |
//!
//! A regular pass looks at the first two; a shadow pass looks at the first
//! and third. Empty or missing artifacts are not candidates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

/// Suffix of the active-or-frozen rendition.
pub const ACTIVE_SUFFIX: &str = ".active_or_frozen.proto";
/// Suffix of the next-major rendition.
pub const NEXT_MAJOR_SUFFIX: &str = ".next_major_version_candidate.proto";
/// Suffix of the next-major rendition carrying internal-only fields.
pub const NEXT_MAJOR_INTERNAL_SUFFIX: &str = ".next_major_version_candidate.envoy_internal.proto";

/// Which rendition a candidate artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    ActiveOrFrozen,
    NextMajor,
    NextMajorInternal,
}

impl CandidateKind {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::ActiveOrFrozen => ACTIVE_SUFFIX,
            Self::NextMajor => NEXT_MAJOR_SUFFIX,
            Self::NextMajorInternal => NEXT_MAJOR_INTERNAL_SUFFIX,
        }
    }

    /// Kinds considered by a pass, in lookup order.
    pub fn for_pass(shadow: bool) -> [Self; 2] {
        if shadow {
            [Self::ActiveOrFrozen, Self::NextMajorInternal]
        } else {
            [Self::ActiveOrFrozen, Self::NextMajor]
        }
    }

    pub fn is_next_major(self) -> bool {
        !matches!(self, Self::ActiveOrFrozen)
    }
}

/// One artifact file that may become a destination file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub kind: CandidateKind,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>, kind: CandidateKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// A build label of the form `[@repo]//<package_dir>:<file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub package_dir: String,
    pub file: String,
}

impl Label {
    /// Parse a label. The optional `@repo` prefix is ignored.
    pub fn parse(label: &str) -> Result<Self> {
        let invalid = || Error::InvalidLabel {
            label: label.to_string(),
        };

        let rest = label.split_once("//").map(|(_, r)| r).ok_or_else(invalid)?;
        let (package_dir, file) = rest.split_once(':').ok_or_else(invalid)?;
        if file.is_empty() || file.contains(':') || package_dir.starts_with('/') {
            return Err(invalid());
        }

        Ok(Self {
            package_dir: package_dir.to_string(),
            file: file.to_string(),
        })
    }

    /// Artifact path of this label's rendition, relative to the artifact root.
    pub fn artifact(&self, kind: CandidateKind) -> PathBuf {
        let name = format!("{}{}", self.file, kind.suffix());
        if self.package_dir.is_empty() {
            PathBuf::from(name)
        } else {
            Path::new(&self.package_dir).join(name)
        }
    }
}

/// Candidates grouped by destination path.
///
/// Every destination has one candidate, or exactly two where one is the
/// active-or-frozen rendition and the other a next-major rendition.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    entries: BTreeMap<PathBuf, Vec<Candidate>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `candidate` for `destination`, rejecting combinations that
    /// cannot be materialized.
    pub fn insert(&mut self, destination: PathBuf, candidate: Candidate) -> Result<()> {
        let entry = self.entries.entry(destination.clone()).or_default();
        if entry.iter().any(|c| c.path == candidate.path) {
            return Ok(());
        }

        let conflict = match entry.as_slice() {
            [] => false,
            [existing] => existing.kind.is_next_major() == candidate.kind.is_next_major(),
            _ => true,
        };
        if conflict {
            let mut candidates: Vec<PathBuf> = entry.iter().map(|c| c.path.clone()).collect();
            candidates.push(candidate.path);
            return Err(Error::CandidateConflict {
                destination,
                candidates,
            });
        }

        entry.push(candidate);
        entry.sort_by_key(|c| c.kind);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &[Candidate])> {
        self.entries.iter().map(|(d, c)| (d, c.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decides which artifacts are regenerated and which are carried over
/// from the live tree unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncGate {
    force: bool,
    tooling_changed: bool,
    modified_files: Option<Vec<String>>,
}

impl SyncGate {
    /// Sync everything.
    pub fn all() -> Self {
        Self {
            force: true,
            tooling_changed: false,
            modified_files: None,
        }
    }

    /// Gate from version-control history.
    ///
    /// `modified_files` holds the definition files changed since the last
    /// upstream merge; `None` means that history is unknown.
    pub fn from_history(tooling_changed: bool, modified_files: Option<Vec<String>>) -> Self {
        let modified_files = modified_files.map(|files| {
            files
                .iter()
                .filter_map(|f| f.rsplit('/').next())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        });
        Self {
            force: false,
            tooling_changed,
            modified_files,
        }
    }

    /// Whether `artifact` must be regenerated.
    pub fn should_sync(&self, artifact: &Path) -> bool {
        if self.force || self.tooling_changed {
            return true;
        }
        let Some(modified) = &self.modified_files else {
            return true;
        };
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        modified.iter().any(|m| name.starts_with(m.as_str()))
    }
}
