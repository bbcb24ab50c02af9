//! File-level comparison of the current and proposed trees

use std::path::Path;

use protosync_fs::list_files;
use serde::Serialize;
use similar::TextDiff;

use crate::Result;

/// How a file differs between the two trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// One differing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Tree-relative, forward-slash path
    pub path: String,
    pub kind: ChangeKind,
    old: Vec<u8>,
    new: Vec<u8>,
}

impl FileChange {
    /// Unified diff of this file with `a/` and `b/` path prefixes.
    pub fn unified(&self) -> String {
        let old = String::from_utf8_lossy(&self.old);
        let new = String::from_utf8_lossy(&self.new);
        let old_header = match self.kind {
            ChangeKind::Added => "/dev/null".to_string(),
            _ => format!("a/{}", self.path),
        };
        let new_header = match self.kind {
            ChangeKind::Deleted => "/dev/null".to_string(),
            _ => format!("b/{}", self.path),
        };

        TextDiff::from_lines(&*old, &*new)
            .unified_diff()
            .context_radius(3)
            .header(&old_header, &new_header)
            .to_string()
    }
}

/// All differences between a current and a proposed tree.
///
/// Changes are ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    changes: Vec<FileChange>,
}

impl TreeDiff {
    /// Compare every file of `current` with every file of `proposed`.
    ///
    /// `current` is expected to be a filtered copy of the live tree already;
    /// nothing in `proposed` is dropped.
    pub fn compute(current: &Path, proposed: &Path) -> Result<Self> {
        let before = list_files(current)?;
        let after = list_files(proposed)?;

        let mut changes = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < before.len() || j < after.len() {
            let ordering = match (before.get(i), after.get(j)) {
                (Some(b), Some(a)) => b.cmp(a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, _) => std::cmp::Ordering::Greater,
            };
            match ordering {
                std::cmp::Ordering::Less => {
                    let path = &before[i];
                    changes.push(FileChange {
                        path: path.clone(),
                        kind: ChangeKind::Deleted,
                        old: read(current, path)?,
                        new: Vec::new(),
                    });
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    let path = &after[j];
                    changes.push(FileChange {
                        path: path.clone(),
                        kind: ChangeKind::Added,
                        old: Vec::new(),
                        new: read(proposed, path)?,
                    });
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    let path = &before[i];
                    let old = read(current, path)?;
                    let new = read(proposed, path)?;
                    if old != new {
                        changes.push(FileChange {
                            path: path.clone(),
                            kind: ChangeKind::Modified,
                            old,
                            new,
                        });
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        Ok(Self { changes })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[FileChange] {
        &self.changes
    }

    /// Paths of changes of `kind`.
    pub fn paths(&self, kind: ChangeKind) -> Vec<String> {
        self.changes
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.path.clone())
            .collect()
    }

    /// Paths that applying this diff would delete.
    pub fn deletions(&self) -> Vec<String> {
        self.paths(ChangeKind::Deleted)
    }

    /// The whole diff as one unified patch.
    pub fn unified(&self) -> String {
        self.changes.iter().map(FileChange::unified).collect()
    }

    /// Make `target` match the proposed tree for every changed path.
    ///
    /// Added and modified files are written atomically. Deleted files are
    /// removed together with any directories they leave empty.
    pub fn apply(&self, target: &Path) -> Result<()> {
        for change in &self.changes {
            let path = target.join(&change.path);
            match change.kind {
                ChangeKind::Added | ChangeKind::Modified => {
                    protosync_fs::io::write_atomic(&path, &change.new)?;
                }
                ChangeKind::Deleted => {
                    if path.exists() {
                        protosync_fs::io::remove_file_pruning(&path, target)?;
                    }
                }
            }
            tracing::debug!(path = %change.path, kind = ?change.kind, "Applied change");
        }
        Ok(())
    }
}

fn read(root: &Path, relative: &str) -> Result<Vec<u8>> {
    let path = root.join(relative);
    std::fs::read(&path).map_err(|e| protosync_fs::Error::io(path, e).into())
}
