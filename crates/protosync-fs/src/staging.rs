//! Scoped staging areas for sync passes
//!
//! A [`StagingArea`] owns a temporary directory holding two trees: `a`, the
//! filtered copy of the live source tree, and `b`, the freshly generated
//! tree. The directory is removed when the area is dropped. Live areas are
//! also tracked in a process-wide registry so an interrupt handler can
//! remove them via [`purge_registered`] before the process exits.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use tempfile::TempDir;

use crate::{Error, Result};

static LIVE_AREAS: LazyLock<Mutex<HashSet<PathBuf>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Temporary `a`/`b` tree pair used for one sync pass.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a fresh staging area with empty `a` and `b` trees.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("protosync-")
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;

        for tree in ["a", "b"] {
            let path = dir.path().join(tree);
            fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        }

        if let Ok(mut live) = LIVE_AREAS.lock() {
            live.insert(dir.path().to_path_buf());
        }
        tracing::debug!(path = %dir.path().display(), "Created staging area");

        Ok(Self { dir })
    }

    /// Root of the staging area; `a` and `b` live directly below it.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The filtered copy of the live source tree.
    pub fn current(&self) -> PathBuf {
        self.dir.path().join("a")
    }

    /// The freshly generated tree.
    pub fn proposed(&self) -> PathBuf {
        self.dir.path().join("b")
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Ok(mut live) = LIVE_AREAS.lock() {
            live.remove(self.dir.path());
        }
        tracing::debug!(path = %self.dir.path().display(), "Removing staging area");
    }
}

/// Remove every staging area that is still alive.
///
/// Intended for interrupt handlers, where destructors will not run.
/// Returns the number of directories removed.
pub fn purge_registered() -> usize {
    let Ok(mut live) = LIVE_AREAS.lock() else {
        return 0;
    };
    let mut removed = 0;
    for path in live.drain() {
        match fs::remove_dir_all(&path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove staging area"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_area_layout() {
        let area = StagingArea::new().unwrap();
        assert!(area.current().is_dir());
        assert!(area.proposed().is_dir());
        assert_eq!(area.current().parent().unwrap(), area.root());
    }

    #[test]
    fn test_staging_area_removed_on_drop() {
        let area = StagingArea::new().unwrap();
        let root = area.root().to_path_buf();
        drop(area);
        assert!(!root.exists());
    }

    #[test]
    fn test_dropped_area_is_unregistered() {
        let area = StagingArea::new().unwrap();
        let root = area.root().to_path_buf();
        assert!(LIVE_AREAS.lock().unwrap().contains(&root));
        drop(area);
        assert!(!LIVE_AREAS.lock().unwrap().contains(&root));
    }
}
