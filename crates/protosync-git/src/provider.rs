//! Source-control trait used by the synchronizer

use std::path::Path;

use crate::{GitSourceControl, Result};

/// Version-control queries needed by a sync pass.
pub trait SourceControl {
    /// Uncommitted entries under `path`, one `XY path` line per entry.
    fn dirty_entries(&self, path: &Path) -> Result<Vec<String>>;

    /// Files under `path` ending in `suffix` that changed since the last
    /// upstream-merged commit, as repository-relative paths.
    ///
    /// `None` means the history is unknown and callers must assume
    /// everything changed.
    fn modified_since_upstream(&self, path: &Path, suffix: &str) -> Result<Option<Vec<String>>>;
}

/// Stand-in for trees that are not under version control.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSourceControl;

impl SourceControl for NoSourceControl {
    fn dirty_entries(&self, _path: &Path) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn modified_since_upstream(&self, _path: &Path, _suffix: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }
}

/// Open the git repository containing `path`, or fall back to [`NoSourceControl`].
pub fn open_source_control(path: &Path) -> Result<Box<dyn SourceControl>> {
    match GitSourceControl::discover(path)? {
        Some(git) => Ok(Box::new(git)),
        None => {
            tracing::debug!(path = %path.display(), "No git repository found");
            Ok(Box::new(NoSourceControl))
        }
    }
}
