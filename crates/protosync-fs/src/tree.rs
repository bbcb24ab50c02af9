//! Deterministic directory listing and filtered tree copies

use std::path::Path;

use walkdir::WalkDir;

use crate::{Error, Result, io};

/// Selects which files of a tree take part in a copy.
///
/// Paths are compared in their root-relative, forward-slash form.
#[derive(Debug, Clone, Default)]
pub struct TreeFilter {
    /// Top-level entries to include. Empty means everything.
    pub roots: Vec<String>,
    /// Relative sub-paths excluded together with everything below them.
    pub excluded_paths: Vec<String>,
    /// File extensions (without the dot) that are never copied.
    pub excluded_extensions: Vec<String>,
}

impl TreeFilter {
    /// Does the root-relative path pass this filter?
    pub fn accepts(&self, relative: &str) -> bool {
        if !self.roots.is_empty() {
            let top = relative.split('/').next().unwrap_or_default();
            if !self.roots.iter().any(|r| r == top) {
                return false;
            }
        }
        if self
            .excluded_paths
            .iter()
            .any(|p| is_same_or_below(relative, p))
        {
            return false;
        }
        let extension = relative
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext);
        !matches!(extension, Some(ext) if self.excluded_extensions.iter().any(|e| e == ext))
    }
}

/// True when `relative` equals `prefix` or lies beneath it.
fn is_same_or_below(relative: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    relative == prefix
        || relative
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// List every regular file under `root` as a sorted, forward-slash relative path.
///
/// A missing root yields an empty listing.
pub fn list_files(root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative_string(relative));
        }
    }
    files.sort();
    Ok(files)
}

/// Copy the files of `src` accepted by `filter` into `dst`, preserving layout.
///
/// Returns the number of files copied.
pub fn copy_filtered(src: &Path, dst: &Path, filter: &TreeFilter) -> Result<usize> {
    let mut copied = 0;
    for relative in list_files(src)? {
        if !filter.accepts(&relative) {
            tracing::trace!(path = %relative, "Filtered out of tree copy");
            continue;
        }
        io::copy_file(&src.join(&relative), &dst.join(&relative))?;
        copied += 1;
    }
    tracing::debug!(
        src = %src.display(),
        dst = %dst.display(),
        copied,
        "Copied filtered tree"
    );
    Ok(copied)
}

fn relative_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
