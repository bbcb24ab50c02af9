//! [`ApiFixture`] scratch layout for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory laid out the way a sync run expects:
///
/// ```text
/// <root>/api/   live API tree
/// <root>/out/   artifact root the labels resolve under
/// <root>/bin/   fake tools, see [`crate::tools`]
/// ```
pub struct ApiFixture {
    temp_dir: TempDir,
}

impl Default for ApiFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiFixture {
    /// Create the layout with empty `api/` and `out/` trees.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["api", "out", "bin"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn api_root(&self) -> PathBuf {
        self.root().join("api")
    }

    pub fn artifact_root(&self) -> PathBuf {
        self.root().join("out")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root().join("bin")
    }

    /// Write a file into the live API tree.
    pub fn write_api(&self, relative: &str, content: &str) -> &Self {
        write(&self.api_root().join(relative), content);
        self
    }

    /// Write the artifact `<dir>/<file><suffix>` under the artifact root.
    pub fn write_artifact(&self, dir: &str, file: &str, suffix: &str, content: &str) -> &Self {
        write(
            &self.artifact_root().join(dir).join(format!("{file}{suffix}")),
            content,
        );
        self
    }

    /// Contents of a file in the live API tree.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_api(&self, relative: &str) -> String {
        let path = self.api_root().join(relative);
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("Could not read {}: {e}", path.display()))
    }

    /// Every file of the live API tree with its contents, sorted by path.
    pub fn api_snapshot(&self) -> Vec<(String, String)> {
        let mut files = Vec::new();
        collect(&self.api_root(), &self.api_root(), &mut files);
        files.sort();
        files
    }

    /// Assert that `relative` exists in the live API tree.
    pub fn assert_api_exists(&self, relative: &str) {
        let path = self.api_root().join(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert that `relative` does **not** exist in the live API tree.
    pub fn assert_api_not_exists(&self, relative: &str) {
        let path = self.api_root().join(relative);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
}

fn collect(root: &Path, dir: &Path, files: &mut Vec<(String, String)>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            files.push((relative, fs::read_to_string(&path).unwrap_or_default()));
        }
    }
}
