//! Canonical destination paths for definition files

use std::path::{Path, PathBuf};

use crate::descriptor;
use crate::policy::NamespacePolicy;
use crate::{Error, Result};

/// Directory for a package or fully qualified message name.
///
/// Keeps the segments that start with a lowercase letter (package parts)
/// and drops message and field names.
///
/// ```
/// use protosync_core::paths::directory_for;
///
/// assert_eq!(directory_for("envoy.api.v2.Cluster.EdsClusterConfig"), "envoy/api/v2");
/// ```
pub fn directory_for(qualified_name: &str) -> String {
    qualified_name
        .split('.')
        .filter(|s| s.chars().next().is_some_and(|c| c.is_ascii_lowercase()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonical `.proto` file name for a source or artifact file: everything
/// before the first `.`, plus `.proto`.
pub fn canonical_file_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    format!("{stem}.proto")
}

/// Maps definition files to their place in the API tree.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    policy: &'a NamespacePolicy,
}

impl<'a> PathResolver<'a> {
    pub fn new(policy: &'a NamespacePolicy) -> Self {
        Self { policy }
    }

    /// Destination for a file declaring `package`.
    ///
    /// `source` is the file's path relative to the root it was found under;
    /// it decides whether the extension-area rules apply.
    pub fn destination_path(&self, source: &Path, package: &str) -> Result<PathBuf> {
        let destination = PathBuf::from(directory_for(package)).join(canonical_file_name(source));

        if !self.policy.is_extension_path(source) {
            return Ok(destination);
        }

        if !self.policy.is_unstable_package(package)
            && !self.policy.extension_allow_list.contains(package)
        {
            return Err(Error::NamespaceViolation {
                package: package.to_string(),
            });
        }

        Ok(PathBuf::from(&self.policy.relocation_prefix).join(destination))
    }

    /// Read the package declaration of `root/relative` and resolve its destination.
    pub fn resolve_file(&self, root: &Path, relative: &Path) -> Result<PathBuf> {
        let package = descriptor::read_package(&root.join(relative))?;
        self.destination_path(relative, &package)
    }
}
