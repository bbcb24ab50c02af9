//! Build dependency resolution for directories of definition files
//!
//! A directory's dependency set is the union of two sources:
//!
//! - **imports**: every `import` is mapped to the build target providing it,
//!   through the implicit, special-case, external and internal rules of the
//!   [`NamespacePolicy`];
//! - **history**: every `previous_message_type` annotation links the package
//!   holding the earlier version of a message, so reflection-based upgrades
//!   can find its descriptor.
//!
//! An import matching no rule is an error. Guessing a target would produce
//! a dependency graph that looks valid and is not.

use std::collections::BTreeSet;
use std::path::Path;

use crate::descriptor::DefinitionFile;
use crate::paths::directory_for;
use crate::policy::NamespacePolicy;
use crate::{Error, Result};

/// Build target for a package directory inside the API tree.
pub fn package_target(directory: &str) -> String {
    format!("//{directory}:pkg")
}

/// Resolved dependencies of one output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryDeps {
    /// Deduplicated build targets, never naming the directory itself
    pub deps: BTreeSet<String>,
    /// Whether any file in the directory declares a service
    pub has_services: bool,
}

/// Maps imports and history annotations to build targets.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    policy: &'a NamespacePolicy,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(policy: &'a NamespacePolicy) -> Self {
        Self { policy }
    }

    /// Targets for the imports of `file`, which lives in the tree-relative `directory`.
    pub fn resolve_imports(&self, file: &DefinitionFile, directory: &str) -> Result<BTreeSet<String>> {
        let mut targets = BTreeSet::new();
        for import in &file.imports {
            if let Some(target) = self.resolve_import(import, file, directory)? {
                targets.insert(target);
            }
        }
        Ok(targets)
    }

    fn resolve_import(&self, import: &str, file: &DefinitionFile, directory: &str) -> Result<Option<String>> {
        let policy = self.policy;

        if policy
            .implicit_import_prefixes
            .iter()
            .any(|p| import.starts_with(p.as_str()))
        {
            return Ok(None);
        }

        if let Some(special) = policy
            .special_import_prefixes
            .iter()
            .find(|s| import.starts_with(s.prefix.as_str()))
        {
            return Ok(Some(special.target.clone()));
        }

        if let Some(target) = policy.external_dependencies.get(import) {
            return Ok(Some(target.clone()));
        }

        if policy
            .internal_roots
            .iter()
            .any(|r| import.starts_with(r.as_str()))
        {
            let import_dir = Path::new(import)
                .parent()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            if Path::new(directory).ends_with(&import_dir) {
                tracing::trace!(import, directory, "Eliding package-internal import");
                return Ok(None);
            }
            return Ok(Some(package_target(&import_dir)));
        }

        Err(Error::UnmappedImport {
            import: import.to_string(),
            path: file.path.clone(),
        })
    }

    /// Targets for the packages holding previous versions of messages in `file`.
    pub fn resolve_history(&self, file: &DefinitionFile, directory: &str) -> BTreeSet<String> {
        let relocate = self.policy.is_extension_path(Path::new(directory));
        file.previous_message_types
            .iter()
            .filter_map(|name| {
                let package_dir = directory_for(name);
                if self.policy.is_ignored_legacy(&package_dir) {
                    return None;
                }
                Some(if relocate {
                    package_target(&format!("{}/{package_dir}", self.policy.relocation_prefix))
                } else {
                    package_target(&package_dir)
                })
            })
            .collect()
    }

    /// Union of import and history targets across all files of `directory`.
    pub fn resolve_directory(&self, directory: &str, files: &[DefinitionFile]) -> Result<DirectoryDeps> {
        let mut resolved = DirectoryDeps::default();
        for file in files {
            resolved.deps.extend(self.resolve_imports(file, directory)?);
            resolved.deps.extend(self.resolve_history(file, directory));
            resolved.has_services |= file.has_services();
        }
        resolved.deps.remove(&package_target(directory));
        Ok(resolved)
    }
}
