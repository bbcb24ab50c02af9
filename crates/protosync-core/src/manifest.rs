//! Canonical BUILD manifest rendering
//!
//! Output depends only on the has-services flag and the dependency set, so
//! regenerating an unchanged directory produces byte-identical text and
//! never shows up in the tree diff.

use std::path::Path;

use crate::deps::{DependencyResolver, DirectoryDeps};
use crate::descriptor::DefinitionFile;
use crate::Result;

/// Name of the manifest file written into every proto directory.
pub const MANIFEST_FILE_NAME: &str = "BUILD";

const HEADER: &str = "# DO NOT EDIT. This file is generated by protosync.

load(\"@envoy_api//bazel:api_build_system.bzl\", \"api_proto_package\")

licenses([\"notice\"])  # Apache 2

";

/// Ordering key matching buildifier: `:` sorts before every other character.
pub fn dependency_order_key(target: &str) -> String {
    target.replace(':', "!")
}

/// Render the manifest for a directory.
pub fn render<'a, I>(has_services: bool, deps: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut deps: Vec<&String> = deps.into_iter().collect();
    deps.sort_by_cached_key(|d| dependency_order_key(d));
    deps.dedup();

    let mut fields = Vec::new();
    if has_services {
        fields.push("    has_services = True,".to_string());
    }
    match deps.as_slice() {
        [] => {}
        [single] => fields.push(format!("    deps = [\"{single}\"],")),
        many => {
            let lines: String = many
                .iter()
                .map(|d| format!("        \"{d}\",\n"))
                .collect();
            fields.push(format!("    deps = [\n{lines}    ],"));
        }
    }

    let formatted_fields = if fields.is_empty() {
        String::new()
    } else {
        format!("\n{}\n", fields.join("\n"))
    };

    format!("{HEADER}api_proto_package({formatted_fields})\n")
}

/// Render the manifest for already-resolved directory dependencies.
pub fn render_directory(resolved: &DirectoryDeps) -> String {
    render(resolved.has_services, &resolved.deps)
}

/// Resolve and write the manifest for one directory of a tree.
///
/// `directory` is relative to `root`; every `.proto` file directly inside it
/// contributes to the dependency set.
pub fn write_directory_manifest(
    resolver: &DependencyResolver<'_>,
    root: &Path,
    directory: &str,
) -> Result<()> {
    let dir_path = root.join(directory);
    let mut proto_paths: Vec<_> = std::fs::read_dir(&dir_path)
        .map_err(|e| protosync_fs::Error::io(&dir_path, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "proto"))
        .collect();
    proto_paths.sort();

    let files = proto_paths
        .iter()
        .map(|p| DefinitionFile::read(p))
        .collect::<Result<Vec<_>>>()?;

    let resolved = resolver.resolve_directory(directory, &files)?;
    tracing::debug!(
        directory,
        deps = resolved.deps.len(),
        has_services = resolved.has_services,
        "Writing manifest"
    );
    protosync_fs::io::write_text(&dir_path.join(MANIFEST_FILE_NAME), &render_directory(&resolved))?;
    Ok(())
}
