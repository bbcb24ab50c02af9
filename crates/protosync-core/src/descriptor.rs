//! Header metadata extraction from definition files
//!
//! Reads just enough of a `.proto` source (or a text-format file descriptor
//! emitted by the upstream transform) to route and link it: the package
//! declaration, imports, service declarations and `previous_message_type`
//! annotations. This is line-pattern matching, not a grammar.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// `package: "a.b";` in descriptor text format, or `package a.b;` in source form.
static PACKAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^package(?::\s*"([^"]*)"|\s+([^=";\s]+)\s*;)"#).unwrap()
});

static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^import "(.*)";"#).unwrap());

static SERVICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^service (\w+) \{").unwrap());

static PREVIOUS_MESSAGE_TYPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"previous_message_type\s+=\s+"([^"]*)";"#).unwrap());

/// Header metadata of one definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionFile {
    /// Where the file was read from
    pub path: PathBuf,
    /// Declared package, e.g. `envoy.config.bootstrap.v3`
    pub package: String,
    /// Raw import targets in declaration order
    pub imports: Vec<String>,
    /// Names of declared services
    pub services: Vec<String>,
    /// Qualified names referenced by `previous_message_type` annotations
    pub previous_message_types: Vec<String>,
}

impl DefinitionFile {
    /// Read and parse the file at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = protosync_fs::io::read_text(path)?;
        Self::parse(path, &contents)
    }

    /// Parse already-loaded contents. `path` is only used for reporting.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let package = parse_package(path, contents)?;

        let mut imports = Vec::new();
        let mut services = Vec::new();
        for line in contents.lines() {
            if let Some(caps) = IMPORT_PATTERN.captures(line) {
                imports.push(caps[1].to_string());
            } else if let Some(caps) = SERVICE_PATTERN.captures(line) {
                services.push(caps[1].to_string());
            }
        }

        let previous_message_types = PREVIOUS_MESSAGE_TYPE_PATTERN
            .captures_iter(contents)
            .map(|caps| caps[1].to_string())
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            package,
            imports,
            services,
            previous_message_types,
        })
    }

    pub fn has_services(&self) -> bool {
        !self.services.is_empty()
    }
}

/// Read only the package declaration of the file at `path`.
pub fn read_package(path: &Path) -> Result<String> {
    let contents = protosync_fs::io::read_text(path)?;
    parse_package(path, &contents)
}

fn parse_package(path: &Path, contents: &str) -> Result<String> {
    let matches: Vec<String> = PACKAGE_PATTERN
        .captures_iter(contents)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string()))
        .collect();

    match matches.as_slice() {
        [package] => Ok(package.clone()),
        _ => Err(Error::Format {
            path: path.to_path_buf(),
            count: matches.len(),
        }),
    }
}
