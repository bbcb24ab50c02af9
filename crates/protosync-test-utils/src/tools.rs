//! Fake external tools.
//!
//! Both fakes are `/bin/sh` scripts, so tests using them are unix-only.
//! Each appends one line per invocation to a shared log:
//!
//! ```text
//! print <src> <dst>
//! merge <active> <shadow> <dst>
//! ```
//!
//! The printer copies its input unchanged. The merger copies the active file
//! and appends a `// merged` marker line, so merge output is recognisable and
//! still carries a single package declaration.

use std::fs;
use std::path::{Path, PathBuf};

/// Paths of an installed set of fake tools.
#[derive(Debug, Clone)]
pub struct FakeTools {
    pub printer: PathBuf,
    pub merger: PathBuf,
    pub log: PathBuf,
}

impl FakeTools {
    /// Install working fakes into `bin_dir`.
    pub fn install(bin_dir: &Path) -> Self {
        let log = bin_dir.join("calls.log");
        let printer = script(
            bin_dir,
            "printer",
            &format!(
                "echo \"print $1 $2\" >> '{log}'\ncp \"$1\" \"$2\"\n",
                log = log.display()
            ),
        );
        let merger = script(
            bin_dir,
            "merger",
            &format!(
                "echo \"merge $1 $2 $3\" >> '{log}'\ncp \"$1\" \"$3\"\necho '// merged' >> \"$3\"\n",
                log = log.display()
            ),
        );
        Self { printer, merger, log }
    }

    /// Install a printer that always fails with `message` on stderr.
    pub fn install_failing_printer(bin_dir: &Path, message: &str) -> Self {
        let mut tools = Self::install(bin_dir);
        tools.printer = script(
            bin_dir,
            "failing-printer",
            &format!("echo '{message}' >&2\nexit 1\n"),
        );
        tools
    }

    /// Logged invocations, oldest first.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Logged invocations starting with `tool` (`print` or `merge`).
    pub fn invocations_of(&self, tool: &str) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|line| line.split(' ').next() == Some(tool))
            .collect()
    }
}

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\nset -e\n{body}")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}
