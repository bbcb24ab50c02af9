//! External printer and merger invocation
//!
//! Both tools are opaque executables from the build output. They are run as
//! subprocesses with captured output; a non-zero exit (or a failure to start)
//! becomes [`Error::ExternalTool`] carrying the tool's stderr.

use std::path::Path;
use std::process::Command;

use crate::config::ToolsConfig;
use crate::{Error, Result};

/// The two opaque transformations a sync pass depends on.
///
/// Implementations must be shareable across worker threads.
pub trait DefinitionTools: Send + Sync {
    /// Normalize-print `src` into `dst`.
    fn print(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Merge an active and a shadow candidate into `dst`.
    fn merge(&self, active: &Path, shadow: &Path, dst: &Path) -> Result<()>;
}

/// [`DefinitionTools`] backed by the configured executables.
#[derive(Debug, Clone)]
pub struct ExternalTools {
    config: ToolsConfig,
}

impl ExternalTools {
    pub fn new(config: ToolsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }
}

impl DefinitionTools for ExternalTools {
    fn print(&self, src: &Path, dst: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.config.printer);
        cmd.arg(src)
            .arg(dst)
            .arg(&self.config.type_db)
            .arg(&self.config.api_version);
        run_tool("printer", cmd, dst)
    }

    fn merge(&self, active: &Path, shadow: &Path, dst: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.config.merger);
        cmd.arg(active).arg(shadow).arg(dst);
        run_tool("merger", cmd, dst)
    }
}

/// Run `cmd` to completion, mapping any failure to [`Error::ExternalTool`].
fn run_tool(tool: &str, mut cmd: Command, target: &Path) -> Result<()> {
    tracing::trace!(tool, command = ?cmd, "Running external tool");

    let output = cmd.output().map_err(|e| Error::ExternalTool {
        tool: tool.to_string(),
        target: target.to_path_buf(),
        detail: format!("could not start {}: {e}", cmd.get_program().to_string_lossy()),
    })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let detail = match output.status.code() {
        Some(code) if stderr.is_empty() => format!("exited with status {code}"),
        Some(code) => format!("exited with status {code}: {stderr}"),
        None => format!("terminated by signal: {stderr}"),
    };
    Err(Error::ExternalTool {
        tool: tool.to_string(),
        target: target.to_path_buf(),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_executable_is_tool_error() {
        let tools = ExternalTools::new(ToolsConfig {
            printer: PathBuf::from("/nonexistent/protosync-printer"),
            ..ToolsConfig::default()
        });

        let err = tools
            .print(Path::new("in.proto"), Path::new("out.proto"))
            .unwrap_err();

        match err {
            Error::ExternalTool { tool, target, detail } => {
                assert_eq!(tool, "printer");
                assert_eq!(target, PathBuf::from("out.proto"));
                assert!(detail.contains("could not start"));
            }
            other => panic!("expected ExternalTool, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_reports_stderr() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo 'bad descriptor' >&2; exit 3");

        let err = run_tool("merger", cmd, Path::new("x.proto")).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("merger failed for x.proto"));
        assert!(message.contains("status 3: bad descriptor"));
    }

    #[cfg(unix)]
    #[test]
    fn test_succeeding_tool() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("exit 0");
        assert!(run_tool("printer", cmd, Path::new("x.proto")).is_ok());
    }
}
