//! External-command execution shared by every component.
//!
//! All external tools (build generator, build executor, librarians, the
//! archiver) are synchronous barriers: the pipeline blocks until the child
//! exits and treats any non-zero status as fatal. Output streams are
//! inherited so tool output lands on the operator's terminal unchanged.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::types::PackError;

/// Runs an external tool to completion, inheriting stdio.
///
/// `tool` is the human-readable name used in error messages. With `verbose`
/// set, the full command line is echoed first.
pub(crate) fn run_tool(mut cmd: Command, tool: &str, verbose: bool) -> Result<(), PackError> {
    if verbose {
        println!("  Running: {cmd:?}");
    }
    let status = cmd.status().map_err(|e| PackError::Spawn {
        tool: tool.to_string(),
        source: e,
    })?;
    if !status.success() {
        return Err(PackError::Tool {
            tool: tool.to_string(),
            status,
        });
    }
    Ok(())
}

/// Runs an external tool that consumes a script on stdin.
///
/// Used for the `ar -M` archiver-script merge variant.
pub(crate) fn run_tool_with_stdin(
    mut cmd: Command,
    tool: &str,
    input: &str,
    verbose: bool,
) -> Result<(), PackError> {
    if verbose {
        println!("  Running: {cmd:?}");
    }
    cmd.stdin(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| PackError::Spawn {
        tool: tool.to_string(),
        source: e,
    })?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }
    let status = child.wait()?;
    if !status.success() {
        return Err(PackError::Tool {
            tool: tool.to_string(),
            status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_tool_reports_missing_executable() {
        let cmd = Command::new("rtcpack-nonexistent-tool-12345");
        let err = run_tool(cmd, "rtcpack-nonexistent-tool-12345", false).unwrap_err();
        assert!(matches!(err, PackError::Spawn { .. }));
        assert!(format!("{err}").contains("on PATH"));
    }

    #[test]
    fn run_tool_captures_nonzero_exit() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 3"]);
        let err = run_tool(cmd, "sh", false).unwrap_err();
        match err {
            PackError::Tool { tool, status } => {
                assert_eq!(tool, "sh");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected Tool error, got {other:?}"),
        }
    }
}
