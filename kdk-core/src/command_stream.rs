// Standard library
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};

// External crates
use crate::error::{KdkError, Result};
use duct::cmd;
use tracing::debug;
use which::which;

fn render<A: AsRef<OsStr>>(command: &str, args: &[A]) -> String {
    let mut rendered = command.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}

/// Stream command output directly to stdout, bypassing the logging system.
/// Use this for long-running commands where the user needs progress feedback,
/// such as image pulls. Blocks until the command exits.
pub fn stream_command_visible<A: AsRef<OsStr>>(command: &str, args: &[A]) -> Result<()> {
    let full_command = render(command, args);
    debug!("Streaming (visible): {}", full_command);

    let reader = cmd(command, args)
        .stderr_to_stdout()
        .reader()
        .map_err(|e| KdkError::Command(format!("{}: {}", full_command, e)))?;
    for line in BufReader::new(reader).lines() {
        let line = line.map_err(|e| KdkError::Command(format!("{}: {}", full_command, e)))?;
        println!("{}", line);
    }
    Ok(())
}

/// Run a command to completion and return its trimmed stdout.
pub fn capture_command<A: AsRef<OsStr>>(command: &str, args: &[A]) -> Result<String> {
    let full_command = render(command, args);
    debug!("Capturing: {}", full_command);

    let output = cmd(command, args)
        .stderr_capture()
        .stdout_capture()
        .unchecked()
        .run()
        .map_err(|e| KdkError::Command(format!("Failed to start '{}': {}", full_command, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KdkError::Command(format!(
            "'{}' exited with {:?}: {}",
            full_command,
            output.status.code(),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Checks if a command-line tool is available in the system's PATH.
pub fn is_tool_installed(tool_name: &str) -> bool {
    which(tool_name).is_ok()
}

/// Fails with a dependency error when `tool_name` is not on the PATH.
pub fn require_tool(tool_name: &str) -> Result<()> {
    if is_tool_installed(tool_name) {
        Ok(())
    } else {
        Err(KdkError::Dependency(format!(
            "'{}' was not found in PATH",
            tool_name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_arguments() {
        assert_eq!(render("docker", &["ps", "-a"]), "docker ps -a");
        assert_eq!(render::<&str>("true", &[]), "true");
    }

    #[test]
    fn test_require_tool_reports_missing_binary() {
        let err = require_tool("kdk-definitely-not-a-real-tool").unwrap_err();
        assert!(matches!(err, KdkError::Dependency(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_command_returns_stdout() {
        let out = capture_command("echo", &["hello"]).unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_command_fails_on_nonzero_exit() {
        let err = capture_command("false", &[] as &[&str]).unwrap_err();
        assert!(matches!(err, KdkError::Command(_)));
    }
}
