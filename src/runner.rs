//! Execution of the chosen command
//!
//! Runs the command through `bash -c` with stdin/stdout/stderr inherited so
//! interactive commands keep working. The command text is passed through
//! untouched; termi does no shell interpretation of its own.

use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};

pub fn run(command: &str) -> Result<ExitStatus> {
    let status = Command::new("bash")
        .arg("-c")
        .arg(command)
        .status()
        .context("failed to launch bash")?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_reports_exit_status() {
        assert!(run("true").unwrap().success());
        assert!(!run("false").unwrap().success());
    }

    #[test]
    fn test_run_passes_the_command_to_a_shell() {
        // Pipes only work if the whole string reaches a shell unsplit.
        assert!(run("echo hello | grep -q hello").unwrap().success());
    }
}
