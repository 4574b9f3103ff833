//! Utility functions for SLURM command execution and output parsing.

use anyhow::{Context, Result};
use regex::Regex;
use std::process::Command;

/// Result of running a SLURM command
#[derive(Debug)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
}

/// Execute a command and capture stdout, stderr, and return code.
///
/// A nonzero exit is not an error here; callers decide what it means.
///
/// # Arguments
/// * `cmd` - Program followed by its arguments
pub fn run_slurm_command<S: AsRef<str>>(cmd: &[S]) -> Result<CommandResult> {
    let (program, args) = cmd.split_first().context("Empty command")?;
    let program = program.as_ref();

    let output = Command::new(program)
        .args(args.iter().map(|arg| arg.as_ref()))
        .output()
        .with_context(|| format!("Failed to execute command: {}", program))?;

    Ok(CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        // Killed by a signal
        return_code: output.status.code().unwrap_or(-1),
    })
}

/// Parse job ID from sbatch output.
///
/// Typical sbatch output: "Submitted batch job 12345"
pub fn parse_job_id(sbatch_output: &str) -> Option<u64> {
    let re = Regex::new(r"Submitted batch job (\d+)").ok()?;
    re.captures(sbatch_output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_id() {
        assert_eq!(
            parse_job_id("Submitted batch job 12345"),
            Some(12345)
        );
        assert_eq!(
            parse_job_id("Submitted batch job 999999999\n"),
            Some(999999999)
        );
        assert_eq!(parse_job_id("Invalid output"), None);
    }

    #[test]
    fn test_run_empty_command() {
        let cmd: [&str; 0] = [];
        assert!(run_slurm_command(&cmd).is_err());
    }

    #[test]
    fn test_run_missing_program() {
        let err = run_slurm_command(&["definitely-not-a-slurm-binary-xyz"]).unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-slurm-binary-xyz"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_output_and_code() {
        let result = run_slurm_command(&["sh", "-c", "echo out; echo err >&2; exit 3"]).unwrap();
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
        assert_eq!(result.return_code, 3);
    }
}
