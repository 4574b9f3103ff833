//! Command-line and environment configuration.

use crate::status::RetryPolicy;
use crate::submit::{DEFAULT_LOG_DIR, DEFAULT_SBATCH};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for submitting a job.
#[derive(Args, Debug, Clone)]
pub struct SubmitConfig {
    /// Directory for job stdout/stderr files (created if missing)
    #[arg(long, env = "SLURM_PROFILE_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Program used to submit the job
    #[arg(long, env = "SLURM_PROFILE_SBATCH", default_value = DEFAULT_SBATCH)]
    pub sbatch: String,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            sbatch: DEFAULT_SBATCH.to_string(),
        }
    }
}

/// Settings for querying a job's state.
#[derive(Args, Debug, Clone)]
pub struct StatusConfig {
    /// Program that reports job states
    #[arg(long, env = "SLURM_PROFILE_STATUS_CMD", default_value = "dashboard_cli")]
    pub status_cmd: String,

    /// How far back the status query looks for the job
    #[arg(long, env = "SLURM_PROFILE_SINCE", default_value = "-10d", allow_hyphen_values = true)]
    pub since: String,

    /// Number of query attempts before giving up
    #[arg(long, env = "SLURM_PROFILE_STATUS_ATTEMPTS", default_value_t = 4)]
    pub attempts: u32,

    /// Seconds to wait between query attempts
    #[arg(long, env = "SLURM_PROFILE_STATUS_RETRY_DELAY", default_value_t = 11)]
    pub retry_delay: u64,
}

impl StatusConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts,
            delay: Duration::from_secs(self.retry_delay),
        }
    }

    /// Full status query command for a job.
    pub fn query_command(&self, job_id: &str) -> Vec<String> {
        [
            self.status_cmd.as_str(),
            "jobs",
            "-j",
            job_id,
            "--fields",
            "state",
            "--since",
            &self.since,
            "--noheader",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            status_cmd: "dashboard_cli".to_string(),
            since: "-10d".to_string(),
            attempts: 4,
            retry_delay: 11,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_command() {
        let config = StatusConfig::default();
        assert_eq!(
            config.query_command("12345"),
            vec![
                "dashboard_cli",
                "jobs",
                "-j",
                "12345",
                "--fields",
                "state",
                "--since",
                "-10d",
                "--noheader"
            ]
        );
    }

    #[test]
    fn test_default_retry_policy() {
        assert_eq!(StatusConfig::default().retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_submit_defaults() {
        let config = SubmitConfig::default();
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.sbatch, "sbatch");
    }
}
