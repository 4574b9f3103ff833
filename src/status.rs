//! Job status translation for the workflow engine's polling loop.

use crate::utils::CommandResult;
use anyhow::Result;
use std::time::Duration;
use tracing::{debug, warn};

/// Exit code of the status query when the job is not known to it yet.
pub const JOB_UNKNOWN_EXIT_CODE: i32 = 4;

/// Native states that mean the job has not finished.
pub const RUNNING_STATES: [&str; 6] = [
    "PENDING",
    "CONFIGURING",
    "COMPLETING",
    "RUNNING",
    "SUSPENDED",
    "PREEMPTED",
];

/// Job state as reported to the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Success,
    Running,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Success => "success",
            JobState::Running => "running",
            JobState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a native SLURM state onto the engine's three states.
///
/// Anything unrecognized, including no state at all, counts as failed.
pub fn translate_state(raw_state: Option<&str>) -> JobState {
    match raw_state.map(str::trim) {
        Some("COMPLETED") => JobState::Success,
        Some(state) if RUNNING_STATES.contains(&state) => JobState::Running,
        _ => JobState::Failed,
    }
}

/// How often and how patiently the status query is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 4,
            delay: Duration::from_secs(11),
        }
    }
}

/// Result of querying the status collaborator.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The query succeeded and reported this (trimmed) state.
    Reported(String),
    /// The job is not known to the query yet; it was just submitted.
    NotYetKnown,
    /// Every attempt failed; holds the last result.
    Exhausted(CommandResult),
}

impl QueryOutcome {
    /// Engine-facing state, or the last failed run when the query gave up.
    pub fn job_state(&self) -> std::result::Result<JobState, &CommandResult> {
        match self {
            QueryOutcome::Reported(state) => Ok(translate_state(Some(state))),
            QueryOutcome::NotYetKnown => Ok(JobState::Running),
            QueryOutcome::Exhausted(last) => Err(last),
        }
    }
}

/// Run the status query under a retry policy.
///
/// Failures to launch the query are returned immediately; nonzero exits are
/// retried after `policy.delay` until `policy.attempts` runs have been made.
///
/// # Arguments
/// * `policy` - Attempt count and delay between attempts
/// * `run` - Runs the query once
/// * `sleep` - Waits between attempts
pub fn query_state<R, S>(policy: &RetryPolicy, mut run: R, mut sleep: S) -> Result<QueryOutcome>
where
    R: FnMut() -> Result<CommandResult>,
    S: FnMut(Duration),
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = run()?;
        match result.return_code {
            0 => {
                let state = result.stdout.trim().to_string();
                debug!(attempt, state = %state, "status query succeeded");
                return Ok(QueryOutcome::Reported(state));
            }
            JOB_UNKNOWN_EXIT_CODE => {
                debug!(attempt, "job not known to status query yet");
                return Ok(QueryOutcome::NotYetKnown);
            }
            code if attempt >= attempts => {
                warn!(attempt, code, "status query failed, giving up");
                return Ok(QueryOutcome::Exhausted(result));
            }
            code => {
                warn!(
                    attempt,
                    code,
                    delay_secs = policy.delay.as_secs_f64(),
                    "status query failed, retrying"
                );
                sleep(policy.delay);
            }
        }
    }
}
