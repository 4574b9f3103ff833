//! CLI entry point and command definitions.

use crate::config::{StatusConfig, SubmitConfig};
use crate::properties::read_job_properties;
use crate::status::query_state;
use crate::submit::build_submission_command;
use crate::utils::{parse_job_id, run_slurm_command};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// SLURM profile - submit workflow jobs and report their status.
#[derive(Parser)]
#[command(name = "slurm-profile")]
#[command(version = "0.1.0")]
#[command(about = "Submit workflow jobs to SLURM and report their status")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a jobscript, choosing sbatch flags from its resources
    Submit {
        /// Jobscript with embedded job properties
        jobscript: PathBuf,
        #[command(flatten)]
        config: SubmitConfig,
    },
    /// Print success, running or failed for a submitted job
    Status {
        /// SLURM job ID
        job_id: String,
        #[command(flatten)]
        config: StatusConfig,
    },
}

/// Handle the submit command.
pub fn handle_submit(jobscript: &Path, config: &SubmitConfig) -> Result<u8> {
    let props = read_job_properties(jobscript)?;
    debug!(?props, "read job properties");

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;

    let mut cmd = build_submission_command(&props, &config.sbatch, &config.log_dir)?;
    cmd.push_arg(jobscript.to_string_lossy());
    info!(rule = %cmd.job_name, "submission command \"{}\"", cmd);

    let result = run_slurm_command(cmd.tokens.as_slice())
        .with_context(|| format!("Failed to submit job for rule {}", cmd.job_name))?;

    if result.return_code == 0 {
        if let Some(job_id) = parse_job_id(&result.stdout) {
            info!(rule = %cmd.job_name, job_id, "submitted");
        }
        println!("{}", result.stdout.trim_end());
        return Ok(0);
    }

    eprintln!(
        "----- Submission failed for a rule {} execution -----",
        cmd.job_name
    );
    println!("{}", result.stdout.trim_end());
    eprintln!("{}", result.stderr.trim_end());
    eprintln!("----------------------------------------------------------");
    Ok(failure_code(result.return_code))
}

/// Handle the status command.
pub fn handle_status(job_id: &str, config: &StatusConfig) -> Result<u8> {
    let query = config.query_command(job_id);
    let outcome = query_state(
        &config.retry_policy(),
        || run_slurm_command(query.as_slice()),
        std::thread::sleep,
    )?;

    match outcome.job_state() {
        Ok(state) => {
            debug!(job_id, %state, "translated job state");
            println!("{}", state);
            Ok(0)
        }
        Err(last) => {
            eprintln!("{}", last.stderr.trim_end());
            Ok(failure_code(last.return_code))
        }
    }
}

/// Convert a collaborator's exit code into ours, keeping failures nonzero.
fn failure_code(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(code) if code != 0 => code,
        _ => 1,
    }
}
