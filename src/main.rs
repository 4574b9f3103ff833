mod cli;
mod config;
mod error;
mod gres;
mod partition;
mod properties;
mod resources;
mod status;
mod submit;
mod utils;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout belongs to the workflow engine
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Submit { jobscript, config } => cli::handle_submit(&jobscript, &config),
        Commands::Status { job_id, config } => cli::handle_status(&job_id, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
