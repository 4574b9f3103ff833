//! Error types for job properties and submission building.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning job properties into an sbatch command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("{rule}: ERROR - No mem_mb in resources")]
    MissingMemory { rule: String },

    #[error("{rule}: Could not parse {key}={value}")]
    UnparseableResource {
        rule: String,
        key: String,
        value: String,
    },

    #[error("{rule}: Could not split slurm_extra into arguments: {value}")]
    UnparseableExtra { rule: String, value: String },

    #[error("job properties carry neither a rule nor a groupid")]
    MissingJobName,
}

/// Errors raised while reading the properties embedded in a jobscript.
#[derive(Error, Debug)]
pub enum PropertiesError {
    #[error("Failed to read jobscript {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No '# properties = ...' line in jobscript {}", path.display())]
    MissingProperties { path: PathBuf },

    #[error("Malformed job properties in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
