//! Typed view of a job's resource mapping.

use crate::error::SubmitError;
use crate::properties::ResourceValue;
use std::collections::BTreeMap;

/// Runtime limit in minutes when a job does not declare one.
pub const DEFAULT_RUNTIME_MIN: u64 = 120;

/// Resources recognized by the submission builder, each resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub mem_mb: u64,
    pub runtime_min: u64,
    pub disk_mb: Option<u64>,
    pub gpu: Option<u64>,
    pub gpu_model: Option<String>,
    /// From `ntasks`, or its alias `tasks`, which takes precedence.
    pub ntasks: Option<u64>,
    pub nodes: Option<u64>,
    /// Explicit partition; skips automatic selection.
    pub partition: Option<String>,
    /// Raw extra sbatch arguments, passed through untouched.
    pub extra: Option<String>,
}

impl ResourceRequest {
    /// Resolve the recognized keys of a resource mapping.
    ///
    /// Keys are checked in the order the command is built, so the first
    /// offending key is the one reported. Unrecognized keys are ignored.
    pub fn resolve(
        rule: &str,
        resources: &BTreeMap<String, ResourceValue>,
    ) -> Result<Self, SubmitError> {
        let unparseable = move |key: &str, value: &ResourceValue| {
            SubmitError::UnparseableResource {
                rule: rule.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            }
        };
        // A JSON null is the same as leaving the key out
        let lookup = move |key: &str| resources.get(key).filter(|value| !value.is_null());

        let integer = |key: &str| -> Result<Option<u64>, SubmitError> {
            match lookup(key) {
                None => Ok(None),
                Some(value) => value
                    .as_integer()
                    .map(Some)
                    .ok_or_else(|| unparseable(key, value)),
            }
        };
        let text = |key: &str| -> Result<Option<String>, SubmitError> {
            match lookup(key) {
                None => Ok(None),
                Some(value @ ResourceValue::Other(_)) => Err(unparseable(key, value)),
                Some(value) => Ok(Some(value.to_string())),
            }
        };

        // `tasks` overrides `ntasks` when both are given
        let ntasks = match integer("tasks")? {
            Some(n) => Some(n),
            None => integer("ntasks")?,
        };
        let nodes = integer("nodes")?;
        let mem_mb = integer("mem_mb")?.ok_or_else(|| SubmitError::MissingMemory {
            rule: rule.to_string(),
        })?;
        let runtime_min = integer("runtime")?.unwrap_or(DEFAULT_RUNTIME_MIN);
        let disk_mb = integer("disk_mb")?;
        let gpu = integer("gpu")?;
        let gpu_model = text("gpu_model")?;
        let partition = text("slurm_partition")?;
        let extra = text("slurm_extra")?;

        Ok(Self {
            mem_mb,
            runtime_min,
            disk_mb,
            gpu,
            gpu_model,
            ntasks,
            nodes,
            partition,
            extra,
        })
    }
}
