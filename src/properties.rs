//! Job properties embedded in workflow jobscripts.

use crate::error::{PropertiesError, SubmitError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Thread count used when the properties do not carry one.
pub const DEFAULT_THREADS: u32 = 2;

/// Marker of the line carrying the JSON-encoded properties.
const PROPERTIES_PREFIX: &str = "# properties = ";

/// A single resource value as the workflow engine wrote it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl ResourceValue {
    /// Interpret the value as a non-negative integer.
    ///
    /// Strings are trimmed before parsing. Floats are accepted only when they
    /// have no fractional part and fit in a `u64`.
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            ResourceValue::Integer(n) => u64::try_from(*n).ok(),
            ResourceValue::Unsigned(n) => Some(*n),
            // u64::MAX as f64 rounds up to 2^64, which is already out of range
            ResourceValue::Float(f)
                if f.is_finite() && f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64 =>
            {
                Some(*f as u64)
            }
            ResourceValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// JSON `null`, which counts as the resource not being set.
    pub fn is_null(&self) -> bool {
        matches!(self, ResourceValue::Other(serde_json::Value::Null))
    }
}

impl std::fmt::Display for ResourceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceValue::Integer(n) => write!(f, "{}", n),
            ResourceValue::Unsigned(n) => write!(f, "{}", n),
            ResourceValue::Float(x) => write!(f, "{}", x),
            ResourceValue::Text(s) => write!(f, "{}", s),
            ResourceValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ResourceValue {
    fn from(n: i64) -> Self {
        ResourceValue::Integer(n)
    }
}

impl From<&str> for ResourceValue {
    fn from(s: &str) -> Self {
        ResourceValue::Text(s.to_string())
    }
}

/// Properties of one workflow job, as written into its jobscript.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobProperties {
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub groupid: Option<String>,
    #[serde(default)]
    pub threads: Option<u32>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceValue>,
}

impl JobProperties {
    /// Logical job name: the rule, or the group id for grouped jobs.
    pub fn job_name(&self) -> Result<&str, SubmitError> {
        self.rule
            .as_deref()
            .or(self.groupid.as_deref())
            .ok_or(SubmitError::MissingJobName)
    }

    pub fn threads(&self) -> u32 {
        self.threads.unwrap_or(DEFAULT_THREADS)
    }
}

/// Read the job properties from a jobscript on disk.
pub fn read_job_properties(jobscript: &Path) -> Result<JobProperties, PropertiesError> {
    let content = std::fs::read_to_string(jobscript).map_err(|source| PropertiesError::Io {
        path: jobscript.to_path_buf(),
        source,
    })?;
    parse_job_properties(&content, jobscript)
}

/// Parse the `# properties = {...}` line out of jobscript text.
///
/// # Arguments
/// * `content` - Full jobscript text
/// * `jobscript` - Path used in error messages
pub fn parse_job_properties(
    content: &str,
    jobscript: &Path,
) -> Result<JobProperties, PropertiesError> {
    let json = content
        .lines()
        .find_map(|line| line.strip_prefix(PROPERTIES_PREFIX))
        .map(str::trim)
        .ok_or_else(|| PropertiesError::MissingProperties {
            path: jobscript.to_path_buf(),
        })?;

    serde_json::from_str(json).map_err(|source| PropertiesError::Json {
        path: jobscript.to_path_buf(),
        source,
    })
}
