//! Translation of job properties into an sbatch command line.

use crate::error::SubmitError;
use crate::gres::{GresEntry, GresList};
use crate::partition::select_partition;
use crate::properties::JobProperties;
use crate::resources::ResourceRequest;
use std::path::Path;

/// Directory job logs are written to, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Program used to submit batch jobs.
pub const DEFAULT_SBATCH: &str = "sbatch";

/// A fully built submission command for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionCommand {
    /// Program followed by its arguments.
    pub tokens: Vec<String>,
    /// Rule (or group id) the job was built for.
    pub job_name: String,
}

impl SubmissionCommand {
    #[cfg(test)]
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    #[cfg(test)]
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// Append a trailing argument, such as the jobscript path.
    pub fn push_arg(&mut self, arg: impl Into<String>) {
        self.tokens.push(arg.into());
    }

    /// Whether the exact token is part of the command.
    #[cfg(test)]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

impl std::fmt::Display for SubmissionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Build the sbatch command for a job.
///
/// Flags are emitted in a fixed order: cpus, ntasks, nodes, mem, time,
/// constraint, gres, partition, `slurm_extra` tokens, output. Nothing is
/// executed; creating `log_dir` and running the command is up to the caller.
///
/// # Arguments
/// * `props` - Job properties read from the jobscript
/// * `program` - Submission program placed first in the token list
/// * `log_dir` - Directory the job's `%j` output file goes to
pub fn build_submission_command(
    props: &JobProperties,
    program: &str,
    log_dir: &Path,
) -> Result<SubmissionCommand, SubmitError> {
    let job_name = props.job_name()?.to_string();
    let threads = props.threads();
    let request = ResourceRequest::resolve(&job_name, &props.resources)?;

    let mut tokens = vec![program.to_string(), format!("--cpus-per-task={}", threads)];

    if let Some(ntasks) = request.ntasks {
        tokens.push(format!("--ntasks={}", ntasks));
    }
    if let Some(nodes) = request.nodes {
        tokens.push(format!("--nodes={}", nodes));
    }
    tokens.push(format!("--mem={}", request.mem_mb));
    tokens.push(format!("--time={}", request.runtime_min));

    let mut gres = GresList::new();
    if let Some(disk_mb) = request.disk_mb {
        gres.push(GresEntry::scratch_from_mb(disk_mb));
    }
    if let Some(count) = request.gpu {
        match request.gpu_model.as_deref() {
            // A set of acceptable models goes to --constraint instead of --gres
            Some(models) if models.contains('|') => {
                gres.push(GresEntry::Gpu { model: None, count });
                tokens.push(format!("--constraint={}", models));
            }
            model => gres.push(GresEntry::Gpu {
                model: model.map(str::to_string),
                count,
            }),
        }
    }
    if let Some(flag) = gres.to_flag() {
        tokens.push(flag);
    }

    let partition = match request.partition {
        Some(partition) => partition,
        None => select_partition(
            threads,
            request.mem_mb,
            request.runtime_min,
            &gres,
            request.ntasks,
            request.nodes,
        )
        .to_string(),
    };
    tokens.push(format!("--partition={}", partition));

    if let Some(extra) = request.extra.as_deref() {
        let extra_tokens = shlex::split(extra).ok_or_else(|| SubmitError::UnparseableExtra {
            rule: job_name.clone(),
            value: extra.to_string(),
        })?;
        tokens.extend(extra_tokens);
    }

    let output = log_dir.join(format!("{}-%j.out", job_name));
    tokens.push(format!("--output={}", output.display()));

    Ok(SubmissionCommand { tokens, job_name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::ResourceValue;

    fn build(props: &JobProperties) -> Result<SubmissionCommand, SubmitError> {
        build_submission_command(props, DEFAULT_SBATCH, Path::new(DEFAULT_LOG_DIR))
    }

    fn props(rule: &str, threads: u32, resources: &[(&str, ResourceValue)]) -> JobProperties {
        JobProperties {
            rule: Some(rule.to_string()),
            groupid: None,
            threads: Some(threads),
            resources: resources
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_cmd_with_scratch() {
        let p = props(
            "testrule",
            10,
            &[("mem_mb", 1024i64.into()), ("disk_mb", 1000i64.into()), ("runtime", 600i64.into())],
        );
        let cmd = build(&p).unwrap();
        assert_eq!(cmd.job_name, "testrule");
        assert_eq!(cmd.program(), "sbatch");
        assert!(cmd.contains("--mem=1024"));
        assert!(cmd.contains("--cpus-per-task=10"));
        assert!(cmd.contains("--gres=lscratch:1"));
        assert!(cmd.contains("--partition=norm"));
    }

    #[test]
    fn test_cmd_with_gpu() {
        let p = props(
            "testrule2",
            2,
            &[("mem_mb", 4096i64.into()), ("gpu", 1i64.into()), ("runtime", 600i64.into())],
        );
        let cmd = build(&p).unwrap();
        assert_eq!(cmd.job_name, "testrule2");
        assert!(cmd.contains("--mem=4096"));
        assert!(cmd.contains("--cpus-per-task=2"));
        assert!(cmd.contains("--gres=gpu:1"));
    }

    #[test]
    fn test_cmd_with_gpu_and_scratch() {
        let p = props(
            "testrule3",
            2,
            &[
                ("mem_mb", 4096i64.into()),
                ("gpu", 1i64.into()),
                ("disk_mb", 4096i64.into()),
                ("runtime", 600i64.into()),
            ],
        );
        let cmd = build(&p).unwrap();
        assert!(cmd.contains("--time=600"));
        assert!(cmd.contains("--partition=gpu"));
        assert!(cmd.contains("--gres=lscratch:4,gpu:1"));
    }

    #[test]
    fn test_cmd_with_gpu_model() {
        let p = props(
            "testrule3",
            2,
            &[
                ("mem_mb", 4096i64.into()),
                ("gpu", 1i64.into()),
                ("gpu_model", "a100".into()),
                ("disk_mb", 4096i64.into()),
                ("runtime", 600i64.into()),
            ],
        );
        let cmd = build(&p).unwrap();
        assert!(cmd.contains("--partition=gpu"));
        assert!(cmd.contains("--gres=lscratch:4,gpu:a100:1"));
        assert!(!cmd.tokens.iter().any(|t| t.starts_with("--constraint")));
    }

    #[test]
    fn test_cmd_with_gpu_constraint() {
        let p = props(
            "testrule3",
            2,
            &[
                ("mem_mb", 4096i64.into()),
                ("gpu", 2i64.into()),
                ("gpu_model", "[gpua100|gpuv100x]".into()),
                ("disk_mb", 4096i64.into()),
                ("runtime", 600i64.into()),
            ],
        );
        let cmd = build(&p).unwrap();
        assert!(cmd.contains("--partition=gpu"));
        assert!(cmd.contains("--gres=lscratch:4,gpu:2"));
        assert!(cmd.contains("--constraint=[gpua100|gpuv100x]"));
    }

    #[test]
    fn test_gpu_model_without_gpu_is_ignored() {
        let p = props("r", 2, &[("mem_mb", 4096i64.into()), ("gpu_model", "a100".into())]);
        let cmd = build(&p).unwrap();
        assert!(!cmd.tokens.iter().any(|t| t.starts_with("--gres")));
        assert!(cmd.contains("--partition=quick"));
    }

    #[test]
    fn test_full_token_order() {
        let p = props(
            "mpi",
            4,
            &[
                ("mem_mb", 2048i64.into()),
                ("tasks", 32i64.into()),
                ("nodes", 2i64.into()),
                ("disk_mb", 2048i64.into()),
                ("slurm_extra", "--mail-type=END --comment 'two words'".into()),
            ],
        );
        let cmd = build(&p).unwrap();
        assert_eq!(
            cmd.tokens,
            vec![
                "sbatch",
                "--cpus-per-task=4",
                "--ntasks=32",
                "--nodes=2",
                "--mem=2048",
                "--time=120",
                "--gres=lscratch:2",
                "--partition=multinode",
                "--mail-type=END",
                "--comment",
                "two words",
                "--output=logs/mpi-%j.out",
            ]
        );
    }

    #[test]
    fn test_explicit_partition_wins() {
        let p = props(
            "r",
            2,
            &[
                ("mem_mb", 1024i64.into()),
                ("gpu", 1i64.into()),
                ("slurm_partition", "buyin".into()),
            ],
        );
        let cmd = build(&p).unwrap();
        assert!(cmd.contains("--partition=buyin"));
        assert!(!cmd.contains("--partition=gpu"));
    }

    #[test]
    fn test_defaults_and_group_name() {
        let p = JobProperties {
            groupid: Some("grp".to_string()),
            resources: [("mem_mb".to_string(), ResourceValue::from(100i64))].into_iter().collect(),
            ..Default::default()
        };
        let cmd =
            build_submission_command(&p, "/usr/bin/sbatch", Path::new("/tmp/joblogs")).unwrap();
        assert_eq!(cmd.job_name, "grp");
        assert_eq!(cmd.program(), "/usr/bin/sbatch");
        assert!(cmd.contains("--cpus-per-task=2"));
        assert!(cmd.contains("--time=120"));
        assert!(cmd.contains("--output=/tmp/joblogs/grp-%j.out"));
        assert!(!cmd.tokens.iter().any(|t| t.starts_with("--gres")));
    }

    #[test]
    fn test_missing_memory_is_fatal() {
        let p = props("nomem", 2, &[("runtime", 10i64.into())]);
        assert_eq!(
            build(&p),
            Err(SubmitError::MissingMemory {
                rule: "nomem".to_string()
            })
        );
    }

    #[test]
    fn test_bad_runtime_is_fatal() {
        let p = props("r", 2, &[("mem_mb", 10i64.into()), ("runtime", "1h".into())]);
        let err = build(&p).unwrap_err();
        assert_eq!(err.to_string(), "r: Could not parse runtime=1h");
    }

    #[test]
    fn test_out_of_range_memory_is_fatal() {
        let p = props("big", 2, &[("mem_mb", ResourceValue::Float(1e300))]);
        assert!(matches!(
            build(&p),
            Err(SubmitError::UnparseableResource { ref key, .. }) if key == "mem_mb"
        ));
    }

    #[test]
    fn test_null_partition_and_model_are_ignored() {
        let null = ResourceValue::Other(serde_json::Value::Null);
        let p = props(
            "r",
            2,
            &[
                ("mem_mb", 1024i64.into()),
                ("gpu", 1i64.into()),
                ("gpu_model", null.clone()),
                ("slurm_partition", null),
            ],
        );
        let cmd = build(&p).unwrap();
        assert!(cmd.contains("--gres=gpu:1"));
        assert!(cmd.contains("--partition=gpu"));
        assert!(!cmd.tokens.iter().any(|t| t.contains("null")));
    }

    #[test]
    fn test_unbalanced_extra_is_rejected() {
        let p = props(
            "r",
            2,
            &[("mem_mb", 10i64.into()), ("slurm_extra", "--comment 'oops".into())],
        );
        assert!(matches!(
            build(&p),
            Err(SubmitError::UnparseableExtra { .. })
        ));
    }

    #[test]
    fn test_push_jobscript_and_display() {
        let p = props("r", 1, &[("mem_mb", 10i64.into())]);
        let mut cmd = build(&p).unwrap();
        cmd.push_arg("job.sh");
        assert_eq!(cmd.args().last().map(String::as_str), Some("job.sh"));
        assert_eq!(
            cmd.to_string(),
            concat!(
                "sbatch --cpus-per-task=1 --mem=10 --time=120 --partition=quick ",
                "--output=logs/r-%j.out job.sh"
            )
        );
    }
}
