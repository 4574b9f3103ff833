//! Partition selection from a job's resource request.

use crate::gres::GresList;

/// Jobs at or below this runtime (minutes) are eligible for `quick`.
pub const QUICK_MAX_MINUTES: u64 = 120;
/// Memory ceiling (MB) of the nodes behind `quick`.
pub const QUICK_MAX_MEM_MB: u64 = 370 * 1024;
/// Jobs at or below this runtime (minutes) are eligible for `norm`.
pub const NORM_MAX_MINUTES: u64 = 240 * 60;
/// Memory ceiling (MB) of the nodes behind `norm`.
pub const NORM_MAX_MEM_MB: u64 = 499 * 1024;
/// More tasks than this need the `multinode` partition.
pub const MULTINODE_MIN_TASKS: u64 = 16;

/// Partitions the selector can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Gpu,
    Multinode,
    Quick,
    Norm,
    Unlimited,
    Largemem,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Gpu => "gpu",
            Partition::Multinode => "multinode",
            Partition::Quick => "quick",
            Partition::Norm => "norm",
            Partition::Unlimited => "unlimited",
            Partition::Largemem => "largemem",
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pick a partition for a job from its resource request.
///
/// This is a heuristic that fits most jobs, not a model of the cluster: it
/// ignores buy-in and other restricted partitions, and jobs with unusual
/// shapes may still need `slurm_partition` set explicitly. The first matching
/// rule wins, so the order of the checks below matters.
///
/// # Arguments
/// * `_threads` - CPUs per task (not used by the current rules)
/// * `mem_mb` - Memory in megabytes
/// * `time_min` - Runtime limit in minutes
/// * `gres` - Generic resources requested so far
/// * `ntasks` - Number of tasks, if requested
/// * `nodes` - Number of nodes, if requested
pub fn select_partition(
    _threads: u32,
    mem_mb: u64,
    time_min: u64,
    gres: &GresList,
    ntasks: Option<u64>,
    nodes: Option<u64>,
) -> Partition {
    if gres.requests_gpu() {
        return Partition::Gpu;
    }
    if ntasks.is_some_and(|n| n > MULTINODE_MIN_TASKS) {
        return Partition::Multinode;
    }
    if nodes.is_some_and(|n| n > 1) {
        return Partition::Multinode;
    }
    if time_min <= QUICK_MAX_MINUTES && mem_mb <= QUICK_MAX_MEM_MB {
        return Partition::Quick;
    }
    if time_min <= NORM_MAX_MINUTES && mem_mb <= NORM_MAX_MEM_MB {
        return Partition::Norm;
    }
    if time_min > NORM_MAX_MINUTES {
        return Partition::Unlimited;
    }
    Partition::Largemem
}
