//! Generic resource (`--gres`) accumulation.

/// A single generic resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GresEntry {
    /// Local scratch space in gigabytes.
    Scratch { gb: u64 },
    /// GPUs, optionally pinned to one model.
    Gpu { model: Option<String>, count: u64 },
}

impl GresEntry {
    /// Scratch entry for a disk request in megabytes, rounded up to whole gigabytes.
    pub fn scratch_from_mb(disk_mb: u64) -> Self {
        GresEntry::Scratch {
            gb: disk_mb.div_ceil(1024),
        }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, GresEntry::Gpu { .. })
    }
}

impl std::fmt::Display for GresEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GresEntry::Scratch { gb } => write!(f, "lscratch:{}", gb),
            GresEntry::Gpu { model: Some(model), count } => write!(f, "gpu:{}:{}", model, count),
            GresEntry::Gpu { model: None, count } => write!(f, "gpu:{}", count),
        }
    }
}

/// Ordered list of generic resources, serialized once into a single flag.
///
/// Entries keep their insertion order so the emitted command is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GresList {
    entries: Vec<GresEntry>,
}

impl GresList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: GresEntry) {
        self.entries.push(entry);
    }

    /// Whether any entry asks for a GPU.
    pub fn requests_gpu(&self) -> bool {
        self.entries.iter().any(GresEntry::is_gpu)
    }

    /// Render the `--gres=...` flag, or `None` when nothing was requested.
    pub fn to_flag(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let joined = self
            .entries
            .iter()
            .map(|entry| entry.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Some(format!("--gres={}", joined))
    }
}
