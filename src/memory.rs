//! physical memory usage and pressure.

use {
    crate::source::{HostQueryError, ProcMeminfoFile},
    log::debug,
    std::fmt::{self, Display},
};

pub use self::meminfo::MeminfoParseError;

mod meminfo;


/// the host's default memory statistics source.
#[cfg(target_os = "macos")]
pub type HostMemory = crate::sys::macos::VmStatistics;

/// the host's default memory statistics source.
#[cfg(not(target_os = "macos"))]
pub type HostMemory = ProcMeminfoFile;

/// a source of memory counters.
pub trait MemorySource {
    fn counters(&self) -> Result<MemoryCounters, HostQueryError>;
}

/// raw memory counters, in bytes, as reported by the host.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryCounters {
    pub total: u64,
    pub free: u64,
    /// reclaimable pages.
    pub inactive: u64,
    pub usage: Usage,
    pub swap_used: u64,
    pub swap_total: u64,
    /// the kernel's own pressure score in `[0, 100]`, where higher means more memory available.
    pub kernel_score: Option<u32>,
}

/// how the host accounts for memory in use.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Usage {
    /// per-category counters. memory in use is their sum.
    Categories { active: u64, wired: u64, compressed: u64 },
    /// only a total is known.
    Used(u64),
}

/// a coarse classification of memory scarcity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Pressure {
    #[default]
    Normal,
    Warning,
    Critical,
}

/// memory usage at a moment in time, in bytes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemorySnapshot {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub active: u64,
    pub wired: u64,
    pub compressed: u64,
    pub inactive: u64,
    pub swap_used: u64,
    pub swap_total: u64,
    /// `100 * used / total`, or zero if the total is unknown.
    pub used_percent: f64,
    pub kernel_score: Option<u32>,
    pub pressure: Pressure,
}

/// samples memory usage.
#[derive(Default)]
pub struct MemorySampler<S = HostMemory> {
    source: S,
}

// === impl ProcMeminfoFile ===

impl MemorySource for ProcMeminfoFile {
    fn counters(&self) -> Result<MemoryCounters, HostQueryError> {
        meminfo::read(self).map_err(Into::into)
    }
}

// === impl MemorySampler ===

impl<S: MemorySource> MemorySampler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// returns the current memory usage, or an all-default snapshot if the host query failed.
    pub fn sample(&self) -> MemorySnapshot {
        match self.source.counters() {
            Ok(counters) => MemorySnapshot::from(counters),
            Err(error) => {
                debug!("memory query failed: {error}");
                MemorySnapshot::default()
            }
        }
    }
}

// === impl Usage ===

impl Default for Usage {
    fn default() -> Self {
        Self::Used(0)
    }
}

// === impl Pressure ===

impl Pressure {
    /// classifies a kernel pressure score.
    pub fn from_score(score: u32) -> Self {
        match score {
            75.. => Self::Normal,
            25..75 => Self::Warning,
            _ => Self::Critical,
        }
    }

    /// classifies the share of memory that is free or reclaimable.
    pub fn from_available_ratio(ratio: f64) -> Self {
        if ratio >= 0.25 {
            Self::Normal
        } else if ratio >= 0.10 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    /// prefers the kernel's score, falling back to the available ratio.
    ///
    /// with neither a score nor a total, there is nothing to judge by and this is `Normal`.
    pub fn classify(kernel_score: Option<u32>, free: u64, inactive: u64, total: u64) -> Self {
        match kernel_score {
            Some(score) => Self::from_score(score),
            None if total > 0 => {
                Self::from_available_ratio((inactive + free) as f64 / total as f64)
            }
            None => Self::Normal,
        }
    }
}

impl Display for Pressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        })
    }
}

// === impl MemorySnapshot ===

impl From<MemoryCounters> for MemorySnapshot {
    fn from(
        MemoryCounters {
            total,
            free,
            inactive,
            usage,
            swap_used,
            swap_total,
            kernel_score,
        }: MemoryCounters,
    ) -> Self {
        let (used, active, wired, compressed) = match usage {
            Usage::Categories {
                active,
                wired,
                compressed,
            } => (active + wired + compressed, active, wired, compressed),
            Usage::Used(used) => (used, 0, 0, 0),
        };

        let used_percent = if total > 0 {
            100.0 * used as f64 / total as f64
        } else {
            0.0
        };

        Self {
            total,
            used,
            free,
            active,
            wired,
            compressed,
            inactive,
            swap_used,
            swap_total,
            used_percent,
            kernel_score,
            pressure: Pressure::classify(kernel_score, free, inactive, total),
        }
    }
}
