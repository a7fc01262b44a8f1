//! delta-based cpu usage.

use {
    crate::source::{HostQueryError, ProcStatFile},
    log::debug,
};

#[cfg(test)]
mod tests;

/// the host's default tick source.
#[cfg(target_os = "macos")]
pub type HostTicks = crate::sys::macos::ProcessorLoad;

/// the host's default tick source.
#[cfg(not(target_os = "macos"))]
pub type HostTicks = ProcStatFile;

/// a source of absolute per-core tick counters.
pub trait TickSource {
    /// returns the counters of every logical core, ordered by core index.
    fn ticks(&self) -> Result<Vec<CoreTicks>, HostQueryError>;
}

/// the scheduler ticks a logical core has spent in each state since boot.
///
/// every counter is monotonically non-decreasing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CoreTicks {
    pub user: u64,
    pub system: u64,
    pub idle: u64,
    pub nice: u64,
}

/// the difference between two [`CoreTicks`] of the same core.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Delta {
    user: u64,
    system: u64,
    idle: u64,
    nice: u64,
}

/// cpu usage over one sampling interval, as percentages in `[0, 100]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CpuUsage {
    /// usage across all cores, weighted by each core's elapsed ticks.
    pub overall: f64,
    /// usage of each core, ordered by core index.
    pub cores: Vec<f64>,
}

/// computes cpu usage from consecutive tick snapshots.
pub struct TickSampler<S = HostTicks> {
    source: S,
    /// the last observed snapshot.
    last: Option<Vec<CoreTicks>>,
}

// === impl ProcStatFile ===

impl TickSource for ProcStatFile {
    fn ticks(&self) -> Result<Vec<CoreTicks>, HostQueryError> {
        crate::stat::read_cores(self).map_err(Into::into)
    }
}

// === impl TickSampler ===

impl<S: TickSource + Default> Default for TickSampler<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: TickSource> TickSampler<S> {
    pub fn new(source: S) -> Self {
        Self { source, last: None }
    }

    /// returns the cpu usage since this was last called.
    ///
    /// NB: by virtue of this being a comparison to the previous reading, the first call (and the
    /// first call after the core count changes) reports zero usage for every core.
    pub fn sample(&mut self) -> CpuUsage {
        let Self { source, last } = self;

        let new = match source.ticks() {
            Ok(ticks) => ticks,
            Err(error) => {
                debug!("cpu tick query failed: {error}");
                return CpuUsage::default();
            }
        };

        let usage = match last.as_deref() {
            Some(prev) if prev.len() == new.len() => CpuUsage::between(prev, &new),
            _ => CpuUsage::idle(new.len()),
        };

        *last = Some(new);
        usage
    }
}

// === impl CpuUsage ===

impl CpuUsage {
    /// all-zero usage for `cores` cores.
    fn idle(cores: usize) -> Self {
        Self {
            overall: 0.0,
            cores: vec![0.0; cores],
        }
    }

    /// compares two snapshots of equal core count.
    fn between(prev: &[CoreTicks], new: &[CoreTicks]) -> Self {
        let deltas = prev
            .iter()
            .zip(new)
            .map(|(a, b)| Delta::new(a, b))
            .collect::<Vec<_>>();

        let cores = deltas.iter().map(Delta::percentage).collect();
        let (active, total) = deltas
            .iter()
            .fold((0, 0), |(active, total), d| (active + d.active(), total + d.total()));

        Self {
            overall: percentage(active, total),
            cores,
        }
    }
}

// === impl Delta ===

impl Delta {
    fn new(a: &CoreTicks, b: &CoreTicks) -> Self {
        // saturate, rather than wrap, if a 32-bit kernel counter rolled over.
        Self {
            user: b.user.saturating_sub(a.user),
            system: b.system.saturating_sub(a.system),
            idle: b.idle.saturating_sub(a.idle),
            nice: b.nice.saturating_sub(a.nice),
        }
    }

    fn active(&self) -> u64 {
        let Self {
            user,
            system,
            nice,
            idle: _, // do not count idle time...
        } = *self;

        user + system + nice
    }

    fn total(&self) -> u64 {
        let Self {
            user,
            system,
            idle,
            nice,
        } = *self;

        user + system + idle + nice
    }

    fn percentage(&self) -> f64 {
        percentage(self.active(), self.total())
    }
}

/// `100 * active / total`, or zero if no time elapsed.
fn percentage(active: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    100.0 * active as f64 / total as f64
}
