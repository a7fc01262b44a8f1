//! performance/efficiency labels for logical cores.

use std::{borrow::Cow, cell::OnceCell};

/// the host's default core topology.
#[cfg(target_os = "macos")]
pub type HostTopology = crate::sys::macos::PerfLevels;

/// the host's default core topology.
#[cfg(not(target_os = "macos"))]
pub type HostTopology = Flat;

/// reports how many logical cores belong to each performance tier.
pub trait Topology {
    /// returns `(performance, efficiency)` logical core counts, if the host knows them.
    fn tiers(&self) -> Option<(usize, usize)>;
}

/// a topology without performance tiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Flat;

/// labels cores once, then remembers the labels for the life of the process.
#[derive(Default)]
pub struct CoreRoles<T = HostTopology> {
    topology: T,
    labels: OnceCell<Vec<String>>,
}

// === impl Flat ===

impl Topology for Flat {
    fn tiers(&self) -> Option<(usize, usize)> {
        None
    }
}

// === impl CoreRoles ===

impl<T: Topology> CoreRoles<T> {
    pub fn new(topology: T) -> Self {
        Self {
            topology,
            labels: OnceCell::new(),
        }
    }

    /// returns the label of each of `cores` cores.
    ///
    /// nothing is remembered until a non-zero core count is seen. if the core count later
    /// differs from the remembered labels, the tiers no longer describe the cores, and positional
    /// labels are returned instead.
    pub fn labels(&self, cores: usize) -> Cow<'_, [String]> {
        if cores == 0 {
            return Cow::Borrowed(&[]);
        }

        let labels = self
            .labels
            .get_or_init(|| classify(cores, self.topology.tiers()));
        match labels.len() == cores {
            true => Cow::Borrowed(labels),
            false => Cow::Owned(classify(cores, None)),
        }
    }
}

/// labels `cores` logical cores.
///
/// when the tier counts add up to `cores`, efficiency cores are assumed to be enumerated first:
/// `E1..En` followed by `P1..Pm`. otherwise every core gets a positional `Core N` label.
pub fn classify(cores: usize, tiers: Option<(usize, usize)>) -> Vec<String> {
    match tiers {
        Some((performance, efficiency)) if performance + efficiency == cores => {
            let efficiency = (1..=efficiency).map(|n| format!("E{n}"));
            let performance = (1..=performance).map(|n| format!("P{n}"));
            efficiency.chain(performance).collect()
        }
        _ => (0..cores).map(|n| format!("Core {n}")).collect(),
    }
}
