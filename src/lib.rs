//! a compact hardware telemetry monitor.
//!
//! samples per-core cpu usage, memory and memory pressure, fan speeds, die temperatures and
//! power rails. see [`App::report()`] for a one-shot report, and [`App::tui()`] for a live
//! dashboard.

use {
    self::{
        probe::{Probe, Probes},
        report::Report,
    },
    std::{io::Write, time::Duration},
};

pub mod fan;
pub mod history;
pub mod memory;
pub mod meter;
pub mod poll;
pub mod power;
pub mod probe;
pub mod report;
pub mod roles;
pub mod smc;
pub mod source;
pub mod sys;
pub mod thermal;
pub mod ticks;

/// kernel statistics facilities.
///
/// this file provides tools to interact with `/proc/stat`.
pub mod stat;

mod window;

pub use self::window::draw;

pub type Error = Box<dyn std::error::Error>;

pub struct App {
    probes: Probes,
    config: Config,
}

/// how the dashboard samples.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// time between samples.
    pub interval: Duration,
    /// samples kept for each series.
    pub history: usize,
}

// === impl App ===

impl App {
    /// how long the one-shot report waits for cpu ticks to accrue.
    const PRIME: Duration = Duration::from_millis(500);

    /// initializes a new application, probing this host.
    pub fn new(config: Config) -> Self {
        Self {
            probes: Probes::host(),
            config,
        }
    }

    /// samples the host once, and writes a plain text report to `out`.
    pub fn report(self, out: &mut impl Write) -> Result<(), Error> {
        let Self { mut probes, .. } = self;

        probes.prime();
        std::thread::sleep(Self::PRIME);
        let sample = probes.probe();

        write!(out, "{}", Report(&sample))?;
        out.flush()?;
        Ok(())
    }
}

// === impl Config ===

impl Config {
    pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

    /// a config sampling every `interval`, keeping `history` samples.
    ///
    /// intervals shorter than [`Config::MIN_INTERVAL`] are raised to it. at least one sample is
    /// kept.
    pub fn new(interval: Duration, history: usize) -> Self {
        Self {
            interval: interval.max(Self::MIN_INTERVAL),
            history: history.max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 60)
    }
}
