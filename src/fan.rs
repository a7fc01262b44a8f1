//! fan tachometers.

use {
    crate::smc::{HostTransport, SensorKeyClient, Transport},
    log::debug,
    std::sync::Arc,
};

/// the speeds of one fan, in rpm. a key the host lacks reads as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Fan {
    pub actual: f32,
    pub min: f32,
    pub max: f32,
}

/// samples every fan the smc reports.
pub struct FanSampler<T = HostTransport> {
    smc: Arc<SensorKeyClient<T>>,
}

// === impl FanSampler ===

impl<T: Transport> FanSampler<T> {
    const COUNT: &str = "FNum";
    /// the count is a single byte on every host. wider readings are clamped to it.
    const MAX_FANS: usize = u8::MAX as usize;

    pub fn new(smc: Arc<SensorKeyClient<T>>) -> Self {
        Self { smc }
    }

    /// returns the speeds of each fan. hosts without fans, or without an smc, have none.
    pub fn sample(&self) -> Vec<Fan> {
        let Self { smc } = self;

        let count = match smc.read_value(Self::COUNT) {
            Ok(count) => (count as usize).min(Self::MAX_FANS),
            Err(error) => {
                debug!("{}: {error}", Self::COUNT);
                return Vec::new();
            }
        };

        (0..count)
            .map(|fan| Fan {
                actual: self.speed(fan, "Ac"),
                min: self.speed(fan, "Mn"),
                max: self.speed(fan, "Mx"),
            })
            .collect()
    }

    /// reads `F{fan}{suffix}`, e.g. `F0Ac`.
    ///
    /// NB: fans numbered 10 and up would need five character keys, which are not valid smc keys.
    /// their speeds read as zero.
    fn speed(&self, fan: usize, suffix: &str) -> f32 {
        let key = format!("F{fan}{suffix}");
        self.smc
            .read_value(&key)
            .inspect_err(|error| debug!("{key}: {error}"))
            .unwrap_or(0.0)
    }
}
