//! die temperatures.

use {
    crate::smc::{HostTransport, SensorKeyClient, Transport},
    log::debug,
    std::sync::Arc,
};

/// die temperatures in degrees celsius. sensors that are missing, or read outside of a sane
/// range, are absent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thermal {
    pub cpu: Option<f32>,
    pub gpu: Option<f32>,
}

/// the two host families, which name their thermal keys differently.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Family {
    AppleSilicon,
    Intel,
}

/// samples die temperatures, trying each candidate key in order of preference.
pub struct ThermalSampler<T = HostTransport> {
    smc: Arc<SensorKeyClient<T>>,
    family: Family,
}

// === impl Family ===

impl Family {
    /// identifies the family from a platform identifier, such as `hw.machine`.
    pub fn from_platform(id: &str) -> Self {
        if id.contains("arm64") || id.contains("aarch64") {
            Self::AppleSilicon
        } else {
            Self::Intel
        }
    }

    fn cpu_keys(self) -> &'static [&'static str] {
        match self {
            Self::AppleSilicon => &["Tp09", "Tp01", "Tp05", "TC0P"],
            Self::Intel => &["TC0P", "TC0D", "TC0E"],
        }
    }

    fn gpu_keys(self) -> &'static [&'static str] {
        match self {
            Self::AppleSilicon => &["Tg05", "Tg0D", "Tg0P"],
            Self::Intel => &[],
        }
    }
}

// === impl ThermalSampler ===

impl<T: Transport> ThermalSampler<T> {
    pub fn new(smc: Arc<SensorKeyClient<T>>, family: Family) -> Self {
        Self { smc, family }
    }

    pub fn sample(&self) -> Thermal {
        let Self { family, .. } = *self;

        Thermal {
            cpu: self.first_sane(family.cpu_keys()),
            gpu: self.first_sane(family.gpu_keys()),
        }
    }

    /// returns the first reading within (0, 150) °C.
    fn first_sane(&self, keys: &[&str]) -> Option<f32> {
        keys.iter().find_map(|key| match self.smc.read_value(key) {
            Ok(celsius) if celsius > 0.0 && celsius < 150.0 => Some(celsius),
            Ok(celsius) => {
                debug!("{key}: discarding {celsius} °C");
                None
            }
            Err(error) => {
                debug!("{key}: {error}");
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::smc::mock::MockSmc};

    fn sampler(smc: MockSmc, family: Family) -> ThermalSampler<MockSmc> {
        ThermalSampler::new(Arc::new(SensorKeyClient::with_transport(smc)), family)
    }

    #[test]
    fn families() {
        assert_eq!(Family::from_platform("arm64"), Family::AppleSilicon);
        assert_eq!(Family::from_platform("aarch64"), Family::AppleSilicon);
        assert_eq!(Family::from_platform("x86_64"), Family::Intel);
    }

    #[test]
    fn first_candidate_wins() {
        let smc = MockSmc::new()
            .with("Tp09", "flt ", &48.5f32.to_ne_bytes())
            .with("Tp01", "flt ", &60f32.to_ne_bytes())
            .with("Tg05", "flt ", &41f32.to_ne_bytes());

        let thermal = sampler(smc, Family::AppleSilicon).sample();
        assert_eq!(thermal.cpu, Some(48.5));
        assert_eq!(thermal.gpu, Some(41.0));
    }

    /// out of range readings are skipped in favor of the next candidate.
    #[test]
    fn skips_insane_readings() {
        let smc = MockSmc::new()
            .with("Tp09", "flt ", &0f32.to_ne_bytes())
            .with("Tp01", "flt ", &200f32.to_ne_bytes())
            .with("Tp05", "ch8*", b"abcd")
            .with("TC0P", "sp78", &[0x2d, 0x00]);

        let thermal = sampler(smc, Family::AppleSilicon).sample();
        assert_eq!(thermal.cpu, Some(45.0));
        assert_eq!(thermal.gpu, None);
    }

    #[test]
    fn intel_has_no_gpu_keys() {
        let smc = MockSmc::new()
            .with("TC0D", "sp78", &[0x3c, 0x00])
            .with("Tg05", "flt ", &41f32.to_ne_bytes());

        let thermal = sampler(smc, Family::Intel).sample();
        assert_eq!(thermal.cpu, Some(60.0));
        assert_eq!(thermal.gpu, None);
    }

    #[test]
    fn closed_smc() {
        let sampler = ThermalSampler::new(
            Arc::new(SensorKeyClient::<MockSmc>::closed()),
            Family::AppleSilicon,
        );
        assert_eq!(sampler.sample(), Thermal::default());
    }
}
