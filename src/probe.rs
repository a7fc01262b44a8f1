//! one sampling cycle across every sampler.

use {
    crate::{
        fan::{Fan, FanSampler},
        memory::{HostMemory, MemorySampler, MemorySnapshot, MemorySource},
        power::{Power, PowerProvider, Powermetrics},
        roles::{CoreRoles, HostTopology, Topology},
        smc::{HostTransport, SensorKeyClient, Transport},
        sys,
        thermal::{Family, Thermal, ThermalSampler},
        ticks::{CpuUsage, HostTicks, TickSampler, TickSource},
    },
    std::sync::Arc,
};

/// everything observed in one sampling cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub cpu: CpuUsage,
    /// the label of each core in `cpu.cores`.
    pub labels: Arc<[String]>,
    pub memory: MemorySnapshot,
    pub fans: Vec<Fan>,
    pub thermal: Thermal,
    pub power: Power,
}

/// takes samples. these calls block on the host, and must stay off the render thread.
pub trait Probe {
    fn probe(&mut self) -> Sample;
}

impl<F: FnMut() -> Sample> Probe for F {
    fn probe(&mut self) -> Sample {
        self()
    }
}

/// every sampler, sharing one smc session between the fan and thermal samplers.
pub struct Probes<
    S = HostTicks,
    R = HostTopology,
    M = HostMemory,
    T = HostTransport,
    P = Powermetrics,
> {
    cpu: TickSampler<S>,
    roles: CoreRoles<R>,
    labels: Arc<[String]>,
    memory: MemorySampler<M>,
    fans: FanSampler<T>,
    thermal: ThermalSampler<T>,
    power: P,
}

// === impl Probes ===

impl Probes {
    /// probes the host this process runs on.
    pub fn host() -> Self {
        let smc = Arc::new(SensorKeyClient::open());
        let family = Family::from_platform(&sys::platform_id());

        Self::new(
            TickSampler::default(),
            CoreRoles::default(),
            MemorySampler::default(),
            smc,
            family,
            Powermetrics,
        )
    }
}

impl<S, R, M, T, P> Probes<S, R, M, T, P>
where
    S: TickSource,
    R: Topology,
    M: MemorySource,
    T: Transport,
    P: PowerProvider,
{
    pub fn new(
        cpu: TickSampler<S>,
        roles: CoreRoles<R>,
        memory: MemorySampler<M>,
        smc: Arc<SensorKeyClient<T>>,
        family: Family,
        power: P,
    ) -> Self {
        Self {
            cpu,
            roles,
            labels: Arc::new([]),
            memory,
            fans: FanSampler::new(Arc::clone(&smc)),
            thermal: ThermalSampler::new(smc, family),
            power,
        }
    }

    /// samples cpu usage alone, establishing the tick baseline.
    pub fn prime(&mut self) {
        self.cpu.sample();
    }

    /// labels for `cores` cores, reusing the shared labels while the count is unchanged.
    fn labels(&mut self, cores: usize) -> Arc<[String]> {
        let Self { roles, labels, .. } = self;

        if labels.len() != cores {
            *labels = roles.labels(cores).into();
        }
        Arc::clone(labels)
    }
}

impl<S, R, M, T, P> Probe for Probes<S, R, M, T, P>
where
    S: TickSource,
    R: Topology,
    M: MemorySource,
    T: Transport,
    P: PowerProvider,
{
    fn probe(&mut self) -> Sample {
        let cpu = self.cpu.sample();
        let labels = self.labels(cpu.cores.len());

        Sample {
            cpu,
            labels,
            memory: self.memory.sample(),
            fans: self.fans.sample(),
            thermal: self.thermal.sample(),
            power: self.power.sample(),
        }
    }
}
