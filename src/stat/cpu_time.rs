use super::*;

/// the counters of a single "cpu" line, in `USER_HZ` ticks.
///
/// kernels older than 2.6.33 print fewer columns; missing trailing counters read as zero.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuTime {
    /// time spent in user mode. this already includes `guest`.
    pub user: u64,
    /// time spent in user mode with low priority (nice). this already includes `guest_nice`.
    pub nice: u64,
    /// time spent in system mode.
    pub system: u64,
    /// time spent in the idle task.
    pub idle: u64,
    /// time waiting for i/o to complete.
    ///
    /// this value is not reliable: the cpu does not wait for i/o, and the value may decrease in
    /// certain conditions. it is folded into idle time.
    pub iowait: u64,
    /// time servicing interrupts.
    pub irq: u64,
    /// time servicing softirqs.
    pub softirq: u64,
    /// stolen time, which is the time spent in other operating systems when running in a
    /// virtualized environment.
    pub steal: u64,
    /// time spent running a virtual cpu for guest operating systems.
    pub guest: u64,
    /// time spent running a niced guest.
    pub guest_nice: u64,
}

// === impl CpuTime ===

impl CpuTime {
    /// the fewest counters a cpu line may carry: user, nice, system, idle.
    const MIN_FIELDS: usize = 4;
    const MAX_FIELDS: usize = 10;
}

impl TryFrom<Vec<u64>> for CpuTime {
    type Error = EntryParseError;
    fn try_from(mut times: Vec<u64>) -> Result<Self, Self::Error> {
        let fields = times.len();
        if !(Self::MIN_FIELDS..=Self::MAX_FIELDS).contains(&fields) {
            return Err(EntryParseError::CpuTime { fields });
        }

        times.resize(Self::MAX_FIELDS, 0);
        let [
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        ] = <[u64; 10]>::try_from(times).map_err(|_| EntryParseError::CpuTime { fields })?;

        Ok(Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        })
    }
}

/// folds the linux accounting categories into the four scheduler counters.
impl From<CpuTime> for CoreTicks {
    fn from(
        CpuTime {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest: _,      // already counted in `user`.
            guest_nice: _, // already counted in `nice`.
        }: CpuTime,
    ) -> Self {
        Self {
            user,
            system: system + irq + softirq + steal,
            idle: idle + iowait,
            nice,
        }
    }
}
