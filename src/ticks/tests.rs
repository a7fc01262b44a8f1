use {
    super::*,
    crate::source::MockStatFile,
    std::{cell::RefCell, collections::VecDeque, io},
};

/// a tick source handing out canned snapshots, or failures.
#[derive(Default)]
struct MockTicks {
    snapshots: RefCell<VecDeque<Option<Vec<CoreTicks>>>>,
}

impl MockTicks {
    fn new(snapshots: impl IntoIterator<Item = Option<Vec<CoreTicks>>>) -> Self {
        Self {
            snapshots: RefCell::new(snapshots.into_iter().collect()),
        }
    }
}

impl TickSource for MockTicks {
    fn ticks(&self) -> Result<Vec<CoreTicks>, HostQueryError> {
        self.snapshots
            .borrow_mut()
            .pop_front()
            .flatten()
            .ok_or_else(|| io::Error::other("tick query failed").into())
    }
}

impl TickSource for MockStatFile {
    fn ticks(&self) -> Result<Vec<CoreTicks>, HostQueryError> {
        crate::stat::read_cores(self).map_err(Into::into)
    }
}

fn ticks(user: u64, system: u64, idle: u64, nice: u64) -> CoreTicks {
    CoreTicks {
        user,
        system,
        idle,
        nice,
    }
}

#[test]
fn first_sample_is_zero() {
    let source = MockTicks::new([Some(vec![ticks(50, 50, 0, 0); 4])]);
    let mut sampler = TickSampler::new(source);

    let usage = sampler.sample();
    assert_eq!(usage.overall, 0.0);
    assert_eq!(usage.cores, vec![0.0; 4]);
}

#[test]
fn per_core_usage() {
    let source = MockTicks::new([
        Some(vec![ticks(0, 0, 0, 0), ticks(100, 100, 100, 100)]),
        Some(vec![ticks(25, 25, 50, 0), ticks(100, 100, 200, 100)]),
    ]);
    let mut sampler = TickSampler::new(source);

    sampler.sample();
    let usage = sampler.sample();
    assert_eq!(usage.cores, vec![50.0, 0.0]);
}

/// overall usage weights each core by its elapsed ticks, it is not a mean of percentages.
#[test]
fn overall_is_weighted() {
    let source = MockTicks::new([
        Some(vec![ticks(0, 0, 0, 0), ticks(0, 0, 0, 0)]),
        // core 0: 90 active of 100 ticks. core 1: 0 active of 300 ticks.
        Some(vec![ticks(60, 20, 10, 10), ticks(0, 0, 300, 0)]),
    ]);
    let mut sampler = TickSampler::new(source);

    sampler.sample();
    let usage = sampler.sample();
    assert_eq!(usage.cores, vec![90.0, 0.0]);
    assert_eq!(usage.overall, 100.0 * 90.0 / 400.0);
    assert_ne!(usage.overall, 45.0);
}

#[test]
fn usage_is_bounded() {
    let source = MockTicks::new([
        Some(vec![ticks(7, 11, 13, 17); 3]),
        Some(vec![
            ticks(1007, 11, 13, 17),
            ticks(7, 11, 913, 17),
            ticks(8, 12, 14, 18),
        ]),
    ]);
    let mut sampler = TickSampler::new(source);

    sampler.sample();
    let usage = sampler.sample();
    assert_eq!(usage.cores, vec![100.0, 0.0, 75.0]);
    for pct in usage.cores.iter().chain([&usage.overall]) {
        assert!((0.0..=100.0).contains(pct), "{pct}");
    }
}

#[test]
fn idle_interval_is_zero() {
    let source = MockTicks::new([Some(vec![ticks(1, 2, 3, 4)]), Some(vec![ticks(1, 2, 3, 4)])]);
    let mut sampler = TickSampler::new(source);

    sampler.sample();
    let usage = sampler.sample();
    assert_eq!(usage, CpuUsage::idle(1));
}

#[test]
fn core_count_change_resets_baseline() {
    let source = MockTicks::new([
        Some(vec![ticks(0, 0, 0, 0); 2]),
        Some(vec![ticks(50, 0, 50, 0); 3]),
        Some(vec![ticks(100, 0, 100, 0); 3]),
    ]);
    let mut sampler = TickSampler::new(source);

    sampler.sample();
    assert_eq!(sampler.sample(), CpuUsage::idle(3));
    assert_eq!(sampler.sample().cores, vec![50.0; 3]);
}

#[test]
fn failure_keeps_baseline() {
    let source = MockTicks::new([
        Some(vec![ticks(0, 0, 0, 0)]),
        None,
        Some(vec![ticks(30, 0, 70, 0)]),
    ]);
    let mut sampler = TickSampler::new(source);

    sampler.sample();
    assert_eq!(sampler.sample(), CpuUsage::default());
    assert_eq!(sampler.sample().cores, vec![30.0]);
}

#[test]
fn reads_proc_stat() {
    let source = MockStatFile::new([
        "cpu  0 0 0 0\ncpu0 0 0 0 0\ncpu1 0 0 0 0\n",
        "cpu  0 0 0 0\ncpu0 10 0 10 80 0 0 0 0 0 0\ncpu1 0 0 0 50 50 0 0 0 0 0\n",
    ]);
    let mut sampler = TickSampler::new(source);

    sampler.sample();
    let usage = sampler.sample();
    // iowait counts as idle time.
    assert_eq!(usage.cores, vec![20.0, 0.0]);
    assert_eq!(usage.overall, 10.0);
}
