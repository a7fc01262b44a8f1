//! the background poll loop, and the dashboard state it publishes.
//!
//! the poller owns every blocking host call. it samples without holding any lock, then applies
//! the whole sample to the shared state under a single lock, then wakes the render loop. the
//! render loop copies the state out under that same lock and draws from the copy.

use {
    crate::{
        history::History,
        probe::{Probe, Sample},
    },
    crossterm::event::Event,
    log::{debug, warn},
    std::{
        io,
        sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, mpsc::Sender},
        thread::{self, JoinHandle},
        time::Duration,
    },
};


/// what the dashboard shows: the latest sample, and a bounded history of each series.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardState {
    capacity: usize,
    labels: Arc<[String]>,
    latest: Option<Sample>,
    overall: History<f64>,
    cores: Vec<History<f64>>,
    memory: History<f64>,
    cycles: u64,
}

/// a handle to dashboard state shared between the poller and the render loop.
#[derive(Clone, Debug)]
pub struct Shared(Arc<Mutex<DashboardState>>);

/// a cancellation token. cancelling it wakes anything waiting on it.
#[derive(Clone, Debug, Default)]
pub struct Cancel(Arc<(Mutex<bool>, Condvar)>);

/// a reason for the render loop to wake up.
#[derive(Clone, Debug, PartialEq)]
pub enum Wake {
    /// the poller published a new sample.
    Sampled,
    /// the terminal delivered an event.
    Input(Event),
}

/// a running poll loop. dropping it stops the loop.
pub struct Poller {
    cancel: Cancel,
    handle: Option<JoinHandle<()>>,
}

// === impl DashboardState ===

impl DashboardState {
    /// an empty dashboard, keeping up to `capacity` samples of each series.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            labels: Arc::new([]),
            latest: None,
            overall: History::new(capacity),
            cores: Vec::new(),
            memory: History::new(capacity),
            cycles: 0,
        }
    }

    /// applies one sampling cycle to every series.
    ///
    /// a sampler that failed this cycle leaves its series untouched. if the core count changed,
    /// the cpu series start over.
    pub fn publish(&mut self, sample: Sample) {
        let Self {
            capacity,
            labels,
            latest,
            overall,
            cores,
            memory,
            cycles,
        } = self;

        let usage = &sample.cpu;
        if !usage.cores.is_empty() {
            if cores.len() != usage.cores.len() {
                debug!("core count changed from {} to {}", cores.len(), usage.cores.len());
                *overall = History::new(*capacity);
                *cores = usage.cores.iter().map(|_| History::new(*capacity)).collect();
            }

            overall.push(usage.overall);
            for (history, percent) in cores.iter_mut().zip(&usage.cores) {
                history.push(*percent);
            }
            *labels = Arc::clone(&sample.labels);
        }

        if sample.memory.total > 0 {
            memory.push(sample.memory.used_percent);
        }

        *latest = Some(sample);
        *cycles += 1;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// the label of each core, in the order of [`DashboardState::cores()`].
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.latest.as_ref()
    }

    /// overall cpu usage, in percent.
    pub fn overall(&self) -> &History<f64> {
        &self.overall
    }

    /// the usage of each core, in percent.
    pub fn cores(&self) -> &[History<f64>] {
        &self.cores
    }

    /// memory in use, in percent.
    pub fn memory(&self) -> &History<f64> {
        &self.memory
    }

    /// how many samples have been published.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

// === impl Shared ===

impl Shared {
    pub fn new(capacity: usize) -> Self {
        Self(Arc::new(Mutex::new(DashboardState::new(capacity))))
    }

    /// applies a sample while holding the lock.
    pub fn publish(&self, sample: Sample) {
        self.lock().publish(sample);
    }

    /// copies the current state out.
    pub fn snapshot(&self) -> DashboardState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        // NB: `publish` leaves the state whole before anything in it can panic.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// === impl Cancel ===

impl Cancel {
    pub fn cancel(&self) {
        let (cancelled, cvar) = &*self.0;
        *cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (cancelled, _) = &*self.0;
        *cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// waits until cancelled, or until `timeout` elapses. returns whether this was cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (cancelled, cvar) = &*self.0;
        let guard = cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

// === impl Poller ===

impl Poller {
    /// spawns a thread sampling `probe` every `interval`, publishing into `shared`.
    ///
    /// each published sample sends [`Wake::Sampled`] to `wake`. the loop ends when it is
    /// stopped, or when nothing is listening for wakes anymore.
    pub fn spawn<P>(
        mut probe: P,
        shared: Shared,
        wake: Sender<Wake>,
        interval: Duration,
    ) -> io::Result<Self>
    where
        P: Probe + Send + 'static,
    {
        let cancel = Cancel::default();
        let handle = {
            let cancel = cancel.clone();
            thread::Builder::new()
                .name("vitals-poller".to_owned())
                .spawn(move || {
                    while !cancel.is_cancelled() {
                        let sample = probe.probe();
                        shared.publish(sample);

                        if wake.send(Wake::Sampled).is_err() {
                            debug!("render loop hung up, stopping poller");
                            break;
                        }
                        if cancel.wait(interval) {
                            break;
                        }
                    }
                })?
        };

        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    /// stops the loop, waiting for any sample in flight to finish.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let Self { cancel, handle } = self;

        cancel.cancel();
        if let Some(handle) = handle.take() {
            if handle.join().is_err() {
                warn!("poller thread panicked");
            }
        }
    }
}
