//! Background metrics sampling.
//!
//! The step loop publishes value snapshots into a bounded channel; a sampler thread keeps the latest one
//! and records it at its own fixed interval, independently of the step pacing. A stop request wakes the
//! thread immediately, whatever the interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use log::{debug, warn};

/// State of the simulation after one step, detached from the simulation itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Step index.
    pub step: u64,
    /// Simulated time of the step.
    pub elapsed: f64,
    /// Station position.
    pub position: f64,
    /// Name of the active candidate.
    pub active: String,
    /// Candidate names and scores in declaration order.
    pub scores: Vec<(String, f64)>,
    /// Candidates whose link still carries older parameters than their model output.
    pub stale: Vec<String>,
}

/// Snapshot recorded by the sampler.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Wall-clock time since the sampler started.
    pub wall_elapsed: Duration,
    /// Latest snapshot known at the sampling tick.
    pub snapshot: Snapshot,
}

/// Sending side of the snapshot channel, owned by the step loop.
pub struct SnapshotPublisher {
    tx: Sender<Snapshot>,
    dropped: u64,
}

impl SnapshotPublisher {
    /// Publishes the snapshot without blocking.
    ///
    /// Returns false if the channel is full or the sampler is gone; the snapshot is dropped in that case.
    pub fn publish(&mut self, snapshot: Snapshot) -> bool {
        match self.tx.try_send(snapshot) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Returns the number of snapshots dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Handle of the sampler thread.
pub struct MetricsSampler {
    stop: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: Option<JoinHandle<Vec<Sample>>>,
}

impl MetricsSampler {
    /// Starts the sampler thread.
    ///
    /// * `interval` - Wall-clock time between two samples.
    /// * `capacity` - Capacity of the snapshot channel.
    pub fn spawn(interval: Duration, capacity: usize) -> (SnapshotPublisher, MetricsSampler) {
        let (tx, rx) = bounded(capacity.max(1));
        let (done_tx, done_rx) = bounded(1);
        let (wake_tx, wake_rx) = bounded(1);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let handle = thread::spawn(move || {
            let samples = sample_loop(rx, wake_rx, interval, &thread_stop);
            let _ = done_tx.send(());
            samples
        });
        (
            SnapshotPublisher { tx, dropped: 0 },
            MetricsSampler {
                stop,
                wake_tx,
                done_rx,
                handle: Some(handle),
            },
        )
    }

    /// Stops the sampler and returns the recorded samples.
    ///
    /// Waits at most `timeout` for the thread to finish. Returns `None` if it did not finish in time
    /// (the thread is left to exit on its own) or if it panicked.
    pub fn stop(mut self, timeout: Duration) -> Option<Vec<Sample>> {
        self.request_stop();
        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => self.handle.take()?.join().ok(),
            Err(RecvTimeoutError::Timeout) => {
                warn!("metrics sampler did not stop within {:?}, samples discarded", timeout);
                None
            }
        }
    }

    fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        // a full channel already holds a pending wake-up
        let _ = self.wake_tx.try_send(());
    }
}

impl Drop for MetricsSampler {
    fn drop(&mut self) {
        self.request_stop();
    }
}

fn sample_loop(
    rx: Receiver<Snapshot>,
    wake_rx: Receiver<()>,
    interval: Duration,
    stop: &AtomicBool,
) -> Vec<Sample> {
    let start = Instant::now();
    let ticker = tick(interval);
    let mut latest: Option<Snapshot> = None;
    let mut samples = Vec::new();
    loop {
        // snapshots published before the stop request are still drained and recorded
        let stopping = stop.load(Ordering::SeqCst);
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
        if let Some(snapshot) = &latest {
            samples.push(Sample {
                wall_elapsed: start.elapsed(),
                snapshot: snapshot.clone(),
            });
        }
        if disconnected {
            debug!("snapshot publisher closed, sampler exits");
            break;
        }
        if stopping {
            break;
        }
        select! {
            recv(ticker) -> _ => {}
            recv(wake_rx) -> _ => {}
        }
    }
    samples
}
