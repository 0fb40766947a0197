//! Link measurements: probing the active link and falling back to synthetic values.

pub mod fallback;
pub mod ping;

use crate::link::LinkParams;

pub use fallback::SyntheticFallback;
pub use ping::{parse_ping_output, PingProbe};

/// Round-trip time and loss observed on a link.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Probe {
    /// Average round-trip time in milliseconds.
    pub rtt_ms: f64,
    /// Packet loss in percent.
    pub loss_pct: f64,
}

/// Outcome of a measurement attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Measurement {
    /// The probe produced a usable result.
    Measured(Probe),
    /// The probe failed; the reason is kept for logging.
    Unavailable(String),
}

/// Probe recorded in the metrics series, always usable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProbeSample {
    /// Average round-trip time in milliseconds.
    pub rtt_ms: f64,
    /// Packet loss in percent.
    pub loss_pct: f64,
    /// True if the values were generated by the fallback instead of measured.
    pub synthetic: bool,
}

/// Measures the quality of a candidate link.
pub trait MeasurementSource {
    /// Probes the link of the specified candidate, whose currently applied parameters are `params`.
    fn measure(&mut self, candidate: &str, params: &LinkParams) -> Measurement;
}

/// Derives the probe directly from the emulated link parameters: RTT is twice the one-way delay.
#[derive(Default)]
pub struct EmulatedProbe;

impl MeasurementSource for EmulatedProbe {
    fn measure(&mut self, _candidate: &str, params: &LinkParams) -> Measurement {
        Measurement::Measured(Probe {
            rtt_ms: 2. * params.delay_ms,
            loss_pct: params.loss_pct,
        })
    }
}

/// Source that never produces a result.
pub struct Unreachable;

impl MeasurementSource for Unreachable {
    fn measure(&mut self, candidate: &str, _params: &LinkParams) -> Measurement {
        Measurement::Unavailable(format!("{} is unreachable", candidate))
    }
}
