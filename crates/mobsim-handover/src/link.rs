//! Emulated link parameters.

/// Traffic-shaping parameters of one emulated wireless link.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinkParams {
    /// Link rate in Mbit/s.
    pub bandwidth_mbps: f64,
    /// One-way delay in milliseconds.
    pub delay_ms: f64,
    /// Packet loss in percent (0-100).
    pub loss_pct: f64,
}

impl LinkParams {
    /// Creates link parameters.
    pub fn new(bandwidth_mbps: f64, delay_ms: f64, loss_pct: f64) -> Self {
        Self {
            bandwidth_mbps,
            delay_ms,
            loss_pct,
        }
    }
}
