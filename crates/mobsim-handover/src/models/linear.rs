//! Linear interpolation link model.

use serde::{Deserialize, Serialize};

use crate::link::LinkParams;
use crate::model::QualityModel;

/// Value moving linearly from `from` (at position 0) to `to` (at position 1).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    /// Value at position 0.
    pub from: f64,
    /// Value at position 1.
    pub to: f64,
}

impl Ramp {
    /// Creates a ramp.
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// Creates a ramp with the same value at both ends.
    pub fn constant(value: f64) -> Self {
        Self { from: value, to: value }
    }

    /// Returns the raw (unclamped) value at the specified position.
    pub fn at(&self, position: f64) -> f64 {
        self.from + (self.to - self.from) * position
    }
}

/// A model based on linear interpolation of every link parameter along a normalized path.
///
/// The position is clamped to _[0, 1]_ before evaluation. After interpolation the bandwidth is floored
/// at `bandwidth_floor`, the delay at zero and the loss is clamped to _[0, loss_cap]_.
#[derive(Clone, Debug)]
pub struct LinearModel {
    bandwidth: Ramp,
    delay: Ramp,
    loss: Ramp,
    bandwidth_floor: f64,
    loss_cap: f64,
}

impl LinearModel {
    /// Creates a linear model with zero bandwidth floor and 100% loss cap.
    ///
    /// * `bandwidth` - Bandwidth ramp in Mbit/s.
    /// * `delay` - Delay ramp in milliseconds.
    /// * `loss` - Loss ramp in percent.
    pub fn new(bandwidth: Ramp, delay: Ramp, loss: Ramp) -> Self {
        Self {
            bandwidth,
            delay,
            loss,
            bandwidth_floor: 0.,
            loss_cap: 100.,
        }
    }

    /// Sets the minimal bandwidth.
    pub fn with_bandwidth_floor(mut self, floor: f64) -> Self {
        self.bandwidth_floor = floor;
        self
    }

    /// Sets the maximal loss.
    pub fn with_loss_cap(mut self, cap: f64) -> Self {
        self.loss_cap = cap;
        self
    }

    /// Returns the same model with both ends of every ramp swapped.
    ///
    /// Mirrors the access point to the other end of the path.
    pub fn mirrored(&self) -> Self {
        let swap = |r: &Ramp| Ramp::new(r.to, r.from);
        Self {
            bandwidth: swap(&self.bandwidth),
            delay: swap(&self.delay),
            loss: swap(&self.loss),
            bandwidth_floor: self.bandwidth_floor,
            loss_cap: self.loss_cap,
        }
    }

    /// Returns the path end where the access point is located (the end with the higher bandwidth).
    pub fn anchor(&self) -> f64 {
        if self.bandwidth.from >= self.bandwidth.to {
            0.
        } else {
            1.
        }
    }
}

fn clamp_position(position: f64) -> f64 {
    if position.is_nan() {
        return 0.;
    }
    position.clamp(0., 1.)
}

impl QualityModel for LinearModel {
    fn evaluate(&self, position: f64) -> LinkParams {
        let p = clamp_position(position);
        LinkParams {
            bandwidth_mbps: self.bandwidth.at(p).max(self.bandwidth_floor),
            delay_ms: self.delay.at(p).max(0.),
            loss_pct: self.loss.at(p).max(0.).min(self.loss_cap),
        }
    }

    fn distance(&self, position: f64) -> f64 {
        (clamp_position(position) - self.anchor()).abs()
    }
}
