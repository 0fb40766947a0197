//! Distance based link model.

use serde::{Deserialize, Serialize};

use crate::link::LinkParams;
use crate::model::QualityModel;

/// Bounded linear function of distance: `max(min, min(max, base + slope * distance))`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceCurve {
    /// Value at distance 0 before clamping.
    pub base: f64,
    /// Change of the value per distance unit.
    pub slope: f64,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl DistanceCurve {
    /// Creates a curve.
    pub fn new(base: f64, slope: f64, min: f64, max: f64) -> Self {
        Self { base, slope, min, max }
    }

    /// Creates a curve that does not depend on distance.
    pub fn constant(value: f64) -> Self {
        Self::new(value, 0., value, value)
    }

    /// Returns the clamped value at the specified distance.
    pub fn at(&self, distance: f64) -> f64 {
        self.min.max(self.max.min(self.base + self.slope * distance))
    }
}

/// A model where link parameters depend on the distance between the station and a fixed access point.
///
/// `distance = |position - reference|`, every parameter is a [`DistanceCurve`] of that distance.
#[derive(Clone, Debug)]
pub struct DistanceModel {
    reference: f64,
    bandwidth: DistanceCurve,
    delay: DistanceCurve,
    loss: DistanceCurve,
}

impl DistanceModel {
    /// Creates a distance model for an access point located at `reference`.
    pub fn new(reference: f64, bandwidth: DistanceCurve, delay: DistanceCurve, loss: DistanceCurve) -> Self {
        Self {
            reference,
            bandwidth,
            delay,
            loss,
        }
    }

    /// Returns the access point location.
    pub fn reference(&self) -> f64 {
        self.reference
    }
}

impl QualityModel for DistanceModel {
    fn evaluate(&self, position: f64) -> LinkParams {
        let distance = self.distance(position);
        LinkParams {
            bandwidth_mbps: self.bandwidth.at(distance),
            delay_ms: self.delay.at(distance),
            loss_pct: self.loss.at(distance),
        }
    }

    fn distance(&self, position: f64) -> f64 {
        let distance = (position - self.reference).abs();
        if distance.is_nan() {
            0.
        } else {
            distance
        }
    }
}
