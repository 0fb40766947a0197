//! Link quality scoring.
//!
//! A score ranks candidate links: higher is better. Scores are only compared with each other,
//! so they are allowed to go negative.

use serde::{Deserialize, Serialize};

use crate::link::LinkParams;

/// Computes a single quality score from link parameters.
pub trait ScoringFunction {
    /// Returns the score of a link with the specified parameters.
    fn score(&self, params: &LinkParams) -> f64;
}

impl<F> ScoringFunction for F
where
    F: Fn(&LinkParams) -> f64,
{
    fn score(&self, params: &LinkParams) -> f64 {
        self(params)
    }
}

/// `100 - delay - loss * loss_weight`, not clamped.
#[derive(Copy, Clone, Debug)]
pub struct DelayLossScore {
    loss_weight: f64,
}

impl DelayLossScore {
    /// Creates the scoring function with specified weight of the loss percentage.
    pub fn new(loss_weight: f64) -> Self {
        Self { loss_weight }
    }
}

impl ScoringFunction for DelayLossScore {
    fn score(&self, params: &LinkParams) -> f64 {
        100. - params.delay_ms - params.loss_pct * self.loss_weight
    }
}

/// `max(0, 100 - delay / latency_divisor - loss)`.
#[derive(Copy, Clone, Debug)]
pub struct NormalizedLatencyScore {
    latency_divisor: f64,
}

impl NormalizedLatencyScore {
    /// Creates the scoring function; latency is divided by `latency_divisor` before subtraction.
    pub fn new(latency_divisor: f64) -> Self {
        Self { latency_divisor }
    }
}

impl ScoringFunction for NormalizedLatencyScore {
    fn score(&self, params: &LinkParams) -> f64 {
        (100. - params.delay_ms / self.latency_divisor - params.loss_pct).max(0.)
    }
}

/// YAML-serializable choice of the scoring function.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringConfig {
    /// See [`DelayLossScore`].
    DelayLoss {
        /// Weight of the loss percentage.
        #[serde(default = "default_loss_weight")]
        loss_weight: f64,
    },
    /// See [`NormalizedLatencyScore`].
    NormalizedLatency {
        /// Latency divisor.
        #[serde(default = "default_latency_divisor")]
        latency_divisor: f64,
    },
}

fn default_loss_weight() -> f64 {
    5.
}

fn default_latency_divisor() -> f64 {
    5.
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::DelayLoss {
            loss_weight: default_loss_weight(),
        }
    }
}

impl ScoringConfig {
    /// Builds the configured scoring function.
    pub fn build(&self) -> Box<dyn ScoringFunction> {
        match *self {
            Self::DelayLoss { loss_weight } => Box::new(DelayLossScore::new(loss_weight)),
            Self::NormalizedLatency { latency_divisor } => Box::new(NormalizedLatencyScore::new(latency_divisor)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_loss_goes_negative() {
        let score = DelayLossScore::new(5.);
        assert_eq!(score.score(&LinkParams::new(1., 20., 50.)), -170.);
        assert_eq!(score.score(&LinkParams::new(20., 1., 0.)), 99.);
    }

    #[test]
    fn normalized_latency_is_floored() {
        let score = NormalizedLatencyScore::new(5.);
        assert_eq!(score.score(&LinkParams::new(8., 15., 1.)), 96.);
        assert_eq!(score.score(&LinkParams::new(8., 1000., 100.)), 0.);
    }

    #[test]
    fn closures_are_scoring_functions() {
        let by_bandwidth = |p: &LinkParams| p.bandwidth_mbps;
        let boxed: Box<dyn ScoringFunction> = Box::new(by_bandwidth);
        assert_eq!(boxed.score(&LinkParams::new(12., 0., 0.)), 12.);
    }
}
