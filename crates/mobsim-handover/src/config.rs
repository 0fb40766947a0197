//! Scenario configuration.

use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use mobsim_core::SimulationClock;
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::error::ConfigError;
use crate::handover::InitialSelection;
use crate::model::QualityModel;
use crate::models::{DistanceCurve, DistanceModel, LinearModel, Ramp};
use crate::scoring::ScoringConfig;
use crate::sink::NetemInterface;

/// Names of the built-in scenarios accepted by [`ScenarioConfig::preset`].
pub const PRESETS: [&str; 4] = ["two-ap-linear", "two-ap-linear-q8", "degrading-ap", "three-ap-corridor"];

/// Quality model of a candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelConfig {
    /// Metrics interpolated linearly over the normalized position.
    Linear {
        /// Bandwidth in Mbit/s at positions 0 and 1.
        bandwidth: Ramp,
        /// Delay in ms at positions 0 and 1.
        delay: Ramp,
        /// Loss in percent at positions 0 and 1.
        loss: Ramp,
        /// Lower bound of the bandwidth.
        #[serde(default)]
        bandwidth_floor: f64,
        /// Upper bound of the loss.
        #[serde(default = "default_loss_cap")]
        loss_cap: f64,
    },
    /// Metrics derived from the distance to the access point.
    Distance {
        /// Position of the access point.
        reference: f64,
        /// Bandwidth curve.
        bandwidth: DistanceCurve,
        /// Delay curve.
        delay: DistanceCurve,
        /// Loss curve.
        loss: DistanceCurve,
    },
}

fn default_loss_cap() -> f64 {
    100.
}

impl ModelConfig {
    /// Creates the configured model.
    pub fn build(&self) -> Box<dyn QualityModel> {
        match self {
            ModelConfig::Linear {
                bandwidth,
                delay,
                loss,
                bandwidth_floor,
                loss_cap,
            } => Box::new(
                LinearModel::new(*bandwidth, *delay, *loss)
                    .with_bandwidth_floor(*bandwidth_floor)
                    .with_loss_cap(*loss_cap),
            ),
            ModelConfig::Distance {
                reference,
                bandwidth,
                delay,
                loss,
            } => Box::new(DistanceModel::new(*reference, *bandwidth, *delay, *loss)),
        }
    }

    fn validate(&self, candidate: &str) -> Result<(), ConfigError> {
        match self {
            ModelConfig::Linear { loss_cap, .. } => {
                if !(0. ..=100.).contains(loss_cap) {
                    return Err(invalid(format!("loss cap of {} must be within [0, 100]", candidate)));
                }
            }
            ModelConfig::Distance { delay, loss, .. } => {
                if delay.slope < 0. || loss.slope < 0. {
                    return Err(invalid(format!(
                        "delay and loss of {} must not decrease with distance",
                        candidate
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Mapping from step index to station position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionMapping {
    /// Uniform movement from `start` (step 0) to `end` (last step).
    Linear {
        /// Position at step 0.
        start: f64,
        /// Position at the last step.
        end: f64,
    },
    /// Replay of a recorded position sequence, one position per step.
    Recorded {
        /// Recorded positions.
        positions: Vec<f64>,
    },
}

impl Default for PositionMapping {
    fn default() -> Self {
        Self::Linear { start: 0., end: 1. }
    }
}

impl PositionMapping {
    /// Returns the position at the specified step.
    pub fn position(&self, step: u64, total_steps: u64) -> f64 {
        match self {
            PositionMapping::Linear { start, end } => {
                if total_steps == 0 {
                    *start
                } else {
                    start + (end - start) * step as f64 / total_steps as f64
                }
            }
            PositionMapping::Recorded { positions } => {
                let idx = (step as usize).min(positions.len().saturating_sub(1));
                positions.get(idx).copied().unwrap_or(0.)
            }
        }
    }
}

/// Candidate link description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateConfig {
    /// Candidate name, used in logs and event descriptions.
    pub name: String,
    /// Quality model.
    pub model: ModelConfig,
    /// Interface shaped by the netem sink.
    #[serde(default)]
    pub interface: Option<NetemInterface>,
    /// Address probed by the ping measurement source.
    #[serde(default)]
    pub ping_target: Option<String>,
}

impl CandidateConfig {
    /// Creates a candidate description without sink or probe settings.
    pub fn new(name: &str, model: ModelConfig) -> Self {
        Self {
            name: name.to_string(),
            model,
            interface: None,
            ping_target: None,
        }
    }
}

/// Scenario as read from YAML, all fields optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScenarioConfig {
    /// Index of the last step.
    pub total_steps: Option<u64>,
    /// Simulated seconds per step.
    pub step_duration: Option<f64>,
    /// Hysteresis margin.
    pub margin: Option<f64>,
    /// Random seed.
    pub seed: Option<u64>,
    /// Scoring function.
    pub scoring: Option<ScoringConfig>,
    /// Initially active candidate.
    pub initial: Option<InitialSelection>,
    /// Steps to keep running after the first handover.
    pub settle_steps: Option<u64>,
    /// Wall-clock pause after each step in milliseconds.
    pub step_delay_ms: Option<u64>,
    /// Meters per model distance unit, used by the synthetic measurement fallback.
    pub distance_scale: Option<f64>,
    /// Station movement.
    pub positions: Option<PositionMapping>,
    /// Candidate links in declaration order.
    pub candidates: Option<Vec<CandidateConfig>>,
}

/// Validated scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioConfig {
    /// Index of the last step; steps `0..=total_steps` are simulated.
    pub total_steps: u64,
    /// Simulated seconds per step.
    pub step_duration: f64,
    /// Hysteresis margin.
    pub margin: f64,
    /// Random seed.
    pub seed: u64,
    /// Scoring function.
    pub scoring: ScoringConfig,
    /// Initially active candidate.
    pub initial: InitialSelection,
    /// Steps to keep running after the first handover, unlimited if `None`.
    pub settle_steps: Option<u64>,
    /// Wall-clock pause after each step in milliseconds.
    pub step_delay_ms: u64,
    /// Meters per model distance unit.
    pub distance_scale: f64,
    /// Station movement.
    pub positions: PositionMapping,
    /// Candidate links in declaration order.
    pub candidates: Vec<CandidateConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            total_steps: 20,
            step_duration: 1.,
            margin: 15.,
            seed: 123,
            scoring: ScoringConfig::default(),
            initial: InitialSelection::default(),
            settle_steps: None,
            step_delay_ms: 0,
            distance_scale: 1.,
            positions: PositionMapping::default(),
            candidates: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    /// Creates scenario config by reading parameter values from .yaml file
    /// (uses default values if some parameters are absent).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Fills in defaults and validates the raw config.
    pub fn from_raw(raw: RawScenarioConfig) -> Result<Self, ConfigError> {
        let default = Self::default();
        let positions = raw.positions.unwrap_or(default.positions);
        let total_steps = match (&positions, raw.total_steps) {
            (PositionMapping::Recorded { positions }, None) => positions.len().saturating_sub(1) as u64,
            (_, total_steps) => total_steps.unwrap_or(default.total_steps),
        };
        let config = Self {
            total_steps,
            step_duration: raw.step_duration.unwrap_or(default.step_duration),
            margin: raw.margin.unwrap_or(default.margin),
            seed: raw.seed.unwrap_or(default.seed),
            scoring: raw.scoring.unwrap_or(default.scoring),
            initial: raw.initial.unwrap_or(default.initial),
            settle_steps: raw.settle_steps,
            step_delay_ms: raw.step_delay_ms.unwrap_or(default.step_delay_ms),
            distance_scale: raw.distance_scale.unwrap_or(default.distance_scale),
            positions,
            candidates: raw.candidates.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the consistency of the scenario.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candidates.len() < 2 {
            return Err(invalid("at least two candidates are required"));
        }
        for (idx, candidate) in self.candidates.iter().enumerate() {
            let name = &candidate.name;
            if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '|') {
                return Err(invalid(format!(
                    "candidate name {:?} must be non-empty and contain no whitespace or '|'",
                    name
                )));
            }
            if self.candidates[..idx].iter().any(|c| &c.name == name) {
                return Err(invalid(format!("duplicate candidate {}", name)));
            }
            candidate.model.validate(name)?;
        }
        if self.total_steps == 0 {
            return Err(invalid("total_steps must be positive"));
        }
        if let PositionMapping::Recorded { positions } = &self.positions {
            if positions.len() as u64 != self.total_steps + 1 {
                return Err(invalid(format!(
                    "{} recorded positions don't match {} steps",
                    positions.len(),
                    self.total_steps + 1
                )));
            }
        }
        if self.step_duration.is_nan() || self.step_duration <= 0. {
            return Err(invalid("step_duration must be positive"));
        }
        if self.margin.is_nan() || self.margin < 0. {
            return Err(invalid("margin must be non-negative"));
        }
        if self.distance_scale.is_nan() || self.distance_scale < 0. {
            return Err(invalid("distance_scale must be non-negative"));
        }
        if let InitialSelection::Named(name) = &self.initial {
            if !self.candidates.iter().any(|c| &c.name == name) {
                return Err(invalid(format!("unknown initial candidate {}", name)));
            }
        }
        Ok(())
    }

    /// Returns one of the built-in scenarios listed in [`PRESETS`].
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "two-ap-linear" => Some(two_ap_linear(1., 99.)),
            "two-ap-linear-q8" => Some(two_ap_linear(2., 80.)),
            "degrading-ap" => Some(degrading_ap()),
            "three-ap-corridor" => Some(three_ap_corridor()),
            _ => None,
        }
    }

    /// Returns a clock covering the scenario steps.
    pub fn clock(&self) -> SimulationClock {
        SimulationClock::new(self.total_steps, self.step_duration)
    }

    /// Returns the station position at the specified step.
    pub fn position_at(&self, step: u64) -> f64 {
        self.positions.position(step, self.total_steps)
    }

    /// Returns candidate names in declaration order.
    pub fn candidate_names(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.name.clone()).collect()
    }

    /// Creates candidates with their quality models.
    pub fn build_candidates(&self) -> Vec<Candidate> {
        self.candidates
            .iter()
            .map(|c| Candidate::new(&c.name, c.model.build()))
            .collect()
    }

    /// Returns the netem interfaces of candidates that have one.
    pub fn netem_interfaces(&self) -> IndexMap<String, NetemInterface> {
        self.candidates
            .iter()
            .filter_map(|c| c.interface.clone().map(|i| (c.name.clone(), i)))
            .collect()
    }

    /// Returns the ping targets of candidates that have one.
    pub fn ping_targets(&self) -> IndexMap<String, String> {
        self.candidates
            .iter()
            .filter_map(|c| c.ping_target.clone().map(|t| (c.name.clone(), t)))
            .collect()
    }
}

impl FromStr for ScenarioConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawScenarioConfig = serde_yaml::from_str(s)?;
        Self::from_raw(raw)
    }
}

fn invalid<S: Into<String>>(message: S) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn two_ap_linear(best_delay: f64, loss_cap: f64) -> ScenarioConfig {
    let ap1 = ModelConfig::Linear {
        bandwidth: Ramp::new(20., 1.),
        delay: Ramp::new(best_delay, 20.),
        loss: Ramp::new(0., 50.),
        bandwidth_floor: 1.,
        loss_cap,
    };
    let ap2 = ModelConfig::Linear {
        bandwidth: Ramp::new(1., 20.),
        delay: Ramp::new(20., best_delay),
        loss: Ramp::new(50., 0.),
        bandwidth_floor: 1.,
        loss_cap,
    };
    ScenarioConfig {
        distance_scale: 100.,
        candidates: vec![CandidateConfig::new("AP1", ap1), CandidateConfig::new("AP2", ap2)],
        ..ScenarioConfig::default()
    }
}

fn degrading_ap() -> ScenarioConfig {
    let ap1 = ModelConfig::Linear {
        bandwidth: Ramp::constant(10.),
        delay: Ramp::new(5., 105.),
        loss: Ramp::new(0., 20.),
        bandwidth_floor: 0.,
        loss_cap: 100.,
    };
    let ap2 = ModelConfig::Linear {
        bandwidth: Ramp::constant(8.),
        delay: Ramp::constant(15.),
        loss: Ramp::constant(1.),
        bandwidth_floor: 0.,
        loss_cap: 100.,
    };
    ScenarioConfig {
        scoring: ScoringConfig::NormalizedLatency { latency_divisor: 5. },
        settle_steps: Some(5),
        distance_scale: 100.,
        candidates: vec![CandidateConfig::new("AP1", ap1), CandidateConfig::new("AP2", ap2)],
        ..ScenarioConfig::default()
    }
}

fn three_ap_corridor() -> ScenarioConfig {
    let ap = |name: &str, reference: f64| {
        CandidateConfig::new(
            name,
            ModelConfig::Distance {
                reference,
                bandwidth: DistanceCurve::constant(20.),
                delay: DistanceCurve::new(5., 1., 5., 100.),
                loss: DistanceCurve::new(0., 0.2, 0., 20.),
            },
        )
    };
    ScenarioConfig {
        total_steps: 30,
        positions: PositionMapping::Linear { start: 0., end: 140. },
        candidates: vec![ap("AP1", 20.), ap("AP2", 70.), ap("AP3", 120.)],
        ..ScenarioConfig::default()
    }
}
