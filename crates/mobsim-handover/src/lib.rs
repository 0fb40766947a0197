#![warn(missing_docs)]
#![doc = include_str!("../readme.md")]

pub mod candidate;
pub mod config;
pub mod error;
pub mod event_log;
pub mod handover;
pub mod link;
pub mod measurement;
pub mod metrics;
pub mod model;
pub mod models;
pub mod sampler;
pub mod scoring;
pub mod simulation;
pub mod sink;

pub use candidate::Candidate;
pub use config::{CandidateConfig, ModelConfig, PositionMapping, RawScenarioConfig, ScenarioConfig, PRESETS};
pub use error::{ConfigError, ReportError, SinkError};
pub use event_log::{EventLog, HandoverEvent, LoggedHandover};
pub use handover::{HandoverController, InitialSelection, Transition};
pub use link::LinkParams;
pub use measurement::{EmulatedProbe, Measurement, MeasurementSource, PingProbe, Probe, ProbeSample, SyntheticFallback};
pub use metrics::{MetricsRecord, MetricsSeries};
pub use model::QualityModel;
pub use sampler::{MetricsSampler, Sample, Snapshot, SnapshotPublisher};
pub use scoring::{DelayLossScore, NormalizedLatencyScore, ScoringConfig, ScoringFunction};
pub use simulation::{HandoverSimulation, SimulationReport};
pub use sink::{LinkParameterSink, NetemInterface, NetemSink, NullSink};
