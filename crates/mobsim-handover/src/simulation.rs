//! Step loop driving the handover simulation.

use std::thread;
use std::time::Duration;

use mobsim_core::{log_debug, log_error, log_info, log_trace, log_warn, Simulation, SimulationContext};

use crate::candidate::Candidate;
use crate::config::{PositionMapping, ScenarioConfig};
use crate::error::ConfigError;
use crate::event_log::{EventLog, HandoverEvent};
use crate::handover::{best_index, HandoverController, InitialSelection, Transition};
use crate::measurement::{MeasurementSource, ProbeSample, SyntheticFallback};
use crate::metrics::{MetricsRecord, MetricsSeries};
use crate::sampler::{MetricsSampler, Sample, Snapshot, SnapshotPublisher};
use crate::scoring::ScoringFunction;
use crate::sink::{LinkParameterSink, NullSink};

const SNAPSHOT_CAPACITY: usize = 64;
const SAMPLER_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Results of a finished run.
#[derive(Clone, Debug)]
pub struct SimulationReport {
    /// Handover events in order.
    pub events: Vec<HandoverEvent>,
    /// Per-step metrics.
    pub metrics: MetricsSeries,
    /// Snapshots recorded by the background sampler, empty if it was not enabled.
    pub samples: Vec<Sample>,
    /// Number of rejected parameter updates.
    pub sink_failures: u64,
}

/// Mobility simulation with hysteresis-gated handover between candidate links.
///
/// Each [`step`](Self::step) moves the station, re-evaluates every candidate, runs the handover decision,
/// pushes the new parameters to the link sink, optionally probes the active link and records metrics.
pub struct HandoverSimulation {
    sim: Simulation,
    ctx: SimulationContext,
    positions: PositionMapping,
    total_steps: u64,
    settle_steps: Option<u64>,
    step_delay: Duration,
    scoring: Box<dyn ScoringFunction>,
    initial: InitialSelection,
    candidates: Vec<Candidate>,
    controller: HandoverController,
    sink: Box<dyn LinkParameterSink>,
    measurement: Option<Box<dyn MeasurementSource>>,
    fallback: SyntheticFallback,
    event_log: EventLog,
    metrics: MetricsSeries,
    publisher: Option<SnapshotPublisher>,
    sampler_interval: Option<Duration>,
    first_handover_step: Option<u64>,
    sink_failures: u64,
}

impl HandoverSimulation {
    /// Creates a simulation of the scenario, with a [`NullSink`] and no measurements.
    ///
    /// The scenario is validated first, so an empty candidate list or an unknown initial link is reported
    /// as [`ConfigError::Invalid`].
    pub fn new(config: &ScenarioConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut sim = Simulation::with_clock(config.seed, config.clock());
        let ctx = sim.create_context("handover");
        let fallback = SyntheticFallback::new(config.distance_scale, sim.create_context("fallback"));

        let mut simulation = Self {
            sim,
            ctx,
            positions: config.positions.clone(),
            total_steps: config.total_steps,
            settle_steps: config.settle_steps,
            step_delay: Duration::from_millis(config.step_delay_ms),
            scoring: config.scoring.build(),
            initial: config.initial.clone(),
            metrics: MetricsSeries::new(config.candidate_names()),
            candidates: config.build_candidates(),
            controller: HandoverController::new(config.margin, 0),
            sink: Box::new(NullSink),
            measurement: None,
            fallback,
            event_log: EventLog::new(),
            publisher: None,
            sampler_interval: None,
            first_handover_step: None,
            sink_failures: 0,
        };
        simulation.select_initial();
        Ok(simulation)
    }

    /// Scores candidates with the specified function instead of the configured one.
    ///
    /// Candidates are rescored at the starting position and the initial link is chosen again, so this must be
    /// called before the first step.
    pub fn with_scoring<F: ScoringFunction + 'static>(mut self, scoring: F) -> Self {
        self.scoring = Box::new(scoring);
        self.select_initial();
        self
    }

    /// Uses the specified sink for link parameters and route switches.
    pub fn with_sink<S: LinkParameterSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Probes the active link after every step.
    pub fn with_measurement<M: MeasurementSource + 'static>(mut self, source: M) -> Self {
        self.measurement = Some(Box::new(source));
        self
    }

    /// Records events into the specified log (e.g. one mirrored to a file).
    pub fn with_event_log(mut self, event_log: EventLog) -> Self {
        self.event_log = event_log;
        self
    }

    /// Runs a background sampler with the specified interval during [`run`](Self::run).
    pub fn with_sampler(mut self, interval: Duration) -> Self {
        self.sampler_interval = Some(interval);
        self
    }

    /// Returns the index of the step to be simulated next.
    pub fn current_step(&self) -> u64 {
        self.sim.step()
    }

    /// Returns true once every step has been simulated.
    pub fn is_finished(&self) -> bool {
        self.sim.is_finished()
    }

    /// Returns the name of the active candidate.
    pub fn active(&self) -> &str {
        self.candidates[self.controller.active()].name()
    }

    /// Returns candidates in declaration order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Returns handover events recorded so far.
    pub fn events(&self) -> &[HandoverEvent] {
        self.event_log.events()
    }

    /// Returns metrics recorded so far.
    pub fn metrics(&self) -> &MetricsSeries {
        &self.metrics
    }

    /// Returns the step of the first handover, if any.
    pub fn first_handover_step(&self) -> Option<u64> {
        self.first_handover_step
    }

    /// Returns the number of rejected parameter updates.
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures
    }

    /// Returns true if the settle window after the first handover has passed.
    pub fn is_settled(&self) -> bool {
        match (self.settle_steps, self.first_handover_step) {
            (Some(settle), Some(first)) => self.sim.step() > first + settle,
            _ => false,
        }
    }

    /// Simulates the current step and advances the clock.
    ///
    /// Returns false without doing anything if the simulation is finished.
    pub fn step(&mut self) -> bool {
        if self.sim.is_finished() {
            return false;
        }
        let step = self.sim.step();
        let elapsed = self.sim.time();
        let position = self.positions.position(step, self.total_steps);

        for candidate in self.candidates.iter_mut() {
            candidate.update(position, self.scoring.as_ref());
        }
        let scores: Vec<f64> = self.candidates.iter().map(|c| c.score()).collect();
        log_debug!(self.ctx, "position {:.3}, scores {:?}", position, scores);

        if let Some(transition) = self.controller.evaluate(step, &scores) {
            self.handover(transition, step, elapsed, position);
        }
        self.apply_params();

        let probe = self.probe_active(position);
        let active = self.active().to_string();
        self.metrics.push(MetricsRecord {
            step,
            elapsed,
            position,
            scores: scores.clone(),
            active: active.clone(),
            probe,
        });
        self.publish(step, elapsed, position, active, scores);

        if !self.step_delay.is_zero() {
            thread::sleep(self.step_delay);
        }
        self.sim.advance();
        true
    }

    /// Runs the simulation until the clock finishes or the settle window passes.
    pub fn run(mut self) -> SimulationReport {
        let sampler = self.sampler_interval.map(|interval| {
            let (publisher, sampler) = MetricsSampler::spawn(interval, SNAPSHOT_CAPACITY);
            self.publisher = Some(publisher);
            sampler
        });

        while self.step() {
            if self.is_settled() {
                log_info!(
                    self.ctx,
                    "settled {} steps after the first handover",
                    self.settle_steps.unwrap_or_default()
                );
                break;
            }
        }

        if let Some(publisher) = self.publisher.take() {
            if publisher.dropped() > 0 {
                log_debug!(self.ctx, "{} snapshots dropped by a busy sampler", publisher.dropped());
            }
        }
        let samples = sampler
            .and_then(|sampler| sampler.stop(SAMPLER_STOP_TIMEOUT))
            .unwrap_or_default();
        log_info!(
            self.ctx,
            "finished with {} handovers, active link {}",
            self.event_log.len(),
            self.active()
        );

        SimulationReport {
            events: self.event_log.events().to_vec(),
            metrics: self.metrics,
            samples,
            sink_failures: self.sink_failures,
        }
    }

    fn select_initial(&mut self) {
        let start = self.positions.position(0, self.total_steps);
        for candidate in self.candidates.iter_mut() {
            candidate.update(start, self.scoring.as_ref());
        }
        let scores: Vec<f64> = self.candidates.iter().map(|c| c.score()).collect();
        // candidates are non-empty and a named link exists after validation
        let active = match &self.initial {
            InitialSelection::BestScore => best_index(&scores),
            InitialSelection::Named(name) => self.candidates.iter().position(|c| c.name() == name),
        }
        .unwrap_or(0);
        let margin = self.controller.margin();
        self.controller = HandoverController::new(margin, active);
        log_info!(
            self.ctx,
            "initial link {} with score {:.2}, margin {}",
            self.candidates[active].name(),
            scores[active],
            margin
        );
    }

    fn handover(&mut self, transition: Transition, step: u64, elapsed: f64, position: f64) {
        let from = self.candidates[transition.from].name().to_string();
        let to = self.candidates[transition.to].name().to_string();
        if let Err(e) = self.sink.activate(&to) {
            log_warn!(self.ctx, "can't route through {}: {}", to, e);
        }
        let event = HandoverEvent {
            step,
            elapsed,
            position,
            from,
            to,
        };
        log_info!(self.ctx, "{} at position {:.2}", event.description(), position);
        if let Err(e) = self.event_log.append(event) {
            log_error!(self.ctx, "can't write event log: {}", e);
        }
        self.first_handover_step.get_or_insert(step);
    }

    fn apply_params(&mut self) {
        for candidate in self.candidates.iter_mut() {
            match self.sink.apply(candidate.name(), &candidate.params()) {
                Ok(()) => candidate.mark_applied(),
                Err(e) => {
                    self.sink_failures += 1;
                    log_warn!(
                        self.ctx,
                        "can't apply parameters of {}: {}, link keeps {:?}",
                        candidate.name(),
                        e,
                        candidate.applied()
                    );
                }
            }
        }
    }

    fn probe_active(&mut self, position: f64) -> Option<ProbeSample> {
        let source = self.measurement.as_mut()?;
        let active = &self.candidates[self.controller.active()];
        let params = active.applied().unwrap_or_else(|| active.params());
        let measurement = source.measure(active.name(), &params);
        Some(self.fallback.resolve(measurement, active.distance(position)))
    }

    fn publish(&mut self, step: u64, elapsed: f64, position: f64, active: String, scores: Vec<f64>) {
        let publisher = match self.publisher.as_mut() {
            Some(publisher) => publisher,
            None => return,
        };
        let snapshot = Snapshot {
            step,
            elapsed,
            position,
            active,
            scores: self
                .candidates
                .iter()
                .map(|c| c.name().to_string())
                .zip(scores)
                .collect(),
            stale: self
                .candidates
                .iter()
                .filter(|c| c.is_stale())
                .map(|c| c.name().to_string())
                .collect(),
        };
        if !publisher.publish(snapshot) {
            log_trace!(self.ctx, "snapshot of step {} not delivered", step);
        }
    }
}
