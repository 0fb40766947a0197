//! Candidate links.

use crate::link::LinkParams;
use crate::model::QualityModel;
use crate::scoring::ScoringFunction;

/// A link to one access point the station may use.
///
/// Keeps the parameters produced by its model at the current position and, separately, the last
/// parameters that were successfully pushed to the link parameter sink.
pub struct Candidate {
    name: String,
    model: Box<dyn QualityModel>,
    current: LinkParams,
    applied: Option<LinkParams>,
    score: f64,
}

impl Candidate {
    /// Creates a candidate and evaluates its model at position 0.
    pub fn new(name: &str, model: Box<dyn QualityModel>) -> Self {
        let current = model.evaluate(0.);
        Self {
            name: name.to_string(),
            model,
            current,
            applied: None,
            score: 0.,
        }
    }

    /// Returns the candidate name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the underlying quality model.
    pub fn model(&self) -> &dyn QualityModel {
        self.model.as_ref()
    }

    /// Re-evaluates the model and the score at the specified position.
    pub fn update(&mut self, position: f64, scoring: &dyn ScoringFunction) {
        self.current = self.model.evaluate(position);
        self.score = scoring.score(&self.current);
    }

    /// Returns the parameters produced by the model at the current position.
    pub fn params(&self) -> LinkParams {
        self.current
    }

    /// Returns the score of the current parameters.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the distance to the access point at the specified position.
    pub fn distance(&self, position: f64) -> f64 {
        self.model.distance(position)
    }

    /// Records that the current parameters were pushed to the sink.
    pub fn mark_applied(&mut self) {
        self.applied = Some(self.current);
    }

    /// Returns the last parameters successfully pushed to the sink.
    pub fn applied(&self) -> Option<LinkParams> {
        self.applied
    }

    /// Returns true if the sink holds parameters other than the current model output.
    pub fn is_stale(&self) -> bool {
        self.applied != Some(self.current)
    }
}
