//! Hysteresis-gated handover decision.

use serde::{Deserialize, Serialize};

/// Switch of the active link from one candidate to another.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Index of the previously active candidate.
    pub from: usize,
    /// Index of the newly active candidate.
    pub to: usize,
}

/// Handover decision state machine.
///
/// Exactly one candidate is active. A challenger takes over only when its score exceeds the score of the
/// active candidate by more than `margin`. Challengers are examined in declaration order and the first one
/// that qualifies wins, even if a later one scores higher.
#[derive(Clone, Debug)]
pub struct HandoverController {
    margin: f64,
    active: usize,
    last_evaluated: Option<u64>,
}

impl HandoverController {
    /// Creates a controller with specified hysteresis margin and initially active candidate.
    pub fn new(margin: f64, active: usize) -> Self {
        Self {
            margin,
            active,
            last_evaluated: None,
        }
    }

    /// Returns the hysteresis margin.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Returns the index of the active candidate.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Returns the first candidate whose score beats the active one by more than the margin.
    ///
    /// Does not change the controller state.
    pub fn challenger(&self, scores: &[f64]) -> Option<usize> {
        let active_score = *scores.get(self.active)?;
        scores
            .iter()
            .enumerate()
            .find(|&(idx, &score)| idx != self.active && score > active_score + self.margin)
            .map(|(idx, _)| idx)
    }

    /// Evaluates the decision rule for the specified step and applies the resulting transition.
    ///
    /// The rule is evaluated at most once per step: repeated calls with an already evaluated step
    /// return `None`.
    pub fn evaluate(&mut self, step: u64, scores: &[f64]) -> Option<Transition> {
        if self.last_evaluated.map_or(false, |last| step <= last) {
            return None;
        }
        self.last_evaluated = Some(step);
        let to = self.challenger(scores)?;
        let transition = Transition { from: self.active, to };
        self.active = to;
        Some(transition)
    }
}

/// Policy for choosing the active candidate before the first step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialSelection {
    /// The candidate with the highest initial score, ties resolved in favour of the first declared one.
    BestScore,
    /// The named candidate.
    Named(String),
}

impl Default for InitialSelection {
    fn default() -> Self {
        Self::BestScore
    }
}

/// Returns the index of the best score, the first one on ties.
///
/// Non-finite scores are skipped, so `None` is returned if no score is finite.
pub fn best_index(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            continue;
        }
        match best {
            Some(b) if scores[b] >= score => {}
            _ => best = Some(idx),
        }
    }
    best
}
