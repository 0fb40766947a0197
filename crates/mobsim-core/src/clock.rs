//! Discrete simulation clock.

/// Step counter of a time-stepped simulation.
///
/// The clock visits steps `0..=total_steps` (both ends included, so a 20-step walk produces 21 samples)
/// and maps every step to simulated time `step * step_duration`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationClock {
    step: u64,
    total_steps: u64,
    step_duration: f64,
}

impl SimulationClock {
    /// Creates a clock positioned at step 0.
    ///
    /// * `total_steps` - The index of the last step.
    /// * `step_duration` - Simulated time between two consecutive steps.
    pub fn new(total_steps: u64, step_duration: f64) -> Self {
        Self {
            step: 0,
            total_steps,
            step_duration,
        }
    }

    /// Returns the current step index.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Returns the index of the last step.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Returns simulated time between two consecutive steps.
    pub fn step_duration(&self) -> f64 {
        self.step_duration
    }

    /// Returns simulated time elapsed since step 0.
    pub fn elapsed(&self) -> f64 {
        self.step as f64 * self.step_duration
    }

    /// Returns `step / total_steps`.
    ///
    /// A clock with zero total steps is always at progress 0.
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.;
        }
        self.step as f64 / self.total_steps as f64
    }

    /// Returns true once every step has been visited.
    pub fn is_finished(&self) -> bool {
        self.step > self.total_steps
    }

    /// Moves the clock to the next step.
    ///
    /// Does nothing when the clock is already finished.
    pub fn advance(&mut self) {
        if !self.is_finished() {
            self.step += 1;
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(0, 1.)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_both_ends() {
        let mut clock = SimulationClock::new(4, 0.5);
        let mut visited = Vec::new();
        while !clock.is_finished() {
            visited.push((clock.step(), clock.elapsed(), clock.progress()));
            clock.advance();
        }
        assert_eq!(visited.len(), 5);
        assert_eq!(visited[0], (0, 0., 0.));
        assert_eq!(visited[4], (4, 2., 1.));
    }

    #[test]
    fn advance_after_finish_is_noop() {
        let mut clock = SimulationClock::new(1, 1.);
        clock.advance();
        clock.advance();
        assert!(clock.is_finished());
        clock.advance();
        assert_eq!(clock.step(), 2);
    }

    #[test]
    fn zero_steps() {
        let clock = SimulationClock::new(0, 1.);
        assert_eq!(clock.progress(), 0.);
        assert!(!clock.is_finished());
    }
}
