//! Simulation configuration and execution.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use serde_json::json;
use sugars::{rc, refcell};

use crate::clock::SimulationClock;
use crate::context::SimulationContext;
use crate::state::SimulationState;

/// Represents a step-driven simulation: owns the shared clock and random number generator.
pub struct Simulation {
    sim_state: Rc<RefCell<SimulationState>>,
    names: Vec<String>,
}

impl Simulation {
    /// Creates a new simulation with specified random seed and a zero-step clock.
    pub fn new(seed: u64) -> Self {
        Self::with_clock(seed, SimulationClock::default())
    }

    /// Creates a new simulation with specified random seed and clock.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mobsim_core::{Simulation, SimulationClock};
    ///
    /// let sim = Simulation::with_clock(123, SimulationClock::new(10, 0.5));
    /// assert_eq!(sim.step(), 0);
    /// assert_eq!(sim.clock().total_steps(), 10);
    /// ```
    pub fn with_clock(seed: u64, clock: SimulationClock) -> Self {
        Self {
            sim_state: rc!(refcell!(SimulationState::new(seed, clock))),
            names: Vec::new(),
        }
    }

    /// Creates a new simulation context with specified name.
    ///
    /// Component names are informational (they prefix log messages), so the same name may be reused.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mobsim_core::Simulation;
    ///
    /// let mut sim = Simulation::new(123);
    /// let ctx = sim.create_context("walker");
    /// assert_eq!(ctx.name(), "walker");
    /// assert_eq!(ctx.time(), 0.);
    /// ```
    pub fn create_context<S>(&mut self, name: S) -> SimulationContext
    where
        S: AsRef<str>,
    {
        let ctx = SimulationContext::new(name.as_ref(), self.sim_state.clone());
        self.names.push(name.as_ref().to_owned());
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Created context: {}",
            self.time(),
            crate::log::get_colored("DEBUG", colored::Color::Blue),
            json!({"name": ctx.name(), "index": self.names.len() - 1})
        );
        ctx
    }

    /// Returns the names of all created contexts in creation order.
    pub fn context_names(&self) -> &[String] {
        &self.names
    }

    /// Returns a copy of the current clock.
    pub fn clock(&self) -> SimulationClock {
        self.sim_state.borrow().clock()
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Returns the current step index.
    pub fn step(&self) -> u64 {
        self.sim_state.borrow().step()
    }

    /// Returns true once every step of the clock has been visited.
    pub fn is_finished(&self) -> bool {
        self.sim_state.borrow().clock().is_finished()
    }

    /// Moves the clock to the next step.
    pub fn advance(&mut self) {
        self.sim_state.borrow_mut().advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_share_clock() {
        let mut sim = Simulation::with_clock(1, SimulationClock::new(3, 2.));
        let ctx = sim.create_context("a");
        sim.advance();
        sim.advance();
        assert_eq!(ctx.step(), 2);
        assert_eq!(ctx.time(), 4.);
        assert_eq!(sim.context_names(), &["a".to_string()]);
    }

    #[test]
    fn same_seed_same_values() {
        let mut a = Simulation::new(42);
        let mut b = Simulation::new(42);
        let mut ctx_a = a.create_context("a");
        let mut ctx_b = b.create_context("b");
        for _ in 0..10 {
            assert_eq!(ctx_a.gen_range(0.0..10.0), ctx_b.gen_range(0.0..10.0));
        }
        // contexts of one simulation draw from a single generator
        let mut other = a.create_context("other");
        let first = ctx_b.gen_range(0.0..10.0);
        let second = ctx_b.gen_range(0.0..10.0);
        assert_eq!(other.gen_range(0.0..10.0), first);
        assert_eq!(ctx_a.gen_range(0.0..10.0), second);
    }
}
