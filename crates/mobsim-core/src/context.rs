//! Accessing simulation from components.

use std::cell::RefCell;
use std::rc::Rc;

use rand::distributions::uniform::{SampleRange, SampleUniform};

use crate::state::SimulationState;

/// A facade for accessing the simulation clock and random number generator from simulation components.
///
/// All contexts created by the same [`Simulation`](crate::Simulation) observe the same clock
/// and draw from the same seeded generator.
pub struct SimulationContext {
    name: String,
    sim_state: Rc<RefCell<SimulationState>>,
}

impl SimulationContext {
    pub(crate) fn new(name: &str, sim_state: Rc<RefCell<SimulationState>>) -> Self {
        Self {
            name: name.to_owned(),
            sim_state,
        }
    }

    /// Returns the name of component associated with this context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Returns the current step index.
    pub fn step(&self) -> u64 {
        self.sim_state.borrow().step()
    }

    /// Returns a random value in the specified range
    /// using the simulation-wide random number generator.
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.sim_state.borrow_mut().gen_range(range)
    }
}
