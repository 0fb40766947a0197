use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::clock::SimulationClock;

pub struct SimulationState {
    clock: SimulationClock,
    rand: Pcg64,
}

impl SimulationState {
    pub fn new(seed: u64, clock: SimulationClock) -> Self {
        Self {
            clock,
            rand: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn clock(&self) -> SimulationClock {
        self.clock
    }

    pub fn advance(&mut self) {
        self.clock.advance();
    }

    pub fn time(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn step(&self) -> u64 {
        self.clock.step()
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.rand.gen_range(range)
    }
}
