#![warn(missing_docs)]
#![doc = include_str!("../readme.md")]

pub mod clock;
pub mod context;
pub mod log;
pub mod simulation;
mod state;

pub use clock::SimulationClock;
pub use colored;
pub use context::SimulationContext;
pub use simulation::Simulation;
