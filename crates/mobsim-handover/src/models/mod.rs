//! Link quality model implementations.

pub mod distance;
pub mod linear;

pub use distance::{DistanceCurve, DistanceModel};
pub use linear::{LinearModel, Ramp};
