//! Link quality model interface.

use crate::link::LinkParams;

/// Maps the simulated position of a station to the parameters of its link to one access point.
///
/// Implementations must be pure: evaluating the same position twice yields the same parameters.
/// This is what makes a recorded walk replayable.
pub trait QualityModel {
    /// Returns the link parameters at the specified position.
    fn evaluate(&self, position: f64) -> LinkParams;

    /// Returns the distance between the station and the access point at the specified position,
    /// expressed in the units of the position.
    ///
    /// Used to key synthetic measurement fallbacks.
    fn distance(&self, position: f64) -> f64;
}
