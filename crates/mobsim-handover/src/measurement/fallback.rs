//! Synthetic measurement fallback.

use mobsim_core::{log_debug, SimulationContext};

use crate::measurement::{Measurement, Probe, ProbeSample};

/// Generates plausible probe values from the distance to the access point.
///
/// Distances are converted to meters with `distance_scale` and then mapped to
/// `rtt = 1 + 0.1 * d + U(0, 2)` and a loss drawn from a distance band:
/// `U(0.1, 1)` up to 10 m, `U(1, 5)` up to 50 m and `U(5, 15)` beyond.
/// Random values come from the simulation generator, so runs stay reproducible for a fixed seed.
pub struct SyntheticFallback {
    distance_scale: f64,
    ctx: SimulationContext,
}

impl SyntheticFallback {
    /// Creates a fallback generator.
    pub fn new(distance_scale: f64, ctx: SimulationContext) -> Self {
        Self { distance_scale, ctx }
    }

    /// Returns a synthetic probe for the specified distance in model units.
    pub fn generate(&mut self, distance: f64) -> Probe {
        let meters = (distance * self.distance_scale).abs();
        let rtt_ms = 1. + meters * 0.1 + self.ctx.gen_range(0.0..2.0);
        let loss_pct = if meters <= 10. {
            self.ctx.gen_range(0.1..1.0)
        } else if meters <= 50. {
            self.ctx.gen_range(1.0..5.0)
        } else {
            self.ctx.gen_range(5.0..15.0)
        };
        Probe { rtt_ms, loss_pct }
    }

    /// Turns a measurement into a usable sample, generating synthetic values when it is unavailable.
    pub fn resolve(&mut self, measurement: Measurement, distance: f64) -> ProbeSample {
        match measurement {
            Measurement::Measured(probe) => ProbeSample {
                rtt_ms: probe.rtt_ms,
                loss_pct: probe.loss_pct,
                synthetic: false,
            },
            Measurement::Unavailable(reason) => {
                let probe = self.generate(distance);
                log_debug!(
                    self.ctx,
                    "measurement unavailable ({}), using synthetic rtt {:.2} ms, loss {:.2}%",
                    reason,
                    probe.rtt_ms,
                    probe.loss_pct
                );
                ProbeSample {
                    rtt_ms: probe.rtt_ms,
                    loss_pct: probe.loss_pct,
                    synthetic: true,
                }
            }
        }
    }
}
