//! Suspension pacing: how long the host should animate between steps.
//!
//! The interpreter never sleeps. After each visible effect it hands the host
//! a state snapshot plus the delay computed here; the host owns the clock.

use crate::world::WorldState;
use std::time::Duration;

/// Baseline delay between visible steps at 1× speed.
pub const BASE_STEP_DELAY: Duration = Duration::from_millis(500);

/// Fixed delay used when the host requests reduced motion.
pub const REDUCED_MOTION_DELAY: Duration = Duration::from_millis(30);

/// Slowest speed multiplier accepted; anything lower is clamped.
const MIN_SPEED: f64 = 0.25;

/// Host-facing pacing configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    /// Scale factor on the baseline delay: 2.0 halves the pause.
    pub speed_multiplier: f64,
    /// Collapse every pause to [`REDUCED_MOTION_DELAY`].
    pub reduced_motion: bool,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            reduced_motion: false,
        }
    }
}

impl Pacing {
    /// The pause the host should apply after one visible step.
    pub fn step_delay(&self) -> Duration {
        if self.reduced_motion {
            return REDUCED_MOTION_DELAY;
        }
        BASE_STEP_DELAY.div_f64(self.speed_multiplier.max(MIN_SPEED))
    }
}

/// Receives a state snapshot at every suspension point.
///
/// Implementations animate the step and wait out `pause` before returning;
/// the interpreter resumes when the call returns.
pub trait StepObserver {
    fn on_step(&mut self, world: &WorldState, pause: Duration);
}

/// Observer for headless runs: ignores every snapshot.
#[derive(Debug, Default)]
pub struct NullObserver;

impl StepObserver for NullObserver {
    fn on_step(&mut self, _world: &WorldState, _pause: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pacing_uses_the_baseline_delay() {
        assert_eq!(Pacing::default().step_delay(), BASE_STEP_DELAY);
    }

    #[test]
    fn doubling_speed_halves_the_delay() {
        let pacing = Pacing {
            speed_multiplier: 2.0,
            reduced_motion: false,
        };
        assert_eq!(pacing.step_delay(), BASE_STEP_DELAY / 2);
    }

    #[test]
    fn reduced_motion_collapses_to_the_fixed_minimum() {
        let pacing = Pacing {
            speed_multiplier: 0.5,
            reduced_motion: true,
        };
        assert_eq!(pacing.step_delay(), REDUCED_MOTION_DELAY);
    }

    #[test]
    fn absurdly_slow_speed_is_clamped() {
        let pacing = Pacing {
            speed_multiplier: 0.0,
            reduced_motion: false,
        };
        assert_eq!(pacing.step_delay(), BASE_STEP_DELAY.div_f64(0.25));
    }
}
