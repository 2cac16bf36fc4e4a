//! Explicit simulation clock.
//!
//! The physics driver owns one [`SimulationState`] and passes it to
//! whatever needs the current time or step count; nothing in this crate
//! reads time from a global.

use crate::math::Real;

/// Physical time and step count of a running simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationState {
    physical_time: Real,
    iteration: u64,
}

impl SimulationState {
    /// A state at time zero, before the first step.
    #[inline]
    pub const fn new() -> Self {
        Self {
            physical_time: 0.0,
            iteration: 0,
        }
    }

    /// Current physical time.
    #[inline]
    pub const fn physical_time(&self) -> Real {
        self.physical_time
    }

    /// Number of completed steps.
    #[inline]
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Advances the clock by one step of length `dt`.
    #[inline]
    pub fn advance(&mut self, dt: Real) {
        self.physical_time += dt;
        self.iteration += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_time_and_steps() {
        let mut state = SimulationState::new();
        assert_eq!(state.physical_time(), 0.0);
        assert_eq!(state.iteration(), 0);

        state.advance(1e-4);
        state.advance(2e-4);

        assert!((state.physical_time() - 3e-4).abs() < 1e-15);
        assert_eq!(state.iteration(), 2);
    }
}
