//! Two cascaded first order low pass stages smoothing the commanded joint trajectory.

use crate::kinematic_traits::Joints;

/// Filter state, owned by one controller and reseeded at the start of every motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadedFilter {
    stage1: Joints,
    stage2: Joints,
    gain: f64,
}

impl CascadedFilter {
    /// Gain `dt / (0.1 * settling_time + dt)` of both stages. A larger settling time
    /// gives slower and smoother motion.
    pub fn gain_for(dt: f64, settling_time: f64) -> f64 {
        dt / (0.1 * settling_time + dt)
    }

    /// Creates the filter for the tick period `dt` (seconds), seeded at `seed`.
    pub fn new(dt: f64, settling_time: f64, seed: &Joints) -> Self {
        CascadedFilter {
            stage1: *seed,
            stage2: *seed,
            gain: Self::gain_for(dt, settling_time),
        }
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Reinitializes both stages, must be called before the first tick of a new motion.
    pub fn reset(&mut self, seed: &Joints) {
        self.stage1 = *seed;
        self.stage2 = *seed;
    }

    /// One tick towards the target; returns the new commanded configuration.
    pub fn step(&mut self, target: &Joints) -> Joints {
        let g = self.gain;
        for i in 0..6 {
            self.stage1[i] = (1.0 - g) * self.stage1[i] + g * target[i];
            self.stage2[i] = (1.0 - g) * self.stage2[i] + g * self.stage1[i];
        }
        self.stage2
    }

    pub fn output(&self) -> &Joints {
        &self.stage2
    }
}
