//! Smoothed horizontal movement

use pushball_math::lerp_clamped;

/// Default rate at which velocity approaches the input target
pub const DEFAULT_DAMPING_RATE: f32 = 5.0;

/// Exponential-ish smoothing of the movement axis
///
/// `tick` runs once per fixed step:
/// `current = lerp(current, target, clamp(dt * damping_rate, 0, 1))`.
#[derive(Clone, Copy, Debug)]
pub struct MovementIntegrator {
    current: f32,
    target: f32,
    pub damping_rate: f32,
}

impl Default for MovementIntegrator {
    fn default() -> Self {
        Self::new(DEFAULT_DAMPING_RATE)
    }
}

impl MovementIntegrator {
    pub fn new(damping_rate: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            damping_rate,
        }
    }

    /// Set the input target, clamped to [-1, 1]
    pub fn set_target(&mut self, value: f32) {
        self.target = value.clamp(-1.0, 1.0);
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Advance the smoothing by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.current = lerp_clamped(self.current, self.target, dt * self.damping_rate);
        self.current
    }

    /// Horizontal velocity for the current smoothed value
    pub fn velocity(&self, max_speed: f32) -> f32 {
        self.current * max_speed
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
        self.target = 0.0;
    }
}
