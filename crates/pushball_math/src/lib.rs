//! Vector math for the Pushball platformer
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector used for positions, velocities, and impulses
//! - [`Vec2`] - 2D vector used for directional input (aiming)
//!
//! Angle helpers work in degrees because every gameplay tunable
//! (slope limits, aim clamps) is authored in degrees.

mod vec2;
mod vec3;

pub use vec2::Vec2;
pub use vec3::Vec3;

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp_clamped(from: f32, to: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_clamped_midpoint() {
        assert!((lerp_clamped(0.0, 1.0, 0.5) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_lerp_clamped_saturates() {
        assert_eq!(lerp_clamped(0.0, 1.0, 2.0), 1.0);
        assert_eq!(lerp_clamped(0.0, 1.0, -1.0), 0.0);
    }
}
