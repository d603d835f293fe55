//! Slope probing under the character

use pushball_math::Vec3;
use pushball_physics::{CollisionLayer, PhysicsWorld};

/// Steepest slope the character can jump from or push along, in degrees
pub const DEFAULT_MAX_SLOPE_ANGLE: f32 = 40.0;

/// Surface found below the character
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlopeProbe {
    /// Surface normal (unit length)
    pub normal: Vec3,
    /// Angle between the normal and world up, in degrees
    pub angle: f32,
    /// Distance from the probe origin to the surface
    pub distance: f32,
}

/// Downward raycast against ground geometry
#[derive(Clone, Copy, Debug)]
pub struct SlopeAnalyzer {
    pub max_slope_angle: f32,
    pub mask: CollisionLayer,
}

impl Default for SlopeAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SLOPE_ANGLE)
    }
}

impl SlopeAnalyzer {
    pub fn new(max_slope_angle: f32) -> Self {
        Self {
            max_slope_angle,
            mask: CollisionLayer::GROUND,
        }
    }

    /// Cast straight down from `origin`; `None` if no surface within `max_distance`
    pub fn probe_slope(&self, world: &PhysicsWorld, origin: Vec3, max_distance: f32) -> Option<SlopeProbe> {
        let hit = world.raycast(origin, Vec3::DOWN, max_distance, self.mask)?;
        Some(SlopeProbe {
            normal: hit.hit.normal,
            angle: hit.hit.normal.angle_deg(Vec3::UP),
            distance: hit.hit.distance,
        })
    }

    pub fn is_walkable(&self, angle: f32) -> bool {
        angle <= self.max_slope_angle
    }

    /// Project `direction` onto the surface plane and renormalize
    ///
    /// Returns zero when `direction` is parallel to `normal`.
    pub fn push_direction(direction: Vec3, normal: Vec3) -> Vec3 {
        direction.project_on_plane(normal.normalized()).normalized()
    }
}
