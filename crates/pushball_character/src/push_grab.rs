//! Grabbing and pushing pushable bodies
//!
//! The character can hold at most one pushable body. While holding, the
//! character's own position is frozen. A push launches either the held body
//! or the first pushable body along the aim direction, then lets go.
//!
//! State machine:
//! - `Idle -> Holding`: holder region touches a pushable body and `can_hold`
//! - `Holding -> Releasing -> Idle`: explicit release, holder contact lost,
//!   movement canceled, a push, or `can_hold` turning false

use log::debug;
use pushball_math::{Vec2, Vec3};
use pushball_physics::{BodyKey, CollisionLayer, Constraints, PhysicsWorld};

use crate::slope::SlopeAnalyzer;

/// Default reach of an unheld push
pub const DEFAULT_PUSH_DISTANCE: f32 = 1.5;
/// Default impulse of a straight push
pub const DEFAULT_MAX_PUSH_FORCE: f32 = 10.0;

/// Grab state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrabState {
    Idle,
    Holding,
    /// Side effects of a release are running
    Releasing,
}

/// Holds, releases and pushes pushable bodies
#[derive(Clone, Debug)]
pub struct PushGrabController {
    state: GrabState,
    held: Option<BodyKey>,
    /// Character constraints from before the grab
    saved_constraints: Option<Constraints>,
    can_hold: bool,
    aimed_angle: f32,

    pub push_distance: f32,
    pub max_push_force: f32,
    /// Layers that can be grabbed and pushed
    pub pushable_mask: CollisionLayer,
    /// Trigger layers that forbid grabbing
    pub exclusion_mask: CollisionLayer,
}

impl Default for PushGrabController {
    fn default() -> Self {
        Self::new(DEFAULT_PUSH_DISTANCE, DEFAULT_MAX_PUSH_FORCE)
    }
}

impl PushGrabController {
    pub fn new(push_distance: f32, max_push_force: f32) -> Self {
        Self {
            state: GrabState::Idle,
            held: None,
            saved_constraints: None,
            can_hold: true,
            aimed_angle: 0.0,
            push_distance,
            max_push_force,
            pushable_mask: CollisionLayer::PUSHABLE,
            exclusion_mask: CollisionLayer::PUSH_EXCLUSION,
        }
    }

    pub fn state(&self) -> GrabState {
        self.state
    }

    pub fn is_holding(&self) -> bool {
        self.state == GrabState::Holding
    }

    /// The held body, if any
    pub fn held(&self) -> Option<BodyKey> {
        self.held
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    /// Aim angle in degrees, 0 = straight ahead, 90 = straight up
    pub fn aimed_angle(&self) -> f32 {
        self.aimed_angle
    }

    /// Update the aim from a 2D input
    ///
    /// The angle is `atan2(|y|, x)`. Inputs pointing backwards (negative x)
    /// are ignored; returns whether the aim changed.
    pub fn set_aim(&mut self, input: Vec2) -> bool {
        if input.x < 0.0 {
            return false;
        }
        self.aimed_angle = input.y.abs().atan2(input.x).to_degrees();
        true
    }

    /// Re-evaluate `can_hold` at the character position
    ///
    /// Losing eligibility while holding releases the held body.
    pub fn refresh_can_hold(&mut self, world: &mut PhysicsWorld, character: BodyKey, center: Vec3, radius: f32) {
        self.can_hold = !world.overlaps_trigger(center, radius, self.exclusion_mask);
        if !self.can_hold && self.is_holding() {
            debug!("Entered push exclusion zone while holding");
            self.release(world, character);
        }
    }

    /// Grab `body` if idle and allowed
    ///
    /// Returns whether the body is now held. Grabbing while already holding
    /// is ignored.
    pub fn try_grab(&mut self, world: &mut PhysicsWorld, character: BodyKey, body: BodyKey) -> bool {
        if self.state != GrabState::Idle || !self.can_hold {
            return false;
        }
        let pushable = world
            .get_body(body)
            .is_some_and(|b| b.filter.layer.intersects(self.pushable_mask));
        if !pushable {
            return false;
        }
        let Some(original) = world.constraints(character) else {
            return false;
        };

        world.set_constraints(character, Constraints::FREEZE_POSITION);
        world.set_velocity(character, Vec3::ZERO);
        world.set_velocity(body, Vec3::ZERO);

        self.saved_constraints = Some(original);
        self.held = Some(body);
        self.state = GrabState::Holding;
        debug!("Grabbed body {:?}", body);
        true
    }

    /// Let go of the held body; no-op when idle
    pub fn release(&mut self, world: &mut PhysicsWorld, character: BodyKey) {
        if self.state != GrabState::Holding {
            return;
        }
        self.state = GrabState::Releasing;

        if let Some(original) = self.saved_constraints.take() {
            world.set_constraints(character, original);
        }
        if let Some(body) = self.held.take() {
            debug!("Released body {:?}", body);
        }

        self.state = GrabState::Idle;
    }

    /// Handle the holder region losing contact with `body`
    pub fn on_contact_lost(&mut self, world: &mut PhysicsWorld, character: BodyKey, body: BodyKey) {
        if self.held == Some(body) {
            self.release(world, character);
        }
    }

    /// Unit push direction for the current aim
    ///
    /// `facing` is +1 or -1. With a surface normal the aim is measured from
    /// the surface tangent instead of the horizontal.
    pub fn aim_direction(&self, facing: f32, surface_normal: Option<Vec3>) -> Vec3 {
        let angle = self.aimed_angle.clamp(-90.0, 90.0).to_radians();
        let forward = Vec3::X * facing.signum();
        let (tangent, up) = match surface_normal {
            Some(normal) => {
                let tangent = SlopeAnalyzer::push_direction(forward, normal);
                if tangent == Vec3::ZERO {
                    (forward, Vec3::UP)
                } else {
                    (tangent, normal.normalized())
                }
            }
            None => (forward, Vec3::UP),
        };
        (tangent * angle.cos() + up * angle.sin()).normalized()
    }

    /// Impulse magnitude for the current aim
    pub fn push_magnitude(&self) -> f32 {
        let angle = self.aimed_angle.clamp(-90.0, 90.0).to_radians();
        self.max_push_force.min(self.max_push_force * angle.cos())
    }

    /// Push the held body, or the first pushable body along the aim
    ///
    /// `origin` is the holder position. Returns the pushed body; `None`
    /// (and no force) when nothing is held and nothing is in range.
    pub fn push(
        &mut self,
        world: &mut PhysicsWorld,
        character: BodyKey,
        origin: Vec3,
        facing: f32,
        surface_normal: Option<Vec3>,
    ) -> Option<BodyKey> {
        let direction = self.aim_direction(facing, surface_normal);

        let target = match self.held.filter(|key| world.get_body(*key).is_some()) {
            Some(held) => Some(held),
            None => world
                .raycast(origin, direction, self.push_distance, self.pushable_mask)
                .and_then(|hit| hit.body()),
        };

        let Some(target) = target else {
            debug!("Push found no target");
            self.release(world, character);
            return None;
        };

        let magnitude = self.push_magnitude();
        world.apply_impulse(target, direction * magnitude);
        debug!("Pushed body {:?} with impulse {:.2}", target, magnitude);

        self.release(world, character);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushball_physics::{CollisionFilter, RigidBody, TriggerVolume};

    fn setup() -> (PhysicsWorld, BodyKey, BodyKey) {
        let mut world = PhysicsWorld::new();
        let character = world.add_body(
            RigidBody::new_sphere(Vec3::ZERO, 0.5)
                .with_filter(CollisionFilter::player())
                .with_gravity(false),
        );
        let ball = world.add_body(
            RigidBody::new_sphere(Vec3::new(1.2, 0.0, 0.0), 0.5)
                .with_filter(CollisionFilter::pushable())
                .with_velocity(Vec3::new(2.0, 0.0, 0.0))
                .with_gravity(false),
        );
        (world, character, ball)
    }

    #[test]
    fn test_aim_angle() {
        let mut grab = PushGrabController::default();
        assert!(grab.set_aim(Vec2::new(0.5, 0.5)));
        assert!((grab.aimed_angle() - 45.0).abs() < 0.001);

        // Downward input mirrors up
        grab.set_aim(Vec2::new(1.0, -1.0));
        assert!((grab.aimed_angle() - 45.0).abs() < 0.001);

        grab.set_aim(Vec2::new(0.0, 1.0));
        assert!((grab.aimed_angle() - 90.0).abs() < 0.001);
    }

    #[test]
    fn test_backward_aim_ignored() {
        let mut grab = PushGrabController::default();
        grab.set_aim(Vec2::new(1.0, 0.0));
        assert!(!grab.set_aim(Vec2::new(-1.0, 1.0)));
        assert_eq!(grab.aimed_angle(), 0.0);
    }

    #[test]
    fn test_grab_freezes_character() {
        let (mut world, character, ball) = setup();
        let mut grab = PushGrabController::default();

        assert!(grab.try_grab(&mut world, character, ball));
        assert!(grab.is_holding());
        assert_eq!(grab.held(), Some(ball));
        assert_eq!(world.constraints(character), Some(Constraints::FREEZE_POSITION));
        assert_eq!(world.velocity(ball), Some(Vec3::ZERO));
    }

    #[test]
    fn test_grab_while_holding_ignored() {
        let (mut world, character, ball) = setup();
        let other = world.add_body(
            RigidBody::new_sphere(Vec3::new(-1.2, 0.0, 0.0), 0.5).with_filter(CollisionFilter::pushable()),
        );
        let mut grab = PushGrabController::default();
        grab.try_grab(&mut world, character, ball);
        assert!(!grab.try_grab(&mut world, character, other));
        assert_eq!(grab.held(), Some(ball));
    }

    #[test]
    fn test_grab_rejects_non_pushable() {
        let (mut world, character, _) = setup();
        let rock = world.add_body(RigidBody::new_sphere(Vec3::new(0.0, 3.0, 0.0), 0.5));
        let mut grab = PushGrabController::default();
        assert!(!grab.try_grab(&mut world, character, rock));
    }

    #[test]
    fn test_release_restores_constraints() {
        let (mut world, character, ball) = setup();
        let original = world.constraints(character).unwrap();
        let mut grab = PushGrabController::default();
        grab.try_grab(&mut world, character, ball);

        grab.release(&mut world, character);
        assert_eq!(grab.state(), GrabState::Idle);
        assert!(grab.held().is_none());
        assert_eq!(world.constraints(character), Some(original));
    }

    #[test]
    fn test_release_when_idle_is_noop() {
        let (mut world, character, _) = setup();
        world.set_constraints(character, Constraints::FREEZE_POSITION_Y);
        let mut grab = PushGrabController::default();
        grab.release(&mut world, character);
        assert_eq!(grab.state(), GrabState::Idle);
        assert_eq!(world.constraints(character), Some(Constraints::FREEZE_POSITION_Y));
    }

    #[test]
    fn test_contact_lost_releases_only_held_body() {
        let (mut world, character, ball) = setup();
        let other = world.add_body(RigidBody::new_sphere(Vec3::new(5.0, 0.0, 0.0), 0.5));
        let mut grab = PushGrabController::default();
        grab.try_grab(&mut world, character, ball);

        grab.on_contact_lost(&mut world, character, other);
        assert!(grab.is_holding());
        grab.on_contact_lost(&mut world, character, ball);
        assert!(!grab.is_holding());
    }

    #[test]
    fn test_exclusion_zone_blocks_and_releases() {
        let (mut world, character, ball) = setup();
        world.add_trigger(TriggerVolume::push_exclusion(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)));
        let mut grab = PushGrabController::default();

        grab.refresh_can_hold(&mut world, character, Vec3::ZERO, 0.5);
        assert!(grab.can_hold());
        grab.try_grab(&mut world, character, ball);

        grab.refresh_can_hold(&mut world, character, Vec3::new(10.0, 0.0, 0.0), 0.5);
        assert!(!grab.can_hold());
        assert!(!grab.is_holding());
        assert!(!grab.try_grab(&mut world, character, ball));
    }

    #[test]
    fn test_push_held_body() {
        let (mut world, character, ball) = setup();
        let mut grab = PushGrabController::default();
        grab.try_grab(&mut world, character, ball);

        let pushed = grab.push(&mut world, character, Vec3::new(0.6, 0.0, 0.0), 1.0, None);
        assert_eq!(pushed, Some(ball));
        assert!(!grab.is_holding());
        let v = world.velocity(ball).unwrap();
        assert!((v.x - DEFAULT_MAX_PUSH_FORCE).abs() < 0.001);
        assert!(v.y.abs() < 0.001);
    }

    #[test]
    fn test_push_raycast_target() {
        let (mut world, character, ball) = setup();
        let mut grab = PushGrabController::default();

        let pushed = grab.push(&mut world, character, Vec3::ZERO, 1.0, None);
        assert_eq!(pushed, Some(ball));
        assert!(world.velocity(ball).unwrap().x > 2.0);
    }

    #[test]
    fn test_push_facing_away_misses() {
        let (mut world, character, ball) = setup();
        let mut grab = PushGrabController::default();
        assert_eq!(grab.push(&mut world, character, Vec3::ZERO, -1.0, None), None);
        assert_eq!(world.velocity(ball), Some(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aimed_push_direction_and_magnitude() {
        let mut grab = PushGrabController::default();
        grab.set_aim(Vec2::new(0.5, 0.5));

        let dir = grab.aim_direction(-1.0, None);
        let c = 45f32.to_radians().cos();
        assert!((dir.x + c).abs() < 0.0001);
        assert!((dir.y - c).abs() < 0.0001);
        assert!((grab.push_magnitude() - DEFAULT_MAX_PUSH_FORCE * c).abs() < 0.0001);
    }

    #[test]
    fn test_aim_follows_surface() {
        let grab = PushGrabController::default();
        let normal = Vec3::new(-(20f32.to_radians().sin()), 20f32.to_radians().cos(), 0.0);
        let dir = grab.aim_direction(1.0, Some(normal));
        assert!(dir.dot(normal).abs() < 0.0001);
        assert!(dir.y > 0.0);
    }
}
