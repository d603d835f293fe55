//! Physics world, simulation step, and scene queries

use log::trace;
use pushball_math::Vec3;
use slotmap::{new_key_type, SlotMap};

use crate::body::{BodyKey, Constraints, RigidBody, StaticCollider, TriggerVolume};
use crate::collision::{
    aabb_vs_aabb, aabb_vs_plane, ray_vs_collider, sphere_overlaps, sphere_vs_aabb,
    sphere_vs_plane, sphere_vs_sphere, CollisionLayer, Contact, RayHit,
};
use crate::shapes::{Collider, Ray, Sphere};

/// Configuration for the physics simulation
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    /// Gravity acceleration (applied to Y-axis, negative = down)
    pub gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { gravity: -9.81 }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity
    pub fn new(gravity: f32) -> Self {
        Self { gravity }
    }
}

new_key_type! {
    /// Key to a sensor in the physics world
    pub struct SensorKey;
}

/// A spherical region that reports bodies entering and leaving it
///
/// Sensors never push anything. When attached to a body the sensor follows
/// it, offset by `offset`.
#[derive(Clone, Debug)]
pub struct Sensor {
    pub radius: f32,
    pub offset: Vec3,
    pub attached_to: Option<BodyKey>,
    /// Only bodies on these layers are reported
    pub mask: CollisionLayer,
    touching: Vec<BodyKey>,
}

impl Sensor {
    pub fn new(radius: f32, offset: Vec3, attached_to: Option<BodyKey>, mask: CollisionLayer) -> Self {
        Self {
            radius,
            offset,
            attached_to,
            mask,
            touching: Vec::new(),
        }
    }

    /// Bodies currently inside the sensor
    pub fn touching(&self) -> &[BodyKey] {
        &self.touching
    }
}

/// Whether a sensor contact started or ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Exit,
}

/// Contact change reported by a sensor during a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorEvent {
    pub sensor: SensorKey,
    pub body: BodyKey,
    pub phase: ContactPhase,
}

/// What a world ray query hit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Body(BodyKey),
    /// Index into the static collider list
    Static(usize),
}

/// Result of [`PhysicsWorld::raycast`]
#[derive(Clone, Copy, Debug)]
pub struct WorldHit {
    pub hit: RayHit,
    pub target: HitTarget,
}

impl WorldHit {
    /// The body that was hit, if the hit was not static geometry
    pub fn body(&self) -> Option<BodyKey> {
        match self.target {
            HitTarget::Body(key) => Some(key),
            HitTarget::Static(_) => None,
        }
    }
}

/// The physics world containing all rigid bodies
pub struct PhysicsWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    static_colliders: Vec<StaticCollider>,
    triggers: Vec<TriggerVolume>,
    sensors: SlotMap<SensorKey, Sensor>,
    sensor_events: Vec<SensorEvent>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            static_colliders: Vec::new(),
            triggers: Vec::new(),
            sensors: SlotMap::with_key(),
            sensor_events: Vec::new(),
            config,
        }
    }

    pub fn add_static_collider(&mut self, collider: StaticCollider) {
        self.static_colliders.push(collider);
    }

    pub fn static_colliders(&self) -> &[StaticCollider] {
        &self.static_colliders
    }

    pub fn add_trigger(&mut self, trigger: TriggerVolume) {
        self.triggers.push(trigger);
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.bodies.remove(key)
    }

    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // --- Body accessors used by gameplay code ---

    pub fn velocity(&self, key: BodyKey) -> Option<Vec3> {
        self.bodies.get(key).map(|b| b.velocity)
    }

    /// Returns false if the body no longer exists
    pub fn set_velocity(&mut self, key: BodyKey, velocity: Vec3) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                body.velocity = body.constraints.mask(velocity);
                true
            }
            None => false,
        }
    }

    pub fn constraints(&self, key: BodyKey) -> Option<Constraints> {
        self.bodies.get(key).map(|b| b.constraints)
    }

    /// Returns false if the body no longer exists
    pub fn set_constraints(&mut self, key: BodyKey, constraints: Constraints) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                body.constraints = constraints;
                body.velocity = constraints.mask(body.velocity);
                true
            }
            None => false,
        }
    }

    /// Returns false if the body no longer exists
    pub fn apply_impulse(&mut self, key: BodyKey, impulse: Vec3) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                body.apply_impulse(impulse);
                true
            }
            None => false,
        }
    }

    // --- Sensors ---

    pub fn add_sensor(&mut self, sensor: Sensor) -> SensorKey {
        self.sensors.insert(sensor)
    }

    pub fn remove_sensor(&mut self, key: SensorKey) -> Option<Sensor> {
        self.sensors.remove(key)
    }

    pub fn get_sensor(&self, key: SensorKey) -> Option<&Sensor> {
        self.sensors.get(key)
    }

    /// Move a sensor relative to the body it is attached to
    pub fn set_sensor_offset(&mut self, key: SensorKey, offset: Vec3) {
        if let Some(sensor) = self.sensors.get_mut(key) {
            sensor.offset = offset;
        }
    }

    /// World-space center of a sensor
    ///
    /// `None` if the sensor is gone or its body has been removed.
    pub fn sensor_center(&self, key: SensorKey) -> Option<Vec3> {
        let sensor = self.sensors.get(key)?;
        Self::resolve_sensor_center(&self.bodies, sensor)
    }

    fn resolve_sensor_center(bodies: &SlotMap<BodyKey, RigidBody>, sensor: &Sensor) -> Option<Vec3> {
        match sensor.attached_to {
            Some(body) => bodies.get(body).map(|b| b.position + sensor.offset),
            None => Some(sensor.offset),
        }
    }

    /// Drain the sensor contact changes accumulated since the last call
    pub fn take_sensor_events(&mut self) -> Vec<SensorEvent> {
        std::mem::take(&mut self.sensor_events)
    }

    // --- Queries ---

    /// Check whether a sphere overlaps any static collider or body on `mask`
    pub fn overlap_sphere(&self, center: Vec3, radius: f32, mask: CollisionLayer) -> bool {
        let sphere = Sphere::new(center, radius);
        self.static_colliders
            .iter()
            .filter(|s| s.filter.layer.intersects(mask))
            .any(|s| sphere_overlaps(&sphere, &s.collider))
            || self
                .bodies
                .values()
                .filter(|b| b.filter.layer.intersects(mask))
                .any(|b| sphere_overlaps(&sphere, &b.collider))
    }

    /// Check whether a sphere overlaps any trigger volume on `mask`
    pub fn overlaps_trigger(&self, center: Vec3, radius: f32, mask: CollisionLayer) -> bool {
        let sphere = Sphere::new(center, radius);
        self.triggers
            .iter()
            .filter(|t| t.layer.intersects(mask))
            .any(|t| sphere_overlaps(&sphere, &t.collider))
    }

    /// Cast a ray and return the closest hit on `mask` within `max_distance`
    ///
    /// Colliders containing the ray origin are not reported.
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: CollisionLayer,
    ) -> Option<WorldHit> {
        let ray = Ray::new(origin, direction);
        let mut best: Option<WorldHit> = None;

        let mut consider = |hit: Option<RayHit>, target: HitTarget| {
            if let Some(hit) = hit {
                if best.map_or(true, |b| hit.distance < b.hit.distance) {
                    best = Some(WorldHit { hit, target });
                }
            }
        };

        for (index, s) in self.static_colliders.iter().enumerate() {
            if s.filter.layer.intersects(mask) {
                consider(ray_vs_collider(&ray, &s.collider, max_distance), HitTarget::Static(index));
            }
        }
        for (key, b) in &self.bodies {
            if b.filter.layer.intersects(mask) {
                consider(ray_vs_collider(&ray, &b.collider, max_distance), HitTarget::Body(key));
            }
        }

        best
    }

    // --- Simulation ---

    /// Step the physics simulation forward by dt seconds
    ///
    /// This performs:
    /// 1. Gravity and velocity integration for non-static bodies
    /// 2. Static collider collision resolution
    /// 3. Body-body collision resolution
    /// 4. Sensor contact tracking
    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if body.is_static {
                continue;
            }

            if body.affected_by_gravity {
                body.velocity.y += self.config.gravity * dt;
            }
            body.velocity = body.constraints.mask(body.velocity);

            let displacement = body.velocity * dt;
            body.position += displacement;
            body.collider = body.collider.translated(displacement);
        }

        self.resolve_static_collisions();
        self.resolve_body_collisions();
        self.update_sensors();
    }

    /// Contact between a moving body and a static collider
    ///
    /// The normal points from the static collider toward the body.
    fn check_static_collision(body_collider: &Collider, static_collider: &Collider) -> Option<Contact> {
        match (body_collider, static_collider) {
            (Collider::Sphere(sphere), Collider::Plane(plane)) => sphere_vs_plane(sphere, plane),
            (Collider::Aabb(aabb), Collider::Plane(plane)) => aabb_vs_plane(aabb, plane),
            (Collider::Sphere(sphere), Collider::Aabb(aabb)) => sphere_vs_aabb(sphere, aabb),
            (Collider::Aabb(body_aabb), Collider::Aabb(static_aabb)) => aabb_vs_aabb(body_aabb, static_aabb),
            (Collider::Sphere(body_sphere), Collider::Sphere(static_sphere)) => {
                sphere_vs_sphere(static_sphere, body_sphere)
            }
            (Collider::Aabb(aabb), Collider::Sphere(sphere)) => sphere_vs_aabb(sphere, aabb).map(|mut c| {
                c.normal = -c.normal;
                c
            }),
            (Collider::Plane(_), _) => None,
        }
    }

    fn resolve_static_collisions(&mut self) {
        for body in self.bodies.values_mut() {
            if body.is_static {
                continue;
            }

            for static_col in &self.static_colliders {
                if !body.filter.collides_with(&static_col.filter) {
                    continue;
                }
                let Some(contact) = Self::check_static_collision(&body.collider, &static_col.collider) else {
                    continue;
                };
                if !contact.is_colliding() {
                    continue;
                }

                body.apply_correction(contact.normal * contact.penetration);

                let combined = body.material.combine(&static_col.material);
                let velocity_along_normal = body.velocity.dot(contact.normal);
                if velocity_along_normal < 0.0 {
                    let normal_velocity = contact.normal * velocity_along_normal;
                    body.velocity -= normal_velocity * (1.0 + combined.restitution);

                    let tangent_velocity =
                        body.velocity - contact.normal * body.velocity.dot(contact.normal);
                    if tangent_velocity.length() > 0.0001 {
                        let friction_factor = 1.0 - combined.friction;
                        body.velocity = contact.normal * body.velocity.dot(contact.normal)
                            + tangent_velocity * friction_factor;
                    }
                    body.velocity = body.constraints.mask(body.velocity);
                }
            }
        }
    }

    fn resolve_body_collisions(&mut self) {
        let keys: Vec<BodyKey> = self.bodies.keys().collect();

        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let (key_a, key_b) = (keys[i], keys[j]);

                let (collider_a, collider_b, is_static_a, is_static_b, allowed) = {
                    let a = &self.bodies[key_a];
                    let b = &self.bodies[key_b];
                    (a.collider, b.collider, a.is_static, b.is_static, a.filter.collides_with(&b.filter))
                };

                if (is_static_a && is_static_b) || !allowed {
                    continue;
                }

                // Contact normal convention: FROM body A TOWARD body B
                let contact = match (&collider_a, &collider_b) {
                    (Collider::Sphere(a), Collider::Sphere(b)) => sphere_vs_sphere(a, b),
                    (Collider::Sphere(sphere), Collider::Aabb(aabb)) => sphere_vs_aabb(sphere, aabb).map(|mut c| {
                        c.normal = -c.normal;
                        c
                    }),
                    (Collider::Aabb(aabb), Collider::Sphere(sphere)) => sphere_vs_aabb(sphere, aabb),
                    (Collider::Aabb(a), Collider::Aabb(b)) => aabb_vs_aabb(a, b).map(|mut c| {
                        c.normal = -c.normal;
                        c
                    }),
                    (Collider::Plane(_), _) | (_, Collider::Plane(_)) => None,
                };

                if let Some(contact) = contact {
                    if contact.is_colliding() {
                        self.resolve_body_pair(key_a, key_b, &contact, is_static_a, is_static_b);
                    }
                }
            }
        }
    }

    fn resolve_body_pair(
        &mut self,
        key_a: BodyKey,
        key_b: BodyKey,
        contact: &Contact,
        is_static_a: bool,
        is_static_b: bool,
    ) {
        let (correction_a, correction_b) = if is_static_a {
            (Vec3::ZERO, contact.normal * contact.penetration)
        } else if is_static_b {
            (-contact.normal * contact.penetration, Vec3::ZERO)
        } else {
            let mass_a = self.bodies[key_a].mass;
            let mass_b = self.bodies[key_b].mass;
            let total_mass = mass_a + mass_b;
            (
                -contact.normal * contact.penetration * (mass_b / total_mass),
                contact.normal * contact.penetration * (mass_a / total_mass),
            )
        };

        if !is_static_a {
            self.bodies[key_a].apply_correction(correction_a);
        }
        if !is_static_b {
            self.bodies[key_b].apply_correction(correction_b);
        }

        let combined = self.bodies[key_a].material.combine(&self.bodies[key_b].material);

        for (key, is_static, normal) in [
            (key_a, is_static_a, -contact.normal),
            (key_b, is_static_b, contact.normal),
        ] {
            if is_static {
                continue;
            }
            let body = &mut self.bodies[key];
            let vel_along_normal = body.velocity.dot(normal);
            if vel_along_normal < 0.0 {
                body.velocity -= normal * vel_along_normal * (1.0 + combined.restitution);
                body.velocity = body.constraints.mask(body.velocity);
            }
        }
    }

    /// Recompute sensor overlaps and queue enter/exit events
    fn update_sensors(&mut self) {
        for (sensor_key, sensor) in &mut self.sensors {
            let Some(center) = Self::resolve_sensor_center(&self.bodies, sensor) else {
                // Owner is gone: everything it touched leaves
                for body in sensor.touching.drain(..) {
                    self.sensor_events.push(SensorEvent {
                        sensor: sensor_key,
                        body,
                        phase: ContactPhase::Exit,
                    });
                }
                continue;
            };

            let query = Sphere::new(center, sensor.radius);
            let now: Vec<BodyKey> = self
                .bodies
                .iter()
                .filter(|(key, _)| Some(*key) != sensor.attached_to)
                .filter(|(_, b)| b.filter.layer.intersects(sensor.mask))
                .filter(|(_, b)| sphere_overlaps(&query, &b.collider))
                .map(|(key, _)| key)
                .collect();

            for body in sensor.touching.iter().filter(|k| !now.contains(k)) {
                trace!("sensor {:?} lost contact with {:?}", sensor_key, body);
                self.sensor_events.push(SensorEvent {
                    sensor: sensor_key,
                    body: *body,
                    phase: ContactPhase::Exit,
                });
            }
            for body in now.iter().filter(|k| !sensor.touching.contains(k)) {
                trace!("sensor {:?} touched {:?}", sensor_key, body);
                self.sensor_events.push(SensorEvent {
                    sensor: sensor_key,
                    body: *body,
                    phase: ContactPhase::Enter,
                });
            }
            sensor.touching = now;
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionFilter;
    use crate::material::PhysicsMaterial;

    fn world_with_floor() -> PhysicsWorld {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(-10.0));
        world.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::CONCRETE));
        world
    }

    fn ball(position: Vec3) -> RigidBody {
        RigidBody::new_sphere(position, 0.5).with_filter(CollisionFilter::pushable())
    }

    #[test]
    fn test_stale_key_returns_none() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(ball(Vec3::ZERO));
        assert!(world.remove_body(key).is_some());
        assert!(world.get_body(key).is_none());
        assert!(world.velocity(key).is_none());
        assert!(!world.apply_impulse(key, Vec3::X));
        assert!(!world.set_velocity(key, Vec3::X));
    }

    #[test]
    fn test_gravity_pulls_body_down() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(-10.0));
        let key = world.add_body(ball(Vec3::new(0.0, 5.0, 0.0)));
        world.step(0.1);
        let body = world.get_body(key).unwrap();
        assert!(body.velocity.y < 0.0);
        assert!(body.position.y < 5.0);
    }

    #[test]
    fn test_body_rests_on_floor() {
        let mut world = world_with_floor();
        let key = world.add_body(ball(Vec3::new(0.0, 2.0, 0.0)));
        for _ in 0..200 {
            world.step(0.02);
        }
        let body = world.get_body(key).unwrap();
        assert!(body.position.y >= 0.5 - 0.05);
        assert!(body.position.y < 0.6);
    }

    #[test]
    fn test_frozen_body_does_not_fall() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(-10.0));
        let key = world.add_body(
            ball(Vec3::new(0.0, 5.0, 0.0)).with_constraints(Constraints::FREEZE_POSITION),
        );
        world.step(0.1);
        assert_eq!(world.get_body(key).unwrap().position, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_overlap_sphere_respects_mask() {
        let world = world_with_floor();
        assert!(world.overlap_sphere(Vec3::new(0.0, 0.1, 0.0), 0.2, CollisionLayer::GROUND));
        assert!(!world.overlap_sphere(Vec3::new(0.0, 0.1, 0.0), 0.2, CollisionLayer::PUSHABLE));
        assert!(!world.overlap_sphere(Vec3::new(0.0, 3.0, 0.0), 0.2, CollisionLayer::GROUND));
    }

    #[test]
    fn test_raycast_returns_closest_body() {
        let mut world = world_with_floor();
        let near = world.add_body(ball(Vec3::new(2.0, 1.0, 0.0)));
        let _far = world.add_body(ball(Vec3::new(5.0, 1.0, 0.0)));

        let hit = world
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 10.0, CollisionLayer::PUSHABLE)
            .unwrap();
        assert_eq!(hit.body(), Some(near));
        assert!((hit.hit.distance - 1.5).abs() < 0.0001);
    }

    #[test]
    fn test_raycast_reports_static_geometry() {
        let world = world_with_floor();
        let hit = world
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::DOWN, 5.0, CollisionLayer::GROUND)
            .unwrap();
        assert_eq!(hit.target, HitTarget::Static(0));
        assert!(hit.body().is_none());
    }

    #[test]
    fn test_sensor_enter_and_exit_events() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(0.0));
        let sensor = world.add_sensor(Sensor::new(0.5, Vec3::ZERO, None, CollisionLayer::PUSHABLE));
        let key = world.add_body(ball(Vec3::new(0.8, 0.0, 0.0)));

        world.step(0.01);
        assert_eq!(
            world.take_sensor_events(),
            vec![SensorEvent { sensor, body: key, phase: ContactPhase::Enter }]
        );

        // No change, no events
        world.step(0.01);
        assert!(world.take_sensor_events().is_empty());

        world.get_body_mut(key).unwrap().set_position(Vec3::new(5.0, 0.0, 0.0));
        world.step(0.01);
        assert_eq!(
            world.take_sensor_events(),
            vec![SensorEvent { sensor, body: key, phase: ContactPhase::Exit }]
        );
    }

    #[test]
    fn test_sensor_reports_exit_for_removed_body() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(0.0));
        let sensor = world.add_sensor(Sensor::new(0.5, Vec3::ZERO, None, CollisionLayer::PUSHABLE));
        let key = world.add_body(ball(Vec3::ZERO));
        world.step(0.01);
        world.take_sensor_events();

        world.remove_body(key);
        world.step(0.01);
        let events = world.take_sensor_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, ContactPhase::Exit);
        assert!(world.get_sensor(sensor).unwrap().touching().is_empty());
    }

    #[test]
    fn test_attached_sensor_ignores_owner() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(0.0));
        let owner = world.add_body(ball(Vec3::ZERO));
        world.add_sensor(Sensor::new(1.0, Vec3::new(0.5, 0.0, 0.0), Some(owner), CollisionLayer::ALL));
        world.step(0.01);
        assert!(world.take_sensor_events().is_empty());
    }

    #[test]
    fn test_trigger_overlap() {
        let mut world = PhysicsWorld::new();
        world.add_trigger(TriggerVolume::push_exclusion(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0)));
        assert!(world.overlaps_trigger(Vec3::new(1.2, 0.0, 0.0), 0.5, CollisionLayer::PUSH_EXCLUSION));
        assert!(!world.overlaps_trigger(Vec3::new(3.0, 0.0, 0.0), 0.5, CollisionLayer::PUSH_EXCLUSION));
        assert!(!world.overlaps_trigger(Vec3::ZERO, 0.5, CollisionLayer::TRIGGER));
    }

    #[test]
    fn test_set_constraints_clears_frozen_velocity() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(ball(Vec3::ZERO).with_velocity(Vec3::new(1.0, 2.0, 0.0)));
        world.set_constraints(key, Constraints::FREEZE_POSITION);
        assert_eq!(world.velocity(key), Some(Vec3::ZERO));
    }
}
