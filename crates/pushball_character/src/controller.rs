//! Character controller
//!
//! Composes ground detection, slope probing, movement smoothing and the
//! push/grab state machine around one rigid body in a [`PhysicsWorld`].
//!
//! Two update rates:
//! - [`update`](CharacterController::update) every frame writes the
//!   smoothed horizontal velocity to the body
//! - [`fixed_update`](CharacterController::fixed_update) after each physics
//!   step advances smoothing and reacts to holder contacts

use log::debug;
use pushball_input::{Action, ActionEvent, ActionPhase};
use pushball_math::Vec3;
use pushball_physics::{
    BodyKey, CollisionFilter, CollisionLayer, ContactPhase, PhysicsMaterial, PhysicsWorld,
    RigidBody, Sensor, SensorEvent, SensorKey,
};
use serde::{Deserialize, Serialize};

use crate::ground::GroundSensor;
use crate::movement::MovementIntegrator;
use crate::push_grab::{GrabState, PushGrabController};
use crate::slope::SlopeAnalyzer;

/// Tunables for the character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Horizontal speed at full input
    pub max_speed: f32,
    /// Rate at which velocity approaches the input target
    pub damping_rate: f32,
    /// Upward impulse applied by a jump
    pub jump_factor: f32,
    pub ground_check_radius: f32,
    /// Vertical offset of the ground check from the body center
    pub ground_check_offset: f32,
    pub slope_probe_distance: f32,
    /// Steepest walkable slope in degrees
    pub max_slope_angle: f32,
    pub push_distance: f32,
    pub max_push_force: f32,
    /// Horizontal distance of the holder region in front of the body
    pub holder_offset: f32,
    pub holder_radius: f32,
    /// Radius of the character's own collision sphere
    pub body_radius: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            damping_rate: 5.0,
            jump_factor: 7.0,
            ground_check_radius: 0.2,
            ground_check_offset: -0.5,
            slope_probe_distance: 1.5,
            max_slope_angle: 40.0,
            push_distance: 1.5,
            max_push_force: 10.0,
            holder_offset: 0.6,
            holder_radius: 0.4,
            body_radius: 0.5,
        }
    }
}

/// Snapshot of the character's gameplay state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterState {
    /// Movement input target in [-1, 1]
    pub move_target: f32,
    /// Smoothed movement value in [-1, 1]
    pub velocity: f32,
    pub grounded: bool,
    pub holding: bool,
    pub can_hold: bool,
    /// Aim angle in degrees
    pub aimed_angle: f32,
    /// +1 facing right, -1 facing left
    pub facing: f32,
}

/// Errors from the character controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The character's body is no longer in the physics world
    MissingBody,
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::MissingBody => write!(f, "Character body missing from physics world"),
        }
    }
}

impl std::error::Error for ControllerError {}

/// Drives one character body
pub struct CharacterController {
    body: BodyKey,
    holder: SensorKey,
    config: CharacterConfig,
    ground: GroundSensor,
    slope: SlopeAnalyzer,
    movement: MovementIntegrator,
    grab: PushGrabController,
    facing: f32,
    grounded: bool,
}

impl CharacterController {
    /// Add a character body at `position` and build a controller for it
    pub fn spawn(world: &mut PhysicsWorld, position: Vec3, config: CharacterConfig) -> Self {
        let body = world.add_body(
            RigidBody::new_sphere(position, config.body_radius)
                .with_filter(CollisionFilter::player())
                .with_material(PhysicsMaterial::FRICTIONLESS),
        );
        let holder = world.add_sensor(Self::holder_sensor(body, &config, 1.0));
        Self::from_parts(body, holder, config)
    }

    /// Build a controller for an existing body
    ///
    /// A holder sensor is attached to the body.
    pub fn new(world: &mut PhysicsWorld, body: BodyKey, config: CharacterConfig) -> Result<Self, ControllerError> {
        if world.get_body(body).is_none() {
            return Err(ControllerError::MissingBody);
        }
        let holder = world.add_sensor(Self::holder_sensor(body, &config, 1.0));
        Ok(Self::from_parts(body, holder, config))
    }

    fn holder_sensor(body: BodyKey, config: &CharacterConfig, facing: f32) -> Sensor {
        Sensor::new(
            config.holder_radius,
            Vec3::new(config.holder_offset * facing, 0.0, 0.0),
            Some(body),
            CollisionLayer::PUSHABLE,
        )
    }

    fn from_parts(body: BodyKey, holder: SensorKey, config: CharacterConfig) -> Self {
        Self {
            body,
            holder,
            ground: GroundSensor::new(Vec3::new(0.0, config.ground_check_offset, 0.0), config.ground_check_radius),
            slope: SlopeAnalyzer::new(config.max_slope_angle),
            movement: MovementIntegrator::new(config.damping_rate),
            grab: PushGrabController::new(config.push_distance, config.max_push_force),
            facing: 1.0,
            grounded: false,
            config,
        }
    }

    pub fn body(&self) -> BodyKey {
        self.body
    }

    pub fn holder(&self) -> SensorKey {
        self.holder
    }

    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    pub fn grab_state(&self) -> GrabState {
        self.grab.state()
    }

    /// The held body, if any
    pub fn held(&self) -> Option<BodyKey> {
        self.grab.held()
    }

    pub fn state(&self) -> CharacterState {
        CharacterState {
            move_target: self.movement.target(),
            velocity: self.movement.current(),
            grounded: self.grounded,
            holding: self.grab.is_holding(),
            can_hold: self.grab.can_hold(),
            aimed_angle: self.grab.aimed_angle(),
            facing: self.facing,
        }
    }

    pub fn position(&self, world: &PhysicsWorld) -> Result<Vec3, ControllerError> {
        world
            .get_body(self.body)
            .map(|b| b.position)
            .ok_or(ControllerError::MissingBody)
    }

    /// React to one input event
    pub fn handle_action(&mut self, world: &mut PhysicsWorld, event: ActionEvent) -> Result<(), ControllerError> {
        match (event.action, event.phase) {
            (Action::Move, ActionPhase::Started | ActionPhase::Performed) => {
                let value = event.value.axis();
                self.movement.set_target(value);
                if value != 0.0 {
                    self.face(world, value.signum());
                }
            }
            (Action::Move, ActionPhase::Canceled) => {
                self.movement.set_target(0.0);
                self.grab.release(world, self.body);
            }
            (Action::Jump, ActionPhase::Performed) => {
                self.jump(world)?;
            }
            (Action::Push, ActionPhase::Performed) => {
                self.push(world)?;
            }
            (Action::Release, ActionPhase::Performed) => {
                self.grab.release(world, self.body);
            }
            (Action::Aim, ActionPhase::Performed) => {
                self.grab.set_aim(event.value.vector2());
            }
            _ => {}
        }
        Ok(())
    }

    fn face(&mut self, world: &mut PhysicsWorld, facing: f32) {
        if facing == self.facing {
            return;
        }
        self.facing = facing;
        world.set_sensor_offset(self.holder, Vec3::new(self.config.holder_offset * facing, 0.0, 0.0));
        debug!("Character now facing {}", if facing > 0.0 { "right" } else { "left" });
    }

    /// Jump if grounded on a walkable surface
    ///
    /// Returns whether the jump impulse was applied.
    pub fn jump(&mut self, world: &mut PhysicsWorld) -> Result<bool, ControllerError> {
        let position = self.position(world)?;
        self.grounded = self.ground.is_grounded(world, position);
        if !self.grounded {
            debug!("Jump ignored: not grounded");
            return Ok(false);
        }
        if let Some(probe) = self.slope.probe_slope(world, position, self.config.slope_probe_distance) {
            if !self.slope.is_walkable(probe.angle) {
                debug!("Jump ignored: slope {:.1} too steep", probe.angle);
                return Ok(false);
            }
        }
        world.apply_impulse(self.body, Vec3::UP * self.config.jump_factor);
        Ok(true)
    }

    /// Push the held body or whatever pushable body is in front
    ///
    /// On a walkable slope the push follows the surface.
    pub fn push(&mut self, world: &mut PhysicsWorld) -> Result<Option<BodyKey>, ControllerError> {
        let position = self.position(world)?;
        let origin = world.sensor_center(self.holder).unwrap_or(position);
        let surface = self
            .slope
            .probe_slope(world, position, self.config.slope_probe_distance)
            .filter(|probe| self.slope.is_walkable(probe.angle))
            .map(|probe| probe.normal);
        Ok(self.grab.push(world, self.body, origin, self.facing, surface))
    }

    /// Release whatever is held
    pub fn release(&mut self, world: &mut PhysicsWorld) {
        self.grab.release(world, self.body);
    }

    /// Per-frame update: write the smoothed horizontal velocity
    ///
    /// Vertical velocity is left to the physics world.
    pub fn update(&mut self, world: &mut PhysicsWorld) -> Result<(), ControllerError> {
        let mut velocity = world.velocity(self.body).ok_or(ControllerError::MissingBody)?;
        velocity.x = self.movement.velocity(self.config.max_speed);
        world.set_velocity(self.body, velocity);
        Ok(())
    }

    /// Fixed-step update, run after each physics step
    ///
    /// Drains the world's sensor events; events for other sensors are
    /// dropped.
    pub fn fixed_update(&mut self, world: &mut PhysicsWorld, dt: f32) -> Result<(), ControllerError> {
        let position = self.position(world)?;
        self.movement.tick(dt);
        self.grounded = self.ground.is_grounded(world, position);
        self.grab
            .refresh_can_hold(world, self.body, position, self.config.body_radius);

        for event in world.take_sensor_events() {
            self.handle_sensor_event(world, event);
        }
        Ok(())
    }

    /// React to a holder contact change
    pub fn handle_sensor_event(&mut self, world: &mut PhysicsWorld, event: SensorEvent) {
        if event.sensor != self.holder {
            return;
        }
        match event.phase {
            ContactPhase::Enter => {
                self.grab.try_grab(world, self.body, event.body);
            }
            ContactPhase::Exit => self.grab.on_contact_lost(world, self.body, event.body),
        }
    }

    /// Tear down before the character's scene goes away
    pub fn on_scene_exit(&mut self, world: &mut PhysicsWorld) {
        self.grab.release(world, self.body);
        self.movement.reset();
        world.remove_sensor(self.holder);
    }
}
