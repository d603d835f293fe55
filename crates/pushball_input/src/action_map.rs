//! Keyboard bindings for character actions
//!
//! Bindings:
//! - A/D or Left/Right: movement axis (composite, -1..1)
//! - Space: jump
//! - E: push
//! - Q: release a held object
//! - I/J/K/L: aim direction (composite 2D)

use log::debug;
use pushball_math::Vec2;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::action::{Action, ActionEvent, ActionPhase, ActionValue};

/// Translates key state into action events
///
/// Events queue up until [`drain`](ActionMap::drain) is called. A disabled
/// map ignores keys and injected events.
#[derive(Debug, Default)]
pub struct ActionMap {
    enabled: bool,

    // Movement composite
    left: bool,
    right: bool,

    // Buttons (held state, to drop key repeat)
    jump: bool,
    push: bool,
    release: bool,

    // Aim composite
    aim_up: bool,
    aim_down: bool,
    aim_left: bool,
    aim_right: bool,

    events: Vec<ActionEvent>,
}

impl ActionMap {
    /// Create a disabled action map
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            debug!("Character action map enabled");
        }
        self.enabled = true;
    }

    /// Disable the map, dropping held keys and queued events
    pub fn disable(&mut self) {
        if self.enabled {
            debug!("Character action map disabled");
        }
        *self = Self::default();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Process keyboard input
    ///
    /// Returns true when the key is bound.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        if !self.enabled {
            return false;
        }
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                let before = self.move_axis();
                self.left = pressed;
                self.emit_axis(before);
                true
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                let before = self.move_axis();
                self.right = pressed;
                self.emit_axis(before);
                true
            }
            KeyCode::Space => {
                Self::button(&mut self.jump, pressed, Action::Jump, &mut self.events);
                true
            }
            KeyCode::KeyE => {
                Self::button(&mut self.push, pressed, Action::Push, &mut self.events);
                true
            }
            KeyCode::KeyQ => {
                Self::button(&mut self.release, pressed, Action::Release, &mut self.events);
                true
            }
            KeyCode::KeyI | KeyCode::KeyK | KeyCode::KeyJ | KeyCode::KeyL => {
                let before = self.aim_vector();
                match key {
                    KeyCode::KeyI => self.aim_up = pressed,
                    KeyCode::KeyK => self.aim_down = pressed,
                    KeyCode::KeyJ => self.aim_left = pressed,
                    _ => self.aim_right = pressed,
                }
                self.emit_aim(before);
                true
            }
            _ => false,
        }
    }

    /// Queue an event directly (scripted input, tests)
    pub fn inject(&mut self, event: ActionEvent) {
        if self.enabled {
            self.events.push(event);
        }
    }

    /// Take all queued events in order
    pub fn drain(&mut self) -> Vec<ActionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current movement axis
    pub fn move_axis(&self) -> f32 {
        (self.right as i32 - self.left as i32) as f32
    }

    /// Current aim vector
    pub fn aim_vector(&self) -> Vec2 {
        Vec2::new(
            (self.aim_right as i32 - self.aim_left as i32) as f32,
            (self.aim_up as i32 - self.aim_down as i32) as f32,
        )
    }

    fn button(held: &mut bool, pressed: bool, action: Action, events: &mut Vec<ActionEvent>) {
        match (*held, pressed) {
            (false, true) => {
                events.push(ActionEvent::new(action, ActionPhase::Started, ActionValue::Button));
                events.push(ActionEvent::new(action, ActionPhase::Performed, ActionValue::Button));
            }
            (true, false) => {
                events.push(ActionEvent::new(action, ActionPhase::Canceled, ActionValue::Button));
            }
            // Key repeat
            _ => {}
        }
        *held = pressed;
    }

    fn emit_axis(&mut self, before: f32) {
        let after = self.move_axis();
        if after == before {
            return;
        }
        if after == 0.0 {
            self.events.push(ActionEvent::axis(ActionPhase::Canceled, 0.0));
            return;
        }
        if before == 0.0 {
            self.events.push(ActionEvent::axis(ActionPhase::Started, after));
        }
        self.events.push(ActionEvent::axis(ActionPhase::Performed, after));
    }

    fn emit_aim(&mut self, before: Vec2) {
        let after = self.aim_vector();
        if after == before {
            return;
        }
        let phase = if after == Vec2::ZERO {
            ActionPhase::Canceled
        } else {
            ActionPhase::Performed
        };
        self.events.push(ActionEvent::new(Action::Aim, phase, ActionValue::Vector2(after)));
    }
}
