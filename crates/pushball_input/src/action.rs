//! Typed action events

use pushball_math::Vec2;

/// Gameplay actions the character responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Horizontal movement axis
    Move,
    Jump,
    Push,
    /// Let go of a held object
    Release,
    /// Push aim direction
    Aim,
}

/// Lifecycle of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Started,
    Performed,
    Canceled,
}

/// Payload carried by an action event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionValue {
    Button,
    Axis(f32),
    Vector2(Vec2),
}

impl ActionValue {
    /// Read as an axis; buttons read as 1.0
    pub fn axis(self) -> f32 {
        match self {
            ActionValue::Button => 1.0,
            ActionValue::Axis(v) => v,
            ActionValue::Vector2(v) => v.x,
        }
    }

    /// Read as a 2D vector; axes map onto x
    pub fn vector2(self) -> Vec2 {
        match self {
            ActionValue::Button => Vec2::new(1.0, 0.0),
            ActionValue::Axis(v) => Vec2::new(v, 0.0),
            ActionValue::Vector2(v) => v,
        }
    }
}

/// One action event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionEvent {
    pub action: Action,
    pub phase: ActionPhase,
    pub value: ActionValue,
}

impl ActionEvent {
    pub fn new(action: Action, phase: ActionPhase, value: ActionValue) -> Self {
        Self { action, phase, value }
    }

    /// A button press
    pub fn pressed(action: Action) -> Self {
        Self::new(action, ActionPhase::Performed, ActionValue::Button)
    }

    pub fn axis(phase: ActionPhase, value: f32) -> Self {
        Self::new(Action::Move, phase, ActionValue::Axis(value))
    }

    pub fn aim(x: f32, y: f32) -> Self {
        Self::new(Action::Aim, ActionPhase::Performed, ActionValue::Vector2(Vec2::new(x, y)))
    }
}
