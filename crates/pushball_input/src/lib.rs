//! Character input for Pushball
//!
//! Raw keyboard events become typed [`ActionEvent`]s through an
//! [`ActionMap`]. [`CharacterInput`] keeps a map enabled for as long as it
//! is alive.

mod action;
mod action_map;
mod character_input;

pub use action::{Action, ActionEvent, ActionPhase, ActionValue};
pub use action_map::ActionMap;
pub use character_input::CharacterInput;
