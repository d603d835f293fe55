//! Input mapping from raw events to application actions
//!
//! Maps keyboard and mouse input to high-level actions like StartGame, Exit, etc.
//! Character keys (movement, jump, push) are NOT mapped here - they go to the
//! character's action map.

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Application-level actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Press the main menu start button (Enter, or click while in the menu)
    StartGame,
    /// Abandon a scene transition before the level activates (Backspace)
    CancelLoad,
    /// Exit application (Escape)
    Exit,
}

/// Maps raw input events to application actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `None` for keys the character handles
    pub fn map_keyboard(key: KeyCode, state: ElementState, in_menu: bool) -> Option<InputAction> {
        // Only handle key presses, not releases
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Enter | KeyCode::NumpadEnter if in_menu => Some(InputAction::StartGame),
            KeyCode::Backspace => Some(InputAction::CancelLoad),
            KeyCode::Escape => Some(InputAction::Exit),
            _ => None,
        }
    }

    /// Map mouse button to an action
    ///
    /// A left click in the menu presses the start button
    pub fn map_mouse_button(button: MouseButton, state: ElementState, in_menu: bool) -> Option<InputAction> {
        if button == MouseButton::Left && state == ElementState::Pressed && in_menu {
            Some(InputAction::StartGame)
        } else {
            None
        }
    }
}
