//! Game state
//!
//! Owns the scene manager, the transition sequencer and the player. Scene
//! transitions and the player are passed around explicitly; nothing here is
//! global.

use log::{debug, info, warn};
use pushball_character::{CharacterController, ControllerError};
use pushball_core::{
    SceneBackend, SceneError, SceneManager, SceneTransitionSequencer, TransitionError,
    TransitionProgressDisplay,
};
use pushball_input::CharacterInput;
use pushball_math::Vec3;
use pushball_physics::PhysicsWorld;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use crate::config::AppConfig;
use crate::input::{InputAction, InputMapper};
use crate::scene::demo_scenes;
use crate::systems::MainMenu;

/// Errors surfaced by the game loop
#[derive(Debug)]
pub enum GameError {
    Scene(SceneError),
    Transition(TransitionError),
    Character(ControllerError),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::Scene(e) => write!(f, "Scene error: {}", e),
            GameError::Transition(e) => write!(f, "Transition error: {}", e),
            GameError::Character(e) => write!(f, "Character error: {}", e),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Scene(e) => Some(e),
            GameError::Transition(e) => Some(e),
            GameError::Character(e) => Some(e),
        }
    }
}

impl From<SceneError> for GameError {
    fn from(e: SceneError) -> Self {
        GameError::Scene(e)
    }
}

impl From<TransitionError> for GameError {
    fn from(e: TransitionError) -> Self {
        GameError::Transition(e)
    }
}

impl From<ControllerError> for GameError {
    fn from(e: ControllerError) -> Self {
        GameError::Character(e)
    }
}

/// The player: a character controller living in one scene's physics world
pub struct Player {
    /// Scene whose physics world holds the character body
    pub scene: String,
    pub controller: CharacterController,
    /// Keeps the character's action map enabled while the player exists
    pub input: CharacterInput,
}

/// Everything the frame loop drives
pub struct Game {
    pub config: AppConfig,
    pub scenes: SceneManager,
    pub sequencer: SceneTransitionSequencer,
    pub progress_display: TransitionProgressDisplay,
    pub menu: MainMenu,
    player: Option<Player>,
    exit_requested: bool,
}

impl Game {
    /// Register the built-in scenes and open the main menu
    pub fn new(config: AppConfig) -> Result<Self, GameError> {
        let mut scenes = SceneManager::new().with_physics(config.physics.to_physics_config());
        for scene in demo_scenes(&config.scenes) {
            scenes.register_template(scene);
        }
        scenes.load_immediate(&config.scenes.main_menu)?;
        scenes.take_loaded_events();
        scenes.take_unloaded_events();

        let transition = config.scenes.transition_scene.clone();
        Ok(Self {
            sequencer: SceneTransitionSequencer::new(transition.clone()),
            progress_display: TransitionProgressDisplay::new(transition),
            menu: MainMenu::new(config.scenes.first_level.clone()),
            scenes,
            player: None,
            exit_requested: false,
            config,
        })
    }

    /// Whether the main menu is showing and idle
    pub fn in_menu(&self) -> bool {
        self.scenes.active_scene_name() == Some(self.config.scenes.main_menu.as_str())
            && !self.sequencer.is_busy()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// Physics world the player lives in
    pub fn player_world(&self) -> Option<&PhysicsWorld> {
        let player = self.player.as_ref()?;
        self.scenes.get_scene(&player.scene).map(|s| &s.physics)
    }

    pub fn player_position(&self) -> Option<Vec3> {
        let player = self.player.as_ref()?;
        player.controller.position(self.player_world()?).ok()
    }

    /// Position of a named body in the active scene
    pub fn body_position(&self, name: &str) -> Option<Vec3> {
        let scene = self.scenes.active_scene()?;
        let key = scene.body(name)?;
        scene.physics.get_body(key).map(|b| b.position)
    }

    /// Route a key to the application mapper, then to the character
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) -> Result<(), GameError> {
        if let Some(action) = InputMapper::map_keyboard(key, state, self.in_menu()) {
            return self.apply_action(action);
        }
        if let Some(player) = self.player.as_mut() {
            player.input.process_keyboard(key, state);
        }
        Ok(())
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) -> Result<(), GameError> {
        match InputMapper::map_mouse_button(button, state, self.in_menu()) {
            Some(action) => self.apply_action(action),
            None => Ok(()),
        }
    }

    pub fn apply_action(&mut self, action: InputAction) -> Result<(), GameError> {
        match action {
            InputAction::StartGame => self.menu.press_start(&mut self.sequencer, &mut self.scenes)?,
            InputAction::CancelLoad => self.sequencer.cancel(&mut self.scenes)?,
            InputAction::Exit => {
                info!("Exit requested");
                self.exit_requested = true;
            }
        }
        Ok(())
    }

    // --- Frame phases, driven by SimulationSystem ---

    /// Variable-rate phase: feed input to the character and write its velocity
    pub(crate) fn update(&mut self) -> Result<(), GameError> {
        let Some(player) = self.player.as_mut() else {
            return Ok(());
        };
        let Some(scene) = self.scenes.get_scene_mut(&player.scene) else {
            return Ok(());
        };
        for event in player.input.drain() {
            player.controller.handle_action(&mut scene.physics, event)?;
        }
        player.controller.update(&mut scene.physics)?;
        Ok(())
    }

    /// Advance scene loading and keep the player in the active scene
    pub(crate) fn advance_scenes(&mut self) {
        if let Err(e) = self.sequencer.tick(&mut self.scenes) {
            warn!("Scene transition failed: {}", e);
        }
        self.scenes.advance_operations();
        for name in self.scenes.take_loaded_events() {
            self.progress_display.on_scene_loaded(&name);
        }
        // The loading scene also goes away mid-transition; only an abandoned
        // transition stops the bar before 1.0
        for name in self.scenes.take_unloaded_events() {
            if !self.sequencer.is_busy() {
                self.progress_display.on_scene_unloaded(&name);
            }
        }
        self.sync_player();
    }

    /// Fixed-rate phase: step physics, then the character and progress bar
    pub(crate) fn fixed_update(&mut self, dt: f32) -> Result<(), GameError> {
        self.scenes.update(dt);
        if let Some(player) = self.player.as_mut() {
            if let Some(scene) = self.scenes.get_scene_mut(&player.scene) {
                player.controller.fixed_update(&mut scene.physics, dt)?;
            }
        }
        self.progress_display.fixed_update(self.sequencer.progress());
        Ok(())
    }

    fn sync_player(&mut self) {
        let active = self.scenes.active_scene_name().map(str::to_string);

        let stale = self
            .player
            .as_ref()
            .is_some_and(|p| active.as_deref() != Some(p.scene.as_str()));
        if stale {
            if let Some(mut player) = self.player.take() {
                if let Some(scene) = self.scenes.get_scene_mut(&player.scene) {
                    player.controller.on_scene_exit(&mut scene.physics);
                }
                info!("Player left scene '{}'", player.scene);
            }
        }

        if self.player.is_some() {
            return;
        }
        let Some(scene) = self.scenes.active_scene_mut() else {
            return;
        };
        let Some(spawn) = scene.spawn_point() else {
            return;
        };
        let controller = CharacterController::spawn(&mut scene.physics, spawn, self.config.character.clone());
        debug!("Spawned player at {:?}", spawn);
        info!("Player entered scene '{}'", scene.name);
        self.player = Some(Player {
            scene: scene.name.clone(),
            controller,
            input: CharacterInput::default(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        let mut config = AppConfig::default();
        config.scenes.load_steps = 3;
        Game::new(config).unwrap()
    }

    #[test]
    fn test_starts_in_menu() {
        let game = game();
        assert!(game.in_menu());
        assert!(game.player().is_none());
    }

    #[test]
    fn test_enter_starts_transition() {
        let mut game = game();
        game.handle_key(KeyCode::Enter, ElementState::Pressed).unwrap();
        assert!(game.sequencer.is_busy());
        assert!(!game.in_menu());
    }

    #[test]
    fn test_click_starts_transition() {
        let mut game = game();
        game.handle_mouse_button(MouseButton::Left, ElementState::Pressed).unwrap();
        assert!(game.sequencer.is_busy());
    }

    #[test]
    fn test_cancel_when_idle_is_error() {
        let mut game = game();
        assert!(matches!(
            game.handle_key(KeyCode::Backspace, ElementState::Pressed),
            Err(GameError::Transition(TransitionError::NotCancellable))
        ));
    }

    #[test]
    fn test_escape_requests_exit() {
        let mut game = game();
        game.handle_key(KeyCode::Escape, ElementState::Pressed).unwrap();
        assert!(game.exit_requested());
    }

    #[test]
    fn test_game_error_display() {
        let err: GameError = ControllerError::MissingBody.into();
        assert_eq!(format!("{}", err), "Character error: Character body missing from physics world");
    }
}
