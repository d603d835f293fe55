//! Pushball - headless session
//!
//! Opens the main menu, starts the first level through the loading screen,
//! then plays a short scripted run: walk into the ball, push it and jump.

use winit::event::ElementState;
use winit::keyboard::KeyCode;

use pushball::config::AppConfig;
use pushball::game::Game;
use pushball::systems::SimulationSystem;
use pushball_core::SceneBackend;

/// Keys pressed and released relative to the frame the player spawned
const SCRIPT: &[(u32, KeyCode, ElementState)] = &[
    (1, KeyCode::KeyD, ElementState::Pressed),
    (90, KeyCode::KeyI, ElementState::Pressed),
    (90, KeyCode::KeyL, ElementState::Pressed),
    (91, KeyCode::KeyE, ElementState::Pressed),
    (92, KeyCode::KeyE, ElementState::Released),
    (92, KeyCode::KeyI, ElementState::Released),
    (92, KeyCode::KeyL, ElementState::Released),
    (100, KeyCode::KeyD, ElementState::Released),
    (120, KeyCode::Space, ElementState::Pressed),
    (121, KeyCode::Space, ElementState::Released),
];

fn main() {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.debug.log_level)).init();
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }

    let frames = config.simulation.frames;
    let frame_dt = config.simulation.frame_dt;
    let mut simulation = SimulationSystem::new(config.physics.fixed_timestep);
    let mut game = match Game::new(config) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Main menu open - starting game");
    if let Err(e) = game.handle_key(KeyCode::Enter, ElementState::Pressed) {
        log::error!("Failed to start game: {}", e);
        std::process::exit(1);
    }

    let mut spawned_at = None;
    for frame in 0..frames {
        if spawned_at.is_none() && game.player().is_some() {
            log::info!("Player spawned on frame {}", frame);
            spawned_at = Some(frame);
        }
        if let Some(start) = spawned_at {
            for &(at, key, state) in SCRIPT {
                if frame - start == at {
                    if let Err(e) = game.handle_key(key, state) {
                        log::warn!("Key {:?} rejected: {}", key, e);
                    }
                }
            }
        }

        match simulation.update(&mut game, frame_dt) {
            Ok(result) => log::trace!("Frame {}: {:?}", frame, result),
            Err(e) => {
                log::error!("Simulation failed on frame {}: {}", frame, e);
                std::process::exit(1);
            }
        }

        if game.exit_requested() {
            break;
        }
    }

    log::info!(
        "Active scene: {}",
        game.scenes.active_scene_name().unwrap_or("<none>")
    );
    log::info!("Transition progress: {:.2}", game.sequencer.progress());
    if let Some(position) = game.player_position() {
        log::info!("Player at ({:.2}, {:.2})", position.x, position.y);
    }
    for name in ["ball", "far_ball"] {
        if let Some(position) = game.body_position(name) {
            log::info!("{} at ({:.2}, {:.2})", name, position.x, position.y);
        }
    }
}
