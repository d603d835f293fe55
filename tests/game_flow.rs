//! End-to-end game flow: main menu, loading screen, first level, push

use pushball::config::AppConfig;
use pushball::game::Game;
use pushball::systems::SimulationSystem;
use pushball_core::{SceneBackend, TransitionState};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

const FRAME_DT: f32 = 1.0 / 60.0;

fn start() -> (Game, SimulationSystem) {
    let mut config = AppConfig::default();
    config.scenes.load_steps = 5;
    let simulation = SimulationSystem::new(config.physics.fixed_timestep);
    (Game::new(config).unwrap(), simulation)
}

fn run_until(game: &mut Game, sim: &mut SimulationSystem, max_frames: usize, done: impl Fn(&Game) -> bool) -> bool {
    for _ in 0..max_frames {
        if done(game) {
            return true;
        }
        sim.update(game, FRAME_DT).unwrap();
    }
    done(game)
}

#[test]
fn test_menu_to_first_level() {
    let (mut game, mut sim) = start();
    assert_eq!(game.scenes.active_scene_name(), Some("MainMenu"));

    game.handle_key(KeyCode::Enter, ElementState::Pressed).unwrap();

    let mut last_progress = 0.0;
    let done = run_until(&mut game, &mut sim, 200, |g| g.sequencer.state() == TransitionState::Done);
    assert!(done);

    // Progress never moved backwards along the way
    for _ in 0..3 {
        let result = sim.update(&mut game, FRAME_DT).unwrap();
        assert!(result.transition_progress >= last_progress);
        last_progress = result.transition_progress;
    }
    assert_eq!(last_progress, 1.0);

    assert_eq!(game.scenes.active_scene_name(), Some("Level1"));
    assert_eq!(game.scenes.loaded_scenes(), ["Level1".to_string()]);
    assert!(game.player().is_some());
    assert_eq!(game.progress_display.value(), 1.0);
    assert!(!game.progress_display.is_enabled());
}

#[test]
fn test_start_ignored_while_loading() {
    let (mut game, mut sim) = start();
    game.handle_key(KeyCode::Enter, ElementState::Pressed).unwrap();
    sim.update(&mut game, FRAME_DT).unwrap();

    // Enter is no longer a menu action once loading has begun
    game.handle_key(KeyCode::Enter, ElementState::Pressed).unwrap();
    assert!(run_until(&mut game, &mut sim, 200, |g| g.sequencer.state() == TransitionState::Done));
    assert_eq!(game.scenes.loaded_scenes(), ["Level1".to_string()]);
}

#[test]
fn test_cancel_returns_to_menu() {
    let (mut game, mut sim) = start();
    game.handle_key(KeyCode::Enter, ElementState::Pressed).unwrap();
    assert!(run_until(&mut game, &mut sim, 50, |g| g.sequencer.state() == TransitionState::LoadingTarget));

    game.handle_key(KeyCode::Backspace, ElementState::Pressed).unwrap();
    assert_eq!(game.sequencer.state(), TransitionState::Idle);

    run_until(&mut game, &mut sim, 20, |g| g.scenes.pending_operations() == 0);
    assert_eq!(game.scenes.active_scene_name(), Some("MainMenu"));
    assert!(!game.scenes.is_loaded("Loading"));
    assert!(game.player().is_none());
    assert!(game.in_menu());

    // The loading bar stops with its scene
    let shown = game.progress_display.value();
    assert!(!game.progress_display.is_enabled());
    sim.update(&mut game, FRAME_DT).unwrap();
    assert_eq!(game.progress_display.value(), shown);
}

#[test]
fn test_player_pushes_ball() {
    let (mut game, mut sim) = start();
    game.handle_key(KeyCode::Enter, ElementState::Pressed).unwrap();
    assert!(run_until(&mut game, &mut sim, 200, |g| g.player().is_some()));

    let ball_start = game.body_position("ball").unwrap();
    game.handle_key(KeyCode::KeyD, ElementState::Pressed).unwrap();
    assert!(run_until(&mut game, &mut sim, 240, |g| {
        g.player().is_some_and(|p| p.controller.state().holding)
    }));

    game.handle_key(KeyCode::KeyE, ElementState::Pressed).unwrap();
    game.handle_key(KeyCode::KeyD, ElementState::Released).unwrap();
    for _ in 0..30 {
        sim.update(&mut game, FRAME_DT).unwrap();
    }

    let player = game.player().unwrap();
    assert!(!player.controller.state().holding);
    assert!(game.body_position("ball").unwrap().x > ball_start.x);
}
